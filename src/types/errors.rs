use std::fmt;

// === ValidationError ===

/// Errors raised when a keyword or imported payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The keyword is empty after trimming.
    Empty,
    /// The keyword exceeds the maximum length (carries the trimmed length).
    TooLong(usize),
    /// The keyword contains one of `< > ' " &`.
    ForbiddenCharacters(String),
    /// The keyword already exists (case- and whitespace-insensitive).
    Duplicate(String),
    /// The keyword list is full (carries the limit).
    LimitReached(usize),
    /// An imported settings document could not be used.
    InvalidImport(String),
    /// A command payload is missing a field or has the wrong type.
    InvalidPayload(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "Invalid keyword format: keyword is empty"),
            ValidationError::TooLong(len) => {
                write!(f, "Keyword is too long ({} characters, max 100)", len)
            }
            ValidationError::ForbiddenCharacters(k) => {
                write!(f, "Invalid keyword format: forbidden characters in '{}'", k)
            }
            ValidationError::Duplicate(k) => write!(f, "Keyword already exists: {}", k),
            ValidationError::LimitReached(max) => {
                write!(f, "Keyword limit reached (max {})", max)
            }
            ValidationError::InvalidImport(msg) => write!(f, "Invalid import data: {}", msg),
            ValidationError::InvalidPayload(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

// === StorageError ===

/// Errors from the persistent key-value settings area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading a key failed.
    Read(String),
    /// Writing or removing a key failed.
    Write(String),
    /// A write would exceed the per-item or total quota.
    QuotaExceeded {
        key: String,
        bytes: usize,
        quota: usize,
    },
    /// A stored or outgoing value could not be (de)serialized.
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Read(msg) => write!(f, "Storage read failed: {}", msg),
            StorageError::Write(msg) => write!(f, "Storage write failed: {}", msg),
            StorageError::QuotaExceeded { key, bytes, quota } => write!(
                f,
                "Storage quota exceeded for '{}': {} bytes (quota {})",
                key, bytes, quota
            ),
            StorageError::Serialization(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === HistoryError ===

/// Errors from the host history API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A search or visit lookup failed.
    Query(String),
    /// A delete-by-url or delete-by-range command failed.
    Delete(String),
    /// The backing database failed.
    Database(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Query(msg) => write!(f, "History query failed: {}", msg),
            HistoryError::Delete(msg) => write!(f, "History delete failed: {}", msg),
            HistoryError::Database(msg) => write!(f, "History database error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

// === CommandError ===

/// Caller-facing failure of a command; its `Display` is the message returned to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Validation(ValidationError),
    Storage(StorageError),
    History(HistoryError),
    /// Anything else, including unknown actions.
    Unknown(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Validation(e) => write!(f, "{}", e),
            CommandError::Storage(e) => write!(f, "{}", e),
            CommandError::History(e) => write!(f, "{}", e),
            CommandError::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Validation(e) => Some(e),
            CommandError::Storage(e) => Some(e),
            CommandError::History(e) => Some(e),
            CommandError::Unknown(_) => None,
        }
    }
}

impl From<ValidationError> for CommandError {
    fn from(e: ValidationError) -> Self {
        CommandError::Validation(e)
    }
}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        CommandError::Storage(e)
    }
}

impl From<HistoryError> for CommandError {
    fn from(e: HistoryError) -> Self {
        CommandError::History(e)
    }
}
