//! Unit tests for error Display output and conversions.

use std::error::Error;

use block_history::types::errors::{CommandError, HistoryError, StorageError, ValidationError};
use block_history::types::rpc::CommandResponse;

#[test]
fn test_validation_error_display() {
    assert_eq!(
        ValidationError::Empty.to_string(),
        "Invalid keyword format: keyword is empty"
    );
    assert_eq!(
        ValidationError::Duplicate("shop".into()).to_string(),
        "Keyword already exists: shop"
    );
    assert_eq!(
        ValidationError::LimitReached(100).to_string(),
        "Keyword limit reached (max 100)"
    );
    assert!(ValidationError::TooLong(120).to_string().contains("120"));
    assert!(ValidationError::ForbiddenCharacters("<b>".into())
        .to_string()
        .contains("<b>"));
}

#[test]
fn test_storage_error_display() {
    let err = StorageError::QuotaExceeded {
        key: "settings".into(),
        bytes: 9_000,
        quota: 8_192,
    };
    assert_eq!(
        err.to_string(),
        "Storage quota exceeded for 'settings': 9000 bytes (quota 8192)"
    );
    assert_eq!(
        StorageError::Read("disk".into()).to_string(),
        "Storage read failed: disk"
    );
}

#[test]
fn test_history_error_display() {
    assert_eq!(
        HistoryError::Query("timeout".into()).to_string(),
        "History query failed: timeout"
    );
    assert_eq!(
        HistoryError::Delete("locked".into()).to_string(),
        "History delete failed: locked"
    );
}

#[test]
fn test_command_error_delegates_display_and_source() {
    let err: CommandError = ValidationError::Duplicate("shop".into()).into();
    assert_eq!(err.to_string(), "Keyword already exists: shop");
    assert!(err.source().is_some());

    let err: CommandError = StorageError::Write("full".into()).into();
    assert_eq!(err.to_string(), "Storage write failed: full");

    let err = CommandError::Unknown("Unknown action: X".into());
    assert_eq!(err.to_string(), "Unknown action: X");
    assert!(err.source().is_none());
}

#[test]
fn test_command_error_becomes_failed_response() {
    let resp: CommandResponse = CommandError::from(HistoryError::Database("gone".into())).into();
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("History database error: gone"));
    assert!(resp.settings.is_none());
    assert!(resp.data.is_none());
}
