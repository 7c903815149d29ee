use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::CommandError;
use super::settings::Settings;

/// Result object every command resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            settings: None,
            data: None,
            error: None,
        }
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
            ..Self::ok()
        }
    }

    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            settings: None,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl From<CommandError> for CommandResponse {
    fn from(e: CommandError) -> Self {
        CommandResponse::failure(e.to_string())
    }
}

/// Usage of the synced settings area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageInfo {
    pub used: usize,
    pub quota: usize,
    pub percentage: f64,
}

/// Why the host fired its install event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstallReason {
    Install,
    Update,
}

/// Outcome of one scan-and-eradicate pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScrubReport {
    pub matched: usize,
    pub deleted: usize,
}
