//! Command dispatch for Block History.
//!
//! Maps UI action names and host lifecycle events to async handlers. Every
//! entry point here resolves to a [`CommandResponse`]; no error escapes.

use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::app::App;
use crate::types::errors::{CommandError, ValidationError};
use crate::types::history::HistoryRecord;
use crate::types::now_millis;
use crate::types::rpc::{CommandResponse, InstallReason};

/// Action names accepted by [`handle_action`].
pub const ACTIONS: &[&str] = &[
    "TOGGLE_HISTORY_BLOCKING",
    "ADD_KEYWORD",
    "REMOVE_KEYWORD",
    "CLEAR_ALL_KEYWORDS",
    "GET_SETTINGS",
    "CLEAR_HISTORY",
    "RESET_SETTINGS",
    "EXPORT_SETTINGS",
    "IMPORT_SETTINGS",
    "GET_STORAGE_INFO",
];

fn str_field<'a>(data: &'a Value, name: &str) -> Result<&'a str, ValidationError> {
    data.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::InvalidPayload(format!("missing {}", name)))
}

fn bool_field(data: &Value, name: &str) -> Result<bool, ValidationError> {
    data.get(name)
        .and_then(Value::as_bool)
        .ok_or_else(|| ValidationError::InvalidPayload(format!("missing {}", name)))
}

/// Dispatches one UI command.
pub async fn handle_action(app: &App, action: &str, data: &Value) -> CommandResponse {
    debug!(action = %action, "Command received");
    let result = dispatch(app, action, data).await;
    if let Err(e) = &result {
        error!(action = %action, error = %e, "Command failed");
    }
    result.unwrap_or_else(CommandResponse::from)
}

async fn dispatch(app: &App, action: &str, data: &Value) -> Result<CommandResponse, CommandError> {
    match action {
        "TOGGLE_HISTORY_BLOCKING" => {
            let enabled = bool_field(data, "isEnabled")?;
            let _guard = app.begin_operation().await;
            let settings = app.settings.set_enabled(enabled).await?;
            info!(enabled, "History blocking toggled");
            Ok(CommandResponse::with_settings(settings))
        }
        "ADD_KEYWORD" => {
            let keyword = str_field(data, "keyword")?;
            let _guard = app.begin_operation().await;
            let settings = app.settings.add_keyword(keyword).await?;
            // The stored (sanitized) form is the last entry.
            let added: Vec<String> = settings.keywords.last().cloned().into_iter().collect();
            let report = app.scrub(&added).await;
            info!(keyword = ?added.first(), matched = report.matched, deleted = report.deleted, "Keyword added");
            Ok(CommandResponse {
                data: Some(json!(report)),
                ..CommandResponse::with_settings(settings)
            })
        }
        "REMOVE_KEYWORD" => {
            let keyword = str_field(data, "keyword")?;
            let _guard = app.begin_operation().await;
            let settings = app.settings.remove_keyword(keyword).await?;
            info!(keyword = %keyword, "Keyword removed");
            Ok(CommandResponse::with_settings(settings))
        }
        "CLEAR_ALL_KEYWORDS" => {
            let _guard = app.begin_operation().await;
            let settings = app.settings.clear_keywords().await?;
            info!("All keywords cleared");
            Ok(CommandResponse::with_settings(settings))
        }
        "GET_SETTINGS" => Ok(CommandResponse::with_settings(app.settings.get().await)),
        "CLEAR_HISTORY" => {
            let keyword = str_field(data, "keyword")?.trim();
            if keyword.is_empty() {
                return Err(ValidationError::Empty.into());
            }
            let _guard = app.begin_operation().await;
            let report = app.scrub(&[keyword.to_string()]).await;
            info!(keyword = %keyword, matched = report.matched, deleted = report.deleted, "History cleared for keyword");
            Ok(CommandResponse::with_data(json!(report)))
        }
        "RESET_SETTINGS" => {
            let _guard = app.begin_operation().await;
            Ok(CommandResponse::with_settings(app.settings.reset_to_defaults().await?))
        }
        "EXPORT_SETTINGS" => {
            let exported = app.settings.export_settings().await?;
            Ok(CommandResponse::with_data(json!({ "json": exported })))
        }
        "IMPORT_SETTINGS" => {
            let payload = str_field(data, "json")?;
            let _guard = app.begin_operation().await;
            Ok(CommandResponse::with_settings(app.settings.import_settings(payload).await?))
        }
        "GET_STORAGE_INFO" => {
            let info = app.settings.storage_info().await?;
            Ok(CommandResponse::with_data(json!(info)))
        }
        other => Err(CommandError::Unknown(format!("Unknown action: {}", other))),
    }
}

/// Hosts may send integral values (such as timestamps) as floats.
fn number_field(data: &Value, name: &str) -> Option<i64> {
    data.get(name)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
}

/// Builds the record carried by a `visited` event. `visitTime` defaults to now.
pub fn record_from_event(data: &Value) -> Result<HistoryRecord, ValidationError> {
    Ok(HistoryRecord {
        url: str_field(data, "url")?.to_string(),
        visit_time: number_field(data, "visitTime").unwrap_or_else(now_millis),
        visit_count: number_field(data, "visitCount").unwrap_or(1),
    })
}

/// Dispatches a host lifecycle or history event.
///
/// Events: `installed {reason}`, `startup`, `visited {url, visitTime?, visitCount?}`.
/// Install reasons other than `install` and `update` are ignored.
pub async fn handle_event(app: &App, event: &str, data: &Value) -> CommandResponse {
    match event {
        "installed" => {
            let reason = match data.get("reason").and_then(Value::as_str) {
                Some("install") => InstallReason::Install,
                Some("update") => InstallReason::Update,
                other => {
                    debug!(reason = ?other, "Ignoring install event");
                    return CommandResponse::with_settings(app.settings.get().await);
                }
            };
            let _guard = app.begin_operation().await;
            CommandResponse::with_settings(app.settings.on_installed(reason).await)
        }
        "startup" => {
            let _guard = app.begin_operation().await;
            CommandResponse::with_settings(app.settings.on_startup().await)
        }
        "visited" => {
            let record = match record_from_event(data) {
                Ok(record) => record,
                Err(e) => return CommandError::from(e).into(),
            };
            let decision = app.live_monitor().on_visited(&record).await;
            CommandResponse::with_data(json!(decision))
        }
        other => CommandError::Unknown(format!("Unknown event: {}", other)).into(),
    }
}
