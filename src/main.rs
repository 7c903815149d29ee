//! Block History console demo.
//!
//! Runs the scrubbing core against an in-memory history database: settings
//! lifecycle, keyword commands, a windowed scan with verified deletion, and
//! the live monitor reacting to new visits.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use block_history::app::App;
use block_history::config::ScrubConfig;
use block_history::database::Database;
use block_history::logging;
use block_history::managers::history_manager::HistoryManager;
use block_history::managers::storage_manager::StorageManager;
use block_history::rpc_handler::{handle_action, handle_event};
use block_history::types::now_millis;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    println!();
    println!("  Block History v{} (demo mode)", env!("CARGO_PKG_VERSION"));
    println!();

    let db = Arc::new(Database::open_in_memory()?);
    let history = Arc::new(HistoryManager::new(db.clone()));
    let storage = Arc::new(StorageManager::new(db));
    let app = App::new(history.clone(), storage, ScrubConfig::from_env().without_pauses());

    section("Lifecycle");
    let installed = handle_event(&app, "installed", &json!({"reason": "install"})).await;
    println!("  Installed: {}", serde_json::to_string(&installed)?);

    section("Seed history");
    let now = now_millis();
    let seed = [
        ("https://shop.example.com/cart", 1),
        ("https://example.com/shop/items", 45),
        ("https://workshop.example.com", 3),
        ("https://news.example.org/today", 90),
        ("https://example.com/shop/items", 200),
    ];
    for (url, days_ago) in seed {
        history.record_visit(url, "", now - days_ago * DAY_MS)?;
    }
    println!("  Recorded {} visits", history.visit_count()?);

    section("Add keyword 'shop' (scans and eradicates existing history)");
    let added = handle_action(&app, "ADD_KEYWORD", &json!({"keyword": "Shop"})).await;
    println!("  {}", serde_json::to_string(&added)?);
    println!("  Visits remaining: {}", history.visit_count()?);

    section("Duplicate keyword");
    let dup = handle_action(&app, "ADD_KEYWORD", &json!({"keyword": " SHOP "})).await;
    println!("  {}", serde_json::to_string(&dup)?);

    section("Live monitor");
    let monitor = app.spawn_live_monitor();
    history.record_visit("https://shop.example.net", "", now_millis())?;
    history.record_visit("https://rust-lang.org/learn", "", now_millis())?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("  Visits remaining after keyword monitor: {}", history.visit_count()?);

    handle_action(&app, "TOGGLE_HISTORY_BLOCKING", &json!({"isEnabled": true})).await;
    history.record_visit("https://docs.rs", "", now_millis())?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("  Visits remaining with global block: {}", history.visit_count()?);
    monitor.abort();

    section("Storage");
    let info = handle_action(&app, "GET_STORAGE_INFO", &json!({})).await;
    println!("  {}", serde_json::to_string(&info)?);

    println!();
    println!("  Demo finished.");
    Ok(())
}
