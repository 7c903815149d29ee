// Block History managers
// Host-facing adapters that own persisted data: browsing history and the
// synced key-value storage area.

pub mod history_manager;
pub mod storage_manager;
