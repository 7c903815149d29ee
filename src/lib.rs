//! Block History: deletes browsing history matching keyword filters and
//! optionally blocks all new history.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod rpc_transport;
pub mod services;
pub mod types;
