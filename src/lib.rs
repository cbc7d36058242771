//! LabAudit WebUI Library
//!
//! This crate provides the core functionality for the LabAudit WebUI
//! application: a filterable, searchable audit log viewer with CSV export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::AppConfig;
pub use store::EventStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// The admitted audit event collection
    pub store: Arc<EventStore>,
}
