//! Lending ledger
//!
//! Catalog, membership and borrowing state machine for a shared inventory of
//! books, served as a REST JSON API to an authenticating front end.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build an empty ledger from a fully loaded configuration
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let repository = repository::Repository::new(config.ledger.event_channel_capacity);
        let services = services::Services::new(repository, &config.ledger)?;
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
