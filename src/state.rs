//! Shared application state handed to every handler

use crate::config::PaginationConfig;
use crate::services::Services;
use crate::store::Db;

/// Cloned into each request; all fields are cheap handles
#[derive(Clone)]
pub struct AppState {
    /// Domain services over the shared store
    pub services: Services,
    /// Page size defaults and bounds for listing endpoints
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Build the services on `db`
    pub fn new(db: Db, pagination: PaginationConfig) -> Self {
        Self {
            services: Services::new(db),
            pagination,
        }
    }
}
