//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Pagination limits applied to every listing
    pub pagination: PaginationConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite database URL or file path
    pub url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Load the sample clinic data into an empty store on startup
    pub seed_sample_data: bool,
}

/// Pagination configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size used when the caller does not ask for one
    pub default_page_size: u32,
    /// Largest page size a caller may request
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let max_page_size = parse_var("MAX_PAGE_SIZE")
            .filter(|size: &u32| *size > 0)
            .unwrap_or(100);
        let default_page_size = parse_var("DEFAULT_PAGE_SIZE")
            .filter(|size: &u32| *size > 0)
            .unwrap_or(20)
            .min(max_page_size);

        Self {
            server: ServerConfig {
                port: parse_var("PORT").unwrap_or(5000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:petclinic.db".to_string()),
                max_connections: parse_var("DB_MAX_CONNECTIONS")
                    .filter(|n: &u32| *n > 0)
                    .unwrap_or(5),
                seed_sample_data: env::var("SEED_SAMPLE_DATA")
                    .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
            },
            pagination: PaginationConfig {
                default_page_size,
                max_page_size,
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
