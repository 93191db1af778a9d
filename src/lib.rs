//! Mapsweep: a resilient scrape-job orchestrator for map place pages
//!
//! Mapsweep feeds place-detail URLs from a durable queue to a bounded
//! worker engine, skips work whose results already exist, classifies
//! failures for retry or dead-lettering, and drains queued and
//! in-flight work back into durable storage on termination signals.

pub mod classify;
pub mod config;
pub mod engine;
pub mod orchestrator;
pub mod pagination;
pub mod storage;
pub mod times;
pub mod tracker;
pub mod url;

use thiserror::Error;

/// Main error type for Mapsweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Place URL error: {0}")]
    PlaceUrl(#[from] PlaceUrlError),

    #[error("Engine error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid environment override {name}={value}")]
    InvalidOverride { name: String, value: String },
}

/// Place-URL specific errors
#[derive(Debug, Error)]
pub enum PlaceUrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Not a place-detail URL: {0}")]
    NotAPlace(String),

    #[error("No place identifier in URL: {0}")]
    MissingId(String),
}

/// Result type alias for Mapsweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

// Re-export commonly used types
pub use classify::{classify_failure, FailureKind};
pub use config::Config;
pub use engine::{CompletionEvent, ScrapeEngine};
pub use times::{parse_text_duration, RelativeAge, TimeUnit};
pub use tracker::InFlightTracker;
