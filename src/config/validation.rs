//! Configuration validation
//!
//! Rejects configurations that would make the orchestrator misbehave
//! silently: zero-width concurrency bounds, identical queue names,
//! empty identifiers.

use crate::config::types::Config;
use crate::ConfigError;

/// Validates a parsed configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.engine.min_concurrency == 0 {
        return Err(ConfigError::Validation(
            "engine.min-concurrency must be at least 1".to_string(),
        ));
    }

    if config.engine.max_concurrency < config.engine.min_concurrency {
        return Err(ConfigError::Validation(format!(
            "engine.max-concurrency ({}) must not be below min-concurrency ({})",
            config.engine.max_concurrency, config.engine.min_concurrency
        )));
    }

    if config.engine.handler_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "engine.handler-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.orchestrator.backpressure_ceiling == 0 {
        return Err(ConfigError::Validation(
            "orchestrator.backpressure-ceiling must be at least 1".to_string(),
        ));
    }

    if config.scroll.max_iterations == 0 {
        return Err(ConfigError::Validation(
            "scroll.max-iterations must be at least 1".to_string(),
        ));
    }

    if config.queue.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "queue.database-path must not be empty".to_string(),
        ));
    }

    if config.queue.task_queue.is_empty() || config.queue.dead_letter_queue.is_empty() {
        return Err(ConfigError::Validation(
            "queue names must not be empty".to_string(),
        ));
    }

    if config.queue.task_queue == config.queue.dead_letter_queue {
        return Err(ConfigError::Validation(format!(
            "task queue and dead-letter queue must differ (both are {})",
            config.queue.task_queue
        )));
    }

    if config.target.place_url_marker.is_empty() {
        return Err(ConfigError::Validation(
            "target.place-url-marker must not be empty".to_string(),
        ));
    }

    if config.http.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "http.user-agent must not be empty".to_string(),
        ));
    }

    Ok(())
}
