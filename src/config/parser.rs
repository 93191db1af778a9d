use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Parses the TOML, applies environment overrides for the
/// deployment-tuned knobs, and validates the result.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

/// Applies environment overrides, read once at startup.
///
/// `MAPSWEEP_MIN_CONCURRENCY` and `MAPSWEEP_MAX_CONCURRENCY` override
/// the engine's worker bounds; `PROXY_HOST` overrides the HTTP proxy.
fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(value) = read_env("MAPSWEEP_MIN_CONCURRENCY") {
        config.engine.min_concurrency =
            value
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    name: "MAPSWEEP_MIN_CONCURRENCY".to_string(),
                    value,
                })?;
    }

    if let Some(value) = read_env("MAPSWEEP_MAX_CONCURRENCY") {
        config.engine.max_concurrency =
            value
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    name: "MAPSWEEP_MAX_CONCURRENCY".to_string(),
                    value,
                })?;
    }

    if let Some(value) = read_env("PROXY_HOST") {
        config.http.proxy_host = Some(value);
    }

    Ok(())
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Used to detect whether the configuration changed between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let config_content = r#"
[queue]
database-path = "./mapsweep.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.orchestrator.backpressure_ceiling, 10);
        assert_eq!(config.orchestrator.dispatch_interval_ms, 500);
        assert_eq!(config.engine.min_concurrency, 1);
        assert_eq!(config.engine.max_concurrency, 3);
        assert_eq!(config.scroll.max_iterations, 30);
        assert_eq!(config.queue.task_queue, "place:task:queue");
        assert_eq!(config.queue.dead_letter_queue, "place:task:error:queue");
        assert_eq!(config.target.place_url_marker, "www.google.com/maps/place");
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[orchestrator]
backpressure-ceiling = 20
dispatch-interval-ms = 250
empty-queue-wait-ms = 2000
busy-wait-ms = 500

[engine]
min-concurrency = 2
max-concurrency = 6
max-request-retries = 5
handler-timeout-secs = 120
retry-delay-ms = 1000
teardown-grace-ms = 2000

[scroll]
max-iterations = 15
settle-ms = 1000

[queue]
database-path = "./sweep.db"
task-queue = "sweep:tasks"
dead-letter-queue = "sweep:errors"

[target]
place-url-marker = "maps.example.com/place"
fixed-query = "hl=en"

[http]
user-agent = "sweep-test/0.1"
request-timeout-secs = 30
connect-timeout-secs = 5
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.orchestrator.backpressure_ceiling, 20);
        assert_eq!(config.engine.max_concurrency, 6);
        assert_eq!(config.scroll.max_iterations, 15);
        assert_eq!(config.queue.task_queue, "sweep:tasks");
        assert_eq!(config.target.fixed_query, "hl=en");
        assert_eq!(config.http.user_agent, "sweep-test/0.1");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[engine]
min-concurrency = 5
max-concurrency = 2

[queue]
database-path = "./mapsweep.db"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
