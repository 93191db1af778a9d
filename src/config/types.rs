use serde::Deserialize;

/// Main configuration structure for Mapsweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    pub queue: QueueConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Dispatch-loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// In-flight ceiling above which dispatch stops popping
    #[serde(rename = "backpressure-ceiling")]
    pub backpressure_ceiling: usize,

    /// Pause between successful dispatches (milliseconds)
    #[serde(rename = "dispatch-interval-ms")]
    pub dispatch_interval_ms: u64,

    /// Sleep when the task queue is empty (milliseconds)
    #[serde(rename = "empty-queue-wait-ms")]
    pub empty_queue_wait_ms: u64,

    /// Sleep while the backpressure ceiling is hit (milliseconds)
    #[serde(rename = "busy-wait-ms")]
    pub busy_wait_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            backpressure_ceiling: 10,
            dispatch_interval_ms: 500,
            empty_queue_wait_ms: 5000,
            busy_wait_ms: 1000,
        }
    }
}

/// Engine (worker pool) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Workers spawned at startup
    #[serde(rename = "min-concurrency")]
    pub min_concurrency: usize,

    /// Worker ceiling reached while a backlog exists
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: usize,

    /// Navigation-level retries before a failure event is emitted
    #[serde(rename = "max-request-retries")]
    pub max_request_retries: u32,

    /// Per-job processing timeout (seconds)
    #[serde(rename = "handler-timeout-secs")]
    pub handler_timeout_secs: u64,

    /// Pause between navigation retries (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Grace period for running jobs during teardown (milliseconds)
    #[serde(rename = "teardown-grace-ms")]
    pub teardown_grace_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_concurrency: 1,
            max_concurrency: 3,
            max_request_retries: 3,
            handler_timeout_secs: 300,
            retry_delay_ms: 5000,
            teardown_grace_ms: 3000,
        }
    }
}

/// Review-feed scroll configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Ceiling on "load more" iterations per feed
    #[serde(rename = "max-iterations")]
    pub max_iterations: u32,

    /// Wait after each "load more" for content to render (milliseconds)
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            settle_ms: 2000,
        }
    }
}

/// Durable queue configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Path to the SQLite database file backing the queues and the
    /// result store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Name of the main task queue
    #[serde(rename = "task-queue", default = "default_task_queue")]
    pub task_queue: String,

    /// Name of the dead-letter queue for permanent failures
    #[serde(rename = "dead-letter-queue", default = "default_dead_letter_queue")]
    pub dead_letter_queue: String,
}

fn default_task_queue() -> String {
    "place:task:queue".to_string()
}

fn default_dead_letter_queue() -> String {
    "place:task:error:queue".to_string()
}

/// Target-site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Substring identifying a place-detail URL on the target host
    #[serde(rename = "place-url-marker")]
    pub place_url_marker: String,

    /// Query parameters required for the detail pane to render
    /// consistently, without a leading separator
    #[serde(rename = "fixed-query")]
    pub fixed_query: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            place_url_marker: "www.google.com/maps/place".to_string(),
            fixed_query: "authuser=0&hl=en&rclk=1".to_string(),
        }
    }
}

/// HTTP client configuration for the default processor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Optional proxy host for all requests
    #[serde(rename = "proxy-host")]
    pub proxy_host: Option<String>,

    /// Navigation timeout per request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout per request (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "mapsweep/1.0".to_string(),
            proxy_host: None,
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}
