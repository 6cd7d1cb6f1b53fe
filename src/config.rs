use crate::cache::memory::DEFAULT_CACHE_TTL;
use crate::core::{BookError, Result};
use crate::events::DEFAULT_CHANNEL_CAPACITY;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration
///
/// Built with defaults and builder setters, or from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// Time-to-live of every cache entry
    pub cache_ttl: Duration,

    /// Maximum number of cache entries
    pub cache_capacity: usize,

    /// Buffered events per kind before slow consumers lag
    pub event_channel_capacity: usize,

    /// Deadline applied to each request
    pub request_timeout: Option<Duration>,

    /// Whether to run the background event consumer
    pub consumer_enabled: bool,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_capacity: 10_000,
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            request_timeout: Some(Duration::from_secs(30)),
            consumer_enabled: true,
        }
    }

    /// Set the host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set cache entry TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set per-kind event channel capacity
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Disable the request timeout
    pub fn no_request_timeout(mut self) -> Self {
        self.request_timeout = None;
        self
    }

    /// Enable or disable the event consumer
    pub fn consumer_enabled(mut self, enabled: bool) -> Self {
        self.consumer_enabled = enabled;
        self
    }

    /// Load from environment variables, keeping defaults for unset ones.
    ///
    /// Recognized: `SERVER_HOST`, `SERVER_PORT`, `CACHE_TTL_SECS`,
    /// `CACHE_CAPACITY`, `EVENT_CHANNEL_CAPACITY`, `REQUEST_TIMEOUT_MS`
    /// (`0` disables it), `EVENT_CONSUMER_ENABLED`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(host) = lookup("SERVER_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "SERVER_PORT")? {
            config.port = port;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse_var(&lookup, "CACHE_CAPACITY")? {
            config.cache_capacity = capacity;
        }
        if let Some(capacity) = parse_var(&lookup, "EVENT_CHANNEL_CAPACITY")? {
            config.event_channel_capacity = capacity;
        }
        if let Some(millis) = parse_var::<u64, _>(&lookup, "REQUEST_TIMEOUT_MS")? {
            config.request_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(enabled) = parse_var(&lookup, "EVENT_CONSUMER_ENABLED")? {
            config.consumer_enabled = enabled;
        }

        Ok(config)
    }

    /// Address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(BookError::validation("host cannot be empty"));
        }

        if self.port == 0 {
            return Err(BookError::validation("port must be > 0"));
        }

        if self.cache_ttl.is_zero() {
            return Err(BookError::validation("cache_ttl must be > 0"));
        }

        if self.cache_capacity == 0 {
            return Err(BookError::validation("cache_capacity must be > 0"));
        }

        if self.event_channel_capacity == 0 {
            return Err(BookError::validation("event_channel_capacity must be > 0"));
        }

        if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(BookError::validation("request_timeout must be > 0"));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err| BookError::Validation(format!("{name}: {err}"))),
    }
}
