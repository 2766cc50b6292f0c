use std::env;

use serde::{Deserialize, Serialize};

use crate::error::AresError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub source: SourceConfig,
    pub snapshot: SnapshotConfig,
    pub startup: StartupConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ARES_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ARES_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            cache: CacheConfig::from_env_profiled(p),
            source: SourceConfig::from_env_profiled(p),
            snapshot: SnapshotConfig::from_env_profiled(p),
            startup: StartupConfig::from_env_profiled(p),
        }
    }

    /// Built-in defaults, ignoring the environment.
    pub fn defaults() -> Self {
        Self {
            profile: String::new(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            source: SourceConfig::default(),
            snapshot: SnapshotConfig::default(),
            startup: StartupConfig::default(),
        }
    }

    /// Reject settings that cannot produce a working service.
    pub fn validate(&self) -> Result<(), AresError> {
        if !matches!(self.cache.backend.as_str(), "memory" | "redis") {
            return Err(AresError::Config(format!(
                "CACHE_BACKEND must be 'memory' or 'redis', got '{}'",
                self.cache.backend
            )));
        }
        if self.cache.ttl_hours == 0 {
            return Err(AresError::Config("CACHE_TTL_HOURS must be at least 1".into()));
        }
        if self.snapshot.default_count > self.snapshot.max_count {
            return Err(AresError::Config(format!(
                "SNAPSHOT_DEFAULT_COUNT ({}) exceeds SNAPSHOT_MAX_COUNT ({})",
                self.snapshot.default_count, self.snapshot.max_count
            )));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(AresError::Config("SOURCE_BASE_URL is empty".into()));
        }
        Ok(())
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  cache:       backend={}, ttl={}h",
            self.cache.backend,
            self.cache.ttl_hours
        );
        tracing::info!(
            "  source:      url={}{}, auth={}, tz={}",
            self.source.base_url,
            self.source.api_path,
            if self.source.has_credentials() { "basic" } else { "none" },
            self.source.timezone
        );
        tracing::info!(
            "  snapshot:    default_count={}, max_count={}, seed={}",
            self.snapshot.default_count,
            self.snapshot.max_count,
            self.snapshot
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "(entropy)".into())
        );
        tracing::info!("  startup:     warm={}", self.startup.warm_on_startup);
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// `host:port` probed by the datasource reachability check.
    pub ping_target: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8080),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
            ping_target: profiled_env_or(p, "DATASOURCE_PING_HOST", "8.8.8.8:53"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            cors_origin: "*".into(),
            ping_target: "8.8.8.8:53".into(),
        }
    }
}

// ── Cache ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// "memory" or "redis"
    pub backend: String,
    pub redis_url: String,
    pub ttl_hours: u64,
}

impl CacheConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            backend: profiled_env_or(p, "CACHE_BACKEND", "memory").to_lowercase(),
            redis_url: profiled_env_or(p, "REDIS_URL", "redis://127.0.0.1:6379"),
            ttl_hours: profiled_env_u64(p, "CACHE_TTL_HOURS", 24),
        }
    }

    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_hours.saturating_mul(3600))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "memory".into(),
            redis_url: "redis://127.0.0.1:6379".into(),
            ttl_hours: 24,
        }
    }
}

// ── Live execution feed ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub api_path: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// IANA zone used to render the upstream `startTimestamp` parameter.
    pub timezone: String,
    pub timeout_secs: u64,
}

impl SourceConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            base_url: profiled_env_or(p, "SOURCE_BASE_URL", "http://localhost:8081"),
            api_path: profiled_env_or(p, "SOURCE_API_PATH", "/api/executions"),
            username: profiled_env_opt(p, "SOURCE_USERNAME"),
            password: profiled_env_opt(p, "SOURCE_PASSWORD"),
            timezone: profiled_env_or(p, "SOURCE_TIMEZONE", "Europe/Paris"),
            timeout_secs: profiled_env_u64(p, "SOURCE_TIMEOUT_SECS", 30),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some()
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_path.trim_start_matches('/')
        )
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".into(),
            api_path: "/api/executions".into(),
            username: None,
            password: None,
            timezone: "Europe/Paris".into(),
            timeout_secs: 30,
        }
    }
}

// ── Synthetic snapshot ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub default_count: usize,
    /// Largest `count` a caller may request.
    pub max_count: usize,
    /// Fixed seed for reproducible samples; entropy when unset.
    pub seed: Option<u64>,
}

impl SnapshotConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            default_count: profiled_env_u64(p, "SNAPSHOT_DEFAULT_COUNT", 2000) as usize,
            max_count: profiled_env_u64(p, "SNAPSHOT_MAX_COUNT", 100_000) as usize,
            seed: profiled_env_opt(p, "SNAPSHOT_SEED").and_then(|v| v.parse().ok()),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            default_count: 2000,
            max_count: 100_000,
            seed: None,
        }
    }
}

// ── Startup ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    pub warm_on_startup: bool,
}

impl StartupConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            warm_on_startup: profiled_env_bool(p, "WARM_ON_STARTUP", true),
        }
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            warm_on_startup: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_endpoint_joins_cleanly() {
        let mut source = SourceConfig::from_env_profiled("ARES_TEST_UNUSED_PROFILE");
        source.base_url = "http://feed:8080/".into();
        source.api_path = "/api/executions".into();
        assert_eq!(source.endpoint(), "http://feed:8080/api/executions");
    }

    #[test]
    fn cache_ttl_in_hours() {
        let cache = CacheConfig::default();
        assert_eq!(cache.ttl().as_secs(), 24 * 3600);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(Config::defaults().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        let mut config = Config::defaults();
        config.cache.backend = "memcached".into();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("memcached"), "{}", err);

        let mut config = Config::defaults();
        config.cache.ttl_hours = 0;
        assert!(config.validate().is_err());

        let mut config = Config::defaults();
        config.source.base_url = " ".into();
        assert!(config.validate().is_err());

        let mut config = Config::defaults();
        config.snapshot.max_count = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn huge_ttl_saturates() {
        let cache = CacheConfig {
            ttl_hours: u64::MAX,
            ..CacheConfig::default()
        };
        assert_eq!(cache.ttl(), std::time::Duration::from_secs(u64::MAX));
        assert_eq!(CacheConfig::default().ttl(), std::time::Duration::from_secs(24 * 3600));
    }

    #[test]
    fn profile_label_defaults() {
        let mut config = Config::for_profile("");
        assert_eq!(config.profile_label(), "default");
        config.profile = "PROD".into();
        assert_eq!(config.profile_label(), "PROD");
    }
}
