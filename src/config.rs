//! Configuration.
//!
//! [`ExplorerConfig`] controls a single exploration session.
//! [`ServiceConfig`] is read from the environment by the HTTP service binary.
//!
//! Environment variables:
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `8002`)
//! - `LOG_FORMAT`: `json` for structured logs, `pretty` for development (default: `json`)
//! - `THINKING_MAP_STRICT`: `1` or `true` surfaces generation failures instead of
//!   falling back to generated content
//! - `THINKING_MAP_MAX_SESSIONS`: sessions kept in memory before the least
//!   recently used one is evicted (default: `1024`)

use serde::{Deserialize, Serialize};

use crate::layout::LayoutConfig;

/// Sessions the service keeps when no capacity is configured.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Layout spacing.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Replace failed or unusable collaborator replies with generated content.
    #[serde(default = "default_fallback")]
    pub fallback_on_failure: bool,
}

fn default_fallback() -> bool {
    true
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            fallback_on_failure: default_fallback(),
        }
    }
}

impl ExplorerConfig {
    /// Surface collaborator failures instead of recovering from them.
    pub fn strict() -> Self {
        Self {
            fallback_on_failure: false,
            ..Self::default()
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable, for local development.
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Log output format.
    pub log_format: LogFormat,
    /// Sessions kept in memory.
    pub max_sessions: usize,
    /// Settings for every session the service creates.
    pub explorer: ExplorerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8002,
            log_format: LogFormat::Json,
            max_sessions: DEFAULT_MAX_SESSIONS,
            explorer: ExplorerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; missing or malformed values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let strict = lookup("THINKING_MAP_STRICT")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            max_sessions: lookup("THINKING_MAP_MAX_SESSIONS")
                .and_then(|n| n.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_sessions),
            explorer: ExplorerConfig {
                fallback_on_failure: !strict,
                ..defaults.explorer
            },
        }
    }

    /// `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
