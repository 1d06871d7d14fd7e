use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::report::DEFAULT_HISTORY_LIMIT;
use crate::sync_state::DEFAULT_THRESHOLD;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_url: String,
    /// Public base URL of this service, used to register the webhook.
    pub backend_url: String,
    /// Lifetime of the channel prompt sent when a private message fails.
    pub prompt_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Threshold used until a sync push provides one.
    pub default_threshold: u32,
    pub history_limit: usize,
    /// Offset of report timestamps and of "today" for the daily report.
    pub utc_offset_hours: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/fas_monitor".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            backend_url: String::new(),
            prompt_ttl_secs: 30,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            history_limit: DEFAULT_HISTORY_LIMIT,
            utc_offset_hours: 1,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MonitorConfig {
    /// Display offset; out-of-range values fall back to UTC.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8001");
        assert_eq!(config.monitor.default_threshold, 6);
        assert_eq!(config.monitor.history_limit, 15);
        assert_eq!(config.monitor.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_offset_out_of_range_falls_back_to_utc() {
        let monitor = MonitorConfig {
            utc_offset_hours: 99,
            ..MonitorConfig::default()
        };
        assert_eq!(monitor.offset().local_minus_utc(), 0);
    }
}
