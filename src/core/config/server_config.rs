use anyhow::Result;

use super::{lookup_env, normalize_string, parse_or};

pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Listener, transport and logging settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            log_dir: None,
            log_json: false,
            log_level: "info".into(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(lookup_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").and_then(normalize_string).unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            body_limit_bytes: parse_or(&lookup, "RELAY_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
            log_dir: lookup("LOG_DIR").and_then(normalize_string),
            log_json: lookup("LOG_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.log_json),
            log_level: lookup("LOG_LEVEL")
                .and_then(normalize_string)
                .unwrap_or(defaults.log_level),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_port_and_log_format() {
        let cfg = ServerConfig::from_lookup(|key| match key {
            "PORT" => Some("8080".into()),
            "LOG_FORMAT" => Some("JSON".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert!(cfg.log_json);
        assert_eq!(cfg.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(ServerConfig::from_lookup(|key| (key == "PORT").then(|| "http".to_string())).is_err());
    }
}
