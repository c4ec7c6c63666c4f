//! Server configuration, read from the process environment.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Sled database directory
    pub database_path: String,
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,
    /// Upper bound on any single store-bound operation
    pub store_timeout: Duration,
    pub bcrypt_cost: u32,
    pub log_format: LogFormat,
    /// When set, logs are also written to a daily rolling file here
    pub log_dir: Option<String>,
}

impl Config {
    /// Defaults for everything except the signing secret and store path.
    pub fn new(jwt_secret: impl Into<String>, database_path: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: database_path.into(),
            jwt_secret: jwt_secret.into(),
            store_timeout: Duration::from_millis(5000),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            log_format: LogFormat::Pretty,
            log_dir: None,
        }
    }

    /// Read `HOST`, `PORT`, `DATABASE_PATH`, `JWT_SECRET`, `STORE_TIMEOUT_MS`,
    /// `BCRYPT_COST`, `LOG_FORMAT` and `LOG_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let database_path = lookup("DATABASE_PATH").unwrap_or_else(|| "jobboard_data".to_string());

        let mut config = Self::new(jwt_secret, database_path);
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse("PORT", &port)?;
        }
        if let Some(ms) = lookup("STORE_TIMEOUT_MS") {
            config.store_timeout = Duration::from_millis(parse("STORE_TIMEOUT_MS", &ms)?);
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            let cost: u32 = parse("BCRYPT_COST", &cost)?;
            // bcrypt accepts 4..=31
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    value: cost.to_string(),
                });
            }
            config.bcrypt_cost = cost;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LOG_FORMAT",
                        value: format,
                    })
                }
            };
        }
        config.log_dir = lookup("LOG_DIR").filter(|s| !s.is_empty());
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_secret_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_path, "jobboard_data");
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Pretty);

        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("STORE_TIMEOUT_MS", "250"),
            ("BCRYPT_COST", "4"),
            ("LOG_FORMAT", "JSON"),
            ("LOG_DIR", "/tmp/logs"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_dir.as_deref(), Some("/tmp/logs"));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("BCRYPT_COST", "2")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BCRYPT_COST", .. }));
    }
}
