use std::env;
use std::str::FromStr;

/// Where the four collections and the session identity are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub login_delay_ms: u64,
    pub sms_api_url: String,
    pub sms_api_key: String,
    pub sms_sender: String,
    pub sms_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            database_url: None,
            login_delay_ms: 500,
            sms_api_url: String::new(),
            sms_api_key: String::new(),
            sms_sender: "HomeRent".to_string(),
            sms_enabled: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(defaults.port),
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.storage_backend),
            database_url: env::var("DATABASE_URL").ok(),
            login_delay_ms: env::var("LOGIN_DELAY_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(defaults.login_delay_ms),
            sms_api_url: env::var("SMS_API_URL").unwrap_or_default(),
            sms_api_key: env::var("SMS_API_KEY").unwrap_or_default(),
            sms_sender: env::var("SMS_SENDER").unwrap_or(defaults.sms_sender),
            sms_enabled: env::var("SMS_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_storage_backend_names() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("Postgres".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn defaults_to_in_memory_storage_without_sms() {
        let config = Config::default();
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(!config.sms_enabled);
        assert_eq!(config.login_delay_ms, 500);
    }
}
