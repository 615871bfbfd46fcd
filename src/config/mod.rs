use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Secret used when JWT_SECRET is unset. Accepted only outside production.
pub const DEV_JWT_SECRET: &str = "pfe-dev-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub secure_cookies: bool,
    /// Verify the session signature in the gatekeeper instead of only decoding it
    pub verify_token_at_edge: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-default value in production")]
    InsecureJwtSecret,
    #[error("SECURITY_CORS_ORIGINS cannot contain '*' because session cookies are sent with credentials")]
    WildcardCorsOrigin,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(port) = env::var("PFE_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            if !v.is_empty() {
                self.security.jwt_secret = v;
            }
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_VERIFY_TOKEN_AT_EDGE") {
            self.security.verify_token_at_edge = v.parse().unwrap_or(self.security.verify_token_at_edge);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Reject configurations that must never serve traffic
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == Environment::Production
            && (self.security.jwt_secret.is_empty() || self.security.jwt_secret == DEV_JWT_SECRET)
        {
            return Err(ConfigError::InsecureJwtSecret);
        }
        if self.security.cors_origins.iter().any(|origin| origin.trim() == "*") {
            return Err(ConfigError::WildcardCorsOrigin);
        }
        Ok(())
    }

    /// Session lifetime in seconds; also the cookie Max-Age
    pub fn session_ttl_secs(&self) -> i64 {
        (self.security.jwt_expiry_hours as i64) * 3600
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                secure_cookies: false,
                verify_token_at_edge: false,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 2 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7,
                secure_cookies: true,
                verify_token_at_edge: true,
                cors_origins: vec![],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                secure_cookies: true,
                verify_token_at_edge: true,
                cors_origins: vec![],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_decode_at_edge() {
        let config = AppConfig::development();
        assert!(!config.security.verify_token_at_edge);
        assert!(!config.security.secure_cookies);
        assert_eq!(config.session_ttl_secs(), 7 * 24 * 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_requires_real_secret() {
        let mut config = AppConfig::production();
        assert!(config.security.verify_token_at_edge);
        assert!(matches!(config.validate(), Err(ConfigError::InsecureJwtSecret)));

        config.security.jwt_secret = DEV_JWT_SECRET.to_string();
        assert!(config.validate().is_err());

        config.security.jwt_secret = "a-long-random-production-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn wildcard_cors_origin_is_refused() {
        let mut config = AppConfig::development();
        config.security.cors_origins = vec!["http://localhost:3000".into(), "*".into()];
        assert!(matches!(config.validate(), Err(ConfigError::WildcardCorsOrigin)));
    }
}
