use std::env;

use crate::errors::AppError;
use crate::models::conversation::DEFAULT_CAPACITY;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    /// Most conversation entries kept in memory.
    pub conversation_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "appointments.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            conversation_limit: env::var("CONVERSATION_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.admin_token.trim().is_empty() {
            return Err(AppError::Config("ADMIN_TOKEN must not be empty".to_string()));
        }
        if self.database_url.trim().is_empty() {
            return Err(AppError::Config("DATABASE_URL must not be empty".to_string()));
        }
        if self.conversation_limit < 2 {
            return Err(AppError::Config(
                "CONVERSATION_LIMIT must keep at least one exchange".to_string(),
            ));
        }
        if self.admin_token == "changeme" {
            tracing::warn!("ADMIN_TOKEN is the default value, set it before exposing the API");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            port: 3000,
            database_url: ":memory:".to_string(),
            admin_token: "secret".to_string(),
            conversation_limit: DEFAULT_CAPACITY,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_empty_token_rejected() {
        let cfg = AppConfig {
            admin_token: "  ".to_string(),
            ..config()
        };
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_tiny_conversation_limit_rejected() {
        let cfg = AppConfig {
            conversation_limit: 1,
            ..config()
        };
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }
}
