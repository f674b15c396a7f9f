use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/timekeeper".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn defaults_apply_when_env_is_empty() {
        unsafe {
            env::remove_var("DATABASE_URL");
            env::remove_var("ENVIRONMENT");
        }
        let config = Config::from_env_only().unwrap();
        assert_eq!(config.environment, "development");
        assert!(config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn environment_comes_from_env() {
        unsafe {
            env::set_var("ENVIRONMENT", "production");
        }
        let config = Config::from_env_only().unwrap();
        assert!(config.is_production());
        unsafe {
            env::remove_var("ENVIRONMENT");
        }
    }
}
