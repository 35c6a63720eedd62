use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the farm backend, e.g. `https://farm.example.com/api`
    pub base_url: String,

    /// Bearer token sent with every request when set
    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Number of days shown by the production charts
    #[serde(default = "default_trailing_days")]
    pub trailing_days: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trailing_days: default_trailing_days(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_trailing_days() -> u32 {
    7
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. `.env` in the working directory, if present
    /// 2. config/default.toml - base configuration with defaults
    /// 3. config/local.toml - local overrides (optional, not in git)
    /// 4. Environment variables with FM__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FM").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [api]
            base_url = ""
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "pretty"

            [dashboard]
            trailing_days = 7
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "FM__API__BASE_URL environment variable must be set".to_string(),
            ));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "api.base_url must start with http:// or https://, got {}",
                base_url
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "api.request_timeout_secs cannot be 0".to_string(),
            ));
        }

        if self.dashboard.trailing_days == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "dashboard.trailing_days cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}
