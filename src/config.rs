use config::{Config, Environment, File, FileFormat, Map};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sms_core::SenderConfig;
use std::path::Path;

pub use config::ConfigError;

/// Prefix for environment variables overriding file values, e.g. `SNS_SMS_AWS_REGION`.
pub const ENV_PREFIX: &str = "SNS_SMS";

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// AWS access key ID
    pub aws_access_key: String,
    /// AWS secret access key
    pub aws_secret_access_key: String,
    /// AWS region, e.g. eu-west-1
    pub aws_region: String,
    /// Sender ID shown on the receiving device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    /// Maximum price in USD per message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    /// Promotional or Transactional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level or filter directive (default: info)
    pub level: String,
    /// Output format (default: pretty)
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from the YAML file at `path`, then environment
    /// variables prefixed with `SNS_SMS_` (nested keys separated by `__`).
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(path.as_ref(), None)
    }

    /// Same as [`AppConfig::load_from`] but reads overrides from `vars`
    /// instead of the process environment.
    pub fn load_with_env(
        path: impl AsRef<Path>,
        vars: Map<String, String>,
    ) -> Result<Self, ConfigError> {
        Self::build(path.as_ref(), Some(vars))
    }

    fn build(path: &Path, vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml).required(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        s.try_deserialize()
    }

    /// The fields the sender needs, without logging settings.
    pub fn sender_config(&self) -> SenderConfig {
        SenderConfig {
            aws_access_key: self.aws_access_key.clone(),
            aws_secret_access_key: self.aws_secret_access_key.clone(),
            aws_region: self.aws_region.clone(),
            sender_id: self.sender_id.clone(),
            max_price: self.max_price,
            message_type: self.message_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_logging() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Pretty);
    }

    #[test]
    fn sender_config_projection() {
        let config = AppConfig {
            aws_access_key: "key".to_string(),
            aws_secret_access_key: "secret".to_string(),
            aws_region: "eu-west-1".to_string(),
            sender_id: Some("ACME".to_string()),
            max_price: Some(Decimal::new(5, 1)),
            message_type: Some("Promotional".to_string()),
            logging: LoggingConfig::default(),
        };

        let sender = config.sender_config();
        assert_eq!(sender.aws_access_key, "key");
        assert_eq!(sender.aws_secret_access_key, "secret");
        assert_eq!(sender.aws_region, "eu-west-1");
        assert_eq!(sender.sender_id.as_deref(), Some("ACME"));
        assert_eq!(sender.max_price, Some(Decimal::new(5, 1)));
        assert_eq!(sender.message_type.as_deref(), Some("Promotional"));
    }
}
