//! # SNS SMS
//!
//! Send a single SMS text message through AWS SNS, with optional sender ID,
//! max price and message type attributes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sns_sms::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load_from("config.yaml")?;
//!     let mut sender = sender_from_config(&config.sender_config())?;
//!     sender.with_message_type(MessageType::Transactional);
//!
//!     let id = sender.send("Hello from SNS!", "+15555550100").await?;
//!     println!("Message sent with ID: {}", id);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The YAML file holds the AWS credentials and region plus the optional
//! `sender_id`, `max_price` and `message_type`. Any key can be overridden by an
//! environment variable prefixed with `SNS_SMS_`:
//!
//! ```yaml
//! aws_access_key: AKIA...
//! aws_secret_access_key: ...
//! aws_region: eu-west-1
//! sender_id: ACME
//! max_price: 0.05
//! message_type: Transactional
//! logging:
//!   level: info
//!   format: pretty
//! ```

pub mod cli;
pub mod config;
pub mod logging;

pub use crate::cli::Cli;
pub use crate::config::{AppConfig, LogFormat, LoggingConfig};

/// Common imports for SNS SMS usage
pub mod prelude {
    pub use crate::cli::{Cli, MessageTypeArg};
    pub use crate::config::{AppConfig, ConfigError, LogFormat, LoggingConfig};
    pub use sms_aws_sns::{sender_from_config, AwsSnsClient, SnsError};
    pub use sms_core::*;
}
