//! # AWS SNS Publisher
//!
//! Amazon SNS transport for sms-core.
//!
//! ## Features
//!
//! - Publish SMS messages directly to a phone number via SNS
//! - Static credential sessions built from [`SenderConfig`]
//! - SNS service errors classified into [`SnsError`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_aws_sns::sender_from_config;
//!
//! let mut sender = sender_from_config(&config)?;
//! sender.with_sender_id("ACME");
//! let message_id = sender.send("Hello from AWS SNS!", "+15555550100").await?;
//! ```

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sns::error::{DisplayErrorContext, SdkError};
use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sns::types::MessageAttributeValue;
use aws_sdk_sns::{config::Credentials, Client as SnsClient, Config as SnsConfig};
use sms_core::{AttributeSet, BoxError, Publisher, Sender, SenderConfig, SmsError};
use std::collections::HashMap;
use tracing::{debug, error, info};

const CREDENTIALS_PROVIDER: &str = "sns-sms";

/// Failures reported by SNS for a publish call.
#[derive(Debug, thiserror::Error)]
pub enum SnsError {
    #[error("authorization error: {0}")]
    Auth(String),
    #[error("invalid parameter: {0}")]
    Invalid(String),
    #[error("failed to build attribute {name}: {message}")]
    Attribute { name: String, message: String },
    #[error("response did not include a message id")]
    MissingMessageId,
    #[error("{0}")]
    Provider(String),
}

impl From<SdkError<PublishError>> for SnsError {
    fn from(err: SdkError<PublishError>) -> Self {
        match err.as_service_error() {
            Some(PublishError::AuthorizationErrorException(e)) => {
                SnsError::Auth(e.message().unwrap_or("AWS authorization failed").to_string())
            }
            Some(PublishError::InvalidParameterException(e)) => {
                SnsError::Invalid(e.message().unwrap_or("Invalid parameter").to_string())
            }
            Some(PublishError::InvalidParameterValueException(e)) => {
                SnsError::Invalid(e.message().unwrap_or("Invalid parameter value").to_string())
            }
            _ => SnsError::Provider(DisplayErrorContext(&err).to_string()),
        }
    }
}

/// AWS SNS client
#[derive(Debug, Clone)]
pub struct AwsSnsClient {
    client: SnsClient,
    region: String,
}

impl AwsSnsClient {
    /// Create a client with static credentials.
    ///
    /// Fails with [`SmsError::Session`] when the region or either credential is blank.
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self, SmsError> {
        let region = region.into();
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();

        if region.trim().is_empty() {
            return Err(SmsError::Session("AWS region is not set".to_string()));
        }
        if access_key_id.trim().is_empty() || secret_access_key.trim().is_empty() {
            return Err(SmsError::Session("AWS credentials are not set".to_string()));
        }

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None, // session_token
            None, // expiration
            CREDENTIALS_PROVIDER,
        );

        let config = SnsConfig::builder()
            .region(Region::new(region.clone()))
            .credentials_provider(credentials)
            .behavior_version(BehaviorVersion::latest())
            .build();

        debug!(region = %region, "created AWS SNS client");

        Ok(Self {
            client: SnsClient::from_conf(config),
            region,
        })
    }

    pub fn from_config(config: &SenderConfig) -> Result<Self, SmsError> {
        Self::new(
            config.aws_region.as_str(),
            config.aws_access_key.as_str(),
            config.aws_secret_access_key.as_str(),
        )
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Build a sender publishing through SNS with attributes taken from `config`.
pub fn sender_from_config(config: &SenderConfig) -> Result<Sender<AwsSnsClient>, SmsError> {
    let client = AwsSnsClient::from_config(config)?;
    Ok(Sender::new(client, config))
}

fn to_sns_attributes(
    attributes: &AttributeSet,
) -> Result<HashMap<String, MessageAttributeValue>, SnsError> {
    attributes
        .iter()
        .map(|(name, value)| {
            let attr = MessageAttributeValue::builder()
                .data_type(value.data_type())
                .set_string_value(value.string_value().map(str::to_string))
                .build()
                .map_err(|e| SnsError::Attribute {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
            Ok((name.to_string(), attr))
        })
        .collect()
}

#[async_trait]
impl Publisher for AwsSnsClient {
    async fn publish(
        &self,
        message: &str,
        destination: &str,
        attributes: &AttributeSet,
    ) -> Result<String, BoxError> {
        info!("Sending SMS via AWS SNS to {}", destination);

        let message_attributes = to_sns_attributes(attributes)?;
        debug!(
            "Sending SNS message with attributes: {:?}",
            message_attributes
        );

        let result = self
            .client
            .publish()
            .phone_number(destination)
            .message(message)
            .set_message_attributes(
                (!message_attributes.is_empty()).then_some(message_attributes),
            )
            .send()
            .await
            .map_err(|e| {
                let e = SnsError::from(e);
                error!("AWS SNS publish failed: {}", e);
                e
            })?;

        let message_id = result
            .message_id()
            .ok_or(SnsError::MissingMessageId)?
            .to_string();

        info!(
            "SMS sent successfully via AWS SNS with MessageId: {}",
            message_id
        );

        Ok(message_id)
    }
}
