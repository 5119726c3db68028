//! Command-line surface of the `sns-sms` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use sms_core::{MessageType, Publisher, Sender, SmsError};

/// Send an SMS text message using AWS Simple Notification Service.
#[derive(Debug, Clone, Parser)]
#[command(name = "sns-sms", version, about)]
pub struct Cli {
    /// Sender ID shown on the receiving device. Overrides the configured sender ID.
    #[arg(long, env = "SENDER_ID")]
    pub sender_id: Option<String>,

    /// Receiver mobile phone number in E.164 format.
    #[arg(long, env = "RECEIVER")]
    pub receiver: String,

    /// Text message to send.
    #[arg(long, env = "MESSAGE")]
    pub message: String,

    /// Path to the YAML configuration file.
    #[arg(long, env = "SNS_SMS_CONFIG_PATH")]
    pub config_path: PathBuf,

    /// Maximum price in USD for this message. Overrides the configured max price.
    #[arg(long, env = "MAX_PRICE")]
    pub max_price: Option<Decimal>,

    /// Message type. Overrides the configured message type.
    #[arg(long, env = "MESSAGE_TYPE", value_enum)]
    pub message_type: Option<MessageTypeArg>,
}

/// `--message-type` values, spelled as SNS expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageTypeArg {
    /// Noncritical messages, not delivered to DND numbers
    #[value(name = "Promotional")]
    Promotional,
    /// Critical messages such as one-time passwords
    #[value(name = "Transactional")]
    Transactional,
}

impl From<MessageTypeArg> for MessageType {
    fn from(arg: MessageTypeArg) -> Self {
        match arg {
            MessageTypeArg::Promotional => MessageType::Promotional,
            MessageTypeArg::Transactional => MessageType::Transactional,
        }
    }
}

impl Cli {
    /// Apply the command-line overrides to `sender`.
    pub fn apply_overrides<P: Publisher>(&self, sender: &mut Sender<P>) {
        if let Some(id) = &self.sender_id {
            sender.with_sender_id(id.as_str());
        }
        if let Some(price) = self.max_price {
            sender.with_max_price(price);
        }
        if let Some(message_type) = self.message_type {
            sender.with_message_type(MessageType::from(message_type));
        }
    }

    /// Apply the overrides and send the message, returning the message ID.
    pub async fn deliver<P: Publisher>(&self, sender: &mut Sender<P>) -> Result<String, SmsError> {
        self.apply_overrides(sender);
        sender.send(&self.message, &self.receiver).await
    }
}
