//! # SMS Core
//!
//! Core types for sending a single SMS through a notification provider.
//!
//! This crate provides:
//! - [`AttributeSet`] and [`build_attributes`] for the delivery attributes
//!   (sender ID, max price, message type) attached to an outbound message
//! - [`Publisher`], the one-operation capability a provider transport implements
//! - [`Sender`], which owns a publisher plus its attributes and performs the send
//!
//! Nothing here reads the environment or touches the network on its own; every
//! input arrives through [`SenderConfig`], override calls or the publisher.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{Decimal, MessageType, Sender};
//!
//! let mut sender = Sender::with_publisher(publisher);
//! sender
//!     .with_sender_id("ACME")
//!     .with_max_price(Decimal::new(5, 2))
//!     .with_message_type(MessageType::Transactional);
//!
//! let message_id = sender.send("Your code is 1234", "+15555550100").await?;
//! ```

use async_trait::async_trait;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub use rust_decimal::Decimal;

/// Custom name displayed as the message sender on the receiving device.
pub const SENDER_ID_ATTRIBUTE: &str = "AWS.SNS.SMS.SenderID";
/// Maximum price in USD the caller is willing to pay for one message.
pub const MAX_PRICE_ATTRIBUTE: &str = "AWS.SNS.SMS.MaxPrice";
/// Message classification, either `Promotional` or `Transactional`.
///
/// This is the name SNS reads, not `AWS.SNS.SMS.MessageType`.
pub const MESSAGE_TYPE_ATTRIBUTE: &str = "AWS.SNS.SMS.SMSType";

/// Lowest max price accepted by [`Sender::with_max_price`], one cent.
pub const MIN_MAX_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Boxed error returned by [`Publisher`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while preparing or sending a message
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// The provider session could not be established
    #[error("failed to establish a provider session: {0}")]
    Session(String),
    /// The provider rejected or failed the publish call
    #[error("failed to publish a text message to {destination}: {source}")]
    Publish {
        destination: String,
        #[source]
        source: BoxError,
    },
}

/// SMS classification governing delivery cost and Do-Not-Disturb handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Noncritical messages such as marketing. Not delivered to DND numbers.
    Promotional,
    /// Critical messages such as one-time passwords. Delivered to DND numbers,
    /// possibly at a higher price.
    Transactional,
}

impl MessageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageType::Promotional => "Promotional",
            MessageType::Transactional => "Transactional",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names neither message type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type: {0} (expected Promotional or Transactional)")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Promotional" => Ok(MessageType::Promotional),
            "Transactional" => Ok(MessageType::Transactional),
            other => Err(UnknownMessageType(other.to_string())),
        }
    }
}

impl From<MessageType> for String {
    fn from(t: MessageType) -> Self {
        t.as_str().to_string()
    }
}

/// A typed attribute value. The variant is the provider's data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "data_type", content = "value")]
pub enum AttributeValue {
    String(String),
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        AttributeValue::String(value.into())
    }

    /// Provider data type discriminator, e.g. `"String"`.
    pub fn data_type(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "String",
        }
    }

    pub fn string_value(&self) -> Option<&str> {
        match self {
            AttributeValue::String(v) => Some(v),
        }
    }
}

/// Delivery attributes keyed by the provider's attribute names.
///
/// Only [`SENDER_ID_ATTRIBUTE`], [`MAX_PRICE_ATTRIBUTE`] and
/// [`MESSAGE_TYPE_ATTRIBUTE`] are ever stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    map: BTreeMap<&'static str, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate entries in attribute name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttributeValue)> + '_ {
        self.map.iter().map(|(k, v)| (*k, v))
    }

    fn set(&mut self, name: &'static str, value: AttributeValue) {
        debug!(attribute = name, value = ?value, "setting message attribute");
        self.map.insert(name, value);
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = (&'a &'static str, &'a AttributeValue);
    type IntoIter = std::collections::btree_map::Iter<'a, &'static str, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

/// Sender configuration as read from the configuration file.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SenderConfig {
    pub aws_access_key: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    /// Maximum price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    /// Expected to be `Promotional` or `Transactional`; anything else is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

impl fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderConfig")
            .field("aws_access_key", &self.aws_access_key)
            .field("aws_secret_access_key", &"<redacted>")
            .field("aws_region", &self.aws_region)
            .field("sender_id", &self.sender_id)
            .field("max_price", &self.max_price)
            .field("message_type", &self.message_type)
            .finish()
    }
}

/// Two decimal places, ties rounded away from zero.
fn format_price(price: Decimal) -> String {
    let mut rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Build the attribute set described by `config`.
///
/// Sender ID and max price are taken as given, without the blank and
/// one-cent checks the [`Sender`] overrides apply. A message type that is not
/// exactly `Promotional` or `Transactional` is dropped.
pub fn build_attributes(config: &SenderConfig) -> AttributeSet {
    let mut attrs = AttributeSet::new();

    if let Some(id) = &config.sender_id {
        attrs.set(SENDER_ID_ATTRIBUTE, AttributeValue::string(id.clone()));
    }

    if let Some(price) = config.max_price {
        attrs.set(MAX_PRICE_ATTRIBUTE, AttributeValue::string(format_price(price)));
    }

    if let Some(raw) = &config.message_type {
        match raw.parse::<MessageType>() {
            Ok(t) => attrs.set(MESSAGE_TYPE_ATTRIBUTE, AttributeValue::string(t)),
            Err(e) => debug!(error = %e, "ignoring configured message type"),
        }
    }

    attrs
}

/// Capability to publish one text message to a destination.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `message` to `destination` and return the provider's message ID.
    async fn publish(
        &self,
        message: &str,
        destination: &str,
        attributes: &AttributeSet,
    ) -> Result<String, BoxError>;
}

#[async_trait]
impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    async fn publish(
        &self,
        message: &str,
        destination: &str,
        attributes: &AttributeSet,
    ) -> Result<String, BoxError> {
        (**self).publish(message, destination, attributes).await
    }
}

#[async_trait]
impl<P: Publisher + ?Sized> Publisher for Box<P> {
    async fn publish(
        &self,
        message: &str,
        destination: &str,
        attributes: &AttributeSet,
    ) -> Result<String, BoxError> {
        (**self).publish(message, destination, attributes).await
    }
}

/// Sends text messages through a [`Publisher`] with a set of delivery attributes.
///
/// Overrides take `&mut self`, so one sender cannot be mutated while a send
/// borrowed from it is in flight. Build one sender per task for concurrent sends.
#[derive(Debug)]
pub struct Sender<P> {
    publisher: P,
    attributes: AttributeSet,
}

impl<P: Publisher> Sender<P> {
    /// Create a sender whose attributes come from `config`.
    pub fn new(publisher: P, config: &SenderConfig) -> Self {
        Self {
            publisher,
            attributes: build_attributes(config),
        }
    }

    /// Create a sender with no attributes.
    pub fn with_publisher(publisher: P) -> Self {
        Self {
            publisher,
            attributes: AttributeSet::new(),
        }
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Set the sender ID. Blank or whitespace-only IDs are ignored; otherwise
    /// the ID is stored untrimmed.
    pub fn with_sender_id(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if id.trim().is_empty() {
            return self;
        }

        self.attributes.set(SENDER_ID_ATTRIBUTE, AttributeValue::string(id));
        self
    }

    /// Set the max price in USD. Prices below one cent are ignored.
    pub fn with_max_price(&mut self, price: Decimal) -> &mut Self {
        if price < MIN_MAX_PRICE {
            return self;
        }

        self.attributes
            .set(MAX_PRICE_ATTRIBUTE, AttributeValue::string(format_price(price)));
        self
    }

    /// Set the message type. The value is stored as given, without checking it
    /// against the known [`MessageType`] variants.
    pub fn with_message_type(&mut self, message_type: impl Into<String>) -> &mut Self {
        self.attributes.set(
            MESSAGE_TYPE_ATTRIBUTE,
            AttributeValue::string(message_type),
        );
        self
    }

    /// Publish `message` to `destination` with the current attributes and
    /// return the provider-assigned message ID. Exactly one publish attempt is
    /// made per call.
    pub async fn send(&self, message: &str, destination: &str) -> Result<String, SmsError> {
        debug!(
            destination,
            attributes = self.attributes.len(),
            "publishing text message"
        );

        self.publisher
            .publish(message, destination, &self.attributes)
            .await
            .map_err(|source| SmsError::Publish {
                destination: destination.to_string(),
                source,
            })
    }
}
