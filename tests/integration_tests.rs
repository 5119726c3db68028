use async_trait::async_trait;
use clap::Parser;
use sns_sms::prelude::*;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
aws_access_key: test-access-key
aws_secret_access_key: test-secret-key
aws_region: eu-west-1
sender_id: test-sender-id
max_price: 0.07
message_type: Promotional
"#;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[derive(Default)]
struct RecordingPublisher {
    fail: bool,
    calls: Mutex<Vec<(String, String, AttributeSet)>>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        message: &str,
        destination: &str,
        attributes: &AttributeSet,
    ) -> Result<String, BoxError> {
        self.calls.lock().unwrap().push((
            message.to_string(),
            destination.to_string(),
            attributes.clone(),
        ));
        if self.fail {
            return Err("bad".into());
        }
        Ok("test".to_string())
    }
}

fn cli(extra: &[&str]) -> Cli {
    let mut args = vec![
        "sns-sms",
        "--receiver",
        "test-receiver",
        "--message",
        "test-msg",
        "--config-path",
        "unused.yaml",
    ];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

fn attr<'a>(attrs: &'a AttributeSet, name: &str) -> Option<&'a str> {
    attrs.get(name).and_then(AttributeValue::string_value)
}

#[test]
fn test_load_full_config() {
    let file = config_file(FULL_CONFIG);
    let config = AppConfig::load_from(file.path()).unwrap();

    assert_eq!(config.aws_access_key, "test-access-key");
    assert_eq!(config.aws_secret_access_key, "test-secret-key");
    assert_eq!(config.aws_region, "eu-west-1");
    assert_eq!(config.sender_id.as_deref(), Some("test-sender-id"));
    assert_eq!(config.max_price, Some(Decimal::new(7, 2)));
    assert_eq!(config.message_type.as_deref(), Some("Promotional"));
    assert_eq!(config.logging, LoggingConfig::default());

    let attrs = build_attributes(&config.sender_config());
    assert_eq!(attr(&attrs, SENDER_ID_ATTRIBUTE), Some("test-sender-id"));
    assert_eq!(attr(&attrs, MAX_PRICE_ATTRIBUTE), Some("0.07"));
    assert_eq!(attr(&attrs, MESSAGE_TYPE_ATTRIBUTE), Some("Promotional"));
}

#[test]
fn test_optional_fields_may_be_omitted() {
    let file = config_file(
        "aws_access_key: key\naws_secret_access_key: secret\naws_region: us-east-1\n",
    );
    let config = AppConfig::load_from(file.path()).unwrap();

    assert!(config.sender_id.is_none());
    assert!(config.max_price.is_none());
    assert!(config.message_type.is_none());
    assert!(build_attributes(&config.sender_config()).is_empty());
}

#[test]
fn test_logging_section() {
    let file = config_file(&format!(
        "{}logging:\n  level: debug\n  format: json\n",
        FULL_CONFIG
    ));
    let config = AppConfig::load_from(file.path()).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_environment_overrides_file() {
    let file = config_file(FULL_CONFIG);
    let vars = [
        ("SNS_SMS_AWS_REGION", "ap-southeast-2"),
        ("SNS_SMS_MAX_PRICE", "0.5"),
        ("SNS_SMS_LOGGING__FORMAT", "json"),
        ("UNRELATED_AWS_REGION", "us-west-2"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = AppConfig::load_with_env(file.path(), vars).unwrap();

    assert_eq!(config.aws_region, "ap-southeast-2");
    assert_eq!(config.max_price, Some(Decimal::from_str("0.5").unwrap()));
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.sender_id.as_deref(), Some("test-sender-id"));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = AppConfig::load_from(dir.path().join("missing.yaml"));
    assert!(result.is_err());
}

#[test]
fn test_malformed_config_file() {
    let file = config_file("aws_region: [unclosed\n");
    assert!(AppConfig::load_from(file.path()).is_err());
}

#[tokio::test]
async fn test_deliver_with_config_attributes() {
    let file = config_file(FULL_CONFIG);
    let config = AppConfig::load_from(file.path()).unwrap();
    let publisher = Arc::new(RecordingPublisher::default());
    let mut sender = Sender::new(Arc::clone(&publisher), &config.sender_config());

    let id = cli(&[]).deliver(&mut sender).await.unwrap();
    assert_eq!(id, "test");

    let calls = publisher.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (message, destination, attrs) = &calls[0];
    assert_eq!(message, "test-msg");
    assert_eq!(destination, "test-receiver");
    assert_eq!(attrs.len(), 3);
    assert_eq!(attr(attrs, SENDER_ID_ATTRIBUTE), Some("test-sender-id"));
}

#[tokio::test]
async fn test_cli_overrides_config() {
    let file = config_file(FULL_CONFIG);
    let config = AppConfig::load_from(file.path()).unwrap();
    let publisher = Arc::new(RecordingPublisher::default());
    let mut sender = Sender::new(Arc::clone(&publisher), &config.sender_config());

    cli(&[
        "--sender-id",
        "cli-sender",
        "--max-price",
        "0.3",
        "--message-type",
        "Transactional",
    ])
    .deliver(&mut sender)
    .await
    .unwrap();

    let calls = publisher.calls.lock().unwrap();
    let attrs = &calls[0].2;
    assert_eq!(attr(attrs, SENDER_ID_ATTRIBUTE), Some("cli-sender"));
    assert_eq!(attr(attrs, MAX_PRICE_ATTRIBUTE), Some("0.30"));
    assert_eq!(attr(attrs, MESSAGE_TYPE_ATTRIBUTE), Some("Transactional"));
}

#[tokio::test]
async fn test_ignored_cli_overrides_keep_config() {
    let file = config_file(FULL_CONFIG);
    let config = AppConfig::load_from(file.path()).unwrap();
    let publisher = Arc::new(RecordingPublisher::default());
    let mut sender = Sender::new(Arc::clone(&publisher), &config.sender_config());

    cli(&["--sender-id", "  ", "--max-price", "0.001"])
        .deliver(&mut sender)
        .await
        .unwrap();

    let calls = publisher.calls.lock().unwrap();
    let attrs = &calls[0].2;
    assert_eq!(attr(attrs, SENDER_ID_ATTRIBUTE), Some("test-sender-id"));
    assert_eq!(attr(attrs, MAX_PRICE_ATTRIBUTE), Some("0.07"));
}

#[test]
fn test_config_max_price_tie_rounds_up() {
    let file = config_file(&FULL_CONFIG.replace("max_price: 0.07", "max_price: 0.075"));
    let config = AppConfig::load_from(file.path()).unwrap();

    assert_eq!(config.max_price, Some(Decimal::from_str("0.075").unwrap()));
    let attrs = build_attributes(&config.sender_config());
    assert_eq!(attr(&attrs, MAX_PRICE_ATTRIBUTE), Some("0.08"));
}

#[tokio::test]
async fn test_cli_max_price_tie_rounds_up() {
    let publisher = Arc::new(RecordingPublisher::default());
    let mut sender = Sender::with_publisher(Arc::clone(&publisher));

    cli(&["--max-price", "0.075"])
        .deliver(&mut sender)
        .await
        .unwrap();

    let calls = publisher.calls.lock().unwrap();
    assert_eq!(attr(&calls[0].2, MAX_PRICE_ATTRIBUTE), Some("0.08"));
}

#[tokio::test]
async fn test_deliver_failure_reports_receiver() {
    let mut sender = Sender::with_publisher(RecordingPublisher {
        fail: true,
        ..Default::default()
    });

    let err = cli(&[]).deliver(&mut sender).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to publish a text message to test-receiver: bad"
    );
    assert!(matches!(err, SmsError::Publish { .. }));
}

#[test]
fn test_sns_sender_from_loaded_config() {
    let file = config_file(FULL_CONFIG);
    let config = AppConfig::load_from(file.path()).unwrap();

    let sender = sender_from_config(&config.sender_config()).unwrap();
    assert_eq!(sender.publisher().region(), "eu-west-1");
    assert_eq!(sender.attributes().len(), 3);
}

#[test]
fn test_sns_sender_requires_region() {
    let file = config_file("aws_access_key: key\naws_secret_access_key: secret\n");
    let config = AppConfig::load_from(file.path()).unwrap();

    let err = sender_from_config(&config.sender_config()).unwrap_err();
    assert!(matches!(err, SmsError::Session(_)));
}
