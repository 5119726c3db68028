//! `sns-sms` entry point: load configuration, send one message, exit.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use sns_sms::{AppConfig, Cli, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(message_id) => {
            println!("{message_id}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            match logging::ensure_init() {
                Ok(()) => error!("{err:#}"),
                Err(init_err) => {
                    eprintln!("error: {err:#}");
                    eprintln!("error: {init_err:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = AppConfig::load_from(&cli.config_path).with_context(|| {
        format!(
            "failed to load sns-sms config {}",
            cli.config_path.display()
        )
    })?;

    logging::init(&config.logging)?;

    let mut sender = sms_aws_sns::sender_from_config(&config.sender_config())
        .context("failed to initialise the AWS SNS sender")?;

    let message_id = cli
        .deliver(&mut sender)
        .await
        .context("failed to send the text message")?;

    info!(
        receiver = %cli.receiver,
        message_id = %message_id,
        "successfully sent a text message"
    );

    Ok(message_id)
}
