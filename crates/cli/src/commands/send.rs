//! `send` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{DispatchOutcome, EmailMessage};
use dispatcher::{create_dispatcher, DispatchError};
use serde::Serialize;
use tracing::info;

use crate::cli::SendArgs;
use crate::error::CliError;

/// Send result for JSON output
#[derive(Serialize)]
#[serde(untagged)]
enum SendReport<'a> {
    Delivered(&'a DispatchOutcome),
    Failed { status: &'static str, error: String },
}

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let blueprint = super::load_blueprint(args.config.as_deref())?;
    let message = build_message(args)?;

    info!(message_id = %message.id, to = %message.to, "Sending message");

    let dispatcher = create_dispatcher(&blueprint)
        .await
        .context("Failed to create dispatcher")?;
    dispatcher.on_sent(observability::record_sent_event);
    dispatcher.on_error(observability::record_error_event);

    let result = dispatcher.dispatch(&message).await;
    dispatcher.shutdown().await;

    print_result(&result, args.json)?;

    match result {
        Ok(outcome) => {
            observability::record_dispatch_outcome(outcome.status());
            Ok(())
        }
        Err(e) => {
            observability::record_dispatch_outcome(e.kind());
            Err(CliError::from(e).into())
        }
    }
}

fn build_message(args: &SendArgs) -> Result<EmailMessage> {
    if let Some(path) = &args.message {
        return Ok(read_message_file(path)?);
    }

    // clap enforces both when --message is absent
    let id = args.id.clone().context("--id is required")?;
    let to = args.to.clone().context("--to is required")?;
    Ok(EmailMessage::new(id, to, &args.subject, &args.body))
}

fn read_message_file(path: &Path) -> Result<EmailMessage, CliError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::invalid_message(path.display().to_string(), e.to_string()))
}

fn print_result(result: &Result<DispatchOutcome, DispatchError>, json: bool) -> Result<()> {
    if json {
        let report = match result {
            Ok(outcome) => SendReport::Delivered(outcome),
            Err(e) => SendReport::Failed {
                status: e.kind(),
                error: e.to_string(),
            },
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize result")?;
        println!("{}", json);
        return Ok(());
    }

    match result {
        Ok(DispatchOutcome::Sent {
            delivery_id,
            provider,
        }) => println!("✓ Sent via {} (delivery id: {})", provider, delivery_id),
        Ok(DispatchOutcome::AlreadySent { id }) => {
            println!("• Message '{}' was already sent, skipped", id)
        }
        Err(e) => println!("✗ {}", e),
    }
    Ok(())
}
