use std::path::PathBuf;

use clap::Args;

use crate::delivery::{self, ConsoleSink, DeliverySink, WebhookSink, DEFAULT_MESSAGE};
use crate::store::{self, PendingRound};

#[derive(Args)]
pub struct SendArgs {
    /// Pending round written by `generate --pending`
    #[arg(long, default_value = "pending.json")]
    pub pending: PathBuf,

    /// Weight store the confirmed table is persisted to
    #[arg(long, default_value = "weights.json")]
    pub weights: PathBuf,

    /// Message sent to each group
    #[arg(short, long)]
    pub message: Option<String>,

    /// Webhook URL; groups print to stdout when omitted
    #[arg(long)]
    pub webhook: Option<String>,

    /// Maximum age in minutes before a pending round is refused
    #[arg(long, default_value = "60")]
    pub max_age: i64,
}

/// Execute send subcommand
///
/// Delivery runs first and the weight table is persisted afterwards even
/// if some groups fail, matching the round that was actually announced;
/// partial failure still exits nonzero so the operator notices.
///
/// # Errors
///
/// Returns an error for a missing or stale pending round, a delivery sink
/// that cannot be built, persistence failure, or partially failed delivery.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SendArgs, verbose: bool) -> anyhow::Result<()> {
    let round = PendingRound::load_fresh(&args.pending, chrono::Duration::minutes(args.max_age))?;

    if verbose {
        eprintln!(
            "Pending round {} ({} groups, {} minutes old)",
            round.key,
            round.assignment.len(),
            round.age().num_minutes()
        );
    }

    let message = args.message.as_deref().unwrap_or(DEFAULT_MESSAGE);
    let sink: Box<dyn DeliverySink> = match &args.webhook {
        Some(url) => Box::new(WebhookSink::from_url(url.clone())?),
        None => Box::new(ConsoleSink),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(delivery::deliver_assignment(
        sink.as_ref(),
        &round.assignment,
        message,
    ));

    store::weights::save_to_file(&args.weights, &round.table)?;
    std::fs::remove_file(&args.pending)?;

    if report.all_delivered() {
        println!("Round {} sent: {} groups delivered", round.key, report.delivered);
        Ok(())
    } else {
        for failure in &report.failures {
            eprintln!("Failed: {}: {}", failure.group, failure.reason);
        }
        anyhow::bail!(
            "delivered {} of {} groups; weights were persisted",
            report.delivered,
            round.assignment.len()
        );
    }
}
