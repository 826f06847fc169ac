use std::path::PathBuf;

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::OutputFormat;
use crate::engine::{PairingEngine, RoundOutcome};
use crate::store::{self, PendingRound};

#[derive(Args)]
pub struct GenerateArgs {
    /// Roster CSV with one `id,demand` line per participant
    #[arg(long, default_value = "roster.csv")]
    pub roster: PathBuf,

    /// Weight store JSON (created on first commit if missing)
    #[arg(long, default_value = "weights.json")]
    pub weights: PathBuf,

    /// Write a pending round here for a later `send`
    #[arg(long)]
    pub pending: Option<PathBuf>,

    /// Persist the updated weights immediately, skipping the confirm step
    #[arg(long, conflicts_with = "pending")]
    pub commit: bool,

    /// Seed the RNG for a reproducible draw
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Execute generate subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be read, the weight table is
/// corrupt, or the engine exhausts its retry budget.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GenerateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let roster = store::roster::parse_roster_file(&args.roster)?;
    let mut table = store::weights::load_or_empty(&args.weights)?;

    table.sync(&roster);
    table.verify()?;

    if verbose {
        eprintln!(
            "Roster: {} participants, total demand {}",
            roster.len(),
            roster.total_demand()
        );
        eprintln!("Weight table covers {} participants", table.len());
    }

    let engine = PairingEngine::new();
    let outcome = match args.seed {
        Some(seed) => engine.assign_with_rng(&roster, table, &mut StdRng::seed_from_u64(seed))?,
        None => engine.assign(&roster, table)?,
    };

    match format {
        OutputFormat::Text => print_text(&outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }

    if let Some(path) = &args.pending {
        let round = PendingRound::new(outcome.assignment, outcome.table);
        round.save(path)?;
        eprintln!("Pending round {} written to {}", round.key, path.display());
    } else if args.commit {
        store::weights::save_to_file(&args.weights, &outcome.table)?;
        eprintln!("Weights committed to {}", args.weights.display());
    } else {
        eprintln!("Preview only: nothing persisted (use --pending or --commit)");
    }

    Ok(())
}

fn print_text(outcome: &RoundOutcome) {
    println!("Assignment ({} groups):", outcome.assignment.len());
    for group in &outcome.assignment.groups {
        println!("  {group}");
    }
}

fn print_json(outcome: &RoundOutcome) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "attempts": outcome.attempts,
        "groups": outcome.assignment.groups,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
