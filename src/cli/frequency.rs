use std::path::PathBuf;

use clap::Args;

use crate::store;

#[derive(Args)]
pub struct FrequencyArgs {
    /// Participant id (e.g. an email address)
    pub id: String,

    /// Requested pairing events per round (0 opts out)
    #[arg(value_parser = clap::value_parser!(u32).range(0..=2))]
    pub demand: u32,

    /// Roster CSV to update (created if missing)
    #[arg(long, default_value = "roster.csv")]
    pub roster: PathBuf,
}

/// Execute frequency subcommand
///
/// # Errors
///
/// Returns an error if the roster file cannot be read or written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: FrequencyArgs) -> anyhow::Result<()> {
    store::roster::update_entry(&args.roster, &args.id, args.demand)?;
    println!("Updated {} to {} pairing events", args.id, args.demand);
    Ok(())
}
