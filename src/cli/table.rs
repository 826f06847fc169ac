use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::OutputFormat;
use crate::core::ParticipantId;
use crate::store;

#[derive(Args)]
pub struct TableArgs {
    #[command(subcommand)]
    pub command: TableCommands,
}

#[derive(Subcommand)]
pub enum TableCommands {
    /// Check the symmetry invariant
    Verify {
        /// Weight store path
        #[arg(long, default_value = "weights.json")]
        weights: PathBuf,
    },

    /// Print the table
    Show {
        /// Weight store path
        #[arg(long, default_value = "weights.json")]
        weights: PathBuf,
    },

    /// Add rows for roster newcomers
    Sync {
        /// Weight store path (created if missing)
        #[arg(long, default_value = "weights.json")]
        weights: PathBuf,

        /// Roster CSV to sync from
        #[arg(long, default_value = "roster.csv")]
        roster: PathBuf,
    },

    /// Remove a participant's row and every entry pointing at it
    Remove {
        /// Participant id to remove
        id: String,

        /// Weight store path
        #[arg(long, default_value = "weights.json")]
        weights: PathBuf,
    },
}

/// Execute table subcommand
///
/// # Errors
///
/// Returns an error if the store cannot be read or written, or if
/// verification finds a violated invariant.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: TableArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        TableCommands::Verify { weights } => {
            let table = store::weights::load_from_file(&weights)?;
            table.verify()?;
            println!("Weight table OK ({} participants)", table.len());
        }
        TableCommands::Show { weights } => {
            let table = store::weights::load_from_file(&weights)?;
            match format {
                OutputFormat::Text => {
                    for id in table.participants() {
                        let cells: Vec<String> = table
                            .row(id)
                            .into_iter()
                            .flatten()
                            .map(|(partner, w)| format!("{partner}={w}"))
                            .collect();
                        println!("{id}: {}", cells.join(" "));
                    }
                }
                OutputFormat::Json => println!("{}", store::weights::to_json(&table)?),
            }
        }
        TableCommands::Sync { weights, roster } => {
            let roster = store::roster::parse_roster_file(&roster)?;
            let mut table = store::weights::load_or_empty(&weights)?;
            table.sync(&roster);
            store::weights::save_to_file(&weights, &table)?;
            println!("Synced: table now covers {} participants", table.len());
        }
        TableCommands::Remove { id, weights } => {
            let mut table = store::weights::load_from_file(&weights)?;
            table.remove(&ParticipantId::new(id.as_str()));
            store::weights::save_to_file(&weights, &table)?;
            println!("Removed {id}; table now covers {} participants", table.len());
        }
    }
    Ok(())
}
