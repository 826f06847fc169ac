//! Command-line interface for pairwheel.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **generate**: compute a preview assignment for the current roster
//! - **frequency**: update one participant's requested pairing events
//! - **send**: confirm a pending round — deliver it and persist weights
//! - **table**: inspect and maintain the weight table
//! - **serve**: start the HTTP surface
//!
//! ## Usage
//!
//! ```text
//! # Preview a round and stash it for confirmation
//! pairwheel generate --roster roster.csv --weights weights.json --pending pending.json
//!
//! # A participant dials their frequency up or down
//! pairwheel frequency alice@example.org 2
//!
//! # Confirm: deliver one message per group, then persist the weights
//! pairwheel send --pending pending.json --webhook https://hooks.example.org/rounds
//!
//! # Consistency check after editing the store by hand
//! pairwheel table verify --weights weights.json
//!
//! # HTTP surface
//! pairwheel serve --port 8080 --secret hunter2
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod frequency;
pub mod generate;
pub mod send;
pub mod table;

#[derive(Parser)]
#[command(name = "pairwheel")]
#[command(version)]
#[command(about = "Fair weighted pairing rotation for recurring buddy rounds")]
#[command(
    long_about = "pairwheel partitions a roster into pairs (plus at most one triple) each round.\n\nEvery participant states how many pairing events they want; a persistent cooldown table biases the draw toward people who have gone longest without meeting, so repeated rounds rotate fairly without being deterministic."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a preview assignment for the current roster
    Generate(generate::GenerateArgs),

    /// Update one participant's requested pairing events
    Frequency(frequency::FrequencyArgs),

    /// Confirm a pending round: deliver it and persist the weights
    Send(send::SendArgs),

    /// Inspect and maintain the weight table
    Table(table::TableArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Roster CSV consulted on every generate
    #[arg(long, default_value = "roster.csv")]
    pub roster: PathBuf,

    /// Weight store read on generate and written on send
    #[arg(long, default_value = "weights.json")]
    pub weights: PathBuf,

    /// Shared secret required by generate and send requests
    #[arg(long)]
    pub secret: Option<String>,

    /// Webhook URL groups are delivered to; stdout when omitted
    #[arg(long)]
    pub webhook: Option<String>,

    /// Minutes before an unconfirmed round expires
    #[arg(long, default_value = "30")]
    pub session_ttl: i64,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
