//! # pairwheel
//!
//! A library for fair, randomized weighted pairing over a recurring roster.
//!
//! Groups that pair people up on a schedule — coffee chats, code buddies,
//! mentoring rotations — want two things that pull against each other:
//! assignments should feel random, and over time everyone should meet
//! everyone. `pairwheel` resolves the tension with a persistent symmetric
//! weight table: every pair of participants carries a cooldown value that
//! doubles each round they don't meet and resets when they do, and the
//! matcher samples partners proportionally to it.
//!
//! ## Features
//!
//! - **Demand-driven rounds**: each participant requests 0..n pairing
//!   events per round; zero sits the round out
//! - **Randomized, not optimal**: weighted sampling with a soft
//!   favor-the-best policy, never a deterministic argmax
//! - **Exponential cooldown**: long-unpaired participants grow ever more
//!   likely to be drawn
//! - **Odd-leftover folding**: a single leftover is absorbed into the
//!   best-fitting pair, forming at most one triple per round
//! - **Preview → confirm**: nothing persists until a generated round is
//!   explicitly confirmed and delivered
//!
//! ## Example
//!
//! ```rust
//! use pairwheel::{PairingEngine, Roster, RosterEntry, WeightTable};
//!
//! // Four people, one pairing event each
//! let roster = Roster::new(vec![
//!     RosterEntry::new("ada", 1),
//!     RosterEntry::new("grace", 1),
//!     RosterEntry::new("alan", 1),
//!     RosterEntry::new("edsger", 1),
//! ]);
//!
//! // First round: no history yet
//! let mut table = WeightTable::new();
//! table.sync(&roster);
//!
//! let engine = PairingEngine::new();
//! let outcome = engine.assign(&roster, table).unwrap();
//!
//! for group in &outcome.assignment.groups {
//!     println!("{group}");
//! }
//! // Persist outcome.table for the next round
//! ```
//!
//! ## Modules
//!
//! - [`core`]: participants, rosters, groups, and the weight table
//! - [`engine`]: the randomized matching engine and cooldown update
//! - [`store`]: roster CSV, weight-store JSON, and pending-round sessions
//! - [`delivery`]: per-group message delivery sinks
//! - [`cli`]: command-line interface implementation
//! - [`web`]: HTTP surface for the generate/frequency/send workflow

pub mod cli;
pub mod core;
pub mod delivery;
pub mod engine;
pub mod store;
pub mod web;

// Re-export commonly used types for convenience
pub use crate::core::{
    Assignment, Group, InvariantViolation, ParticipantId, Roster, RosterEntry, WeightTable,
};
pub use crate::engine::{EngineConfig, PairingEngine, PairingError, RoundOutcome};
