//! Persistence plumbing around the engine.
//!
//! The engine performs no I/O itself; these modules are the collaborators
//! that feed it and keep its output:
//!
//! - [`roster`]: CSV roster source (`id,demand` per line) and the upsert
//!   used by the frequency command
//! - [`weights`]: versioned JSON document holding the weight table between
//!   rounds
//! - [`session`]: pending rounds bridging preview and confirm

pub mod roster;
pub mod session;
pub mod weights;

pub use session::{PendingRound, SessionStore};
