//! HTTP surface for the pairing workflow.
//!
//! Exposes the same three operations as the CLI — generate a preview,
//! adjust a participant's frequency, confirm and send — over a small axum
//! API, gated by a shared secret. Generated rounds wait in an in-memory
//! session store until confirmed or expired.

pub mod server;
