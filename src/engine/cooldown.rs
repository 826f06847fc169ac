//! Post-round cooldown update.
//!
//! Once an attempt succeeds, every weight cell advances one round: a cell
//! just used goes to 0, a cell used last round goes to 1, and every other
//! cell doubles. A cell's value therefore approximates 2^(rounds since the
//! pair last met), so long-unpaired participants grow ever more likely to
//! be drawn, while a fresh pairing zeroes priority and the weight-1 grace
//! round keeps it from rebounding immediately.

use crate::core::WeightTable;
use crate::engine::PAIRED_SENTINEL;

/// Advance every weight cell one round. Applied exactly once per
/// successful assignment, before the table is handed back for persistence.
pub fn advance(table: &mut WeightTable) {
    table.map_cells(|w| match w {
        PAIRED_SENTINEL => 0,
        0 => 1,
        w => w.saturating_mul(2),
    });
}
