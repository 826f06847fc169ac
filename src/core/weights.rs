use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::participant::{ParticipantId, Roster};

/// A consistency failure in a persisted weight table.
///
/// Violations signal external corruption and must halt processing; the
/// table is never silently repaired.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("asymmetric weight between {a} and {b}: {forward} forward, {reverse:?} reverse")]
    Asymmetric {
        a: ParticipantId,
        b: ParticipantId,
        forward: i64,
        reverse: Option<i64>,
    },

    #[error("self entry recorded for {id}")]
    SelfEntry { id: ParticipantId },
}

/// Symmetric affinity/cooldown table between participant pairs.
///
/// Rows are kept in sorted order so iteration (and the JSON on disk) is
/// deterministic. Invariants: `weight(a, b) == weight(b, a)` for every
/// recorded pair, and no participant has an entry for itself.
///
/// This is the only long-lived state in the system; it persists across
/// rounds via [`crate::store::weights`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    rows: BTreeMap<ParticipantId, BTreeMap<ParticipantId, i64>>,
}

impl WeightTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row for every roster participant not yet recorded, giving
    /// weight 1 to every existing participant and, symmetrically, weight 1
    /// from every existing participant back to the newcomer.
    ///
    /// Idempotent; existing entries are never touched.
    pub fn sync(&mut self, roster: &Roster) {
        for entry in roster.iter() {
            if !self.rows.contains_key(&entry.id) {
                self.add_participant(entry.id.clone());
            }
        }
    }

    fn add_participant(&mut self, id: ParticipantId) {
        let mut row = BTreeMap::new();
        for (other, other_row) in &mut self.rows {
            if *other != id {
                row.insert(other.clone(), 1);
                other_row.insert(id.clone(), 1);
            }
        }
        self.rows.insert(id, row);
    }

    /// Delete the participant's row and its entry from every other row
    pub fn remove(&mut self, id: &ParticipantId) {
        self.rows.remove(id);
        for row in self.rows.values_mut() {
            row.remove(id);
        }
    }

    /// Scan all entries and fail on the first asymmetry or self entry.
    ///
    /// This is an assertion, not a repair.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] describing the offending cell. A
    /// missing reverse entry counts as asymmetry.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        for (a, row) in &self.rows {
            for (b, &forward) in row {
                if a == b {
                    return Err(InvariantViolation::SelfEntry { id: a.clone() });
                }
                let reverse = self.rows.get(b).and_then(|r| r.get(a)).copied();
                if reverse != Some(forward) {
                    return Err(InvariantViolation::Asymmetric {
                        a: a.clone(),
                        b: b.clone(),
                        forward,
                        reverse,
                    });
                }
            }
        }
        Ok(())
    }

    /// Independent deep copy, taken so an attempt's in-place mutations can
    /// be discarded cleanly.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Recorded weight between two participants
    #[must_use]
    pub fn weight(&self, a: &ParticipantId, b: &ParticipantId) -> Option<i64> {
        self.rows.get(a).and_then(|r| r.get(b)).copied()
    }

    /// Set the weight in both directions, preserving symmetry
    pub fn set_pair(&mut self, a: &ParticipantId, b: &ParticipantId, value: i64) {
        if let Some(row) = self.rows.get_mut(a) {
            row.insert(b.clone(), value);
        }
        if let Some(row) = self.rows.get_mut(b) {
            row.insert(a.clone(), value);
        }
    }

    /// All recorded partners of a participant, with weights
    #[must_use]
    pub fn row(&self, id: &ParticipantId) -> Option<&BTreeMap<ParticipantId, i64>> {
        self.rows.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.rows.contains_key(id)
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.rows.keys()
    }

    /// Apply a transformation to every weight cell
    pub fn map_cells(&mut self, f: impl Fn(i64) -> i64) {
        for row in self.rows.values_mut() {
            for value in row.values_mut() {
                *value = f(*value);
            }
        }
    }

    /// Raise every weight to at least `floor`
    pub fn clamp_min(&mut self, floor: i64) {
        self.map_cells(|w| w.max(floor));
    }

    /// Number of participants recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
