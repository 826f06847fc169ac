use std::collections::BTreeMap;

use rand::Rng;
use thiserror::Error;

use crate::core::{Assignment, Group, InvariantViolation, ParticipantId, Roster, WeightTable};
use crate::engine::{cooldown, sampler, PAIRED_SENTINEL};

#[derive(Error, Debug)]
pub enum PairingError {
    /// Total failure: the caller must not persist anything from this round
    #[error("retry budget of {budget} attempts exhausted without a feasible assignment")]
    RetryBudgetExhausted { budget: u32 },

    /// The weight table does not cover the roster; sync before assigning
    #[error("participant {id} has no weight table row; sync the table first")]
    UnknownParticipant { id: ParticipantId },

    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
}

/// Configuration for the pairing engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Global attempt budget; exhausting it is total failure
    pub max_attempts: u32,

    /// Attempt count after which every weight is clamped to at least 1,
    /// eliminating any residual value that could stall sampling
    pub clamp_after: u32,

    /// Attempt count after which a lone leftover is always folded
    pub fold_after: u32,

    /// Attempt count after which a leftover is folded when the round's
    /// total demand is odd
    pub fold_after_odd: u32,

    /// Consecutive redraws before the near-maximality bar drops a bucket
    pub relax_interval: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 500,
            clamp_after: 100,
            fold_after: 100,
            fold_after_odd: 50,
            relax_interval: 20,
        }
    }
}

/// Outcome of a successful round
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub assignment: Assignment,

    /// Cooldown-updated table for the caller to persist
    pub table: WeightTable,

    /// Zero-based index of the attempt that succeeded
    pub attempts: u32,
}

/// The randomized matching engine.
///
/// Holds no state between rounds: input is a roster and the current weight
/// table, output is a finalized assignment plus the cooldown-updated table
/// for the caller to persist. Failed attempts are rolled back to a
/// pre-attempt snapshot, so a returned error leaves nothing worth keeping.
pub struct PairingEngine {
    config: EngineConfig,
}

impl PairingEngine {
    /// Create an engine with default thresholds
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Create an engine with custom thresholds
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Compute a round assignment using a thread-local RNG.
    ///
    /// # Errors
    ///
    /// See [`assign_with_rng`](Self::assign_with_rng).
    pub fn assign(&self, roster: &Roster, table: WeightTable) -> Result<RoundOutcome, PairingError> {
        self.assign_with_rng(roster, table, &mut rand::thread_rng())
    }

    /// Compute a round assignment with a caller-supplied RNG (seed it for
    /// reproducible runs).
    ///
    /// # Errors
    ///
    /// - [`PairingError::UnknownParticipant`] if a roster id with nonzero
    ///   demand has no weight table row
    /// - [`PairingError::InvariantViolation`] if the table turns out to be
    ///   corrupted mid-round
    /// - [`PairingError::RetryBudgetExhausted`] once the attempt budget is
    ///   consumed; the caller must treat this as total failure
    pub fn assign_with_rng<R: Rng>(
        &self,
        roster: &Roster,
        mut table: WeightTable,
        rng: &mut R,
    ) -> Result<RoundOutcome, PairingError> {
        for entry in roster.iter() {
            if entry.demand > 0 && !table.contains(&entry.id) {
                return Err(PairingError::UnknownParticipant {
                    id: entry.id.clone(),
                });
            }
        }

        let total_demand = roster.total_demand();

        for attempt in 0..=self.config.max_attempts {
            // Safety valve: deep into the retry budget, no weight may stay
            // below 1, or sampling could stall on the same dead end forever.
            if attempt > self.config.clamp_after {
                table.clamp_min(1);
            }

            let original = table.snapshot();

            match self.run_attempt(&mut table, roster, attempt, total_demand, rng) {
                Ok(groups) => {
                    cooldown::advance(&mut table);
                    tracing::info!(attempt, groups = groups.len(), "assignment finalized");
                    return Ok(RoundOutcome {
                        assignment: Assignment::new(groups),
                        table,
                        attempts: attempt,
                    });
                }
                Err(AttemptError::Restart(reason)) => {
                    tracing::debug!(attempt, %reason, "attempt rolled back");
                    table = original;
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
            }
        }

        Err(PairingError::RetryBudgetExhausted {
            budget: self.config.max_attempts,
        })
    }

    fn run_attempt<R: Rng>(
        &self,
        table: &mut WeightTable,
        roster: &Roster,
        attempt: u32,
        total_demand: u64,
        rng: &mut R,
    ) -> Result<Vec<Group>, AttemptError> {
        // Working demand map: only participants with events left to fill
        let mut remaining: BTreeMap<ParticipantId, u32> = roster
            .iter()
            .filter(|e| e.demand > 0)
            .map(|e| (e.id.clone(), e.demand))
            .collect();

        let mut pairs: Vec<(ParticipantId, ParticipantId)> = Vec::new();

        while remaining.len() > 1 {
            let anchor = {
                let keys: Vec<&ParticipantId> = remaining.keys().collect();
                keys[rng.gen_range(0..keys.len())].clone()
            };

            let Some(row) = table.row(&anchor) else {
                return Err(AttemptError::Fatal(PairingError::UnknownParticipant {
                    id: anchor,
                }));
            };

            // Candidate score: weight × remaining demand, floored at zero,
            // so exhausted partners and in-attempt sentinels drop out while
            // partners who still need more pairings pull extra mass.
            let mut pool: Vec<ParticipantId> = Vec::with_capacity(row.len());
            let mut scores: Vec<i64> = Vec::with_capacity(row.len());
            for (partner, &weight) in row {
                pool.push(partner.clone());
                scores.push(match remaining.get(partner) {
                    Some(&demand) => weight.saturating_mul(i64::from(demand)).max(0),
                    None => 0,
                });
            }

            let Some(pick) = sampler::select_near_max(&scores, self.config.relax_interval, rng)
            else {
                return Err(AttemptError::Restart(RestartReason::SamplingInfeasible));
            };
            let partner = pool.swap_remove(pick);

            table.set_pair(&anchor, &partner, PAIRED_SENTINEL);
            consume(&mut remaining, &anchor);
            consume(&mut remaining, &partner);
            pairs.push((anchor, partner));
        }

        let mut folded = None;
        if let Some((leftover, demand)) = remaining.pop_first() {
            if demand > 1 {
                return Err(AttemptError::Restart(RestartReason::StructuralDeadlock));
            }

            let fold_now = attempt > self.config.fold_after
                || (total_demand % 2 == 1 && attempt > self.config.fold_after_odd);
            if !fold_now {
                return Err(AttemptError::Restart(RestartReason::OddLeftover));
            }

            folded = Some(fold_leftover(table, &mut pairs, leftover)?);
        }

        let mut groups: Vec<Group> = pairs
            .into_iter()
            .map(|(a, b)| Group::Pair(a, b))
            .collect();
        if let Some(triple) = folded {
            groups.push(triple);
        }
        Ok(groups)
    }
}

impl Default for PairingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold a lone leftover into the pair maximizing its combined weight to
/// both members, forming the round's single triple. Strict comparison
/// keeps the first pair formed on ties.
fn fold_leftover(
    table: &mut WeightTable,
    pairs: &mut Vec<(ParticipantId, ParticipantId)>,
    leftover: ParticipantId,
) -> Result<Group, AttemptError> {
    // A violation here means the persisted table was corrupt all along
    table
        .verify()
        .map_err(|e| AttemptError::Fatal(e.into()))?;

    let mut best: Option<(usize, i64)> = None;
    for (idx, (a, b)) in pairs.iter().enumerate() {
        if *a == leftover || *b == leftover {
            continue;
        }
        let affinity =
            table.weight(&leftover, a).unwrap_or(0) + table.weight(&leftover, b).unwrap_or(0);
        if best.is_none() || best.is_some_and(|(_, top)| affinity > top) {
            best = Some((idx, affinity));
        }
    }

    let Some((idx, _)) = best else {
        return Err(AttemptError::Restart(RestartReason::NoFoldCandidate));
    };

    let (a, b) = pairs.remove(idx);
    table.set_pair(&leftover, &a, PAIRED_SENTINEL);
    table.set_pair(&leftover, &b, PAIRED_SENTINEL);
    Ok(Group::Triple(a, b, leftover))
}

fn consume(remaining: &mut BTreeMap<ParticipantId, u32>, id: &ParticipantId) {
    if let Some(demand) = remaining.get_mut(id) {
        *demand -= 1;
        if *demand == 0 {
            remaining.remove(id);
        }
    }
}

enum AttemptError {
    /// Recoverable: roll back to the pre-attempt snapshot and retry
    Restart(RestartReason),
    /// Unrecoverable: surface to the caller immediately
    Fatal(PairingError),
}

#[derive(Debug, Clone, Copy)]
enum RestartReason {
    SamplingInfeasible,
    StructuralDeadlock,
    OddLeftover,
    NoFoldCandidate,
}

impl std::fmt::Display for RestartReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SamplingInfeasible => write!(f, "no viable candidate during sampling"),
            Self::StructuralDeadlock => write!(f, "lone leftover needs more than one pairing"),
            Self::OddLeftover => write!(f, "one participant left over, folding not yet allowed"),
            Self::NoFoldCandidate => write!(f, "no formed pair can host the leftover"),
        }
    }
}
