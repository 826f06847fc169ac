use serde::{Deserialize, Serialize};

use crate::core::participant::ParticipantId;

/// One delivered unit of a round: a pair, or (at most once per round) a
/// triple absorbing an odd leftover.
///
/// Serializes as a plain JSON array of two or three ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Group {
    Pair(ParticipantId, ParticipantId),
    Triple(ParticipantId, ParticipantId, ParticipantId),
}

impl Group {
    #[must_use]
    pub fn members(&self) -> Vec<&ParticipantId> {
        match self {
            Self::Pair(a, b) => vec![a, b],
            Self::Triple(a, b, c) => vec![a, b, c],
        }
    }

    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members().contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Pair(..) => 2,
            Self::Triple(..) => 3,
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.members().iter().map(|m| m.as_str()).collect();
        write!(f, "{}", names.join(" - "))
    }
}

/// The finalized output of a successful round: an ordered sequence of groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub groups: Vec<Group>,
}

impl Assignment {
    #[must_use]
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Number of groups the given participant appears in
    #[must_use]
    pub fn membership_count(&self, id: &ParticipantId) -> usize {
        self.groups.iter().filter(|g| g.contains(id)).count()
    }

    /// Every participant that appears in at least one group
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.groups.iter().flat_map(Group::members)
    }

    #[must_use]
    pub fn triple_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g, Group::Triple(..)))
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
