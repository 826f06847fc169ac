use serde::{Deserialize, Serialize};

/// Unique identifier for a participant (an email, a handle, any opaque string)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One roster line: a participant and the number of pairing events they
/// request this round. Demand is supplied fresh each round and is never
/// part of persistent state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: ParticipantId,
    pub demand: u32,
}

impl RosterEntry {
    pub fn new(id: impl Into<ParticipantId>, demand: u32) -> Self {
        Self {
            id: id.into(),
            demand,
        }
    }
}

/// An ordered roster of participants for one round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    #[must_use]
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Sum of all requested pairing events
    #[must_use]
    pub fn total_demand(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.demand)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, id: &ParticipantId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Set a participant's demand, appending a new entry if absent.
    /// Returns true if an existing entry was updated.
    pub fn set_demand(&mut self, id: impl Into<ParticipantId>, demand: u32) -> bool {
        let id = id.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.demand = demand;
            true
        } else {
            self.entries.push(RosterEntry { id, demand });
            false
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_demand() {
        let roster = Roster::new(vec![
            RosterEntry::new("a", 2),
            RosterEntry::new("b", 0),
            RosterEntry::new("c", 1),
        ]);
        assert_eq!(roster.total_demand(), 3);
    }

    #[test]
    fn test_set_demand_updates_existing() {
        let mut roster = Roster::new(vec![RosterEntry::new("a", 1)]);
        assert!(roster.set_demand("a", 2));
        assert_eq!(roster.get(&ParticipantId::new("a")).unwrap().demand, 2);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_set_demand_appends_new() {
        let mut roster = Roster::default();
        assert!(!roster.set_demand("a", 1));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = ParticipantId::new("alice@example.org");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            r#""alice@example.org""#
        );
    }
}
