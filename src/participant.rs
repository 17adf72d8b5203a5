use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::{RegroupError, Result};

/// Identity of a participant, stable across rounds.
pub type Id = i64;

fn default_joins() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Id,
    pub name: String,
    #[serde(default = "default_joins")]
    pub joins: bool,
    /// Categorical status per dimension, e.g. `"status" -> "faculty"`.
    #[serde(default)]
    pub status: BTreeMap<String, String>,
    #[serde(default)]
    pub wants_mixing: bool,
    /// Per-dimension overrides of `wants_mixing`.
    #[serde(default)]
    pub wants_mixing_by_dimension: BTreeMap<String, bool>,
}

impl Participant {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Participant {
            id,
            name: name.into(),
            joins: true,
            status: BTreeMap::new(),
            wants_mixing: false,
            wants_mixing_by_dimension: BTreeMap::new(),
        }
    }

    pub fn with_joins(mut self, joins: bool) -> Self {
        self.joins = joins;
        self
    }

    pub fn with_status(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.status.insert(dimension.into(), value.into());
        self
    }

    pub fn with_wants_mixing(mut self, wants_mixing: bool) -> Self {
        self.wants_mixing = wants_mixing;
        self
    }

    pub fn with_wants_mixing_for(mut self, dimension: impl Into<String>, wants_mixing: bool) -> Self {
        self.wants_mixing_by_dimension.insert(dimension.into(), wants_mixing);
        self
    }

    /// Status value for `dimension`; missing values read as the empty string.
    pub fn status_for(&self, dimension: &str) -> &str {
        self.status.get(dimension).map(String::as_str).unwrap_or("")
    }

    pub fn wants_mixing_for(&self, dimension: &str) -> bool {
        self.wants_mixing_by_dimension
            .get(dimension)
            .copied()
            .unwrap_or(self.wants_mixing)
    }
}

/// Fails with `DuplicateIdentity` on the first repeated identity.
pub fn ensure_unique(ids: &[Id]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for &id in ids {
        if !seen.insert(id) {
            return Err(RegroupError::DuplicateIdentity(id));
        }
    }
    Ok(())
}

/// Ordered participant list. Listing order is kept because exclusion
/// ties are broken by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantTable {
    participants: Vec<Participant>,
}

impl ParticipantTable {
    pub fn new(participants: Vec<Participant>) -> Result<Self> {
        let ids: Vec<Id> = participants.iter().map(|p| p.id).collect();
        ensure_unique(&ids)?;
        Ok(ParticipantTable { participants })
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    pub fn ids(&self) -> Vec<Id> {
        self.participants.iter().map(|p| p.id).collect()
    }

    pub fn get(&self, id: Id) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participants with `joins` set, in listing order.
    pub fn active(&self) -> ParticipantTable {
        ParticipantTable {
            participants: self.participants.iter().filter(|p| p.joins).cloned().collect(),
        }
    }

    /// Every status dimension used by at least one participant, sorted.
    pub fn status_dimensions(&self) -> Vec<String> {
        let mut dims: Vec<String> = self
            .participants
            .iter()
            .flat_map(|p| p.status.keys().cloned())
            .collect();
        dims.sort();
        dims.dedup();
        dims
    }

    pub fn names_by_id(&self) -> FxHashMap<Id, &str> {
        self.participants.iter().map(|p| (p.id, p.name.as_str())).collect()
    }

    /// Keep only the participants whose identity is in `ids`, preserving order.
    pub fn retain_ids(&self, ids: &[Id]) -> ParticipantTable {
        let keep: FxHashSet<Id> = ids.iter().copied().collect();
        ParticipantTable {
            participants: self
                .participants
                .iter()
                .filter(|p| keep.contains(&p.id))
                .cloned()
                .collect(),
        }
    }
}
