use std::collections::BTreeSet;

use itertools::Itertools;

use crate::participant::Id;

/// A split of participants into disjoint, non-empty groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    groups: Vec<Vec<Id>>,
}

impl Matching {
    pub fn new(groups: Vec<Vec<Id>>) -> Self {
        Matching { groups }
    }

    pub fn groups(&self) -> &[Vec<Id>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = Id> + '_ {
        self.groups.iter().flatten().copied()
    }

    /// Every unordered pair sharing a group, each pair once.
    pub fn pairs(&self) -> impl Iterator<Item = (Id, Id)> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.iter().copied().tuple_combinations::<(Id, Id)>())
    }

    /// Groups as sets, for order-insensitive comparison.
    pub fn group_sets(&self) -> Vec<BTreeSet<Id>> {
        self.groups
            .iter()
            .map(|group| group.iter().copied().collect())
            .collect()
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }
}
