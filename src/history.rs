use rustc_hash::FxHashMap;

use crate::grouping::Matching;
use crate::participant::{ensure_unique, Id};
use crate::{RegroupError, Result};

/// Symmetric count of how often each pair of identities shared a group.
///
/// Identities map to dense positions through `index`; counts live in a
/// flat row-major grid. All updates return a new matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMatrix {
    ids: Vec<Id>,
    index: FxHashMap<Id, usize>,
    counts: Vec<u32>,
}

impl HistoryMatrix {
    /// All-zero matrix over `ids`.
    pub fn create(ids: &[Id]) -> Result<Self> {
        ensure_unique(ids)?;
        let n = ids.len();
        Ok(HistoryMatrix {
            ids: ids.to_vec(),
            index: ids.iter().enumerate().map(|(pos, &id)| (id, pos)).collect(),
            counts: vec![0; n * n],
        })
    }

    /// Build from persisted rows. Rows must form a square, symmetric
    /// matrix with a zero diagonal.
    pub fn from_rows(ids: &[Id], rows: Vec<Vec<u32>>) -> Result<Self> {
        let mut matrix = Self::create(ids)?;
        let n = ids.len();
        if rows.len() != n {
            return Err(RegroupError::Format(format!(
                "history has {} identities but {} rows",
                n,
                rows.len()
            )));
        }
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(RegroupError::Format(format!(
                    "history row for identity {} has {} entries, expected {}",
                    ids[i],
                    row.len(),
                    n
                )));
            }
            matrix.counts[i * n..(i + 1) * n].copy_from_slice(&row);
        }
        for i in 0..n {
            if matrix.counts[i * n + i] != 0 {
                return Err(RegroupError::Format(format!(
                    "history diagonal for identity {} is not zero",
                    ids[i]
                )));
            }
        }
        if !matrix.is_symmetric() {
            return Err(RegroupError::Format("history matrix is not symmetric".to_string()));
        }
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    pub fn contains(&self, id: Id) -> bool {
        self.index.contains_key(&id)
    }

    pub fn position(&self, id: Id) -> Option<usize> {
        self.index.get(&id).copied()
    }

    fn position_or_err(&self, id: Id) -> Result<usize> {
        self.position(id).ok_or(RegroupError::UnknownIdentity(id))
    }

    pub fn get(&self, a: Id, b: Id) -> Option<u32> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(self.at(i, j))
    }

    /// Count at dense positions `(i, j)`.
    pub fn at(&self, i: usize, j: usize) -> u32 {
        self.counts[i * self.ids.len() + j]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // chunks(0) panics, an empty matrix has no rows anyway
        self.counts.chunks(self.ids.len().max(1))
    }

    /// Total prior matches of `id` (sum of its row).
    pub fn row_total(&self, id: Id) -> Option<u64> {
        let i = self.position(id)?;
        let n = self.ids.len();
        Some(self.counts[i * n..(i + 1) * n].iter().map(|&c| c as u64).sum())
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.ids.len();
        (0..n).all(|i| (0..i).all(|j| self.at(i, j) == self.at(j, i)))
    }

    /// Strictly-lower-triangular entries: every unordered pair once.
    pub fn lower_triangle(&self) -> impl Iterator<Item = u32> + '_ {
        let n = self.ids.len();
        (1..n).flat_map(move |i| (0..i).map(move |j| self.at(i, j)))
    }

    /// Frequency of each attained value over the lower triangle;
    /// entry `v` holds how many pairs met exactly `v` times.
    pub fn value_histogram(&self) -> Vec<u64> {
        let mut histogram: Vec<u64> = Vec::new();
        for value in self.lower_triangle() {
            let v = value as usize;
            if v >= histogram.len() {
                histogram.resize(v + 1, 0);
            }
            histogram[v] += 1;
        }
        histogram
    }

    /// New matrix with zero rows/columns appended for every identity of
    /// `ids` not already indexed. Existing counts are kept as they are.
    pub fn extend(&self, ids: &[Id]) -> Result<Self> {
        ensure_unique(ids)?;
        let new_ids: Vec<Id> = ids.iter().copied().filter(|id| !self.contains(*id)).collect();
        if new_ids.is_empty() {
            return Ok(self.clone());
        }

        let old_n = self.ids.len();
        let n = old_n + new_ids.len();
        let mut counts = vec![0; n * n];
        for i in 0..old_n {
            counts[i * n..i * n + old_n].copy_from_slice(&self.counts[i * old_n..(i + 1) * old_n]);
        }

        let mut all_ids = self.ids.clone();
        all_ids.extend(new_ids);
        let index = all_ids.iter().enumerate().map(|(pos, &id)| (id, pos)).collect();
        Ok(HistoryMatrix {
            ids: all_ids,
            index,
            counts,
        })
    }

    /// New matrix where every pair sharing a group in `matching` is
    /// incremented by one, symmetrically.
    pub fn fold_in(&self, matching: &Matching) -> Result<Self> {
        let mut updated = self.clone();
        let n = self.ids.len();
        for (a, b) in matching.pairs() {
            let i = self.position_or_err(a)?;
            let j = self.position_or_err(b)?;
            if i == j {
                continue;
            }
            let count = updated.counts[i * n + j].checked_add(1).ok_or_else(|| {
                RegroupError::Format(format!("history count for pair ({}, {}) overflows", a, b))
            })?;
            updated.counts[i * n + j] = count;
            updated.counts[j * n + i] = count;
        }
        Ok(updated)
    }
}
