//! Candidate scoring: a history term that punishes concentrated repeat
//! pairings plus an optional assortativity term over status dimensions.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::grouping::Matching;
use crate::history::HistoryMatrix;
use crate::participant::{Id, ParticipantTable};
use crate::penalty::Penalty;
use crate::{RegroupError, Result};

pub const DEFAULT_MIXING_MULTIPLIER: f64 = 3.0;

/// Weight of mixed-status groups, either one value for every status
/// dimension or one per dimension (unlisted dimensions weigh zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MixingMultiplier {
    Uniform(f64),
    PerDimension(BTreeMap<String, f64>),
}

impl MixingMultiplier {
    pub fn for_dimension(&self, dimension: &str) -> f64 {
        match self {
            MixingMultiplier::Uniform(value) => *value,
            MixingMultiplier::PerDimension(values) => values.get(dimension).copied().unwrap_or(0.0),
        }
    }
}

impl Default for MixingMultiplier {
    fn default() -> Self {
        MixingMultiplier::Uniform(DEFAULT_MIXING_MULTIPLIER)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringParams {
    pub penalty: Penalty,
    pub mixing: MixingMultiplier,
    pub assortative: bool,
}

/// `sum(count(v) * penalty(v))` over the attained values of a histogram.
pub fn histogram_score(histogram: &[u64], penalty: &Penalty) -> f64 {
    histogram
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(value, &count)| count as f64 * penalty.apply(value as u32))
        .sum()
}

/// History term of a matrix that already contains the candidate.
pub fn history_score(matrix: &HistoryMatrix, penalty: &Penalty) -> f64 {
    histogram_score(&matrix.value_histogram(), penalty)
}

/// Status codes and mixing wishes of every participant, one column per
/// status dimension.
#[derive(Debug, Clone)]
struct AttributeTable {
    multipliers: Vec<f64>,
    index: FxHashMap<Id, usize>,
    codes: Vec<Vec<u32>>,
    wants_mixing: Vec<Vec<bool>>,
}

impl AttributeTable {
    fn build(participants: &ParticipantTable, mixing: &MixingMultiplier) -> Self {
        let dimensions = participants.status_dimensions();
        let mut dictionaries: Vec<FxHashMap<&str, u32>> = vec![FxHashMap::default(); dimensions.len()];

        let mut index = FxHashMap::default();
        let mut codes = Vec::with_capacity(participants.len());
        let mut wants_mixing = Vec::with_capacity(participants.len());
        for (row, participant) in participants.iter().enumerate() {
            index.insert(participant.id, row);
            let mut row_codes = Vec::with_capacity(dimensions.len());
            let mut row_wants = Vec::with_capacity(dimensions.len());
            for (d, dimension) in dimensions.iter().enumerate() {
                let dictionary = &mut dictionaries[d];
                let next = dictionary.len() as u32;
                row_codes.push(*dictionary.entry(participant.status_for(dimension)).or_insert(next));
                row_wants.push(participant.wants_mixing_for(dimension));
            }
            codes.push(row_codes);
            wants_mixing.push(row_wants);
        }

        AttributeTable {
            multipliers: dimensions.iter().map(|d| mixing.for_dimension(d)).collect(),
            index,
            codes,
            wants_mixing,
        }
    }

    fn rows_of(&self, group: &[Id]) -> Result<Vec<usize>> {
        group
            .iter()
            .map(|id| self.index.get(id).copied().ok_or(RegroupError::UnknownIdentity(*id)))
            .collect()
    }

    fn score(&self, matching: &Matching) -> Result<f64> {
        let mut score = 0.0;
        for group in matching.groups() {
            if group.is_empty() {
                continue;
            }
            let rows = self.rows_of(group)?;
            for (d, multiplier) in self.multipliers.iter().enumerate() {
                let mut values: Vec<u32> = rows.iter().map(|&r| self.codes[r][d]).collect();
                values.sort_unstable();
                values.dedup();
                let distinct = values.len();
                if distinct <= 1 {
                    continue;
                }
                let signal: f64 = rows
                    .iter()
                    .filter(|&&r| !self.wants_mixing[r][d])
                    .map(|_| multiplier * distinct as f64)
                    .sum();
                score += signal / rows.len() as f64;
            }
        }
        Ok(score)
    }
}

/// Scores candidates against one fixed history.
///
/// The lower-triangle histogram of the history is computed once; each
/// candidate only moves the pairs it touches to their next bucket.
pub struct Scorer<'a> {
    history: &'a HistoryMatrix,
    params: &'a ScoringParams,
    baseline: Vec<u64>,
    attributes: Option<AttributeTable>,
}

impl<'a> Scorer<'a> {
    pub fn new(
        history: &'a HistoryMatrix,
        participants: &ParticipantTable,
        params: &'a ScoringParams,
    ) -> Result<Self> {
        params.penalty.validate()?;
        let attributes = if params.assortative {
            if participants.status_dimensions().is_empty() {
                return Err(RegroupError::MissingStatus);
            }
            Some(AttributeTable::build(participants, &params.mixing))
        } else {
            None
        };
        Ok(Scorer {
            history,
            params,
            baseline: history.value_histogram(),
            attributes,
        })
    }

    pub fn history_term(&self, candidate: &Matching) -> Result<f64> {
        let mut increments: FxHashMap<(usize, usize), u32> = FxHashMap::default();
        for (a, b) in candidate.pairs() {
            let i = self.history.position(a).ok_or(RegroupError::UnknownIdentity(a))?;
            let j = self.history.position(b).ok_or(RegroupError::UnknownIdentity(b))?;
            if i == j {
                continue;
            }
            *increments.entry((i.max(j), i.min(j))).or_insert(0) += 1;
        }

        let mut histogram = self.baseline.clone();
        for ((i, j), added) in increments {
            let before = self.history.at(i, j) as usize;
            let after = before + added as usize;
            histogram[before] -= 1;
            if after >= histogram.len() {
                histogram.resize(after + 1, 0);
            }
            histogram[after] += 1;
        }
        Ok(histogram_score(&histogram, &self.params.penalty))
    }

    pub fn assortativity_term(&self, candidate: &Matching) -> Result<f64> {
        match &self.attributes {
            Some(attributes) => attributes.score(candidate),
            None => Ok(0.0),
        }
    }

    pub fn score(&self, candidate: &Matching) -> Result<f64> {
        Ok(self.history_term(candidate)? + self.assortativity_term(candidate)?)
    }
}

/// Score a single candidate by folding it into `history` and recounting.
pub fn score(
    candidate: &Matching,
    history: &HistoryMatrix,
    participants: &ParticipantTable,
    params: &ScoringParams,
) -> Result<f64> {
    let scorer = Scorer::new(history, participants, params)?;
    let updated = history.fold_in(candidate)?;
    Ok(history_score(&updated, &params.penalty) + scorer.assortativity_term(candidate)?)
}
