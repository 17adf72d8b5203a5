use tracing::debug;

use crate::grouping::Matching;
use crate::history::HistoryMatrix;
use crate::participant::ParticipantTable;
use crate::scoring::{Scorer, ScoringParams};
use crate::{RegroupError, Result};

/// Winning candidate and the history with it folded in.
#[derive(Debug, Clone)]
pub struct Selection {
    pub matching: Matching,
    pub updated_history: HistoryMatrix,
    pub score: f64,
    /// Position of the winner in the candidate list.
    pub index: usize,
}

#[cfg(not(feature = "parallel"))]
fn score_all(scorer: &Scorer<'_>, candidates: &[Matching]) -> Result<Vec<f64>> {
    candidates.iter().map(|candidate| scorer.score(candidate)).collect()
}

#[cfg(feature = "parallel")]
fn score_all(scorer: &Scorer<'_>, candidates: &[Matching]) -> Result<Vec<f64>> {
    use rayon::prelude::*;
    // collect keeps candidate order, so ties resolve as in the sequential path
    candidates.par_iter().map(|candidate| scorer.score(candidate)).collect()
}

/// Index of the strictly smallest score; ties keep the first occurrence.
pub fn argmin(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (k, &score) in scores.iter().enumerate() {
        let better = match best {
            None => true,
            Some(b) => score < scores[b] || scores[b].is_nan(),
        };
        if better {
            best = Some(k);
        }
    }
    best
}

/// Score every candidate against the same history and keep the cheapest.
pub fn select(
    candidates: &[Matching],
    history: &HistoryMatrix,
    participants: &ParticipantTable,
    params: &ScoringParams,
) -> Result<Selection> {
    if candidates.is_empty() {
        return Err(RegroupError::InvalidParameter(
            "cannot select from an empty candidate set".to_string(),
        ));
    }

    let scorer = Scorer::new(history, participants, params)?;
    let scores = score_all(&scorer, candidates)?;
    let index = argmin(&scores).ok_or_else(|| RegroupError::Other("no candidate scored".to_string()))?;

    debug!(
        "[selector] best of {} candidates is #{} with score {:.4}",
        candidates.len(),
        index,
        scores[index]
    );

    let matching = candidates[index].clone();
    let updated_history = history.fold_in(&matching)?;
    Ok(Selection {
        matching,
        updated_history,
        score: scores[index],
        index,
    })
}
