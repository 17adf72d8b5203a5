use tracing::{info, warn};

use crate::adjuster::{exclude_most_connected, plan_sizes};
use crate::candidate::draw;
use crate::config::MatchingConfig;
use crate::format::format_matching;
use crate::grouping::Matching;
use crate::history::HistoryMatrix;
use crate::participant::{Participant, ParticipantTable};
use crate::scoring::ScoringParams;
use crate::selector::{select, Selection};
use crate::{RegroupError, Result};

/// Everything a matching run produces.
#[derive(Debug, Clone)]
pub struct MatchingOutcome {
    pub matching: Matching,
    pub excluded: Vec<Participant>,
    pub updated_history: HistoryMatrix,
    pub score: f64,
    /// Human-readable rendering of `matching` and `excluded`.
    pub text: String,
}

/// Draw `n_draws` candidates over `participants` and keep the best one.
///
/// `participants` must already be filtered to the people joining this
/// round and `history` must index all of them.
pub fn select_matching(
    participants: &ParticipantTable,
    history: &HistoryMatrix,
    min_size: usize,
    n_draws: usize,
    seed: u64,
    params: &ScoringParams,
) -> Result<Selection> {
    let candidates = draw(&participants.ids(), min_size, n_draws, seed)?;
    select(&candidates, history, participants, params)
}

pub fn create_matching(
    names: &ParticipantTable,
    history: Option<&HistoryMatrix>,
    config: &MatchingConfig,
) -> Result<MatchingOutcome> {
    create_matching_with_params(names, history, config, &config.scoring_params())
}

/// Full run: extend the history for new names, resolve group sizes,
/// exclude if needed, select, and render. All validation happens before
/// any candidate is drawn.
pub fn create_matching_with_params(
    names: &ParticipantTable,
    history: Option<&HistoryMatrix>,
    config: &MatchingConfig,
    params: &ScoringParams,
) -> Result<MatchingOutcome> {
    params.penalty.validate()?;
    if config.n_draws == 0 {
        return Err(RegroupError::InvalidParameter("n_draws must be positive".to_string()));
    }

    let history = match history {
        Some(existing) => existing.extend(&names.ids())?,
        None => HistoryMatrix::create(&names.ids())?,
    };

    let active = names.active();
    if params.assortative && active.status_dimensions().is_empty() {
        return Err(RegroupError::MissingStatus);
    }

    let plan = plan_sizes(config.size_request(), active.len())?;
    let (participants, excluded) = exclude_most_connected(&active, &history, plan.n_to_exclude)?;
    if !excluded.is_empty() {
        let excluded_names: Vec<&str> = excluded.iter().map(|p| p.name.as_str()).collect();
        warn!("[regroup] Excluded participants: {}", excluded_names.join(", "));
    }

    info!(
        "[regroup] Matching {} participants (min_size {}, {} draws, seed {}, penalty {})",
        participants.len(),
        plan.min_size,
        config.n_draws,
        config.seed,
        params.penalty.name()
    );

    let selection = select_matching(
        &participants,
        &history,
        plan.min_size,
        config.n_draws,
        config.seed,
        params,
    )?;

    info!(
        "[regroup] Selected candidate #{} with score {:.4} ({} groups)",
        selection.index,
        selection.score,
        selection.matching.len()
    );

    let text = format_matching(&selection.matching, names, &excluded);
    Ok(MatchingOutcome {
        matching: selection.matching,
        excluded,
        updated_history: selection.updated_history,
        score: selection.score,
        text,
    })
}
