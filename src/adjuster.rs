use tracing::debug;

use crate::history::HistoryMatrix;
use crate::participant::{Participant, ParticipantTable};
use crate::{RegroupError, Result};

/// Group size constraints as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeRequest {
    pub min_size: Option<usize>,
    pub n_groups: Option<usize>,
    pub max_size: Option<usize>,
}

/// Effective minimum group size and how many participants to leave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePlan {
    pub min_size: usize,
    pub n_to_exclude: usize,
}

pub fn plan_sizes(request: SizeRequest, participant_count: usize) -> Result<SizePlan> {
    let SizeRequest {
        min_size,
        n_groups,
        max_size,
    } = request;

    if min_size.is_none() && n_groups.is_none() {
        return Err(RegroupError::InvalidParameter(
            "either min_size or n_groups must be set to determine the group size".to_string(),
        ));
    }
    if min_size == Some(0) {
        return Err(RegroupError::InvalidParameter("min_size must be positive".to_string()));
    }
    if n_groups == Some(0) {
        return Err(RegroupError::InvalidParameter("n_groups must be positive".to_string()));
    }
    if max_size == Some(0) {
        return Err(RegroupError::InvalidParameter("max_size must be positive".to_string()));
    }

    // with both a group count and a cap, whoever does not fit is left out
    let mut n_to_exclude = match (n_groups, max_size) {
        (Some(groups), Some(max)) => groups
            .checked_mul(max)
            .map_or(0, |capacity| participant_count.saturating_sub(capacity)),
        _ => 0,
    };
    let mut remaining = participant_count - n_to_exclude;

    let effective_min = match n_groups {
        Some(groups) => {
            let derived = remaining / groups;
            if let Some(requested) = min_size {
                if requested > derived {
                    return Err(RegroupError::InsufficientParticipants(format!(
                        "there are not enough participants ({}) to create {} groups with at least {} members; \
                         decrease n_groups or min_size",
                        remaining, groups, requested
                    )));
                }
            }
            derived
        }
        None => min_size.unwrap_or(0),
    };

    if effective_min == 0 || remaining < effective_min {
        return Err(RegroupError::InsufficientParticipants(format!(
            "{} participants cannot form groups of at least {} members (min_size {:?}, n_groups {:?})",
            remaining,
            effective_min.max(1),
            min_size,
            n_groups
        )));
    }

    if let Some(max) = max_size {
        if max < effective_min {
            return Err(RegroupError::InconsistentBounds {
                min_size: effective_min,
                max_size: max,
            });
        }
        if max == effective_min {
            let excess = remaining % max;
            n_to_exclude += excess;
            remaining -= excess;
        }
    }

    debug!(
        "[adjuster] {} participants -> min_size {}, excluding {} ({} remain)",
        participant_count, effective_min, n_to_exclude, remaining
    );

    Ok(SizePlan {
        min_size: effective_min,
        n_to_exclude,
    })
}

/// Drop the `n_to_exclude` participants with the most prior matches.
/// Ties go to whoever is listed first. Returns `(kept, excluded)`, both
/// in listing order.
pub fn exclude_most_connected(
    participants: &ParticipantTable,
    history: &HistoryMatrix,
    n_to_exclude: usize,
) -> Result<(ParticipantTable, Vec<Participant>)> {
    if n_to_exclude == 0 {
        return Ok((participants.clone(), Vec::new()));
    }

    let mut ranked: Vec<(usize, u64)> = participants
        .iter()
        .enumerate()
        .map(|(pos, p)| {
            history
                .row_total(p.id)
                .map(|total| (pos, total))
                .ok_or(RegroupError::UnknownIdentity(p.id))
        })
        .collect::<Result<_>>()?;
    // stable sort keeps listing order among equal totals
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut excluded_positions: Vec<usize> = ranked.iter().take(n_to_exclude).map(|(pos, _)| *pos).collect();
    excluded_positions.sort_unstable();

    let mut kept = Vec::with_capacity(participants.len().saturating_sub(n_to_exclude));
    let mut excluded = Vec::with_capacity(n_to_exclude);
    for (pos, participant) in participants.iter().enumerate() {
        if excluded_positions.binary_search(&pos).is_ok() {
            excluded.push(participant.clone());
        } else {
            kept.push(participant.clone());
        }
    }
    Ok((ParticipantTable::new(kept)?, excluded))
}
