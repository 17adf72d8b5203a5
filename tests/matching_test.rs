use std::collections::BTreeSet;

use regroup::config::MatchingConfig;
use regroup::penalty::{Penalty, PenaltyKind};
use regroup::scoring::{MixingMultiplier, ScoringParams};
use regroup::{
    create_matching, create_matching_with_params, HistoryMatrix, Id, Matching, Participant, ParticipantTable,
    RegroupError,
};

const ANTONIA: Id = 1;
const DANIEL: Id = 2;
const FABIO: Id = 3;
const LUKAS: Id = 4;

fn four_names() -> ParticipantTable {
    ParticipantTable::new(vec![
        Participant::new(ANTONIA, "Antonia"),
        Participant::new(DANIEL, "Daniel"),
        Participant::new(FABIO, "Fabio"),
        Participant::new(LUKAS, "Lukas"),
    ])
    .unwrap()
}

/// Antonia met Daniel and Fabio once, Fabio met Lukas once.
fn four_history() -> HistoryMatrix {
    HistoryMatrix::from_rows(
        &[ANTONIA, DANIEL, FABIO, LUKAS],
        vec![
            vec![0, 1, 1, 0],
            vec![1, 0, 0, 0],
            vec![1, 0, 0, 1],
            vec![0, 0, 1, 0],
        ],
    )
    .unwrap()
}

fn config(min_size: Option<usize>, n_groups: Option<usize>, max_size: Option<usize>) -> MatchingConfig {
    MatchingConfig {
        min_size,
        n_groups,
        max_size,
        n_draws: 50,
        ..MatchingConfig::default()
    }
}

fn set(ids: &[Id]) -> BTreeSet<Id> {
    ids.iter().copied().collect()
}

fn assert_groups(matching: &Matching, expected: &[&[Id]]) {
    let expected: Vec<BTreeSet<Id>> = expected.iter().map(|g| set(g)).collect();
    let got = matching.group_sets();
    assert_eq!(got.len(), expected.len());
    for group in got {
        assert!(expected.contains(&group), "unexpected group {:?}", group);
    }
}

#[test]
fn test_create_matching_pairs_people_who_have_not_met() {
    let outcome = create_matching(&four_names(), Some(&four_history()), &config(Some(2), None, None)).unwrap();
    assert_groups(&outcome.matching, &[&[ANTONIA, LUKAS], &[DANIEL, FABIO]]);
    assert!(outcome.excluded.is_empty());
    assert_eq!(outcome.updated_history.get(ANTONIA, LUKAS), Some(1));
    assert_eq!(outcome.updated_history.get(ANTONIA, DANIEL), Some(1));
}

#[test]
fn test_create_matching_negative_penalty_repeats_pairs() {
    let params = ScoringParams {
        penalty: Penalty::custom("neg_exp", |v| -(v as f64).exp()),
        ..ScoringParams::default()
    };
    let outcome =
        create_matching_with_params(&four_names(), Some(&four_history()), &config(Some(2), None, None), &params)
            .unwrap();
    assert_groups(&outcome.matching, &[&[ANTONIA, DANIEL], &[FABIO, LUKAS]]);
}

#[test]
fn test_builtin_negative_exponential_matches_custom() {
    let mut cfg = config(Some(2), None, None);
    cfg.penalty = PenaltyKind::NegativeExponential;
    let outcome = create_matching(&four_names(), Some(&four_history()), &cfg).unwrap();
    assert_groups(&outcome.matching, &[&[ANTONIA, DANIEL], &[FABIO, LUKAS]]);
}

#[test]
fn test_create_matching_one_group() {
    let outcome = create_matching(&four_names(), Some(&four_history()), &config(Some(2), Some(1), None)).unwrap();
    assert_eq!(outcome.matching.len(), 1);
    assert_eq!(outcome.matching.group_sets()[0], set(&[ANTONIA, DANIEL, FABIO, LUKAS]));
}

#[test]
fn test_create_matching_two_groups() {
    let outcome = create_matching(&four_names(), Some(&four_history()), &config(Some(2), Some(2), None)).unwrap();
    assert_groups(&outcome.matching, &[&[ANTONIA, LUKAS], &[DANIEL, FABIO]]);
}

#[test]
fn test_create_matching_too_few_participants() {
    let err = create_matching(&four_names(), Some(&four_history()), &config(Some(2), Some(3), None)).unwrap_err();
    assert!(matches!(err, RegroupError::InsufficientParticipants(_)));
    assert!(err.to_string().contains("not enough participants"));
}

#[test]
fn test_create_matching_max_size_with_one_group_excludes_most_connected() {
    let outcome =
        create_matching(&four_names(), Some(&four_history()), &config(Some(2), Some(1), Some(2))).unwrap();
    // Antonia and Fabio both have two prior matches
    assert_eq!(outcome.matching.len(), 1);
    assert_eq!(outcome.matching.group_sets()[0], set(&[DANIEL, LUKAS]));
    let excluded: Vec<Id> = outcome.excluded.iter().map(|p| p.id).collect();
    assert_eq!(excluded, vec![ANTONIA, FABIO]);
    assert!(outcome.text.ends_with("Excluded participants: Antonia, Fabio\n"));
    // excluded people keep their history untouched
    assert_eq!(outcome.updated_history.get(ANTONIA, DANIEL), Some(1));
}

#[test]
fn test_create_matching_max_size_no_exclusion() {
    let outcome =
        create_matching(&four_names(), Some(&four_history()), &config(Some(2), None, Some(2))).unwrap();
    assert!(outcome.excluded.is_empty());
    assert_groups(&outcome.matching, &[&[ANTONIA, LUKAS], &[DANIEL, FABIO]]);
}

#[test]
fn test_max_size_equal_min_size_excludes_single_most_connected() {
    let names = ParticipantTable::new((1..=5).map(|id| Participant::new(id, format!("P{}", id))).collect()).unwrap();
    let history = HistoryMatrix::from_rows(
        &[1, 2, 3, 4, 5],
        vec![
            vec![0, 0, 0, 1, 2],
            vec![0, 0, 0, 0, 1],
            vec![0, 0, 0, 0, 3],
            vec![1, 0, 0, 0, 0],
            vec![2, 1, 3, 0, 0],
        ],
    )
    .unwrap();
    let outcome = create_matching(&names, Some(&history), &config(Some(2), None, Some(2))).unwrap();
    assert_eq!(outcome.excluded.len(), 1);
    assert_eq!(outcome.excluded[0].id, 5);
    assert_eq!(outcome.matching.group_sizes(), vec![2, 2]);
    assert_eq!(outcome.matching.members().collect::<BTreeSet<_>>(), set(&[1, 2, 3, 4]));
}

#[test]
fn test_create_matching_is_deterministic() {
    let names =
        ParticipantTable::new((10..24).map(|id| Participant::new(id, format!("Person {}", id))).collect()).unwrap();
    let cfg = MatchingConfig {
        seed: 17,
        n_draws: 200,
        ..MatchingConfig::default()
    };
    let first = create_matching(&names, None, &cfg).unwrap();
    let second = create_matching(&names, None, &cfg).unwrap();
    assert_eq!(first.matching, second.matching);
    assert_eq!(first.updated_history, second.updated_history);
    assert_eq!(first.text, second.text);
}

#[test]
fn test_rounds_accumulate_history() {
    let names =
        ParticipantTable::new((0..9).map(|id| Participant::new(id, format!("Person {}", id))).collect()).unwrap();
    let cfg = MatchingConfig {
        n_draws: 300,
        ..MatchingConfig::default()
    };
    let first = create_matching(&names, None, &cfg).unwrap();
    let second = create_matching(&names, Some(&first.updated_history), &cfg).unwrap();
    assert!(second.updated_history.is_symmetric());
    let total: u32 = second.updated_history.lower_triangle().sum();
    // two rounds of three triples, three pairs each
    assert_eq!(total, 18);
}

#[test]
fn test_inactive_participants_stay_in_history_only() {
    let names = ParticipantTable::new(vec![
        Participant::new(1, "Alice"),
        Participant::new(2, "Bob"),
        Participant::new(3, "Carol").with_joins(false),
        Participant::new(4, "Dan"),
    ])
    .unwrap();
    let outcome = create_matching(&names, None, &config(Some(3), None, None)).unwrap();
    assert_eq!(outcome.matching.group_sets(), vec![set(&[1, 2, 4])]);
    assert!(outcome.updated_history.contains(3));
    assert_eq!(outcome.updated_history.row_total(3), Some(0));
}

#[test]
fn test_new_names_extend_history() {
    let history = HistoryMatrix::from_rows(&[ANTONIA, DANIEL], vec![vec![0, 4], vec![4, 0]]).unwrap();
    let outcome = create_matching(&four_names(), Some(&history), &config(Some(2), None, None)).unwrap();
    assert_eq!(outcome.updated_history.len(), 4);
    assert_eq!(outcome.updated_history.ids()[..2], [ANTONIA, DANIEL]);
    // Antonia and Daniel are kept apart
    for group in outcome.matching.group_sets() {
        assert!(!(group.contains(&ANTONIA) && group.contains(&DANIEL)));
    }
}

fn status_names() -> ParticipantTable {
    ParticipantTable::new(vec![
        Participant::new(1, "Prof A").with_status("status", "faculty"),
        Participant::new(2, "Student A").with_status("status", "student"),
        Participant::new(3, "Prof B").with_status("status", "faculty"),
        Participant::new(4, "Student B").with_status("status", "student"),
    ])
    .unwrap()
}

#[test]
fn test_assortative_matching_groups_by_status() {
    let cfg = MatchingConfig {
        assortative: true,
        ..config(Some(2), None, None)
    };
    let outcome = create_matching(&status_names(), None, &cfg).unwrap();
    assert_groups(&outcome.matching, &[&[1, 3], &[2, 4]]);
}

#[test]
fn test_negative_multiplier_mixes_status() {
    let cfg = MatchingConfig {
        assortative: true,
        mixing_multiplier: MixingMultiplier::Uniform(-1.0),
        ..config(Some(2), None, None)
    };
    let outcome = create_matching(&status_names(), None, &cfg).unwrap();
    for group in outcome.matching.group_sets() {
        let faculty = group.iter().filter(|id| **id == 1 || **id == 3).count();
        assert_eq!(faculty, 1);
    }
}

#[test]
fn test_assortative_without_status_fails() {
    let cfg = MatchingConfig {
        assortative: true,
        ..config(Some(2), None, None)
    };
    assert!(matches!(
        create_matching(&four_names(), None, &cfg),
        Err(RegroupError::MissingStatus)
    ));
}

#[test]
fn test_invalid_penalty_fails_before_sampling() {
    let params = ScoringParams {
        penalty: Penalty::custom("nan", |_| f64::NAN),
        ..ScoringParams::default()
    };
    assert!(matches!(
        create_matching_with_params(&four_names(), None, &config(Some(2), None, None), &params),
        Err(RegroupError::InvalidPenalty(_))
    ));
}

#[test]
fn test_inconsistent_bounds_fail() {
    assert!(matches!(
        create_matching(&four_names(), None, &config(Some(3), None, Some(2))),
        Err(RegroupError::InconsistentBounds { .. })
    ));
}

#[test]
fn test_zero_draws_rejected() {
    let cfg = MatchingConfig {
        n_draws: 0,
        ..config(Some(2), None, None)
    };
    assert!(matches!(
        create_matching(&four_names(), None, &cfg),
        Err(RegroupError::InvalidParameter(_))
    ));
}

#[test]
fn test_duplicate_identity_rejected() {
    let result = ParticipantTable::new(vec![Participant::new(1, "Alice"), Participant::new(1, "Bob")]);
    assert!(matches!(result, Err(RegroupError::DuplicateIdentity(1))));
}
