use crate::grouping::Matching;
use crate::participant::{Participant, ParticipantTable};

/// Render a matching as one `Group k: A, B, C` line per group, followed by
/// an `Excluded participants:` line when anyone was left out.
pub fn format_matching(matching: &Matching, participants: &ParticipantTable, excluded: &[Participant]) -> String {
    let names = participants.names_by_id();
    let mut text = String::new();
    for (k, group) in matching.groups().iter().enumerate() {
        let members: Vec<String> = group
            .iter()
            .map(|id| names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string()))
            .collect();
        text.push_str(&format!("Group {}: {}\n", k, members.join(", ")));
    }
    if !excluded.is_empty() {
        let names: Vec<&str> = excluded.iter().map(|p| p.name.as_str()).collect();
        text.push_str(&format!("Excluded participants: {}\n", names.join(", ")));
    }
    text
}
