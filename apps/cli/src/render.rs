use client_core::Session;
use shared::{domain::Election, protocol::ElectionDetail};

pub fn election_line(election: &Election) -> String {
    format!(
        "#{} {} ({})",
        election.id,
        election.title,
        election.activity_label()
    )
}

pub fn election_detail(detail: &ElectionDetail) -> Vec<String> {
    let mut lines = vec![election_line(&detail.election)];
    if !detail.election.description.is_empty() {
        lines.push(detail.election.description.clone());
    }
    lines.push("Candidates:".to_string());
    if detail.candidates.is_empty() {
        lines.push("  (none)".to_string());
    }
    for candidate in &detail.candidates {
        lines.push(format!("  [{}] {}", candidate.id, candidate.name));
    }
    lines
}

pub fn welcome(session: &Session) -> String {
    match (&session.user, session.is_authenticated()) {
        (Some(user), true) => format!("Welcome, {}", user.name),
        _ => "Not logged in".to_string(),
    }
}
