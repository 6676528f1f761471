//! Client-side mirror of the active poll for a messaging display.
//!
//! The display client keeps one outbound message per poll and edits it in
//! place as totals change. The mirror is a small state machine over
//! {no-message, message-active}: a new poll resets it, a vote update either
//! yields an edit for the tracked message or is ignored. Transport concerns
//! (how messages are sent or edited) stay outside; the message handle type
//! is generic.

use std::collections::BTreeMap;

use crate::models::Poll;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredPoll {
    pub id: i64,
    pub question: String,
}

/// What the display client should do after feeding an event to the mirror.
#[derive(Debug, PartialEq, Eq)]
pub enum MirrorAction<M> {
    None,
    Edit { message: M, text: String },
}

#[derive(Debug)]
pub struct PollMirror<M> {
    active: Option<MirroredPoll>,
    message: Option<M>,
}

impl<M> Default for PollMirror<M> {
    fn default() -> Self {
        Self {
            active: None,
            message: None,
        }
    }
}

impl<M: Clone> PollMirror<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a newly started poll. The previous poll's message handle is
    /// dropped; the old message is left behind, frozen at its last render.
    pub fn on_poll_started(&mut self, poll: &Poll) {
        self.active = Some(MirroredPoll {
            id: poll.id,
            question: poll.question.clone(),
        });
        self.message = None;
    }

    /// Records the outbound message now representing the active poll.
    pub fn attach_message(&mut self, message: M) {
        self.message = Some(message);
    }

    pub fn active_poll_id(&self) -> Option<i64> {
        self.active.as_ref().map(|p| p.id)
    }

    /// Vote updates for a foreign poll, or arriving before any message was
    /// posted, are silently ignored; the mirror tolerates staleness.
    pub fn on_vote_update(&self, poll_id: i64, totals: &BTreeMap<String, i64>) -> MirrorAction<M> {
        match (&self.active, &self.message) {
            (Some(active), Some(message)) if active.id == poll_id => MirrorAction::Edit {
                message: message.clone(),
                text: format_poll_message(&active.question, totals),
            },
            _ => MirrorAction::None,
        }
    }
}

pub fn format_results(totals: &BTreeMap<String, i64>) -> String {
    if totals.is_empty() {
        return "No votes yet.".to_string();
    }
    totals
        .iter()
        .map(|(option, count)| format!("{option} {} {count}", "█".repeat(*count as usize)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_poll_message(question: &str, totals: &BTreeMap<String, i64>) -> String {
    format!("🗳️ {question}\n\n📊 Results:\n{}", format_results(totals))
}

/// Participant-facing reply for a vote submission; server error messages
/// are relayed verbatim.
pub fn vote_reply(error: Option<&str>) -> String {
    match error {
        None => "Your vote has been recorded.".to_string(),
        Some(message) => message.to_string(),
    }
}
