//! Orchestration of poll creation and vote submission.
//!
//! All side effects go through the store and the event bus. Events are
//! published only after the corresponding store write succeeded; a vote
//! whose notification is lost stays recorded and remains visible through
//! the snapshot.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::active::ActivePollSlot;
use crate::error::AppError;
use crate::events::{EventBus, PollEvent};
use crate::identity;
use crate::models::{PollCreated, PollSnapshot, VoteRequest, VoteResults};
use crate::store::{PollStore, VoteOutcome};

pub struct PollService {
    store: Arc<dyn PollStore>,
    active: ActivePollSlot,
    events: EventBus,
}

impl PollService {
    pub fn new(store: Arc<dyn PollStore>, events: EventBus) -> Self {
        Self {
            store,
            active: ActivePollSlot::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    pub fn active_poll_id(&self) -> Option<i64> {
        self.active.get()
    }

    /// Opens a new poll. Unconditionally replaces whichever poll was active;
    /// the newest creation always wins.
    pub async fn create_poll(&self, question: Option<String>) -> Result<PollCreated, AppError> {
        let question = question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::validation("Question is required."))?;

        let poll = self.store.create_poll(&question).await?;
        self.active.set(poll.id);
        info!(poll_id = poll.id, "poll created");

        let payload = PollCreated {
            active_poll_id: poll.id,
            poll,
        };
        self.events.publish(PollEvent::PollStarted(payload.clone()));
        Ok(payload)
    }

    /// Records one vote for the active poll and broadcasts fresh totals.
    pub async fn submit_vote(&self, request: VoteRequest) -> Result<VoteResults, AppError> {
        let active_id = self.active.get().ok_or(AppError::NoActivePoll)?;

        let (user_id, option) = match (request.user_id, request.option) {
            (Some(user_id), Some(option)) if !user_id.is_empty() && !option.is_empty() => {
                (user_id, option)
            }
            _ => return Err(AppError::validation("User ID and option are required.")),
        };
        let option = option.trim().to_string();
        if option.is_empty() {
            return Err(AppError::validation("Option is required."));
        }

        // A vote pinned to a poll that has since been replaced is rejected,
        // never counted toward the newer poll.
        if let Some(requested) = request.poll_id {
            if requested != active_id {
                return Err(AppError::PollNotActive);
            }
        }

        let user_hash = identity::hash_user_id(&user_id);
        match self.store.record_vote(active_id, &user_hash, &option).await? {
            VoteOutcome::Duplicate => return Err(AppError::DuplicateVote),
            VoteOutcome::Recorded { vote_id } => {
                debug!(poll_id = active_id, vote_id, "vote recorded");
            }
        }

        let totals = self.store.totals(active_id).await?;
        let results = VoteResults {
            poll_id: active_id,
            totals,
        };
        self.events.publish(PollEvent::VoteUpdate(results.clone()));
        Ok(results)
    }

    /// Pull-based view for subscribers that missed the broadcast, e.g. a
    /// display client reconnecting after a network gap.
    pub async fn snapshot(&self) -> Result<PollSnapshot, AppError> {
        let Some(active_id) = self.active.get() else {
            return Ok(PollSnapshot {
                poll: None,
                active_poll_id: None,
                totals: Default::default(),
            });
        };

        let poll = self.store.get_poll(active_id).await?;
        let totals = self.store.totals(active_id).await?;
        Ok(PollSnapshot {
            poll,
            active_poll_id: Some(active_id),
            totals,
        })
    }
}
