//! Durable record of polls and votes.
//!
//! The at-most-one-vote rule lives here: `record_vote` must be atomic with
//! respect to concurrent submissions for the same participant, and a
//! conflict is a distinguishable outcome rather than an error. The Postgres
//! backend leans on `ON CONFLICT (poll_id, user_hash) DO NOTHING`; the
//! in-memory backend serializes the check-and-insert behind one mutex.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Poll, Vote};

#[derive(Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded { vote_id: i64 },
    /// A vote for this (poll, participant) pair already exists.
    Duplicate,
}

#[async_trait]
pub trait PollStore: Send + Sync {
    async fn create_poll(&self, question: &str) -> Result<Poll, AppError>;

    async fn get_poll(&self, poll_id: i64) -> Result<Option<Poll>, AppError>;

    async fn record_vote(
        &self,
        poll_id: i64,
        user_hash: &str,
        option: &str,
    ) -> Result<VoteOutcome, AppError>;

    /// Per-option counts for a poll, ascending by option name.
    async fn totals(&self, poll_id: i64) -> Result<BTreeMap<String, i64>, AppError>;
}

pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollStore for PgPollStore {
    async fn create_poll(&self, question: &str) -> Result<Poll, AppError> {
        sqlx::query_as::<_, Poll>(
            "INSERT INTO polls (question) VALUES ($1) RETURNING id, question, created_at, closed_at",
        )
        .bind(question)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to create poll.", e))
    }

    async fn get_poll(&self, poll_id: i64) -> Result<Option<Poll>, AppError> {
        sqlx::query_as::<_, Poll>(
            "SELECT id, question, created_at, closed_at FROM polls WHERE id = $1",
        )
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to load poll.", e))
    }

    async fn record_vote(
        &self,
        poll_id: i64,
        user_hash: &str,
        option: &str,
    ) -> Result<VoteOutcome, AppError> {
        let inserted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO votes (poll_id, user_hash, option) VALUES ($1, $2, $3) \
             ON CONFLICT (poll_id, user_hash) DO NOTHING RETURNING id",
        )
        .bind(poll_id)
        .bind(user_hash)
        .bind(option)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to save vote.", e))?;

        Ok(match inserted {
            Some(vote_id) => VoteOutcome::Recorded { vote_id },
            None => VoteOutcome::Duplicate,
        })
    }

    async fn totals(&self, poll_id: i64) -> Result<BTreeMap<String, i64>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT option, COUNT(*) FROM votes WHERE poll_id = $1 \
             GROUP BY option ORDER BY option ASC",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to load totals.", e))?;

        Ok(rows.into_iter().collect())
    }
}

/// Mutex-guarded in-process store, used by tests and local development.
#[derive(Default)]
pub struct MemoryPollStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_poll_id: i64,
    next_vote_id: i64,
    polls: HashMap<i64, Poll>,
    votes: Vec<Vote>,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vote_count(&self) -> usize {
        self.inner.lock().expect("memory store poisoned").votes.len()
    }
}

#[async_trait]
impl PollStore for MemoryPollStore {
    async fn create_poll(&self, question: &str) -> Result<Poll, AppError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.next_poll_id += 1;
        let poll = Poll {
            id: inner.next_poll_id,
            question: question.to_string(),
            created_at: Utc::now(),
            closed_at: None,
        };
        inner.polls.insert(poll.id, poll.clone());
        Ok(poll)
    }

    async fn get_poll(&self, poll_id: i64) -> Result<Option<Poll>, AppError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.polls.get(&poll_id).cloned())
    }

    async fn record_vote(
        &self,
        poll_id: i64,
        user_hash: &str,
        option: &str,
    ) -> Result<VoteOutcome, AppError> {
        // One lock spans the duplicate check and the insert.
        let mut inner = self.inner.lock().expect("memory store poisoned");
        if inner
            .votes
            .iter()
            .any(|v| v.poll_id == poll_id && v.user_hash == user_hash)
        {
            return Ok(VoteOutcome::Duplicate);
        }
        inner.next_vote_id += 1;
        let vote = Vote {
            id: inner.next_vote_id,
            poll_id,
            user_hash: user_hash.to_string(),
            option: option.to_string(),
            created_at: Utc::now(),
        };
        let vote_id = vote.id;
        inner.votes.push(vote);
        Ok(VoteOutcome::Recorded { vote_id })
    }

    async fn totals(&self, poll_id: i64) -> Result<BTreeMap<String, i64>, AppError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut totals = BTreeMap::new();
        for vote in inner.votes.iter().filter(|v| v.poll_id == poll_id) {
            *totals.entry(vote.option.clone()).or_insert(0) += 1;
        }
        Ok(totals)
    }
}
