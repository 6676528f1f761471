// models.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub created_at: DateTime<Utc>,
    /// Never written by the current behavior; polls stay open until replaced.
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub poll_id: i64,
    pub user_hash: String,
    pub option: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCreated {
    pub poll: Poll,
    pub active_poll_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub user_id: Option<String>,
    pub option: Option<String>,
    /// The poll the client believes is active. When present and out of date
    /// the vote is rejected instead of being counted toward a newer poll.
    #[serde(default)]
    pub poll_id: Option<i64>,
}

/// Shared by the HTTP response and the broadcast payload so both paths
/// serialize identically. The BTreeMap keeps options in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResults {
    pub poll_id: i64,
    pub totals: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSnapshot {
    pub poll: Option<Poll>,
    pub active_poll_id: Option<i64>,
    pub totals: BTreeMap<String, i64>,
}
