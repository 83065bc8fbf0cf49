// models.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::minute_format;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "expireAt", with = "minute_format")]
    pub expire_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "poolId")]
    pub poll_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub id: Uuid,
    #[serde(rename = "choiceId")]
    pub choice_id: Uuid,
    #[serde(rename = "createdAt", with = "minute_format")]
    pub created_at: NaiveDateTime,
}

/// Leading choice of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub title: String,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollResult {
    #[serde(rename = "pollId")]
    pub poll_id: Uuid,
    pub title: String,
    #[serde(rename = "expireAt", with = "minute_format")]
    pub expire_at: NaiveDateTime,
    pub result: ResultSummary,
}

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub title: Option<String>,
    #[serde(rename = "expireAt")]
    pub expire_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateChoiceRequest {
    pub title: Option<String>,
    #[serde(rename = "poolId", alias = "pollId")]
    pub poll_id: Option<String>,
}
