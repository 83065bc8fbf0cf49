// services.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{parse_timestamp, truncate_to_minute, Clock, TIMESTAMP_FORMAT};
use crate::error::{AppError, AppResult, StoreError};
use crate::expiration::{default_expiration, is_expired};
use crate::models::{Choice, Poll, PollResult, Vote};
use crate::poll::build_result;
use crate::store::Store;

#[derive(Clone)]
pub struct PollService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl PollService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            store,
            clock,
            timeout,
        }
    }

    /// Runs a store call under the configured timeout.
    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "store call timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    pub async fn create_poll(&self, title: Option<String>, expire_at: Option<String>) -> AppResult<Poll> {
        let title = required_title(title)?;

        let expire_at = match expire_at.as_deref().map(str::trim) {
            None | Some("") => default_expiration(self.clock.now()),
            Some(raw) => parse_timestamp(raw).ok_or_else(|| {
                AppError::InvalidBody(format!("expireAt must be formatted as YYYY-MM-DD HH:mm, got `{raw}`"))
            })?,
        };

        let poll = Poll {
            id: Uuid::new_v4(),
            title,
            expire_at,
        };
        self.bounded(self.store.insert_poll(&poll)).await?;

        info!(poll_id = %poll.id, expire_at = %poll.expire_at.format(TIMESTAMP_FORMAT), "poll created");
        Ok(poll)
    }

    pub async fn get_poll(&self, id: &str) -> AppResult<Poll> {
        let id = parse_id(id)?;
        self.find_poll(id).await
    }

    async fn find_poll(&self, id: Uuid) -> AppResult<Poll> {
        self.bounded(self.store.find_poll(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("poll {id} not found")))
    }

    pub async fn list_polls(&self) -> AppResult<Vec<Poll>> {
        Ok(self.bounded(self.store.list_polls()).await?)
    }

    pub async fn create_choice(&self, title: Option<String>, poll_id: Option<String>) -> AppResult<Choice> {
        let title = required_title(title)?;
        let poll_id = poll_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::InvalidBody("poolId is required".to_string()))?;
        let poll_id = Uuid::parse_str(poll_id)
            .map_err(|_| AppError::InvalidBody(format!("poolId `{poll_id}` is not a valid identifier")))?;

        let poll = self.find_poll(poll_id).await?;
        self.ensure_open(&poll)?;

        let choice = Choice {
            id: Uuid::new_v4(),
            title,
            poll_id,
        };
        match self.bounded(self.store.insert_choice(&choice)).await {
            Ok(()) => {}
            Err(StoreError::Duplicate) => {
                return Err(AppError::Conflict(format!(
                    "choice `{}` already exists for poll {poll_id}",
                    choice.title
                )));
            }
            Err(e) => return Err(e.into()),
        }

        info!(choice_id = %choice.id, %poll_id, "choice created");
        Ok(choice)
    }

    /// Both an unknown poll and a poll without choices answer not-found.
    pub async fn list_choices_for_poll(&self, poll_id: &str) -> AppResult<Vec<Choice>> {
        let poll_id = parse_id(poll_id)?;
        let poll = self.find_poll(poll_id).await?;

        let choices = self.bounded(self.store.choices_for_poll(poll.id)).await?;
        if choices.is_empty() {
            return Err(AppError::NotFound(format!("poll {poll_id} has no choices")));
        }
        Ok(choices)
    }

    pub async fn cast_vote(&self, choice_id: &str) -> AppResult<Vote> {
        let choice_id = parse_id(choice_id)?;

        let choice = self
            .bounded(self.store.find_choice(choice_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("choice {choice_id} not found")))?;

        let poll = self
            .bounded(self.store.find_poll(choice.poll_id))
            .await?
            .ok_or_else(|| {
                warn!(%choice_id, poll_id = %choice.poll_id, "choice references a missing poll");
                AppError::NotFound(format!("poll {} for choice {choice_id} not found", choice.poll_id))
            })?;
        let now = self.ensure_open(&poll)?;

        let vote = Vote {
            id: Uuid::new_v4(),
            choice_id,
            created_at: truncate_to_minute(now),
        };
        self.bounded(self.store.insert_vote(&vote)).await?;

        debug!(vote_id = %vote.id, %choice_id, "vote cast");
        Ok(vote)
    }

    pub async fn compute_result(&self, poll_id: &str) -> AppResult<PollResult> {
        let poll_id = parse_id(poll_id)?;
        let poll = self.find_poll(poll_id).await?;

        let choices = self.bounded(self.store.choices_for_poll(poll_id)).await?;
        let choice_ids: Vec<Uuid> = choices.iter().map(|c| c.id).collect();
        let counts = self.bounded(self.store.count_votes(&choice_ids)).await?;

        Ok(build_result(poll, &choices, &counts))
    }

    /// Reads the clock and fails when the poll no longer accepts changes.
    fn ensure_open(&self, poll: &Poll) -> AppResult<chrono::NaiveDateTime> {
        let now = self.clock.now();
        if is_expired(poll.expire_at, now) {
            info!(poll_id = %poll.id, "rejected change to expired poll");
            return Err(AppError::Expired(poll.expire_at.format(TIMESTAMP_FORMAT).to_string()));
        }
        Ok(now)
    }
}

fn required_title(title: Option<String>) -> AppResult<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidBody("title is required".to_string()))
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidId(format!("`{raw}` is not a valid identifier")))
}
