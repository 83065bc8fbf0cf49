// src/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Choice, Poll, Vote};

/// Collection-style persistence used by the poll service.
///
/// Implementations return polls and choices in insertion order and must
/// reject a choice whose `(title, poll_id)` pair already exists with
/// [`StoreError::Duplicate`] as part of the insert itself.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError>;
    async fn find_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError>;
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError>;

    async fn insert_choice(&self, choice: &Choice) -> Result<(), StoreError>;
    async fn find_choice(&self, id: Uuid) -> Result<Option<Choice>, StoreError>;
    async fn choices_for_poll(&self, poll_id: Uuid) -> Result<Vec<Choice>, StoreError>;

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError>;

    /// Vote counts for the given choices. Choices without votes may be absent.
    async fn count_votes(&self, choice_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, StoreError>;
}

/// In-process backend. Each collection is an insertion-ordered vector.
#[derive(Default)]
pub struct MemoryStore {
    polls: RwLock<Vec<Poll>>,
    choices: RwLock<Vec<Choice>>,
    votes: RwLock<Vec<Vote>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        self.polls.write().await.push(poll.clone());
        Ok(())
    }

    async fn find_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        Ok(self.polls.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        Ok(self.polls.read().await.clone())
    }

    async fn insert_choice(&self, choice: &Choice) -> Result<(), StoreError> {
        let mut choices = self.choices.write().await;
        if choices
            .iter()
            .any(|c| c.poll_id == choice.poll_id && c.title == choice.title)
        {
            return Err(StoreError::Duplicate);
        }
        choices.push(choice.clone());
        Ok(())
    }

    async fn find_choice(&self, id: Uuid) -> Result<Option<Choice>, StoreError> {
        Ok(self.choices.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn choices_for_poll(&self, poll_id: Uuid) -> Result<Vec<Choice>, StoreError> {
        Ok(self
            .choices
            .read()
            .await
            .iter()
            .filter(|c| c.poll_id == poll_id)
            .cloned()
            .collect())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.votes.write().await.push(vote.clone());
        Ok(())
    }

    async fn count_votes(&self, choice_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, StoreError> {
        let mut counts = HashMap::new();
        for vote in self.votes.read().await.iter() {
            if choice_ids.contains(&vote.choice_id) {
                *counts.entry(vote.choice_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
