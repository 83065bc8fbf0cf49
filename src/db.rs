// src/db.rs
use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Choice, Poll, Vote};
use crate::store::Store;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS polls (
        seq BIGSERIAL,
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        expire_at TIMESTAMP NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS choices (
        seq BIGSERIAL,
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        poll_id UUID NOT NULL,
        UNIQUE (poll_id, title)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS votes (
        seq BIGSERIAL,
        id UUID PRIMARY KEY,
        choice_id UUID NOT NULL,
        created_at TIMESTAMP NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS votes_choice_id_idx ON votes (choice_id)",
];

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Postgres backend. Uniqueness of `(poll_id, title)` is a table constraint.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO polls (id, title, expire_at) VALUES ($1, $2, $3)")
            .bind(poll.id)
            .bind(&poll.title)
            .bind(poll.expire_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let poll = sqlx::query_as::<_, Poll>("SELECT id, title, expire_at FROM polls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(poll)
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let polls = sqlx::query_as::<_, Poll>("SELECT id, title, expire_at FROM polls ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        Ok(polls)
    }

    async fn insert_choice(&self, choice: &Choice) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO choices (id, title, poll_id) VALUES ($1, $2, $3)")
            .bind(choice.id)
            .bind(&choice.title)
            .bind(choice.poll_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate,
                other => StoreError::Database(other),
            })?;
        Ok(())
    }

    async fn find_choice(&self, id: Uuid) -> Result<Option<Choice>, StoreError> {
        let choice = sqlx::query_as::<_, Choice>("SELECT id, title, poll_id FROM choices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(choice)
    }

    async fn choices_for_poll(&self, poll_id: Uuid) -> Result<Vec<Choice>, StoreError> {
        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, title, poll_id FROM choices WHERE poll_id = $1 ORDER BY seq",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(choices)
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO votes (id, choice_id, created_at) VALUES ($1, $2, $3)")
            .bind(vote.id)
            .bind(vote.choice_id)
            .bind(vote.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_votes(&self, choice_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, StoreError> {
        let rows = sqlx::query(
            "SELECT choice_id, COUNT(*) AS vote_count FROM votes WHERE choice_id = ANY($1) GROUP BY choice_id",
        )
        .bind(choice_ids)
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .into_iter()
            .map(|row| {
                let choice_id: Uuid = row.get("choice_id");
                let count: i64 = row.get("vote_count");
                (choice_id, count)
            })
            .collect();
        Ok(counts)
    }
}
