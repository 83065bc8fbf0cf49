// src/expiration.rs
use chrono::{Duration, NaiveDateTime};

use crate::clock::truncate_to_minute;

pub const DEFAULT_LIFETIME_DAYS: i64 = 30;

/// A poll stays open through its expiration minute and closes after it.
pub fn is_expired(expire_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    truncate_to_minute(now) > expire_at
}

pub fn default_expiration(now: NaiveDateTime) -> NaiveDateTime {
    truncate_to_minute(now) + Duration::days(DEFAULT_LIFETIME_DAYS)
}
