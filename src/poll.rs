// src/poll.rs
use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Choice, Poll, PollResult, ResultSummary};

/// Picks the leading choice. Choices are walked in stored order and a
/// candidate replaces the running best when its count is greater than or
/// equal to it, so the last of several tied choices wins.
pub fn leading_choice(choices: &[Choice], counts: &HashMap<Uuid, i64>) -> ResultSummary {
    let mut best = ResultSummary {
        title: String::new(),
        votes: 0,
    };

    for choice in choices {
        let votes = counts.get(&choice.id).copied().unwrap_or(0);
        if votes >= best.votes {
            best = ResultSummary {
                title: choice.title.clone(),
                votes,
            };
        }
    }

    best
}

pub fn build_result(poll: Poll, choices: &[Choice], counts: &HashMap<Uuid, i64>) -> PollResult {
    PollResult {
        poll_id: poll.id,
        title: poll.title,
        expire_at: poll.expire_at,
        result: leading_choice(choices, counts),
    }
}
