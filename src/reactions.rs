//! Optimistic local projections for likes and subscriptions.
//!
//! The backend reports what a toggle actually did; the UI-facing counts
//! are adjusted from that outcome instead of re-fetching. Transitions are
//! an exhaustive table keyed by the reported outcome, not ad hoc field
//! edits.

use crate::api::{LikeStatus, SubscriberCount, SubscriptionState};
use serde::{Deserialize, Serialize};

/// What a like/dislike toggle did on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionOutcome {
    /// The reaction was recorded fresh.
    Added,
    /// The same reaction existed and was withdrawn.
    Removed,
    /// The opposite reaction was replaced by this one.
    Switched,
}

/// Local like/dislike counts for one video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeProjection {
    pub likes: u64,
    pub dislikes: u64,
    /// `Some(true)` liked, `Some(false)` disliked, `None` no reaction.
    pub user_liked: Option<bool>,
}

impl From<LikeStatus> for LikeProjection {
    fn from(status: LikeStatus) -> Self {
        Self {
            likes: status.likes,
            dislikes: status.dislikes,
            user_liked: status.user_liked,
        }
    }
}

impl LikeProjection {
    /// Apply the server-reported outcome of a like (`is_like = true`) or
    /// dislike (`is_like = false`) toggle.
    pub fn apply(&mut self, is_like: bool, outcome: ReactionOutcome) {
        match (is_like, outcome) {
            (true, ReactionOutcome::Added) => {
                self.likes += 1;
                if self.user_liked == Some(false) {
                    self.dislikes = self.dislikes.saturating_sub(1);
                }
                self.user_liked = Some(true);
            }
            (true, ReactionOutcome::Removed) => {
                self.likes = self.likes.saturating_sub(1);
                self.user_liked = None;
            }
            (true, ReactionOutcome::Switched) => {
                self.likes += 1;
                self.dislikes = self.dislikes.saturating_sub(1);
                self.user_liked = Some(true);
            }
            (false, ReactionOutcome::Added) => {
                self.dislikes += 1;
                if self.user_liked == Some(true) {
                    self.likes = self.likes.saturating_sub(1);
                }
                self.user_liked = Some(false);
            }
            (false, ReactionOutcome::Removed) => {
                self.dislikes = self.dislikes.saturating_sub(1);
                self.user_liked = None;
            }
            (false, ReactionOutcome::Switched) => {
                self.dislikes += 1;
                self.likes = self.likes.saturating_sub(1);
                self.user_liked = Some(false);
            }
        }
    }
}

/// Local subscription state for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionProjection {
    pub subscribed: bool,
    pub count: u64,
}

impl SubscriptionProjection {
    pub fn new(state: bool, count: SubscriberCount) -> Self {
        Self {
            subscribed: state,
            count: count.count,
        }
    }

    /// Apply the state the backend reports after a toggle.
    pub fn apply(&mut self, state: SubscriptionState) {
        if state.subscribed {
            self.count += 1;
        } else {
            self.count = self.count.saturating_sub(1);
        }
        self.subscribed = state.subscribed;
    }
}

/// Compact count formatting for the UI ("1.2K", "3.4M").
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}
