//! Twitter data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reply post matched by the trigger search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPost {
    /// Unique tweet ID.
    pub id: String,
    /// The post this one replies to, if the API reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_post_id: Option<String>,
    /// Author of the post being replied to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_user_id: Option<String>,
}

impl TriggerPost {
    /// Create a trigger post with only an ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_post_id: None,
            in_reply_to_user_id: None,
        }
    }

    /// Set the parent post reference.
    #[must_use]
    pub fn with_parent(mut self, parent_post_id: impl Into<String>) -> Self {
        self.parent_post_id = Some(parent_post_id.into());
        self
    }

    /// Set the in-reply-to author.
    #[must_use]
    pub fn with_in_reply_to(mut self, user_id: impl Into<String>) -> Self {
        self.in_reply_to_user_id = Some(user_id.into());
        self
    }
}

/// A post pulled in through the `referenced_tweets.id` expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedPost {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

/// A tweet fetched together with its referenced posts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpandedTweet {
    /// `in_reply_to_user_id` of the fetched tweet itself.
    pub in_reply_to_user_id: Option<String>,
    /// Referenced posts in the order the API returned them.
    pub referenced: Vec<ReferencedPost>,
}

/// Minimal account reference (lookup by handle, following lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub username: String,
}

/// Profile fields used for the trust report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account ID.
    pub id: String,
    /// Handle (without @).
    pub username: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// Public follower count.
    pub followers_count: u64,
    /// Public following count.
    pub following_count: u64,
    /// Bio text (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A recent post with its like count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPost {
    pub id: String,
    pub like_count: u64,
}
