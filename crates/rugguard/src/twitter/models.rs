//! Twitter API v2 request and response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{ExpandedTweet, RecentPost, ReferencedPost, TriggerPost, UserProfile, UserRef};

/// Standard v2 envelope. `data` is absent when nothing matched.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub includes: Option<Includes>,
}

/// Expanded objects returned next to `data`.
#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub tweets: Vec<TweetResource>,
}

/// A tweet object.
#[derive(Debug, Deserialize)]
pub struct TweetResource {
    pub id: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_user_id: Option<String>,
    #[serde(default)]
    pub referenced_tweets: Vec<ReferencedTweet>,
    #[serde(default)]
    pub public_metrics: Option<TweetMetrics>,
}

/// Entry of a tweet's `referenced_tweets` array.
#[derive(Debug, Deserialize)]
pub struct ReferencedTweet {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Tweet engagement counters.
#[derive(Debug, Default, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub like_count: u64,
}

/// A user object.
#[derive(Debug, Deserialize)]
pub struct UserResource {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<UserMetrics>,
}

/// User follower counters.
#[derive(Debug, Default, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
}

/// Body of `POST /2/tweets`.
#[derive(Debug, Serialize)]
pub struct CreateTweetBody<'a> {
    pub text: &'a str,
    pub reply: ReplySettings<'a>,
}

/// Reply target of a new tweet.
#[derive(Debug, Serialize)]
pub struct ReplySettings<'a> {
    pub in_reply_to_tweet_id: &'a str,
}

/// `data` of a `POST /2/tweets` response.
#[derive(Debug, Deserialize)]
pub struct CreatedTweet {
    pub id: String,
}

impl TweetResource {
    /// Convert a search hit into a trigger post.
    pub fn into_trigger(self) -> TriggerPost {
        let parent_post_id = self
            .referenced_tweets
            .into_iter()
            .find(|r| r.kind == "replied_to")
            .map(|r| r.id);
        TriggerPost {
            id: self.id,
            parent_post_id,
            in_reply_to_user_id: self.in_reply_to_user_id,
        }
    }

    pub fn into_recent_post(self) -> RecentPost {
        RecentPost {
            id: self.id,
            like_count: self.public_metrics.unwrap_or_default().like_count,
        }
    }
}

impl UserResource {
    pub fn into_ref(self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username,
        }
    }

    /// Convert into a profile. `None` when the creation time was not returned.
    pub fn into_profile(self) -> Option<UserProfile> {
        let metrics = self.public_metrics.unwrap_or_default();
        Some(UserProfile {
            id: self.id,
            username: self.username,
            created_at: self.created_at?,
            followers_count: metrics.followers_count,
            following_count: metrics.following_count,
            description: self.description,
        })
    }
}

/// Build an expanded tweet from a single-tweet lookup response.
pub fn expanded_tweet(tweet: TweetResource, includes: Option<Includes>) -> ExpandedTweet {
    let referenced = includes
        .unwrap_or_default()
        .tweets
        .into_iter()
        .map(|t| ReferencedPost {
            id: t.id,
            author_id: t.author_id,
        })
        .collect();
    ExpandedTweet {
        in_reply_to_user_id: tweet.in_reply_to_user_id,
        referenced,
    }
}
