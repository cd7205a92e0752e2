//! Remote API capability set used by the bot.

use async_trait::async_trait;

use super::types::{ExpandedTweet, RecentPost, TriggerPost, UserProfile, UserRef};
use crate::error::ApiResult;

/// Twitter API v2 operations the bot depends on.
///
/// Implementations must report throttling as [`crate::ApiError::RateLimited`] so callers
/// can tell it apart from other failures. "Nothing found" is `Ok(None)` or an empty list.
#[async_trait]
pub trait TwitterApi: Send + Sync {
    /// Search recent tweets matching `query`.
    async fn search_recent(&self, query: &str, max_results: u32) -> ApiResult<Vec<TriggerPost>>;

    /// Resolve a handle (without @) to an account.
    async fn get_user_by_username(&self, username: &str) -> ApiResult<Option<UserRef>>;

    /// Fetch profile fields and public metrics of an account.
    async fn get_user(&self, user_id: &str) -> ApiResult<Option<UserProfile>>;

    /// First page of accounts followed by `user_id`.
    async fn get_following(&self, user_id: &str, max_results: u32) -> ApiResult<Vec<UserRef>>;

    /// Fetch a tweet with its referenced tweets expanded.
    async fn get_tweet_with_references(&self, tweet_id: &str)
        -> ApiResult<Option<ExpandedTweet>>;

    /// Most recent tweets of `user_id` with like counts.
    async fn get_recent_tweets(&self, user_id: &str, max_results: u32)
        -> ApiResult<Vec<RecentPost>>;

    /// Post `text` as a reply to `in_reply_to`. Returns the new tweet ID.
    async fn create_reply(&self, text: &str, in_reply_to: &str) -> ApiResult<String>;
}
