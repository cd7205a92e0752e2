//! In-memory API and clock doubles for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::clock::Clock;
use crate::config::BotConfig;
use crate::context::BotContext;
use crate::error::{ApiError, ApiResult};
use crate::twitter::{
    ExpandedTweet, RecentPost, ReferencedPost, TriggerPost, TwitterApi, UserProfile, UserRef,
};

/// Canned answer for one API operation.
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Ok(T),
    RateLimited,
    Fail(String),
}

impl<T: Clone> Scripted<T> {
    fn result(&self) -> ApiResult<T> {
        match self {
            Self::Ok(v) => Ok(v.clone()),
            Self::RateLimited => Err(ApiError::RateLimited {
                retry_after_secs: None,
            }),
            Self::Fail(message) => Err(ApiError::Api {
                status: 500,
                message: message.clone(),
            }),
        }
    }
}

/// A recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    UserByName(String),
    User(String),
    Following(String, u32),
    Tweet(String),
    RecentTweets(String, u32),
    Reply { text: String, in_reply_to: String },
}

/// Scripted Twitter API. Unscripted lookups return "not found".
#[derive(Default)]
pub struct FakeTwitter {
    searches: Mutex<VecDeque<Scripted<Vec<TriggerPost>>>>,
    users_by_name: Mutex<HashMap<String, Scripted<Option<UserRef>>>>,
    profiles: Mutex<HashMap<String, Scripted<Option<UserProfile>>>>,
    following: Mutex<HashMap<String, Scripted<Vec<UserRef>>>>,
    tweets: Mutex<HashMap<String, Scripted<Option<ExpandedTweet>>>>,
    recent: Mutex<HashMap<String, Scripted<Vec<RecentPost>>>>,
    reply: Mutex<Option<Scripted<String>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTwitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next search call.
    pub fn push_search(&self, result: Scripted<Vec<TriggerPost>>) {
        self.searches.lock().unwrap().push_back(result);
    }

    pub fn set_user_by_name(&self, handle: &str, result: Scripted<Option<UserRef>>) {
        self.users_by_name
            .lock()
            .unwrap()
            .insert(handle.to_string(), result);
    }

    /// Register a handle that resolves to `id`.
    pub fn add_account(&self, handle: &str, id: &str) {
        self.set_user_by_name(handle, Scripted::Ok(Some(user_ref(id, handle))));
    }

    pub fn set_profile(&self, user_id: &str, result: Scripted<Option<UserProfile>>) {
        self.profiles
            .lock()
            .unwrap()
            .insert(user_id.to_string(), result);
    }

    pub fn set_following(&self, user_id: &str, result: Scripted<Vec<UserRef>>) {
        self.following
            .lock()
            .unwrap()
            .insert(user_id.to_string(), result);
    }

    pub fn set_tweet(&self, tweet_id: &str, result: Scripted<Option<ExpandedTweet>>) {
        self.tweets
            .lock()
            .unwrap()
            .insert(tweet_id.to_string(), result);
    }

    pub fn set_recent(&self, user_id: &str, result: Scripted<Vec<RecentPost>>) {
        self.recent
            .lock()
            .unwrap()
            .insert(user_id.to_string(), result);
    }

    pub fn set_reply(&self, result: Scripted<String>) {
        *self.reply.lock().unwrap() = Some(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Replies posted so far as `(text, in_reply_to)`.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Reply { text, in_reply_to } => Some((text, in_reply_to)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn lookup<T: Clone>(
    map: &Mutex<HashMap<String, Scripted<T>>>,
    key: &str,
    missing: T,
) -> ApiResult<T> {
    map.lock()
        .unwrap()
        .get(key)
        .map_or(Ok(missing), Scripted::result)
}

#[async_trait]
impl TwitterApi for FakeTwitter {
    async fn search_recent(&self, query: &str, _max_results: u32) -> ApiResult<Vec<TriggerPost>> {
        self.record(Call::Search(query.to_string()));
        let next = self.searches.lock().unwrap().pop_front();
        next.map_or(Ok(Vec::new()), |s| s.result())
    }

    async fn get_user_by_username(&self, username: &str) -> ApiResult<Option<UserRef>> {
        self.record(Call::UserByName(username.to_string()));
        lookup(&self.users_by_name, username, None)
    }

    async fn get_user(&self, user_id: &str) -> ApiResult<Option<UserProfile>> {
        self.record(Call::User(user_id.to_string()));
        lookup(&self.profiles, user_id, None)
    }

    async fn get_following(&self, user_id: &str, max_results: u32) -> ApiResult<Vec<UserRef>> {
        self.record(Call::Following(user_id.to_string(), max_results));
        lookup(&self.following, user_id, Vec::new())
    }

    async fn get_tweet_with_references(
        &self,
        tweet_id: &str,
    ) -> ApiResult<Option<ExpandedTweet>> {
        self.record(Call::Tweet(tweet_id.to_string()));
        lookup(&self.tweets, tweet_id, None)
    }

    async fn get_recent_tweets(
        &self,
        user_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<RecentPost>> {
        self.record(Call::RecentTweets(user_id.to_string(), max_results));
        lookup(&self.recent, user_id, Vec::new())
    }

    async fn create_reply(&self, text: &str, in_reply_to: &str) -> ApiResult<String> {
        self.record(Call::Reply {
            text: text.to_string(),
            in_reply_to: in_reply_to.to_string(),
        });
        let scripted = self.reply.lock().unwrap().clone();
        scripted.map_or_else(|| Ok("reply-1".to_string()), |s| s.result())
    }
}

/// Clock with a fixed `now` that records sleeps instead of waiting.
pub struct FakeClock {
    now: DateTime<Utc>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::at(fixed_now())
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// 2024-06-01T12:00:00Z, the `now` of [`FakeClock::default`].
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn user_ref(id: &str, username: &str) -> UserRef {
    UserRef {
        id: id.to_string(),
        username: username.to_string(),
    }
}

pub fn profile(id: &str, age_days: i64, followers: u64, following: u64) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        username: format!("user{id}"),
        created_at: fixed_now() - chrono::Duration::days(age_days),
        followers_count: followers,
        following_count: following,
        description: None,
    }
}

pub fn expanded(referenced_authors: &[Option<&str>], in_reply_to: Option<&str>) -> ExpandedTweet {
    ExpandedTweet {
        in_reply_to_user_id: in_reply_to.map(str::to_string),
        referenced: referenced_authors
            .iter()
            .enumerate()
            .map(|(i, author)| ReferencedPost {
                id: format!("ref-{i}"),
                author_id: author.map(str::to_string),
            })
            .collect(),
    }
}

/// Context over the given doubles.
pub fn context(api: &Arc<FakeTwitter>, clock: &Arc<FakeClock>, config: BotConfig) -> BotContext {
    BotContext::new(api.clone(), clock.clone(), config)
}
