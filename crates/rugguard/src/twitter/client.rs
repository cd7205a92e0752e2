//! Twitter API v2 HTTP client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::api::TwitterApi;
use super::models::{
    expanded_tweet, ApiResponse, CreateTweetBody, CreatedTweet, ReplySettings, TweetResource,
    UserResource,
};
use super::oauth::OAuthSigner;
use super::types::{ExpandedTweet, RecentPost, TriggerPost, UserProfile, UserRef};
use crate::clock::Clock;
use crate::config::Credentials;
use crate::error::{ApiError, ApiResult};
use crate::text::{error_preview, ERROR_PREVIEW_CHARS};

/// Base URL for the Twitter API.
pub const API_BASE_URL: &str = "https://api.twitter.com";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest wait for an exhausted rate-limit window before calling anyway.
const MAX_THROTTLE_WAIT: Duration = Duration::from_secs(15 * 60);

const HEADER_REMAINING: &str = "x-rate-limit-remaining";
const HEADER_RESET: &str = "x-rate-limit-reset";

/// Last rate-limit window reported for an endpoint.
#[derive(Debug, Clone, Copy)]
struct LimitWindow {
    remaining: u32,
    reset_at: DateTime<Utc>,
}

/// Twitter API client: bearer auth for reads, OAuth 1.0a for posting.
///
/// Waits for an endpoint's window to reset when the previous response reported no
/// remaining calls.
pub struct HttpTwitterClient {
    client: Client,
    base_url: String,
    bearer_token: String,
    signer: OAuthSigner,
    clock: Arc<dyn Clock>,
    limits: Mutex<HashMap<&'static str, LimitWindow>>,
}

impl HttpTwitterClient {
    /// Create a client for the public API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(credentials: &Credentials, clock: Arc<dyn Clock>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("rugguard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            bearer_token: credentials.bearer_token.clone(),
            signer: OAuthSigner::new(credentials),
            clock,
            limits: Mutex::new(HashMap::new()),
        })
    }

    /// Point the client at another host (proxies, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Make a bearer-authenticated GET request.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<ApiResponse<T>> {
        self.throttle(endpoint).await;

        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await?;

        self.handle_response(endpoint, response).await
    }

    /// Handle API response, parsing JSON or mapping the error.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();
        let window = parse_window(response.headers());
        if let Some(window) = window {
            self.lock_limits().insert(endpoint, window);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = window.map(|w| {
                (w.reset_at - self.clock.now())
                    .num_seconds()
                    .max(0)
                    .unsigned_abs()
            });
            return Err(ApiError::RateLimited { retry_after_secs });
        }

        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(
                    error = %e,
                    body = %error_preview(&text, ERROR_PREVIEW_CHARS),
                    "Failed to parse response"
                );
                ApiError::Serialization(e)
            })
        } else {
            Err(ApiError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// Wait out an exhausted window for `endpoint`, if any.
    async fn throttle(&self, endpoint: &'static str) {
        let now = self.clock.now();
        let wait = self
            .lock_limits()
            .get(endpoint)
            .filter(|w| w.remaining == 0)
            .and_then(|w| (w.reset_at - now).to_std().ok());

        if let Some(wait) = wait {
            let wait = wait.min(MAX_THROTTLE_WAIT);
            warn!(
                endpoint,
                wait_secs = wait.as_secs(),
                "Rate-limit window exhausted, waiting for reset"
            );
            self.clock.sleep(wait).await;
            self.lock_limits().remove(endpoint);
        }
    }

    fn lock_limits(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, LimitWindow>> {
        self.limits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_window(headers: &HeaderMap) -> Option<LimitWindow> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let remaining = header(HEADER_REMAINING)?.parse().ok()?;
    let reset = header(HEADER_RESET)?.parse::<i64>().ok()?;
    Some(LimitWindow {
        remaining,
        reset_at: DateTime::from_timestamp(reset, 0)?,
    })
}

#[async_trait]
impl TwitterApi for HttpTwitterClient {
    async fn search_recent(&self, query: &str, max_results: u32) -> ApiResult<Vec<TriggerPost>> {
        let response: ApiResponse<Vec<TweetResource>> = self
            .get(
                "search_recent",
                "/2/tweets/search/recent",
                &[
                    ("query", query.to_string()),
                    ("max_results", max_results.clamp(10, 100).to_string()),
                    ("expansions", "referenced_tweets.id".to_string()),
                    ("tweet.fields", "in_reply_to_user_id".to_string()),
                ],
            )
            .await?;

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(TweetResource::into_trigger)
            .collect())
    }

    async fn get_user_by_username(&self, username: &str) -> ApiResult<Option<UserRef>> {
        let handle = username.trim_start_matches('@');
        let response: ApiResponse<UserResource> = self
            .get(
                "user_by_username",
                &format!("/2/users/by/username/{}", urlencoding::encode(handle)),
                &[],
            )
            .await?;

        Ok(response.data.map(UserResource::into_ref))
    }

    async fn get_user(&self, user_id: &str) -> ApiResult<Option<UserProfile>> {
        let response: ApiResponse<UserResource> = self
            .get(
                "user_by_id",
                &format!("/2/users/{}", urlencoding::encode(user_id)),
                &[(
                    "user.fields",
                    "created_at,public_metrics,description".to_string(),
                )],
            )
            .await?;

        Ok(response.data.and_then(UserResource::into_profile))
    }

    async fn get_following(&self, user_id: &str, max_results: u32) -> ApiResult<Vec<UserRef>> {
        let response: ApiResponse<Vec<UserResource>> = self
            .get(
                "following",
                &format!("/2/users/{}/following", urlencoding::encode(user_id)),
                &[("max_results", max_results.clamp(1, 1000).to_string())],
            )
            .await?;

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(UserResource::into_ref)
            .collect())
    }

    async fn get_tweet_with_references(
        &self,
        tweet_id: &str,
    ) -> ApiResult<Option<ExpandedTweet>> {
        let response: ApiResponse<TweetResource> = self
            .get(
                "tweet_by_id",
                &format!("/2/tweets/{}", urlencoding::encode(tweet_id)),
                &[
                    ("expansions", "referenced_tweets.id".to_string()),
                    (
                        "tweet.fields",
                        "conversation_id,in_reply_to_user_id,author_id".to_string(),
                    ),
                ],
            )
            .await?;

        let includes = response.includes;
        Ok(response.data.map(|tweet| expanded_tweet(tweet, includes)))
    }

    async fn get_recent_tweets(
        &self,
        user_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<RecentPost>> {
        let response: ApiResponse<Vec<TweetResource>> = self
            .get(
                "user_tweets",
                &format!("/2/users/{}/tweets", urlencoding::encode(user_id)),
                &[
                    ("max_results", max_results.clamp(5, 100).to_string()),
                    ("tweet.fields", "public_metrics".to_string()),
                ],
            )
            .await?;

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(TweetResource::into_recent_post)
            .collect())
    }

    async fn create_reply(&self, text: &str, in_reply_to: &str) -> ApiResult<String> {
        const ENDPOINT: &str = "create_tweet";
        self.throttle(ENDPOINT).await;

        let url = format!("{}/2/tweets", self.base_url);
        debug!(url = %url, in_reply_to, "POST request");

        let authorization = self.signer.authorization_header("POST", &url, &[])?;
        let body = CreateTweetBody {
            text,
            reply: ReplySettings {
                in_reply_to_tweet_id: in_reply_to,
            },
        };

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .json(&body)
            .send()
            .await?;

        let created: ApiResponse<CreatedTweet> = self.handle_response(ENDPOINT, response).await?;
        created
            .data
            .map(|t| t.id)
            .ok_or_else(|| ApiError::Api {
                status: 200,
                message: "tweet creation response had no data".to_string(),
            })
    }
}
