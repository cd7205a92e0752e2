//! Bot configuration: credentials, cooldown policy and search settings.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Default search query: replies to the bot account containing the trigger phrase.
pub const DEFAULT_QUERY: &str = r#"to:projectrugguard "riddle me this" is:reply"#;

/// Default trusted-account list file.
pub const DEFAULT_TRUSTED_FILE: &str = "trusted.txt";

/// Platform maximum post length.
pub const MAX_POST_LENGTH: usize = 280;

/// API credentials loaded from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub bearer_token: String,
    pub access_token: String,
    pub access_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("bearer_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from environment variables.
    ///
    /// Unset variables become empty strings; a bad credential only shows up as a failed
    /// request for the endpoints that need it.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from any name-to-value lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name).unwrap_or_else(|| {
                warn!(variable = name, "Credential not set, using empty value");
                String::new()
            })
        };
        Self {
            api_key: read("API_KEY"),
            api_secret: read("API_SECRET"),
            bearer_token: read("BEARER_TOKEN"),
            access_token: read("ACCESS_TOKEN"),
            access_secret: read("ACCESS_SECRET"),
        }
    }
}

/// Fixed delays applied by the bot. None of these back off exponentially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldowns {
    /// Idle time before each search.
    pub poll_interval: Duration,
    /// Delay after each dispatched trigger within a batch.
    pub dispatch_pacing: Duration,
    /// Cooldown after the search call is rate limited.
    pub search_rate_limit: Duration,
    /// Cooldown after any other search failure.
    pub search_error: Duration,
    /// Cooldown after a rate limit while replying, analyzing or resolving a trigger.
    pub rate_limit: Duration,
    /// Delay between consecutive trusted-account checks.
    pub trusted_pacing: Duration,
}

impl Default for Cooldowns {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            dispatch_pacing: Duration::from_secs(60),
            search_rate_limit: Duration::from_secs(15 * 60),
            search_error: Duration::from_secs(60),
            rate_limit: Duration::from_secs(5 * 60),
            trusted_pacing: Duration::from_secs(2),
        }
    }
}

/// Settings shared by every component of the bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Search query for trigger replies.
    pub query: String,
    /// Results requested per search (10 is the API minimum).
    pub search_page_size: u32,
    /// Path of the trusted-account list, read on every check.
    pub trusted_file: PathBuf,
    /// Recent posts sampled for average likes.
    pub recent_post_sample: u32,
    /// Replies are truncated to this many characters.
    pub max_reply_length: usize,
    pub cooldowns: Cooldowns,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            search_page_size: 10,
            trusted_file: PathBuf::from(DEFAULT_TRUSTED_FILE),
            recent_post_sample: 10,
            max_reply_length: MAX_POST_LENGTH,
            cooldowns: Cooldowns::default(),
        }
    }
}
