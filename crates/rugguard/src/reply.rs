//! Posting replies.

use tracing::{error, info, warn};

use crate::context::BotContext;
use crate::text::{error_preview, truncate_chars, ERROR_PREVIEW_CHARS};

/// Result of a reply attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Reply created with this tweet ID.
    Posted(String),
    /// Throttled; the cooldown has already been waited out.
    RateLimited,
    /// Any other failure.
    Failed,
}

impl ReplyOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Posted(_))
    }
}

/// Submits reply text under a trigger post.
pub struct ReplyPoster<'a> {
    ctx: &'a BotContext,
}

impl<'a> ReplyPoster<'a> {
    #[must_use]
    pub fn new(ctx: &'a BotContext) -> Self {
        Self { ctx }
    }

    /// Post `text`, truncated to the platform limit, as a reply to `trigger_tweet_id`.
    ///
    /// A rate limit waits out the cooldown and reports failure; the reply is not retried.
    pub async fn post(&self, text: &str, trigger_tweet_id: &str) -> ReplyOutcome {
        let text = truncate_chars(text, self.ctx.config.max_reply_length);

        match self.ctx.api.create_reply(text, trigger_tweet_id).await {
            Ok(reply_id) => {
                info!(tweet_id = %trigger_tweet_id, reply_id = %reply_id, "Replied to trigger");
                ReplyOutcome::Posted(reply_id)
            }
            Err(e) if e.is_rate_limited() => {
                let cooldown = self.ctx.config.cooldowns.rate_limit;
                warn!(
                    tweet_id = %trigger_tweet_id,
                    cooldown_secs = cooldown.as_secs(),
                    "Rate limited when trying to reply"
                );
                self.ctx.clock.sleep(cooldown).await;
                ReplyOutcome::RateLimited
            }
            Err(e) => {
                error!(
                    tweet_id = %trigger_tweet_id,
                    error = %error_preview(&e, ERROR_PREVIEW_CHARS),
                    "Reply error"
                );
                ReplyOutcome::Failed
            }
        }
    }
}
