//! Trust metrics for an account and the report posted back.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::context::BotContext;
use crate::error::ApiError;
use crate::reply::{ReplyOutcome, ReplyPoster};
use crate::text::{error_preview, ERROR_PREVIEW_CHARS};
use crate::trusted::{TrustedFollowerChecker, TRUSTED_SAMPLE};
use crate::twitter::{RecentPost, UserProfile};

/// Heuristic metrics about one account.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustReport {
    /// Whole days since account creation.
    pub age_days: i64,
    /// Followers per followed account.
    pub follower_ratio: f64,
    /// Bio length in characters.
    pub bio_length: usize,
    /// Mean likes over the recent-post sample.
    pub avg_likes: f64,
    /// Trusted accounts following this one (0..=3).
    pub trusted_connections: u32,
}

impl TrustReport {
    /// Compute the report from fetched data.
    #[must_use]
    pub fn compute(
        profile: &UserProfile,
        recent_posts: &[RecentPost],
        trusted_connections: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            age_days: account_age_days(profile.created_at, now),
            follower_ratio: follower_ratio(profile.followers_count, profile.following_count),
            bio_length: profile
                .description
                .as_deref()
                .map_or(0, |bio| bio.chars().count()),
            avg_likes: average_likes(recent_posts),
            trusted_connections: trusted_connections.min(TRUSTED_SAMPLE as u32),
        }
    }

    /// Reply text for this report.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "🔍 Trust Report:\n\
             - Age: {} days\n\
             - Follower Ratio: {:.2}\n\
             - Bio Length: {} chars\n\
             - Avg Likes: {:.1}\n\
             - Trusted Connections: {}/{}",
            self.age_days,
            self.follower_ratio,
            self.bio_length,
            self.avg_likes,
            self.trusted_connections,
            TRUSTED_SAMPLE,
        )
    }
}

/// Whole days between `created_at` and `now`.
#[must_use]
pub fn account_age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_days()
}

/// Followers divided by following, with the denominator floored at 1.
#[must_use]
pub fn follower_ratio(followers: u64, following: u64) -> f64 {
    followers as f64 / following.max(1) as f64
}

/// Mean like count, 0 for an empty sample.
#[must_use]
pub fn average_likes(posts: &[RecentPost]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let total: u64 = posts.iter().map(|p| p.like_count).sum();
    total as f64 / posts.len() as f64
}

/// Result of analyzing an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// A report was rendered and handed to the reply poster.
    Reported(ReplyOutcome),
    /// No user ID or no user data; nothing posted.
    Abstained,
    /// Throttled; the cooldown has already been waited out.
    RateLimited,
    /// Any other failure; nothing posted.
    Failed,
}

/// Fetches account data, builds a [`TrustReport`] and replies with it.
pub struct UserAnalyzer<'a> {
    ctx: &'a BotContext,
}

impl<'a> UserAnalyzer<'a> {
    #[must_use]
    pub fn new(ctx: &'a BotContext) -> Self {
        Self { ctx }
    }

    /// Analyze `user_id` and reply to `trigger_tweet_id` with the report.
    pub async fn analyze(&self, user_id: &str, trigger_tweet_id: &str) -> AnalysisOutcome {
        if user_id.is_empty() {
            warn!(tweet_id = %trigger_tweet_id, "No user ID provided for analysis");
            return AnalysisOutcome::Abstained;
        }

        let profile = match self.ctx.api.get_user(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(user_id = %user_id, "No user data returned from API");
                return AnalysisOutcome::Abstained;
            }
            Err(e) => return self.fail(&e).await,
        };

        let recent_posts = self.recent_posts(user_id).await;
        let trusted = TrustedFollowerChecker::new(self.ctx).count(user_id).await;

        let report = TrustReport::compute(&profile, &recent_posts, trusted, self.ctx.clock.now());
        info!(
            user_id = %user_id,
            age_days = report.age_days,
            follower_ratio = report.follower_ratio,
            bio_length = report.bio_length,
            avg_likes = report.avg_likes,
            trusted = report.trusted_connections,
            "Built trust report"
        );

        let outcome = ReplyPoster::new(self.ctx)
            .post(&report.render(), trigger_tweet_id)
            .await;
        AnalysisOutcome::Reported(outcome)
    }

    /// Recent posts for the like average. Failures of this lookup are swallowed.
    async fn recent_posts(&self, user_id: &str) -> Vec<RecentPost> {
        match self
            .ctx
            .api
            .get_recent_tweets(user_id, self.ctx.config.recent_post_sample)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                debug!(
                    user_id = %user_id,
                    error = %error_preview(&e, ERROR_PREVIEW_CHARS),
                    "Recent posts unavailable, using 0 average likes"
                );
                Vec::new()
            }
        }
    }

    async fn fail(&self, e: &ApiError) -> AnalysisOutcome {
        if e.is_rate_limited() {
            let cooldown = self.ctx.config.cooldowns.rate_limit;
            warn!(
                cooldown_secs = cooldown.as_secs(),
                "Rate limited during user analysis"
            );
            self.ctx.clock.sleep(cooldown).await;
            AnalysisOutcome::RateLimited
        } else {
            error!(
                error = %error_preview(e, ERROR_PREVIEW_CHARS),
                "User analysis error"
            );
            AnalysisOutcome::Failed
        }
    }
}
