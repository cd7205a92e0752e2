//! Resolving the original author behind a trigger reply.

use tracing::{error, info, warn};

use crate::analyzer::{AnalysisOutcome, UserAnalyzer};
use crate::context::BotContext;
use crate::text::{error_preview, ERROR_PREVIEW_CHARS};
use crate::twitter::{ExpandedTweet, TriggerPost};

/// A way of finding the original author. Tried in [`RESOLUTION_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// First referenced post that carries an author ID.
    ReferencedPost,
    /// The trigger's own in-reply-to author.
    InReplyToUser,
}

/// Strategies in priority order; the first non-empty answer wins.
pub const RESOLUTION_ORDER: [ResolutionStrategy; 2] = [
    ResolutionStrategy::ReferencedPost,
    ResolutionStrategy::InReplyToUser,
];

impl ResolutionStrategy {
    /// Author ID this strategy finds, if any.
    #[must_use]
    pub fn resolve(
        self,
        trigger: &TriggerPost,
        expanded: Option<&ExpandedTweet>,
    ) -> Option<String> {
        let author = match self {
            Self::ReferencedPost => expanded?
                .referenced
                .iter()
                .find_map(|post| post.author_id.clone()),
            Self::InReplyToUser => trigger
                .in_reply_to_user_id
                .clone()
                .or_else(|| expanded?.in_reply_to_user_id.clone()),
        };
        author.filter(|id| !id.is_empty())
    }
}

/// Run the strategies in order and return the first author found.
#[must_use]
pub fn resolve_author(trigger: &TriggerPost, expanded: Option<&ExpandedTweet>) -> Option<String> {
    RESOLUTION_ORDER
        .iter()
        .find_map(|strategy| strategy.resolve(trigger, expanded))
}

/// Result of processing one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Author resolved and handed to the analyzer.
    Analyzed {
        author_id: String,
        analysis: AnalysisOutcome,
    },
    /// No strategy found an author.
    Unresolved,
    /// Throttled; the cooldown has already been waited out.
    RateLimited,
    /// Any other failure.
    Failed,
}

/// Turns a trigger post into an analysis of the account it talks about.
pub struct TriggerProcessor<'a> {
    ctx: &'a BotContext,
}

impl<'a> TriggerProcessor<'a> {
    #[must_use]
    pub fn new(ctx: &'a BotContext) -> Self {
        Self { ctx }
    }

    /// Resolve the original author of `trigger` and analyze them.
    pub async fn process(&self, trigger: &TriggerPost) -> TriggerOutcome {
        info!(tweet_id = %trigger.id, "Trigger detected");

        let expanded = match self.ctx.api.get_tweet_with_references(&trigger.id).await {
            Ok(expanded) => expanded,
            Err(e) if e.is_rate_limited() => {
                let cooldown = self.ctx.config.cooldowns.rate_limit;
                warn!(
                    tweet_id = %trigger.id,
                    cooldown_secs = cooldown.as_secs(),
                    "Rate limited processing trigger"
                );
                self.ctx.clock.sleep(cooldown).await;
                return TriggerOutcome::RateLimited;
            }
            Err(e) => {
                error!(
                    tweet_id = %trigger.id,
                    error = %error_preview(&e, ERROR_PREVIEW_CHARS),
                    "Trigger processing error"
                );
                return TriggerOutcome::Failed;
            }
        };

        let Some(author_id) = resolve_author(trigger, expanded.as_ref()) else {
            warn!(tweet_id = %trigger.id, "Could not determine original author");
            return TriggerOutcome::Unresolved;
        };

        info!(tweet_id = %trigger.id, author_id = %author_id, "Original author resolved");
        let analysis = UserAnalyzer::new(self.ctx)
            .analyze(&author_id, &trigger.id)
            .await;

        TriggerOutcome::Analyzed {
            author_id,
            analysis,
        }
    }
}
