//! Polling loop: search for trigger replies, skip duplicates, dispatch the rest.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::context::BotContext;
use crate::text::{error_preview, ERROR_PREVIEW_CHARS};
use crate::trigger::TriggerProcessor;

/// Tweet IDs already handled in this run.
///
/// In memory only; it grows for the life of the process and starts empty on restart.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    ids: HashSet<String>,
}

impl ProcessedSet {
    /// Check if a tweet ID has been processed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Mark a tweet ID as processed. Returns `false` if it already was.
    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Result of one search-and-dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Search succeeded.
    Completed {
        /// Matches returned by the search.
        found: usize,
        /// New triggers handed to the processor.
        dispatched: usize,
        /// Matches skipped as already processed.
        skipped: usize,
    },
    /// Search was throttled; the search cooldown has been waited out.
    RateLimited,
    /// Search failed; the error cooldown has been waited out.
    Failed,
}

/// The bot's main loop. Owns the processed set and borrows the shared context.
pub struct MonitorLoop {
    ctx: BotContext,
    processed: ProcessedSet,
}

impl MonitorLoop {
    #[must_use]
    pub fn new(ctx: BotContext) -> Self {
        Self {
            ctx,
            processed: ProcessedSet::default(),
        }
    }

    #[must_use]
    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// Run forever. Errors only ever lead to cooldowns; stop the process to exit.
    pub async fn run(&mut self) {
        info!(query = %self.ctx.config.query, "RUGGUARD bot is listening for triggers");
        loop {
            self.step().await;
        }
    }

    /// One idle-search-dispatch round: wait the poll interval, then run a cycle.
    pub async fn step(&mut self) -> CycleOutcome {
        self.ctx
            .clock
            .sleep(self.ctx.config.cooldowns.poll_interval)
            .await;
        self.run_cycle().await
    }

    /// Search once and dispatch every new match, paced, in search order.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        info!("Checking for new replies");
        let cooldowns = &self.ctx.config.cooldowns;

        let replies = match self
            .ctx
            .api
            .search_recent(&self.ctx.config.query, self.ctx.config.search_page_size)
            .await
        {
            Ok(replies) => replies,
            Err(e) if e.is_rate_limited() => {
                warn!(
                    cooldown_secs = cooldowns.search_rate_limit.as_secs(),
                    "Rate limited on search"
                );
                self.ctx.clock.sleep(cooldowns.search_rate_limit).await;
                return CycleOutcome::RateLimited;
            }
            Err(e) => {
                error!(
                    error = %error_preview(&e, ERROR_PREVIEW_CHARS),
                    cooldown_secs = cooldowns.search_error.as_secs(),
                    "Monitoring error"
                );
                self.ctx.clock.sleep(cooldowns.search_error).await;
                return CycleOutcome::Failed;
            }
        };

        if replies.is_empty() {
            info!("No new trigger replies found");
            return CycleOutcome::Completed {
                found: 0,
                dispatched: 0,
                skipped: 0,
            };
        }

        info!(count = replies.len(), "Found relevant replies");
        let processor = TriggerProcessor::new(&self.ctx);
        let mut dispatched = 0;
        let mut skipped = 0;

        for reply in &replies {
            if !self.processed.insert(&reply.id) {
                info!(tweet_id = %reply.id, "Skipping already processed tweet");
                skipped += 1;
                continue;
            }

            let outcome = processor.process(reply).await;
            info!(tweet_id = %reply.id, outcome = ?outcome, "Trigger handled");
            dispatched += 1;
            self.ctx.clock.sleep(cooldowns.dispatch_pacing).await;
        }

        info!(
            found = replies.len(),
            dispatched,
            skipped,
            processed_total = self.processed.len(),
            "Poll cycle complete"
        );

        CycleOutcome::Completed {
            found: replies.len(),
            dispatched,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::{BotConfig, DEFAULT_QUERY};
    use crate::testing::{context, expanded, profile, Call, FakeClock, FakeTwitter, Scripted};
    use crate::twitter::TriggerPost;

    fn monitor(api: &Arc<FakeTwitter>, clock: &Arc<FakeClock>) -> MonitorLoop {
        let config = BotConfig {
            trusted_file: "/nonexistent/trusted.txt".into(),
            ..BotConfig::default()
        };
        MonitorLoop::new(context(api, clock, config))
    }

    fn tweet_lookups(api: &FakeTwitter) -> Vec<String> {
        api.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Tweet(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_processed_set() {
        let mut set = ProcessedSet::default();
        assert!(set.is_empty());
        assert!(set.insert("1"));
        assert!(!set.insert("1"));
        assert!(set.contains("1"));
        assert!(!set.contains("2"));
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_search_sleeps_without_dispatch() {
        let api = Arc::new(FakeTwitter::new());
        let clock = Arc::new(FakeClock::default());
        let mut bot = monitor(&api, &clock);

        let outcome = bot.step().await;

        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                found: 0,
                dispatched: 0,
                skipped: 0
            }
        );
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(300)]);
        assert_eq!(api.calls(), vec![Call::Search(DEFAULT_QUERY.to_string())]);
    }

    #[tokio::test]
    async fn test_dispatches_in_search_order_with_pacing() {
        let api = Arc::new(FakeTwitter::new());
        api.push_search(Scripted::Ok(vec![
            TriggerPost::new("2"),
            TriggerPost::new("1"),
            TriggerPost::new("3"),
        ]));
        let clock = Arc::new(FakeClock::default());
        let mut bot = monitor(&api, &clock);

        let outcome = bot.run_cycle().await;

        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                found: 3,
                dispatched: 3,
                skipped: 0
            }
        );
        assert_eq!(tweet_lookups(&api), ["2", "1", "3"]);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(60); 3]);
    }

    #[tokio::test]
    async fn test_processed_ids_never_dispatched_again() {
        let api = Arc::new(FakeTwitter::new());
        api.push_search(Scripted::Ok(vec![TriggerPost::new("1"), TriggerPost::new("1")]));
        api.push_search(Scripted::Ok(vec![TriggerPost::new("1"), TriggerPost::new("2")]));
        let clock = Arc::new(FakeClock::default());
        let mut bot = monitor(&api, &clock);

        let first = bot.run_cycle().await;
        let second = bot.run_cycle().await;

        assert_eq!(
            first,
            CycleOutcome::Completed {
                found: 2,
                dispatched: 1,
                skipped: 1
            }
        );
        assert_eq!(
            second,
            CycleOutcome::Completed {
                found: 2,
                dispatched: 1,
                skipped: 1
            }
        );
        assert_eq!(tweet_lookups(&api), ["1", "2"]);
        assert!(bot.processed().contains("1"));
        assert!(bot.processed().contains("2"));
    }

    #[tokio::test]
    async fn test_search_rate_limit_cools_down_fifteen_minutes() {
        let api = Arc::new(FakeTwitter::new());
        api.push_search(Scripted::RateLimited);
        let clock = Arc::new(FakeClock::default());
        let mut bot = monitor(&api, &clock);

        assert_eq!(bot.step().await, CycleOutcome::RateLimited);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(300), Duration::from_secs(900)]
        );
    }

    #[tokio::test]
    async fn test_search_error_cools_down_one_minute_and_continues() {
        let api = Arc::new(FakeTwitter::new());
        api.push_search(Scripted::Fail("connection reset".to_string()));
        api.push_search(Scripted::Ok(vec![TriggerPost::new("1")]));
        let clock = Arc::new(FakeClock::default());
        let mut bot = monitor(&api, &clock);

        assert_eq!(bot.run_cycle().await, CycleOutcome::Failed);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(60)]);

        assert!(matches!(
            bot.run_cycle().await,
            CycleOutcome::Completed { dispatched: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_full_flow_posts_trust_report() {
        let api = Arc::new(FakeTwitter::new());
        api.push_search(Scripted::Ok(vec![TriggerPost::new("100").with_in_reply_to("9")]));
        api.set_tweet("100", Scripted::Ok(Some(expanded(&[Some("42")], Some("9")))));
        api.set_profile("42", Scripted::Ok(Some(profile("42", 10, 50, 10))));
        let clock = Arc::new(FakeClock::default());
        let mut bot = monitor(&api, &clock);

        bot.run_cycle().await;

        let replies = api.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1, "100");
        assert!(replies[0].0.contains("Follower Ratio: 5.00"));
        assert!(replies[0].0.contains("Trusted Connections: 0/3"));
    }
}
