//! Shared state handed to every component.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::BotConfig;
use crate::twitter::TwitterApi;

/// API client, clock and configuration for one bot process.
///
/// Created at startup and lives for the whole run. Components borrow it.
#[derive(Clone)]
pub struct BotContext {
    pub api: Arc<dyn TwitterApi>,
    pub clock: Arc<dyn Clock>,
    pub config: BotConfig,
}

impl BotContext {
    #[must_use]
    pub fn new(api: Arc<dyn TwitterApi>, clock: Arc<dyn Clock>, config: BotConfig) -> Self {
        Self { api, clock, config }
    }
}
