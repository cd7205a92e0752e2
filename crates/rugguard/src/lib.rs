//! Twitter/X reply monitor that posts trust reports.
//!
//! This crate provides:
//! - A polling loop that searches for trigger replies and skips ones already handled
//! - Original-author resolution over an ordered list of strategies
//! - Trust metrics (account age, follower ratio, bio length, average likes,
//!   trusted connections) rendered into a reply
//! - A Twitter API v2 client with rate-limit awareness and OAuth 1.0a posting
//!
//! Everything runs on one task. Rate limits are answered with fixed cooldowns that go
//! through [`clock::Clock`], so no component ever returns an error to its caller.

pub mod analyzer;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod monitor;
pub mod reply;
pub mod text;
pub mod trigger;
pub mod trusted;
pub mod twitter;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use analyzer::{AnalysisOutcome, TrustReport, UserAnalyzer};
pub use clock::{Clock, SystemClock};
pub use config::{BotConfig, Cooldowns, Credentials};
pub use context::BotContext;
pub use error::{ApiError, ApiResult, TrustedListError};
pub use monitor::{CycleOutcome, MonitorLoop, ProcessedSet};
pub use reply::{ReplyOutcome, ReplyPoster};
pub use trigger::{ResolutionStrategy, TriggerOutcome, TriggerProcessor};
pub use trusted::{TrustedAccountList, TrustedFollowerChecker};
pub use twitter::{HttpTwitterClient, TriggerPost, TwitterApi};
