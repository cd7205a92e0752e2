//! Twitter/X API access.
//!
//! Provides the API trait the bot is written against and its HTTP implementation.

mod api;
mod client;
mod models;
mod oauth;
mod types;

pub use api::TwitterApi;
pub use client::{HttpTwitterClient, API_BASE_URL};
pub use oauth::OAuthSigner;
pub use types::{ExpandedTweet, RecentPost, ReferencedPost, TriggerPost, UserProfile, UserRef};
