//! Trusted-account list and the trusted-follower check.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::context::BotContext;
use crate::error::{ApiResult, TrustedListError};
use crate::text::{error_preview, ERROR_PREVIEW_CHARS};

/// Trusted accounts consulted per check.
pub const TRUSTED_SAMPLE: usize = 3;

/// Entries fetched from each trusted account's following list (one page).
pub const FOLLOWING_PAGE_SIZE: u32 = 100;

/// Max chars of a per-account error in the log.
const ACCOUNT_ERROR_PREVIEW_CHARS: usize = 50;

/// Ordered account handles, one per non-blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedAccountList {
    handles: Vec<String>,
}

impl TrustedAccountList {
    /// Parse list content. Lines are trimmed and blank lines dropped; order is kept.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let handles = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { handles }
    }

    /// Read the list from disk.
    pub fn load(path: &Path) -> Result<Self, TrustedListError> {
        let content = std::fs::read_to_string(path).map_err(|source| TrustedListError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// The accounts a check consults: the first [`TRUSTED_SAMPLE`] in file order.
    #[must_use]
    pub fn sample(&self) -> &[String] {
        &self.handles[..self.handles.len().min(TRUSTED_SAMPLE)]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Counts how many trusted accounts follow a target account.
pub struct TrustedFollowerChecker<'a> {
    ctx: &'a BotContext,
}

impl<'a> TrustedFollowerChecker<'a> {
    #[must_use]
    pub fn new(ctx: &'a BotContext) -> Self {
        Self { ctx }
    }

    /// Number of sampled trusted accounts whose first following page contains
    /// `target_user_id`, in `0..=3`.
    ///
    /// The list file is read fresh on every call. A rate limit stops the remaining checks
    /// and returns the partial count; other per-account errors are skipped.
    pub async fn count(&self, target_user_id: &str) -> u32 {
        let list = match TrustedAccountList::load(&self.ctx.config.trusted_file) {
            Ok(list) => list,
            Err(e) => {
                error!(
                    error = %error_preview(&e, ERROR_PREVIEW_CHARS),
                    "Trusted followers check error"
                );
                return 0;
            }
        };

        if list.is_empty() {
            warn!(
                path = %self.ctx.config.trusted_file.display(),
                "No trusted accounts listed"
            );
            return 0;
        }

        let mut count: u32 = 0;
        for (i, handle) in list.sample().iter().enumerate() {
            if i > 0 {
                self.ctx
                    .clock
                    .sleep(self.ctx.config.cooldowns.trusted_pacing)
                    .await;
            }

            match self.follows(handle, target_user_id).await {
                Ok(true) => {
                    debug!(
                        account = %handle,
                        target_user_id = %target_user_id,
                        "Trusted account follows target"
                    );
                    count += 1;
                }
                Ok(false) => {}
                Err(e) if e.is_rate_limited() => {
                    warn!(
                        account = %handle,
                        checked = i,
                        "Rate limited during trusted follower check, stopping early"
                    );
                    break;
                }
                Err(e) => {
                    warn!(
                        account = %handle,
                        error = %error_preview(&e, ACCOUNT_ERROR_PREVIEW_CHARS),
                        "Error checking trusted account"
                    );
                }
            }
        }

        info!(target_user_id = %target_user_id, count, "Trusted follower check complete");
        count.min(TRUSTED_SAMPLE as u32)
    }

    async fn follows(&self, handle: &str, target_user_id: &str) -> ApiResult<bool> {
        let Some(account) = self.ctx.api.get_user_by_username(handle).await? else {
            debug!(account = %handle, "Trusted account not found");
            return Ok(false);
        };

        let following = self
            .ctx
            .api
            .get_following(&account.id, FOLLOWING_PAGE_SIZE)
            .await?;
        Ok(following.iter().any(|u| u.id == target_user_id))
    }
}
