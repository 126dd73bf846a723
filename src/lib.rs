//! Slack build-result notifier for a CI host.
//!
//! After a build completes, the host hands this crate the build outcome,
//! the raw build log, and a per-project options mapping. The notifier
//! formats a summary (status, per-step log sections) and posts it to a
//! Slack incoming-webhook URL. Delivery is best-effort: a single POST,
//! no retry, and failures never abort the host's pipeline.

pub mod build;
pub mod error;
pub mod log_parse;
pub mod notifier;
pub mod payload;

use serde::Deserialize;

use crate::error::{NotifyError, Result};

/// Display name used when the options mapping carries no `username`.
pub const DEFAULT_USERNAME: &str = "CI";

/// Summary template used when the options mapping carries no `message`.
/// Placeholder tokens are substituted by the host, not by this crate.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "<%PROJECT_URI%|%PROJECT_TITLE%> - \
    <%BUILD_URI%|Build #%BUILD%> has finished \
    for commit <%COMMIT_URI%|%SHORT_COMMIT% (%COMMIT_EMAIL%)> \
    on branch <%BRANCH_URI%|%BRANCH%>";

/// Per-project notifier options, read from the host's TOML configuration.
/// Immutable once constructed.
#[derive(Debug, Deserialize, Clone)]
pub struct NotifyOptions {
    /// Target webhook URL. Required; surrounding whitespace is trimmed.
    pub webhook: String,
    /// Summary template with host placeholder tokens.
    pub message: Option<String>,
    /// Display username shown next to the notification.
    pub username: Option<String>,
    /// Icon emoji identifier. Absent means no icon is sent.
    pub icon: Option<String>,
    /// Channel override. Absent means the webhook's default channel.
    pub channel: Option<String>,
    /// When set, builds on a branch other than the project's default
    /// branch get a single skip-notice field instead of per-step output.
    #[serde(default)]
    pub truncate_on_non_default_branch: bool,
}

impl NotifyOptions {
    /// Build options from the host's per-project mapping.
    /// A missing or empty `webhook` is a fatal configuration error.
    pub fn from_table(table: toml::Table) -> Result<Self> {
        if !table.contains_key("webhook") {
            return Err(NotifyError::Config(
                "missing required 'webhook' option for the slack notifier".to_string(),
            ));
        }

        let mut options: NotifyOptions = table.try_into()?;
        options.webhook = options.webhook.trim().to_string();
        if options.webhook.is_empty() {
            return Err(NotifyError::Config(
                "'webhook' option must not be empty".to_string(),
            ));
        }

        Ok(options)
    }

    /// Returns the configured display username, or the default.
    pub fn display_username(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }

    /// Returns the configured message template, or the default.
    pub fn template(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_MESSAGE_TEMPLATE)
    }
}
