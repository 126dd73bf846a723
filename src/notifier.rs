//! The notifier itself: assembles the field list and payload for one
//! completed build and performs a single webhook POST.

use tracing::{debug, error, info};

use crate::NotifyOptions;
use crate::build::{BuildHost, BuildResult};
use crate::error::{NotifyError, Result};
use crate::log_parse::{self, STEP_MARKER};
use crate::payload::{Field, SlackPayload};

/// Steps whose log sections are self-referential or pure noise.
const SKIPPED_STEPS: [&str; 2] = ["slack_notify", "php_loc"];

/// Steps listed in the summary but whose output is too long to show.
const SILENCED_STEPS: [&str; 1] = ["composer"];

/// Outcome of one notification attempt.
///
/// Delivery problems never fail the caller; the host inspects this
/// value and decides whether a lost notification matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(String),
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Posts build summaries to a Slack incoming webhook.
///
/// Read-only after construction; every `notify` call assembles its own
/// payload and shares nothing with previous calls.
pub struct SlackNotifier {
    options: NotifyOptions,
    http: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(options: NotifyOptions) -> Self {
        Self {
            options,
            http: reqwest::Client::new(),
        }
    }

    /// Construct from the host's per-project options mapping.
    /// Fails immediately if the mapping is unusable (see
    /// [`NotifyOptions::from_table`]).
    pub fn from_table(table: toml::Table) -> Result<Self> {
        Ok(Self::new(NotifyOptions::from_table(table)?))
    }

    pub fn options(&self) -> &NotifyOptions {
        &self.options
    }

    /// Send one notification for a completed build.
    ///
    /// A single attempt, no retry. On failure the transport error text
    /// is appended to the host's build log and returned inside
    /// [`Delivery::Failed`]; it is never raised.
    pub async fn notify(&self, build: &BuildResult, host: &dyn BuildHost) -> Delivery {
        let message = host.interpolate(self.options.template());
        let payload = self.build_payload(build, &message);

        match self.send(&payload).await {
            Ok(()) => {
                info!(webhook = %self.options.webhook, "build notification delivered");
                Delivery::Delivered
            }
            Err(e) => {
                let reason = e.to_string();
                error!(
                    webhook = %self.options.webhook,
                    error = %reason,
                    "build notification delivery failed"
                );
                host.log(&reason);
                Delivery::Failed(reason)
            }
        }
    }

    /// Assemble the wire payload for a build. Split out from [`notify`]
    /// so encoding can be exercised without a network.
    ///
    /// The interpolated summary becomes the attachment title and the
    /// fallback text; `text` stays empty.
    ///
    /// [`notify`]: SlackNotifier::notify
    pub fn build_payload(&self, build: &BuildResult, message: &str) -> SlackPayload {
        SlackPayload {
            username: self.options.display_username().to_string(),
            icon_emoji: self.options.icon.clone(),
            channel: self.options.channel.clone(),
            text: String::new(),
            fallback: message.to_string(),
            title: message.to_string(),
            color: build.status.color().to_string(),
            fields: self.build_fields(build),
        }
    }

    fn build_fields(&self, build: &BuildResult) -> Vec<Field> {
        let mut fields = vec![Field::short("Status", build.status.label())];

        if self.options.truncate_on_non_default_branch && !build.is_on_default_branch() {
            fields.push(Field::long(
                "Build output",
                format!(
                    "Detailed output skipped for branch '{}' (not the default branch)",
                    build.branch
                ),
            ));
            return fields;
        }

        for step in log_parse::parse_steps(&build.log) {
            if SKIPPED_STEPS.contains(&step.name.as_str()) {
                continue;
            }
            let value = if SILENCED_STEPS.contains(&step.name.as_str()) {
                String::new()
            } else {
                step.output
            };
            fields.push(Field::long(format!("{STEP_MARKER}{}", step.name), value));
        }

        fields
    }

    async fn send(&self, payload: &SlackPayload) -> Result<()> {
        let body = payload.to_json()?;
        debug!(bytes = body.len(), "posting webhook payload");

        let response = self
            .http
            .post(&self.options.webhook)
            .form(&[("payload", body.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Delivery(format!(
                "webhook returned HTTP {status}: {body}"
            )));
        }

        Ok(())
    }
}
