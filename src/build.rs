//! Build-result data handed over by the CI host, and the seam through
//! which the notifier talks back to it.

use serde::{Deserialize, Serialize};

/// Terminal status of a completed build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Success,
    Failed,
}

impl BuildStatus {
    /// Human-readable label shown in the Status field.
    pub fn label(&self) -> &'static str {
        match self {
            BuildStatus::Success => "Success",
            BuildStatus::Failed => "Failed",
        }
    }

    /// Slack attachment color for this status.
    pub fn color(&self) -> &'static str {
        match self {
            BuildStatus::Success => "good",
            BuildStatus::Failed => "danger",
        }
    }
}

/// Outcome of one completed build, read-only from the notifier's side.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub status: BuildStatus,
    /// Raw captured build log, ANSI sequences and all.
    pub log: String,
    /// Branch the build ran on.
    pub branch: String,
    /// The project's configured default branch.
    pub default_branch: String,
}

impl BuildResult {
    pub fn new(
        status: BuildStatus,
        log: impl Into<String>,
        branch: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        Self {
            status,
            log: log.into(),
            branch: branch.into(),
            default_branch: default_branch.into(),
        }
    }

    pub fn is_on_default_branch(&self) -> bool {
        self.branch == self.default_branch
    }
}

/// Services the CI host provides to the notifier.
///
/// The host owns template interpolation (project, build, commit and
/// branch metadata) and the build log sink; the notifier treats the
/// interpolated string as opaque.
pub trait BuildHost {
    /// Substitute placeholder tokens in `template` with build metadata.
    fn interpolate(&self, template: &str) -> String;

    /// Append a line to the build's log output.
    fn log(&self, message: &str);
}
