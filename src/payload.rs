//! Outbound wire structures for the Slack incoming-webhook API.

use serde::Serialize;

use crate::error::Result;

/// One display field in the notification body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
    /// Hint that the field is narrow enough to sit beside another.
    pub short: bool,
}

impl Field {
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }

    pub fn long(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }
}

/// The JSON document posted under the `payload` form key.
///
/// Built fresh for every notification; nothing here survives the call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SlackPayload {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub text: String,
    /// Plain-text summary for clients that cannot render attachments.
    pub fallback: String,
    pub title: String,
    /// `good` or `danger`, derived from the build status.
    pub color: String,
    pub fields: Vec<Field>,
}

impl SlackPayload {
    /// Serialize to the JSON body. Key order follows the struct, so
    /// identical payloads encode to byte-identical documents.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
