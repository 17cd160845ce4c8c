//! Wire types for the Mandrill messages API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named block of content injected into a template's editable region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContent {
    pub name: String,
    pub content: String,
}

impl TemplateContent {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// How a recipient appears on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    To,
    Cc,
    Bcc,
}

/// A single entry of the Mandrill `to` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecipientType,
}

/// A merge variable, used for both global and per-recipient merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeVar {
    pub name: String,
    pub content: String,
}

/// Merge variables scoped to one recipient address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientMergeVars {
    pub rcpt: String,
    pub vars: Vec<MergeVar>,
}

/// Metadata scoped to one recipient address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientMetadata {
    pub rcpt: String,
    pub values: BTreeMap<String, String>,
}

/// An attachment or inline image, with base64-encoded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedFile {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
    pub content: String,
}

/// The `message` object accepted by `messages/send` and `messages/send-template`.
///
/// Unset options are omitted from the JSON so Mandrill applies the account defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct MandrillMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    pub to: Vec<Recipient>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_html: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_strip_qs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_recipients: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_content_link: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global_merge_vars: Vec<MergeVar>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merge_vars: Vec<RecipientMergeVars>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipient_metadata: Vec<RecipientMetadata>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub google_analytics_domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics_campaign: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EncodedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<EncodedFile>,
}

/// Error object Mandrill returns alongside a non-2xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub status: String,
    #[serde(default)]
    pub code: i64,
    pub name: String,
    pub message: String,
}
