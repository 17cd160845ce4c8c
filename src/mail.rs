//! Composed mail and its builder.

use std::collections::BTreeMap;

use crate::models::TemplateContent;
use crate::{Error, Result};

/// A file carried by a [`Mail`], either as an attachment or as an inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Mandrill sending options that have no SMTP equivalent.
///
/// Every field is optional; unset fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MandrillOptions {
    pub important: Option<bool>,
    pub track_opens: Option<bool>,
    pub track_clicks: Option<bool>,
    pub auto_text: Option<bool>,
    pub auto_html: Option<bool>,
    pub inline_css: Option<bool>,
    pub url_strip_qs: Option<bool>,
    pub preserve_recipients: Option<bool>,
    pub view_content_link: Option<bool>,
    pub bcc_address: Option<String>,
    pub tracking_domain: Option<String>,
    pub signing_domain: Option<String>,
    pub return_path_domain: Option<String>,
    pub subaccount: Option<String>,
    pub tags: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    /// Per-recipient metadata as `(recipient, key, value)`.
    pub recipient_metadata: Vec<(String, String, String)>,
    pub google_analytics_domains: Vec<String>,
    pub google_analytics_campaign: Option<String>,
    pub merge: Option<bool>,
    pub merge_language: Option<String>,
    /// Global merge variables as `(name, content)`.
    pub global_merge_vars: Vec<(String, String)>,
    /// Per-recipient merge variables as `(recipient, name, content)`.
    pub merge_vars: Vec<(String, String, String)>,
}

/// An outgoing message as composed by the application.
///
/// Addresses are kept as written (`"Name <addr@example.com>"` or a bare address)
/// and only parsed when the message is translated for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub attachments: Vec<Part>,
    pub images: Vec<Part>,
    pub options: MandrillOptions,
    /// Slug of a stored template; switches delivery to a template send.
    pub template: Option<String>,
    pub template_content: Vec<TemplateContent>,
    /// Scheduled send time, forwarded to Mandrill as written.
    pub send_at: Option<String>,
    /// Dedicated IP pool for this message only.
    pub ip_pool: Option<String>,
}

impl Mail {
    /// Create a new mail builder.
    pub fn builder() -> MailBuilder {
        MailBuilder::default()
    }
}

/// Builder for [`Mail`].
#[derive(Debug, Default)]
pub struct MailBuilder {
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
    headers: BTreeMap<String, String>,
    attachments: Vec<Part>,
    images: Vec<Part>,
    options: MandrillOptions,
    template: Option<String>,
    template_content: Vec<TemplateContent>,
    send_at: Option<String>,
    ip_pool: Option<String>,
}

impl MailBuilder {
    /// Set the sender, e.g. `"Acme <noreply@acme.test>"`.
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Add a primary recipient.
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Add several primary recipients.
    pub fn to_many(mut self, addresses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.to.extend(addresses.into_iter().map(Into::into));
        self
    }

    /// Add a CC recipient.
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Set the Reply-To address.
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain text body.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Add an extra header. A later value for the same name replaces the earlier one.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a file.
    pub fn attachment(
        mut self,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.attachments.push(Part {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        });
        self
    }

    /// Add an inline image, referenced from the HTML body as `cid:<name>`.
    pub fn image(
        mut self,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.images.push(Part {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        });
        self
    }

    /// Mark the message as important.
    pub fn important(mut self, value: bool) -> Self {
        self.options.important = Some(value);
        self
    }

    /// Turn open tracking on or off.
    pub fn track_opens(mut self, value: bool) -> Self {
        self.options.track_opens = Some(value);
        self
    }

    /// Turn click tracking on or off.
    pub fn track_clicks(mut self, value: bool) -> Self {
        self.options.track_clicks = Some(value);
        self
    }

    /// Generate a text body from the HTML body.
    pub fn auto_text(mut self, value: bool) -> Self {
        self.options.auto_text = Some(value);
        self
    }

    /// Generate an HTML body from the text body.
    pub fn auto_html(mut self, value: bool) -> Self {
        self.options.auto_html = Some(value);
        self
    }

    /// Inline CSS styles into the HTML body.
    pub fn inline_css(mut self, value: bool) -> Self {
        self.options.inline_css = Some(value);
        self
    }

    /// Strip query strings from URLs when aggregating tracked clicks.
    pub fn url_strip_qs(mut self, value: bool) -> Self {
        self.options.url_strip_qs = Some(value);
        self
    }

    /// Show every `to` recipient in the headers.
    pub fn preserve_recipients(mut self, value: bool) -> Self {
        self.options.preserve_recipients = Some(value);
        self
    }

    /// Keep the "view content" link in the Mandrill dashboard.
    pub fn view_content_link(mut self, value: bool) -> Self {
        self.options.view_content_link = Some(value);
        self
    }

    /// Send a BCC copy of every message to this address.
    pub fn bcc_address(mut self, address: impl Into<String>) -> Self {
        self.options.bcc_address = Some(address.into());
        self
    }

    /// Use a custom domain for tracked links.
    pub fn tracking_domain(mut self, domain: impl Into<String>) -> Self {
        self.options.tracking_domain = Some(domain.into());
        self
    }

    /// Use a custom domain for DKIM signing.
    pub fn signing_domain(mut self, domain: impl Into<String>) -> Self {
        self.options.signing_domain = Some(domain.into());
        self
    }

    /// Use a custom domain for the return path.
    pub fn return_path_domain(mut self, domain: impl Into<String>) -> Self {
        self.options.return_path_domain = Some(domain.into());
        self
    }

    /// Send under a Mandrill subaccount.
    pub fn subaccount(mut self, id: impl Into<String>) -> Self {
        self.options.subaccount = Some(id.into());
        self
    }

    /// Add a tag for stats and filtering.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.options.tags.push(tag.into());
        self
    }

    /// Attach a metadata key to the message.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach a metadata key to one recipient.
    pub fn recipient_metadata(
        mut self,
        recipient: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.options
            .recipient_metadata
            .push((recipient.into(), key.into(), value.into()));
        self
    }

    /// Add a domain whose links get Google Analytics parameters.
    pub fn google_analytics_domain(mut self, domain: impl Into<String>) -> Self {
        self.options.google_analytics_domains.push(domain.into());
        self
    }

    /// Set the `utm_campaign` value added to tracked links.
    pub fn google_analytics_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.options.google_analytics_campaign = Some(campaign.into());
        self
    }

    /// Turn merge tag processing on or off.
    pub fn merge(mut self, value: bool) -> Self {
        self.options.merge = Some(value);
        self
    }

    /// `"mailchimp"` or `"handlebars"`.
    pub fn merge_language(mut self, language: impl Into<String>) -> Self {
        self.options.merge_language = Some(language.into());
        self
    }

    /// Set a merge variable for every recipient.
    pub fn global_merge_var(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.options
            .global_merge_vars
            .push((name.into(), content.into()));
        self
    }

    /// Set a merge variable for one recipient.
    pub fn merge_var(
        mut self,
        recipient: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.options
            .merge_vars
            .push((recipient.into(), name.into(), content.into()));
        self
    }

    /// Deliver through a stored template instead of the message body.
    pub fn template(mut self, slug: impl Into<String>) -> Self {
        self.template = Some(slug.into());
        self
    }

    /// Fill an editable region of the template.
    pub fn template_content(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.template_content.push(TemplateContent::new(name, content));
        self
    }

    /// Schedule the message, in Mandrill's `YYYY-MM-DD HH:MM:SS` UTC format.
    pub fn send_at(mut self, timestamp: impl Into<String>) -> Self {
        self.send_at = Some(timestamp.into());
        self
    }

    /// Send through a dedicated IP pool for this message only.
    pub fn ip_pool(mut self, pool: impl Into<String>) -> Self {
        self.ip_pool = Some(pool.into());
        self
    }

    /// Build the mail, requiring at least one recipient.
    pub fn build(self) -> Result<Mail> {
        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(Error::Build("at least one recipient required".into()));
        }

        Ok(Mail {
            from: self.from,
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            reply_to: self.reply_to,
            subject: self.subject,
            text: self.text,
            html: self.html,
            headers: self.headers,
            attachments: self.attachments,
            images: self.images,
            options: self.options,
            template: self.template,
            template_content: self.template_content,
            send_at: self.send_at,
            ip_pool: self.ip_pool,
        })
    }
}
