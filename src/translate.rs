//! Translation of composed mail into Mandrill requests.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde_json::Value;

use crate::mail::{Mail, Part};
use crate::models::{
    EncodedFile, MandrillMessage, MergeVar, Recipient, RecipientMergeVars, RecipientMetadata,
    RecipientType, TemplateContent,
};
use crate::{Error, Result};

/// A composed message in the shape the gateway expects.
///
/// Built fresh for every delivery and dropped once the gateway call returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatedMessage {
    /// The Mandrill `message` object.
    pub payload: Value,
    /// Template slug; `None` or empty means a plain send.
    pub template: Option<String>,
    pub template_content: Vec<TemplateContent>,
    pub send_at: Option<String>,
    /// Overrides the configured IP pool for this message.
    pub ip_pool: Option<String>,
}

impl TranslatedMessage {
    /// The template slug, if the message should go through `send-template`.
    pub fn template_slug(&self) -> Option<&str> {
        self.template.as_deref().filter(|slug| !slug.is_empty())
    }
}

/// Converts a composed message of type `M` into a [`TranslatedMessage`].
pub trait MessageTranslator<M: ?Sized> {
    fn translate(&self, message: &M) -> Result<TranslatedMessage>;
}

impl<M, F> MessageTranslator<M> for F
where
    M: ?Sized,
    F: Fn(&M) -> Result<TranslatedMessage>,
{
    fn translate(&self, message: &M) -> Result<TranslatedMessage> {
        self(message)
    }
}

/// Translator for the crate's own [`Mail`] type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandrillTranslator;

impl MessageTranslator<Mail> for MandrillTranslator {
    fn translate(&self, mail: &Mail) -> Result<TranslatedMessage> {
        let (from_email, from_name) = match &mail.from {
            Some(from) => {
                let (email, name) = parse_address(from)?;
                (Some(email), name)
            }
            None => (None, None),
        };

        let mut to = Vec::with_capacity(mail.to.len() + mail.cc.len() + mail.bcc.len());
        for (addresses, kind) in [
            (&mail.to, RecipientType::To),
            (&mail.cc, RecipientType::Cc),
            (&mail.bcc, RecipientType::Bcc),
        ] {
            for address in addresses {
                let (email, name) = parse_address(address)?;
                to.push(Recipient { email, name, kind });
            }
        }

        let mut headers = mail.headers.clone();
        if let Some(reply_to) = &mail.reply_to {
            headers.insert("Reply-To".to_string(), reply_to.clone());
        }

        let options = &mail.options;
        let message = MandrillMessage {
            html: mail.html.clone(),
            text: mail.text.clone(),
            subject: mail.subject.clone(),
            from_email,
            from_name,
            to,
            headers,
            important: options.important,
            track_opens: options.track_opens,
            track_clicks: options.track_clicks,
            auto_text: options.auto_text,
            auto_html: options.auto_html,
            inline_css: options.inline_css,
            url_strip_qs: options.url_strip_qs,
            preserve_recipients: options.preserve_recipients,
            view_content_link: options.view_content_link,
            bcc_address: options.bcc_address.clone(),
            tracking_domain: options.tracking_domain.clone(),
            signing_domain: options.signing_domain.clone(),
            return_path_domain: options.return_path_domain.clone(),
            merge: options.merge,
            merge_language: options.merge_language.clone(),
            global_merge_vars: options
                .global_merge_vars
                .iter()
                .map(|(name, content)| MergeVar {
                    name: name.clone(),
                    content: content.clone(),
                })
                .collect(),
            merge_vars: group_merge_vars(&options.merge_vars),
            tags: options.tags.clone(),
            subaccount: options.subaccount.clone(),
            metadata: options.metadata.clone(),
            recipient_metadata: group_recipient_metadata(&options.recipient_metadata),
            google_analytics_domains: options.google_analytics_domains.clone(),
            google_analytics_campaign: options.google_analytics_campaign.clone(),
            attachments: mail.attachments.iter().map(encode_part).collect(),
            images: mail.images.iter().map(encode_part).collect(),
        };

        Ok(TranslatedMessage {
            payload: serde_json::to_value(&message)?,
            template: mail.template.clone(),
            template_content: mail.template_content.clone(),
            send_at: mail.send_at.clone(),
            ip_pool: mail.ip_pool.clone(),
        })
    }
}

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:"?([^"<]*?)"?\s*<([^<>\s@]+@[^<>\s@]+)>|([^<>\s@]+@[^<>\s@]+))\s*$"#)
        .expect("address pattern is valid")
});

/// Split `"Name <addr>"` or a bare `addr` into the address and optional display name.
fn parse_address(input: &str) -> Result<(String, Option<String>)> {
    let captures = ADDRESS_RE
        .captures(input)
        .ok_or_else(|| Error::InvalidAddress(input.to_string()))?;

    if let Some(bare) = captures.get(3) {
        return Ok((bare.as_str().to_string(), None));
    }

    let email = captures
        .get(2)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::InvalidAddress(input.to_string()))?;
    let name = captures
        .get(1)
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok((email, name))
}

/// Group `(recipient, name, content)` triples by recipient, keeping first-seen order.
fn group_merge_vars(vars: &[(String, String, String)]) -> Vec<RecipientMergeVars> {
    let mut grouped: Vec<RecipientMergeVars> = Vec::new();
    for (rcpt, name, content) in vars {
        let var = MergeVar {
            name: name.clone(),
            content: content.clone(),
        };
        match grouped.iter_mut().find(|entry| &entry.rcpt == rcpt) {
            Some(entry) => entry.vars.push(var),
            None => grouped.push(RecipientMergeVars {
                rcpt: rcpt.clone(),
                vars: vec![var],
            }),
        }
    }
    grouped
}

/// Group `(recipient, key, value)` triples by recipient, keeping first-seen order.
fn group_recipient_metadata(entries: &[(String, String, String)]) -> Vec<RecipientMetadata> {
    let mut grouped: Vec<RecipientMetadata> = Vec::new();
    for (rcpt, key, value) in entries {
        match grouped.iter_mut().find(|entry| &entry.rcpt == rcpt) {
            Some(entry) => {
                entry.values.insert(key.clone(), value.clone());
            }
            None => grouped.push(RecipientMetadata {
                rcpt: rcpt.clone(),
                values: [(key.clone(), value.clone())].into_iter().collect(),
            }),
        }
    }
    grouped
}

fn encode_part(part: &Part) -> EncodedFile {
    EncodedFile {
        mime_type: part.mime_type.clone(),
        name: part.name.clone(),
        content: STANDARD.encode(&part.data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_address_with_display_name() {
        let (email, name) = parse_address("\"Jane Doe\" <jane@example.com>").unwrap();
        assert_eq!(email, "jane@example.com");
        assert_eq!(name.as_deref(), Some("Jane Doe"));

        let (email, name) = parse_address("Acme <noreply@acme.test>").unwrap();
        assert_eq!(email, "noreply@acme.test");
        assert_eq!(name.as_deref(), Some("Acme"));
    }

    #[test]
    fn parse_bare_address() {
        let (email, name) = parse_address("  jane@example.com ").unwrap();
        assert_eq!(email, "jane@example.com");
        assert_eq!(name, None);

        let (email, name) = parse_address("<jane@example.com>").unwrap();
        assert_eq!(email, "jane@example.com");
        assert_eq!(name, None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_address("not an address"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn translate_plain_message() {
        let mail = Mail::builder()
            .from("Acme <noreply@acme.test>")
            .to("Jane <jane@example.com>")
            .cc("bob@example.com")
            .bcc("audit@acme.test")
            .reply_to("support@acme.test")
            .subject("Hello")
            .text("Plain")
            .html("<p>Rich</p>")
            .tag("welcome")
            .track_opens(true)
            .build()
            .unwrap();

        let translated = MandrillTranslator.translate(&mail).unwrap();

        assert_eq!(translated.template_slug(), None);
        assert_eq!(translated.send_at, None);
        assert_eq!(translated.ip_pool, None);
        assert_eq!(
            translated.payload,
            json!({
                "html": "<p>Rich</p>",
                "text": "Plain",
                "subject": "Hello",
                "from_email": "noreply@acme.test",
                "from_name": "Acme",
                "to": [
                    {"email": "jane@example.com", "name": "Jane", "type": "to"},
                    {"email": "bob@example.com", "type": "cc"},
                    {"email": "audit@acme.test", "type": "bcc"}
                ],
                "headers": {"Reply-To": "support@acme.test"},
                "track_opens": true,
                "tags": ["welcome"]
            })
        );
    }

    #[test]
    fn translate_lifts_dispatch_fields_out_of_payload() {
        let mail = Mail::builder()
            .to("jane@example.com")
            .template("some-template-slug")
            .template_content("body", "<some>html</some>")
            .send_at("2016-08-08 18:36:25")
            .ip_pool("Transactional")
            .build()
            .unwrap();

        let translated = MandrillTranslator.translate(&mail).unwrap();

        assert_eq!(translated.template_slug(), Some("some-template-slug"));
        assert_eq!(
            translated.template_content,
            vec![TemplateContent::new("body", "<some>html</some>")]
        );
        assert_eq!(translated.send_at.as_deref(), Some("2016-08-08 18:36:25"));
        assert_eq!(translated.ip_pool.as_deref(), Some("Transactional"));
        assert!(translated.payload.get("template").is_none());
        assert!(translated.payload.get("send_at").is_none());
        assert!(translated.payload.get("ip_pool").is_none());
    }

    #[test]
    fn translate_encodes_files_and_groups_merge_vars() {
        let mail = Mail::builder()
            .to("jane@example.com")
            .attachment("hello.txt", "text/plain", b"hello".to_vec())
            .image("logo", "image/png", vec![0x89, 0x50])
            .merge_language("handlebars")
            .global_merge_var("company", "Acme")
            .merge_var("jane@example.com", "first", "Jane")
            .merge_var("bob@example.com", "first", "Bob")
            .merge_var("jane@example.com", "last", "Doe")
            .metadata("user_id", "42")
            .build()
            .unwrap();

        let payload = MandrillTranslator.translate(&mail).unwrap().payload;

        assert_eq!(
            payload["attachments"],
            json!([{"type": "text/plain", "name": "hello.txt", "content": "aGVsbG8="}])
        );
        assert_eq!(
            payload["images"],
            json!([{"type": "image/png", "name": "logo", "content": "iVA="}])
        );
        assert_eq!(payload["merge_language"], json!("handlebars"));
        assert_eq!(
            payload["global_merge_vars"],
            json!([{"name": "company", "content": "Acme"}])
        );
        assert_eq!(
            payload["merge_vars"],
            json!([
                {"rcpt": "jane@example.com", "vars": [
                    {"name": "first", "content": "Jane"},
                    {"name": "last", "content": "Doe"}
                ]},
                {"rcpt": "bob@example.com", "vars": [{"name": "first", "content": "Bob"}]}
            ])
        );
        assert_eq!(payload["metadata"], json!({"user_id": "42"}));
    }

    #[test]
    fn translate_carries_recipient_metadata_and_analytics() {
        let mail = Mail::builder()
            .to("jane@example.com")
            .recipient_metadata("jane@example.com", "user_id", "42")
            .recipient_metadata("jane@example.com", "plan", "pro")
            .recipient_metadata("bob@example.com", "user_id", "7")
            .google_analytics_domain("acme.test")
            .google_analytics_campaign("welcome-2016")
            .build()
            .unwrap();

        let payload = MandrillTranslator.translate(&mail).unwrap().payload;

        assert_eq!(
            payload["recipient_metadata"],
            json!([
                {"rcpt": "jane@example.com", "values": {"plan": "pro", "user_id": "42"}},
                {"rcpt": "bob@example.com", "values": {"user_id": "7"}}
            ])
        );
        assert_eq!(payload["google_analytics_domains"], json!(["acme.test"]));
        assert_eq!(payload["google_analytics_campaign"], json!("welcome-2016"));
    }

    #[test]
    fn translate_fails_on_bad_recipient() {
        let mail = Mail::builder().to("nobody").build().unwrap();
        assert!(matches!(
            MandrillTranslator.translate(&mail),
            Err(Error::InvalidAddress(address)) if address == "nobody"
        ));
    }

    #[test]
    fn empty_template_slug_means_plain_send() {
        let translated = TranslatedMessage {
            template: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(translated.template_slug(), None);
    }

    #[test]
    fn closures_are_translators() {
        let translator = |text: &str| -> Result<TranslatedMessage> {
            Ok(TranslatedMessage {
                payload: json!({ "text": text }),
                ..Default::default()
            })
        };

        let translated = translator.translate("hi").unwrap();
        assert_eq!(translated.payload, json!({"text": "hi"}));
    }
}
