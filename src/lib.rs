//! # Mandrill Delivery
//! A mail delivery method that hands composed mail to the Mandrill transactional email API instead of an SMTP server, choosing between a plain send and a template send for each message.
//!
//! ## Audience and uses
//! For applications that compose mail in-process and want Mandrill to deliver it: describe the mail with [`Mail`], build a [`DeliveryMethod`] from a [`Configuration`], and call [`DeliveryMethod::deliver`]. The raw API response is returned and also kept on the delivery method for later inspection.
//!
//! ## Collaborators
//! Each step of a delivery sits behind a trait so it can be replaced: [`MessageTranslator`] turns a composed message into a [`TranslatedMessage`], [`GatewayFactory`] builds a [`MessagingGateway`] from the API key, and [`ConfigurationStore`] supplies defaults. The crate ships [`MandrillTranslator`], the `reqwest`-based [`Client`] and the environment-backed [`Configuration`].
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`.
//!
//! ## Out of scope
//! Not a queue. A delivery is one request and one response: no retries, no batching, nothing persisted.
//!
//! ## Errors
//! Transport failures surface as [`Error::Request`], Mandrill error objects as [`Error::Api`] and unexpected bodies as [`Error::ResponseParse`]. The delivery method passes every error through untouched. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use mandrill_delivery::{Configuration, DeliveryMethod, DeliveryOptions, Mail};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mandrill_delivery::Error> {
//!     let config = Configuration::from_env()?;
//!     let mut delivery =
//!         DeliveryMethod::with_options(DeliveryOptions::default().ip_pool("Main Pool"), &config);
//!
//!     let mail = Mail::builder()
//!         .from("Acme <noreply@acme.test>")
//!         .to("jane@example.com")
//!         .template("welcome")
//!         .template_content("body", "<p>Thanks for joining.</p>")
//!         .build()?;
//!
//!     let response = delivery.deliver(&mail).await?;
//!     println!("{response}");
//!     Ok(())
//! }
//! ```

mod client;
mod delivery;
mod error;
mod gateway;
mod mail;
mod models;
mod settings;
mod translate;

pub use client::{Client, ClientBuilder};
pub use delivery::DeliveryMethod;
pub use error::Error;
pub use gateway::{DeliveryResponse, GatewayFactory, MessagingGateway};
pub use mail::{Mail, MailBuilder, MandrillOptions, Part};
pub use models::{
    EncodedFile, MergeVar, Recipient, RecipientMergeVars, RecipientMetadata, RecipientType,
    TemplateContent,
};
pub use settings::{Configuration, ConfigurationStore, DeliveryOptions, DeliverySettings};
pub use translate::{MandrillTranslator, MessageTranslator, TranslatedMessage};

/// Result type alias for Mandrill delivery operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
