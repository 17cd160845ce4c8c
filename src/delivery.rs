//! The delivery method: translate, pick the endpoint, send.

use tracing::debug;

use crate::Result;
use crate::client::ClientBuilder;
use crate::gateway::{DeliveryResponse, GatewayFactory, MessagingGateway};
use crate::settings::{ConfigurationStore, DeliveryOptions, DeliverySettings};
use crate::translate::{MandrillTranslator, MessageTranslator, TranslatedMessage};

/// Delivers composed mail through the Mandrill API.
///
/// Keeps the response of the last successful delivery, available through
/// [`DeliveryMethod::response`]. `deliver` takes `&mut self`, so one instance
/// handles one delivery at a time; share it behind a `Mutex` or build one per
/// task for concurrent sending.
///
/// ```no_run
/// # use mandrill_delivery::{Configuration, DeliveryMethod, Mail};
/// # async fn example() -> Result<(), mandrill_delivery::Error> {
/// let mut delivery = DeliveryMethod::new(&Configuration::from_env()?);
/// let mail = Mail::builder()
///     .from("Acme <noreply@acme.test>")
///     .to("jane@example.com")
///     .subject("Welcome")
///     .html("<p>Thanks for joining.</p>")
///     .build()?;
///
/// let response = delivery.deliver(&mail).await?;
/// println!("{response}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeliveryMethod<F = ClientBuilder, T = MandrillTranslator> {
    settings: DeliverySettings,
    gateways: F,
    translator: T,
    response: Option<DeliveryResponse>,
}

impl DeliveryMethod {
    /// Create a delivery method from configuration alone.
    pub fn new(config: &impl ConfigurationStore) -> Self {
        Self::with_options(DeliveryOptions::default(), config)
    }

    /// Create a delivery method, letting `options` override `config` per setting.
    pub fn with_options(options: DeliveryOptions, config: &impl ConfigurationStore) -> Self {
        Self::from_parts(
            DeliverySettings::resolve(options, config),
            ClientBuilder::new(),
            MandrillTranslator,
        )
    }
}

impl<F, T> DeliveryMethod<F, T> {
    /// Create a delivery method with explicit collaborators.
    pub fn from_parts(settings: DeliverySettings, gateways: F, translator: T) -> Self {
        Self {
            settings,
            gateways,
            translator,
            response: None,
        }
    }

    /// Settings resolved when the delivery method was created.
    pub fn settings(&self) -> &DeliverySettings {
        &self.settings
    }

    /// Response of the most recent successful delivery.
    ///
    /// A failed delivery leaves the previous response in place.
    pub fn response(&self) -> Option<&DeliveryResponse> {
        self.response.as_ref()
    }

    /// Deliver `message`, returning the API response unmodified.
    ///
    /// Uses a template send when the translated message names a template and a
    /// plain send otherwise. A per-message IP pool wins over the configured one.
    /// Errors from the gateway factory, the translator or the API call are
    /// returned as they are.
    pub async fn deliver<M>(&mut self, message: &M) -> Result<DeliveryResponse>
    where
        M: ?Sized,
        F: GatewayFactory,
        T: MessageTranslator<M>,
    {
        let gateway = self.gateways.create(self.settings.api_key.as_deref())?;
        let translated = self.translator.translate(message)?;
        let template = translated.template_slug().map(str::to_string);
        let TranslatedMessage {
            payload,
            template_content,
            send_at,
            ip_pool,
            ..
        } = translated;

        let async_send = self.settings.async_send.unwrap_or(false);
        let ip_pool = ip_pool.or_else(|| self.settings.ip_pool.clone());

        let response = match template {
            Some(template) => {
                debug!(
                    template = %template,
                    ip_pool = ?ip_pool,
                    send_at = ?send_at,
                    "sending template message"
                );
                gateway
                    .send_template(
                        template,
                        template_content,
                        payload,
                        async_send,
                        ip_pool,
                        send_at,
                    )
                    .await?
            }
            None => {
                debug!(ip_pool = ?ip_pool, send_at = ?send_at, "sending message");
                gateway.send(payload, async_send, ip_pool, send_at).await?
            }
        };

        self.response = Some(response.clone());
        Ok(response)
    }
}
