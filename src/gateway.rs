//! The remote messaging API as seen by the delivery method.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::models::TemplateContent;

/// Raw response returned by the messaging API.
pub type DeliveryResponse = Value;

/// Remote transactional email API.
///
/// [`crate::Client`] is the HTTP implementation; tests substitute their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a fully rendered message.
    async fn send(
        &self,
        message: Value,
        async_send: bool,
        ip_pool: Option<String>,
        send_at: Option<String>,
    ) -> Result<DeliveryResponse>;

    /// Send a message rendered server-side from a stored template.
    async fn send_template(
        &self,
        template_name: String,
        template_content: Vec<TemplateContent>,
        message: Value,
        async_send: bool,
        ip_pool: Option<String>,
        send_at: Option<String>,
    ) -> Result<DeliveryResponse>;
}

#[async_trait]
impl<G: MessagingGateway + ?Sized> MessagingGateway for Arc<G> {
    async fn send(
        &self,
        message: Value,
        async_send: bool,
        ip_pool: Option<String>,
        send_at: Option<String>,
    ) -> Result<DeliveryResponse> {
        (**self).send(message, async_send, ip_pool, send_at).await
    }

    async fn send_template(
        &self,
        template_name: String,
        template_content: Vec<TemplateContent>,
        message: Value,
        async_send: bool,
        ip_pool: Option<String>,
        send_at: Option<String>,
    ) -> Result<DeliveryResponse> {
        (**self)
            .send_template(
                template_name,
                template_content,
                message,
                async_send,
                ip_pool,
                send_at,
            )
            .await
    }
}

/// Builds a gateway for an API key.
///
/// The delivery method asks for a new gateway on every delivery, so a factory
/// is also the place to share connection pools or other state between them.
pub trait GatewayFactory {
    type Gateway: MessagingGateway;

    fn create(&self, api_key: Option<&str>) -> Result<Self::Gateway>;
}

impl<G, F> GatewayFactory for F
where
    G: MessagingGateway,
    F: Fn(Option<&str>) -> Result<G>,
{
    type Gateway = G;

    fn create(&self, api_key: Option<&str>) -> Result<G> {
        self(api_key)
    }
}
