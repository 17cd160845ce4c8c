//! Mandrill HTTP client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::gateway::{DeliveryResponse, GatewayFactory, MessagingGateway};
use crate::models::{ApiErrorBody, TemplateContent};
use crate::{Error, Result};

/// Async client for the Mandrill messages API.
///
/// Use [`Client::new`] with just an API key, or [`Client::builder`] to point at
/// another endpoint, go through a proxy or set a timeout.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    proxy: Option<String>,
    user_agent: String,
    base_url: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    key: &'a str,
    message: &'a Value,
    #[serde(rename = "async")]
    async_send: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip_pool: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_at: Option<&'a str>,
}

#[derive(Serialize)]
struct SendTemplateRequest<'a> {
    key: &'a str,
    template_name: &'a str,
    template_content: &'a [TemplateContent],
    message: &'a Value,
    #[serde(rename = "async")]
    async_send: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip_pool: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_at: Option<&'a str>,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the public Mandrill endpoint.
    ///
    /// # Examples
    /// ```no_run
    /// # use mandrill_delivery::Client;
    /// # fn main() -> Result<(), mandrill_delivery::Error> {
    /// let client = Client::new("md-xxxxxxxx")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Get the API base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body to an API method and return the parsed response.
    async fn call<B: Serialize + ?Sized>(&self, method: &str, body: &B) -> Result<Value> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), method);
        debug!(url = %url, "calling Mandrill API");

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return serde_json::from_str(&text)
                .map_err(|_| Error::ResponseParse(format!("HTTP {status}: {text}")));
        }

        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) if body.status == "error" => {
                warn!(
                    status = status.as_u16(),
                    code = body.code,
                    name = %body.name,
                    "Mandrill API returned an error"
                );
                Err(Error::Api {
                    status: status.as_u16(),
                    code: body.code,
                    name: body.name,
                    message: body.message,
                })
            }
            _ => Err(Error::ResponseParse(format!("HTTP {status}: {text}"))),
        }
    }

    /// Build headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl MessagingGateway for Client {
    async fn send(
        &self,
        message: Value,
        async_send: bool,
        ip_pool: Option<String>,
        send_at: Option<String>,
    ) -> Result<DeliveryResponse> {
        let request = SendRequest {
            key: &self.api_key,
            message: &message,
            async_send,
            ip_pool: ip_pool.as_deref(),
            send_at: send_at.as_deref(),
        };
        self.call("messages/send.json", &request).await
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
        let request = SendTemplateRequest {
            key: &self.api_key,
            template_name: &template_name,
            template_content: &template_content,
            message: &message,
            async_send,
            ip_pool: ip_pool.as_deref(),
            send_at: send_at.as_deref(),
        };
        self.call("messages/send-template.json", &request).await
    }
}

const BASE_URL: &str = "https://mandrillapp.com/api/1.0";
const USER_AGENT_VALUE: &str = concat!("mandrill-delivery/", env!("CARGO_PKG_VERSION"));

/// Builder for configuring a Mandrill client.
///
/// A builder without an API key is also a [`GatewayFactory`]: the delivery
/// method hands it the resolved key and gets a fresh [`Client`] per delivery.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    proxy: Option<String>,
    user_agent: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - No API key
    /// - No proxy
    /// - No request timeout
    /// - `mandrill-delivery/<version>` user agent
    /// - The public Mandrill endpoint
    pub fn new() -> Self {
        Self {
            api_key: None,
            proxy: None,
            user_agent: USER_AGENT_VALUE.to_string(),
            base_url: BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Set the API key sent with every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:1080").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing against a local mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fail requests that take longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// Fails with [`Error::MissingApiKey`] when no key, or an empty key, was set.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey)?;

        let mut builder = reqwest::Client::builder();

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build()?;

        Ok(Client {
            http,
            api_key,
            proxy: self.proxy,
            user_agent: self.user_agent,
            base_url: self.base_url,
        })
    }
}

impl GatewayFactory for ClientBuilder {
    type Gateway = Client;

    fn create(&self, api_key: Option<&str>) -> Result<Client> {
        let mut builder = self.clone();
        builder.api_key = api_key.map(str::to_string);
        builder.build()
    }
}
