//! Delivery configuration: defaults from the environment, overrides from the caller.

use serde::Deserialize;

use crate::Result;

/// Where the delivery method reads its defaults from.
///
/// Consulted once, when the delivery method is constructed.
pub trait ConfigurationStore {
    fn api_key(&self) -> Option<String>;
    fn ip_pool(&self) -> Option<String>;
    fn async_send(&self) -> Option<bool>;
}

/// Plain configuration value, usually loaded from the environment.
///
/// | Variable | Description |
/// |----------|-------------|
/// | `MANDRILL_API_KEY` | API key used for every delivery |
/// | `MANDRILL_IP_POOL` | Default dedicated IP pool |
/// | `MANDRILL_ASYNC` | `true` to use Mandrill's async sending mode |
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub ip_pool: Option<String>,
    #[serde(default, rename = "async")]
    pub async_send: Option<bool>,
}

impl Configuration {
    /// Load from `MANDRILL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_prefix("MANDRILL")
    }

    /// Load from `<PREFIX>_API_KEY`, `<PREFIX>_IP_POOL` and `<PREFIX>_ASYNC`.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

impl ConfigurationStore for Configuration {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn ip_pool(&self) -> Option<String> {
        self.ip_pool.clone()
    }

    fn async_send(&self) -> Option<bool> {
        self.async_send
    }
}

/// Caller overrides applied on top of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeliveryOptions {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub ip_pool: Option<String>,
    #[serde(default, rename = "async")]
    pub async_send: Option<bool>,
}

impl DeliveryOptions {
    /// Override the configured API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the configured dedicated IP pool.
    pub fn ip_pool(mut self, ip_pool: impl Into<String>) -> Self {
        self.ip_pool = Some(ip_pool.into());
        self
    }

    /// Override the configured async sending flag.
    pub fn async_send(mut self, async_send: bool) -> Self {
        self.async_send = Some(async_send);
        self
    }
}

/// Settings a delivery method was constructed with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliverySettings {
    pub api_key: Option<String>,
    pub ip_pool: Option<String>,
    pub async_send: Option<bool>,
}

impl DeliverySettings {
    /// Take each setting from `options` when given, otherwise from `config`.
    pub fn resolve(options: DeliveryOptions, config: &impl ConfigurationStore) -> Self {
        Self {
            api_key: options.api_key.or_else(|| config.api_key()),
            ip_pool: options.ip_pool.or_else(|| config.ip_pool()),
            async_send: options.async_send.or_else(|| config.async_send()),
        }
    }
}
