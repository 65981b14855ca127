//! Client configuration.
//!
//! Everything that is not fixed per category lives in [`ClientConfig`],
//! built via [`ClientConfigBuilder`]. The category table itself is static
//! (see [`crate::category`]); this struct only says where the server is and
//! how strictly the forms behave.

use crate::error::ConvertError;
use crate::events::Observer;
use std::fmt;

/// Server the forms talk to when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration shared by every form of a client.
///
/// # Example
/// ```rust
/// use media_convert_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://converter.internal:8080")
///     .request_timeout_secs(300)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Scheme, host and optional path prefix of the conversion service.
    /// Default: `http://localhost:8080`.
    pub base_url: String,

    /// Upper bound for one conversion request, in seconds. Default: none.
    ///
    /// Conversions of large videos can legitimately take minutes, so
    /// requests run until the server answers unless a bound is set here.
    /// An expired bound is reported as a transport error.
    pub request_timeout_secs: Option<u64>,

    /// Reject formats the category does not offer before sending. Default: true.
    ///
    /// When false the format token is forwarded unchecked and the server
    /// decides.
    pub enforce_offered_formats: bool,

    /// Receives selection/submission events and failure alerts.
    pub observer: Option<Observer>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            enforce_offered_formats: true,
            observer: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("enforce_offered_formats", &self.enforce_offered_formats)
            .field("observer", &self.observer.as_ref().map(|_| "<dyn ConversionObserver>"))
            .finish()
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Absolute URL of `endpoint` on the configured server.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn enforce_offered_formats(mut self, v: bool) -> Self {
        self.config.enforce_offered_formats = v;
        self
    }

    pub fn observer(mut self, observer: Observer) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ConvertError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.base_url).map_err(|e| {
            ConvertError::InvalidConfig(format!("base URL '{}' is not valid: {}", c.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConvertError::InvalidConfig(format!(
                "base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
