//! HTTP side of a conversion: send one request, get one outcome.

use crate::category::ConversionCategory;
use crate::config::ClientConfig;
use crate::error::ConvertError;
use crate::pipeline::request::{build_request, ConversionRequest};
use crate::pipeline::response::{interpret, ConversionOutcome};
use tracing::{info, warn};

/// Sends conversion requests to the configured service.
///
/// Holds one connection pool for every category. Cheap to share behind an
/// `Arc`; the forms of a [`crate::form::ConversionForms`] set share one.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ConversionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConvertError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ConvertError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit `request` to `category`'s endpoint and interpret the reply.
    ///
    /// Never fails: every failure is one of the outcome variants.
    pub async fn convert(
        &self,
        category: ConversionCategory,
        request: ConversionRequest,
    ) -> ConversionOutcome {
        let target_format = request.target_format.clone();
        let builder = match build_request(&self.http, &self.config, category, request) {
            Ok(b) => b,
            Err(e) => {
                warn!("Could not build {} request: {}", category, e);
                return ConversionOutcome::TransportError {
                    cause: e.to_string(),
                };
            }
        };

        info!("Sending {} conversion request to server...", category);
        interpret(builder.send().await, &target_format).await
    }
}
