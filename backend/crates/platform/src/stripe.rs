//! Stripe REST client
//!
//! Thin, form-encoded client for the handful of Stripe endpoints the
//! payment proxy needs. Every successful call yields the `id` of the
//! object Stripe created or touched; everything else is a [`StripeError`].

use serde::Deserialize;

const STRIPE_API_URL: &str = "https://api.stripe.com";

/// Object returned by Stripe (only the fields we read)
#[derive(Debug, Clone, Deserialize)]
pub struct StripeObject {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Stripe client errors
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// Transport failure (DNS, TLS, connection reset, ...)
    #[error("stripe request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Stripe answered with a non-2xx status
    #[error("stripe rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// Stripe answered 2xx with a body we could not read
    #[error("unexpected stripe response: {0}")]
    Decode(String),
}

/// Stripe API client
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl StripeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: STRIPE_API_URL.to_string(),
        }
    }

    /// Point the client at another host (test doubles, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// POST a form to `path` (e.g. `/v1/customers`)
    pub async fn post_form(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<StripeObject, StripeError> {
        let request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .form(params);
        self.send(request).await
    }

    /// DELETE the object at `path`
    pub async fn delete(&self, path: &str) -> Result<StripeObject, StripeError> {
        let request = self
            .http
            .delete(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<StripeObject, StripeError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| {
                    tracing::debug!(
                        status = status.as_u16(),
                        error_type = ?envelope.error.kind,
                        "Stripe returned an error"
                    );
                    envelope.error.message
                })
                .unwrap_or(body);
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| StripeError::Decode(e.to_string()))
    }
}
