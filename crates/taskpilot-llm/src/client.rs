//! HTTP gateway client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error, instrument};

use crate::errors::GatewayError;
use crate::types::{GatewayReply, GatewayRequest, RawReply, parse_error_message};
use crate::GatewayClient;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway connection configuration.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Base URL, no trailing slash (`https://gateway.internal`).
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Config with the default timeout and no auth.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `reqwest`-backed [`GatewayClient`].
pub struct HttpGatewayClient {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpGatewayClient {
    /// Create a client with its own connection pool.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create a client sharing an existing `reqwest::Client`.
    ///
    /// The caller's client must already carry a timeout; none is added here.
    #[must_use]
    pub fn with_client(config: GatewayConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// The configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                GatewayError::Api {
                    status: 0,
                    message: "API key is not a valid header value".to_string(),
                }
            })?;
            let _ = headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    #[instrument(skip_all, fields(model = %self.config.model, new_session = request.new_session))]
    async fn complete(&self, request: &GatewayRequest) -> Result<GatewayReply, GatewayError> {
        debug!(
            input_len = request.input.len(),
            has_session = request.session_id.is_some(),
            "sending gateway request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(&body);
            error!(status = status.as_u16(), %message, "gateway API error");
            if status.as_u16() == 429 {
                return Err(GatewayError::RateLimited { message });
            }
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: RawReply = response.json().await?;
        let reply = raw.into_reply().ok_or(GatewayError::MalformedResponse)?;
        debug!(
            output_len = reply.text.len(),
            has_session = reply.session_id.is_some(),
            "gateway reply received"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpGatewayClient {
        let mut config = GatewayConfig::new(server.uri(), "tp-large");
        config.api_key = Some("secret".into());
        HttpGatewayClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn completes_against_choices_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({"model": "tp-large", "new_session": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{\"commands\": []}"}}],
                "session_id": "conv-1"
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(&GatewayRequest::new_conversation("tp-large", "list my tasks"))
            .await
            .unwrap();
        assert_eq!(reply.text, "{\"commands\": []}");
        assert_eq!(reply.session_id.as_deref(), Some("conv-1"));
    }

    #[tokio::test]
    async fn completes_against_flat_output_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "done"})))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(&GatewayRequest::continuation("tp-large", "yes", "conv-1"))
            .await
            .unwrap();
        assert_eq!(reply.text, "done");
        assert!(reply.session_id.is_none());
    }

    #[tokio::test]
    async fn non_success_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": {"message": "upstream exploded"}})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&GatewayRequest::new_conversation("tp-large", "x"))
            .await
            .unwrap_err();
        assert_matches!(err, GatewayError::Api { status: 500, message } if message == "upstream exploded");
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({"message": "slow down"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&GatewayRequest::new_conversation("tp-large", "x"))
            .await
            .unwrap_err();
        assert_matches!(err, GatewayError::RateLimited { message } if message == "slow down");
    }

    #[tokio::test]
    async fn empty_success_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&GatewayRequest::new_conversation("tp-large", "x"))
            .await
            .unwrap_err();
        assert_matches!(err, GatewayError::MalformedResponse);
    }

    #[tokio::test]
    async fn timeout_surfaces_as_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"output": "late"}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let mut config = GatewayConfig::new(server.uri(), "tp-large");
        config.timeout_secs = 0; // sub-second timeout via builder below
        let client = HttpGatewayClient::with_client(
            config,
            reqwest::Client::builder()
                .timeout(Duration::from_millis(50))
                .build()
                .unwrap(),
        );

        let err = client
            .complete(&GatewayRequest::new_conversation("tp-large", "x"))
            .await
            .unwrap_err();
        assert_matches!(err, GatewayError::Http(e) if e.is_timeout());
    }
}
