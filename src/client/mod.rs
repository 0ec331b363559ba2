//! HTTP transport for a local Foundry chat-completions endpoint.

pub mod error;
pub mod lines;
pub mod mock;
pub mod wire;

pub use error::TransportError;
pub use mock::MockTransport;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use std::fmt;
use std::time::Duration;

use crate::core::error::{ChatError, Result};
use crate::core::transport::{ChatTransport, LineStream};
use crate::core::types::TurnRequest;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5273";

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_min_delay: Duration,
    pub retry_max_delay: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            max_retries: 3,
            retry_min_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.max_retries = 0;
        self
    }
}

#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new() -> std::result::Result<Self, TransportError> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> std::result::Result<Self, TransportError> {
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(config.retry_min_delay, config.retry_max_delay)
            .build_with_max_retries(config.max_retries);

        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        let client = builder.build().map_err(|e| {
            TransportError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        let client_with_middleware = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            inner: client_with_middleware,
            config,
        })
    }

    #[must_use]
    pub const fn inner(&self) -> &ClientWithMiddleware {
        &self.inner
    }

    #[must_use]
    pub const fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self(url.trim_end_matches('/').to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BaseUrl {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for BaseUrl {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

/// Chat-completions transport against a Foundry-style local endpoint. One
/// long-lived client per process; each turn opens one streamed POST.
#[derive(Clone)]
pub struct FoundryClient {
    http: HttpClient,
    endpoint: BaseUrl,
}

impl fmt::Debug for FoundryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoundryClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl FoundryClient {
    pub fn new(endpoint: impl Into<BaseUrl>) -> std::result::Result<Self, TransportError> {
        Ok(Self {
            http: HttpClient::new()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn with_http_config(
        endpoint: impl Into<BaseUrl>,
        config: HttpConfig,
    ) -> std::result::Result<Self, TransportError> {
        Ok(Self {
            http: HttpClient::with_config(config)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn local() -> std::result::Result<Self, TransportError> {
        Self::new(DEFAULT_ENDPOINT)
    }

    #[must_use]
    pub fn endpoint(&self) -> &BaseUrl {
        &self.endpoint
    }

    fn url(&self) -> String {
        self.endpoint.join(CHAT_COMPLETIONS_PATH)
    }

    fn classify_send_error(&self, err: &reqwest_middleware::Error) -> TransportError {
        if let reqwest_middleware::Error::Reqwest(inner) = err {
            if inner.is_timeout() {
                return TransportError::Timeout(self.http.config().timeout);
            }
        }
        TransportError::Connection(err.to_string())
    }
}

#[async_trait]
impl ChatTransport for FoundryClient {
    async fn open(&self, request: &TurnRequest) -> Result<LineStream> {
        let api_request = wire::to_api_request(request);
        let body = serde_json::to_string(&api_request).map_err(ChatError::Json)?;

        let response = self
            .http
            .inner()
            .post(self.url())
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(TransportError::from_status(status.as_u16(), &error_body).into());
        }

        let line_stream = lines::decode_lines(response.bytes_stream())
            .map(|result| result.map_err(ChatError::from));
        Ok(Box::pin(line_stream))
    }
}
