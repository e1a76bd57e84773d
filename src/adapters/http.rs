use crate::config::toml_config::TomlConfig;
use crate::domain::ports::{ApiRequest, RequestExecutor};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Retry rules for one executor. Set at construction and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_on_status: Vec<u16>,
    /// Backoff before retry `n` is `base_delay * 2^n`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_on_status: Vec<u16>) -> Self {
        Self {
            max_retries,
            retry_on_status,
            base_delay: Duration::from_millis(500),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_on_status.contains(&status.as_u16())
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // API 對 429 與 500 會回應暫時性失敗
        Self::new(3, vec![429, 500])
    }
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("ergast-etl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// reqwest-backed [`RequestExecutor`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(settings: HttpSettings, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent)
            .build()?;
        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .request(request.method.clone(), &request.url)
            .send()
            .await?;
        Ok(response)
    }

    async fn read_body(response: reqwest::Response) -> Result<Option<serde_json::Value>> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait]
impl RequestExecutor for HttpClient {
    async fn execute(&self, request: &ApiRequest) -> Result<Option<serde_json::Value>> {
        let max_attempts = self.policy.max_retries + 1;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            tracing::debug!(
                "📡 {}: {} {} (attempt {}/{})",
                request.context,
                request.method,
                request.url,
                attempt,
                max_attempts
            );

            match self.send_once(request).await {
                Ok(response) if response.status().is_success() => {
                    return Self::read_body(response).await;
                }
                Ok(response) => {
                    let status = response.status();
                    if !self.policy.should_retry_status(status) {
                        return Err(EtlError::HttpStatusError {
                            context: request.context.to_string(),
                            url: request.url.clone(),
                            status: status.as_u16(),
                        });
                    }
                    if attempt >= max_attempts {
                        tracing::error!(
                            "❌ {}: HTTP {} after {} attempts",
                            request.context,
                            status,
                            attempt
                        );
                        return Err(EtlError::RetryExhaustedError {
                            context: request.context.to_string(),
                            attempts: attempt,
                            status: status.as_u16(),
                        });
                    }
                    tracing::warn!(
                        "⚠️ {}: HTTP {}, retrying ({}/{})",
                        request.context,
                        status,
                        attempt,
                        self.policy.max_retries
                    );
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        "⚠️ {}: {}, retrying ({}/{})",
                        request.context,
                        e,
                        attempt,
                        self.policy.max_retries
                    );
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(self.policy.backoff(attempt - 1)).await;
        }
    }

    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl From<&TomlConfig> for RetryPolicy {
    fn from(config: &TomlConfig) -> Self {
        let defaults = RetryPolicy::default();
        let source = &config.source;
        RetryPolicy {
            max_retries: source.retry_attempts.unwrap_or(defaults.max_retries),
            retry_on_status: source
                .retry_on_status
                .clone()
                .unwrap_or(defaults.retry_on_status),
            base_delay: source
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
        }
    }
}

impl From<&TomlConfig> for HttpSettings {
    fn from(config: &TomlConfig) -> Self {
        let defaults = HttpSettings::default();
        HttpSettings {
            timeout: config
                .source
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            user_agent: config.source.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}
