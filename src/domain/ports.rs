use crate::domain::model::{Dataset, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;

/// A single upstream call: where to go and what it is for (used in logs and errors).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub url: String,
    pub method: Method,
    pub context: &'static str,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>, context: &'static str) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            context,
        }
    }
}

/// Issues requests with whatever retry policy it was built with.
///
/// `Ok(None)` means the server answered with an empty body; callers treat
/// that as "no data".
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<Option<serde_json::Value>>;

    async fn delay(&self, duration: Duration);
}

/// Destination for exported files, addressed relative to its own root.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where and how a pipeline writes its output.
pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
