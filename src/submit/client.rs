use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam for the one-shot submission request, so tests can stand in a mock
/// endpoint without touching the network path.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
