//! HTTP client abstraction for calling upstream services
//!
//! The outbound callers only see the [`HttpClient`] trait, so the pooled hyper client used in
//! production and the recording mock used in tests are interchangeable.
use async_trait::async_trait;
use axum::response::IntoResponse;
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use std::time::Duration;

pub type HyperClient = Client<
    hyper_tls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
    axum::body::Body,
>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait HttpClient: std::fmt::Debug {
    async fn request(
        &self,
        req: axum::extract::Request,
    ) -> Result<axum::response::Response, BoxError>;
}

#[async_trait]
impl HttpClient for HyperClient {
    async fn request(
        &self,
        req: axum::extract::Request,
    ) -> Result<axum::response::Response, BoxError> {
        self.request(req)
            .await
            .map(|res| res.into_response())
            .map_err(|e| Box::new(e) as BoxError)
    }
}

pub fn create_hyper_client(pool_max_idle_per_host: usize, pool_idle_timeout_secs: u64) -> HyperClient {
    let https = hyper_tls::HttpsConnector::new();

    tracing::debug!(
        "HTTP client pool config: idle_timeout={}s, max_idle_per_host={}",
        pool_idle_timeout_secs,
        pool_max_idle_per_host
    );

    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(pool_idle_timeout_secs))
        .pool_max_idle_per_host(pool_max_idle_per_host)
        .pool_timer(hyper_util::rt::TokioTimer::new())
        .build(https)
}
