use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::StatusCode;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    accrual::{limiter::RateLimiter, objects::AccrualResponse},
    db_types::OrderId,
    helpers::extract_requests_per_minute,
};

#[derive(Debug, Error)]
pub enum AccrualClientError {
    #[error("Cancelled before the request was sent")]
    Cancelled,
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("The accrual service is throttling requests. Limit: {0:?} requests per minute")]
    RateLimited(Option<u32>),
    #[error("The accrual service responded with HTTP {0}")]
    UnexpectedStatus(u16),
    #[error("Failed to parse the accrual service response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("Could not create the HTTP client: {0}")]
    Configuration(String),
}

/// Anything that can tell us the accrual status of an order.
#[allow(async_fn_in_trait)]
pub trait AccrualClient {
    /// Asks for the current accrual status of `order_id`. Implementations may wait before sending the request (for
    /// example, because of rate limits), but must give up with [`AccrualClientError::Cancelled`] once `cancel` fires.
    async fn fetch_status(
        &self,
        order_id: &OrderId,
        cancel: &CancellationToken,
    ) -> Result<AccrualResponse, AccrualClientError>;
}

/// An HTTP client for the accrual service.
///
/// Every request first takes a token from the shared [`RateLimiter`]. When the service answers with
/// `429 Too Many Requests`, the limit it announces in the response body is applied to the limiter, and the request
/// fails. There are no retries here. Failed orders are picked up again in a later reconciliation cycle.
#[derive(Debug, Clone)]
pub struct HttpAccrualClient {
    base_url: String,
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl HttpAccrualClient {
    pub fn new(base_url: &str, timeout: Duration, limiter: Arc<RateLimiter>) -> Result<Self, AccrualClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AccrualClientError::Configuration(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { base_url, client, limiter })
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    fn order_url(&self, order_id: &OrderId) -> String {
        format!("{}/api/orders/{}", self.base_url, order_id.as_str())
    }
}

impl AccrualClient for HttpAccrualClient {
    async fn fetch_status(
        &self,
        order_id: &OrderId,
        cancel: &CancellationToken,
    ) -> Result<AccrualResponse, AccrualClientError> {
        self.limiter.until_ready(cancel).await.map_err(|_| AccrualClientError::Cancelled)?;
        let url = self.order_url(order_id);
        trace!("🛰️ GET {url}");
        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let result = serde_json::from_str::<AccrualResponse>(&body)?;
                debug!("🛰️ Accrual status for {order_id}: {} ({:?})", result.status, result.accrual);
                Ok(result)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let body = response.text().await.unwrap_or_default();
                let limit = extract_requests_per_minute(&body);
                match limit {
                    Some(n) if n > 0 => self.limiter.reconfigure(n).await,
                    _ => warn!("🛰️ Accrual service is throttling us, but did not say by how much: '{body}'"),
                }
                Err(AccrualClientError::RateLimited(limit))
            },
            status => {
                debug!("🛰️ Accrual service responded to {order_id} with {status}");
                Err(AccrualClientError::UnexpectedStatus(status.as_u16()))
            },
        }
    }
}
