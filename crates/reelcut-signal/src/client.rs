//! HTTP client for the signal provider service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{SignalError, SignalResult};
use crate::provider::{SignalObservation, SignalProvider};
use crate::types::{HealthResponse, SegmentAnalysisRequest, SegmentAnalysisResponse};

/// Configuration for the signal client.
#[derive(Debug, Clone)]
pub struct SignalClientConfig {
    /// Base URL of the signal service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for transient transport failures
    pub max_retries: u32,
}

impl Default for SignalClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

impl SignalClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SIGNAL_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            timeout: Duration::from_secs(
                std::env::var("SIGNAL_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_retries: std::env::var("SIGNAL_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// HTTP client for the external AI signal service.
pub struct SignalClient {
    http: Client,
    config: SignalClientConfig,
}

impl SignalClient {
    /// Create a new signal client.
    pub fn new(config: SignalClientConfig) -> SignalResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SignalError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SignalResult<Self> {
        Self::new(SignalClientConfig::from_env())
    }

    /// Check if the signal service is healthy.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => health.status == "healthy" || health.status == "ok",
                    Err(e) => {
                        warn!("Signal service health body unreadable: {}", e);
                        false
                    }
                }
            }
            Ok(response) => {
                warn!("Signal service health check failed: {}", response.status());
                false
            }
            Err(e) => {
                warn!("Signal service health check error: {}", e);
                false
            }
        }
    }

    /// Request per-segment analysis, retrying transient transport failures.
    pub async fn analyze(
        &self,
        request: &SegmentAnalysisRequest,
    ) -> SignalResult<SegmentAnalysisResponse> {
        let url = format!("{}/analyze", self.config.base_url);

        debug!(
            start = request.start,
            end = request.end,
            "Requesting segment signal analysis"
        );

        let mut last_err = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
            }

            match self.http.post(&url).json(request).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<SegmentAnalysisResponse>()
                        .await
                        .map_err(|e| SignalError::invalid_response(e.to_string()));
                }
                Ok(response) => {
                    let status = response.status();
                    // Client errors will not improve on retry
                    let body = response.text().await.unwrap_or_default();
                    let err = SignalError::request_failed(format!(
                        "signal service returned {status}: {body}"
                    ));
                    if status.is_client_error() {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
                Err(e) => {
                    last_err = Some(SignalError::Network(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| SignalError::request_failed("no attempts made")))
    }
}

#[async_trait]
impl SignalProvider for SignalClient {
    async fn analyze_segment(&self, video: &str, start: f64, end: f64) -> SignalObservation {
        let request = SegmentAnalysisRequest {
            video: video.to_string(),
            start,
            end,
        };

        match self.analyze(&request).await {
            Ok(response) => SignalObservation::Measured(response.into()),
            Err(e) => {
                warn!(
                    start,
                    end,
                    error = %e,
                    "Signal provider unavailable for segment, falling back to baseline"
                );
                SignalObservation::Unavailable
            }
        }
    }

    fn name(&self) -> &'static str {
        "signal-http"
    }
}
