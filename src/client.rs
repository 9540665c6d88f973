use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::auth::RequestSigner;
use crate::error::SubmissionError;
use crate::models::reservation::ReservationRecord;
use crate::services::submission::ReservationSubmitter;

/// Client for an external reservation backend
pub struct ReservationClient {
    client: Client,
    endpoint: String,
    secret: Option<String>,
}

impl ReservationClient {
    pub fn new(endpoint: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            secret,
        }
    }

    /// POST the record as JSON to the configured endpoint
    pub async fn create_reservation(&self, record: &ReservationRecord) -> Result<(), SubmissionError> {
        let method = "POST";
        let body = serde_json::to_string(record)?;

        let timestamp = RequestSigner::get_timestamp();
        let nonce = RequestSigner::generate_nonce();

        info!("Sending reservation request");
        debug!("API URL: {}", self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Timestamp", timestamp.to_string())
            .header("X-Nonce", &nonce);

        // Sign only when a shared secret is configured
        if let Some(secret) = &self.secret {
            let signature = RequestSigner::generate_signature(secret, method, timestamp, &nonce, &body);
            request = request.header("X-Signature", signature);
        }

        let res = request.body(body).send().await?;
        let status = res.status();
        info!("Response received with status: {}", status);

        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            error!("Reservation backend rejected request ({}): {}", status, detail);
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ReservationSubmitter for ReservationClient {
    async fn submit_reservation(&self, record: &ReservationRecord) -> Result<(), SubmissionError> {
        self.create_reservation(record).await
    }
}
