use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::SubmissionError;
use crate::models::reservation::ReservationRecord;

pub const DEFAULT_SUBMISSION_DELAY: Duration = Duration::from_millis(1500);

/// Outbound capability that hands a validated reservation to whoever
/// fulfils it. The form controller only knows it succeeded or failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationSubmitter: Send + Sync {
    async fn submit_reservation(&self, record: &ReservationRecord) -> Result<(), SubmissionError>;
}

/// Stand-in backend: waits a fixed delay and always accepts.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMISSION_DELAY)
    }
}

#[async_trait]
impl ReservationSubmitter for SimulatedSubmitter {
    async fn submit_reservation(&self, record: &ReservationRecord) -> Result<(), SubmissionError> {
        debug!(
            "Simulating reservation submission for {} guests on {} at {} ({:?} delay)",
            record.guests, record.date, record.time, self.delay
        );
        tokio::time::sleep(self.delay).await;
        info!("Simulated reservation accepted for {}", record.name.trim());
        Ok(())
    }
}
