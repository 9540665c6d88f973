use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::error::SubmissionError;
use crate::models::form::{FormSnapshot, SubmissionStatus};
use crate::models::reservation::{ReservationField, ReservationRecord, ValidationErrors};
use crate::services::submission::ReservationSubmitter;
use crate::services::validator::validate_now;

pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_secs(5);
// Stays under the default HTTP request timeout
pub const DEFAULT_SUBMISSION_TIMEOUT: Duration = Duration::from_secs(8);
pub const SUBMISSION_FAILED_MESSAGE: &str = "Submission failed, please try again";

/// Result of one call to [`ReservationFormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the errors were stored on the form.
    Invalid(ValidationErrors),
    /// The backend accepted the reservation and the form was reset.
    Submitted,
    /// The backend call failed; the record was kept.
    Failed(String),
    /// Another submission is still in flight.
    InProgress,
    /// The form was torn down before the submission finished.
    Cancelled,
}

impl SubmitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitOutcome::Invalid(_) => "invalid",
            SubmitOutcome::Submitted => "submitted",
            SubmitOutcome::Failed(_) => "failed",
            SubmitOutcome::InProgress => "in_progress",
            SubmitOutcome::Cancelled => "cancelled",
        }
    }
}

struct FormState {
    form: FormSnapshot,
    // Bumped on every accepted submit and on teardown; late task results
    // carrying an older generation are dropped.
    generation: u64,
    submission: Option<AbortHandle>,
    reset_timer: Option<AbortHandle>,
    closed: bool,
}

fn lock_state(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns one reservation form: its record, validation errors and
/// submission status.
///
/// All mutations go through the per-form mutex, which is never held across
/// an await point. The backend call and the success reset timer run as
/// tokio tasks whose abort handles live on the form, so [`teardown`]
/// (or dropping the controller) stops both.
///
/// [`teardown`]: ReservationFormController::teardown
pub struct ReservationFormController {
    state: Arc<Mutex<FormState>>,
    submitter: Arc<dyn ReservationSubmitter>,
    success_display: Duration,
    submission_timeout: Duration,
}

impl ReservationFormController {
    pub fn new(submitter: Arc<dyn ReservationSubmitter>, success_display: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState {
                form: FormSnapshot::default(),
                generation: 0,
                submission: None,
                reset_timer: None,
                closed: false,
            })),
            submitter,
            success_display,
            submission_timeout: DEFAULT_SUBMISSION_TIMEOUT,
        }
    }

    /// Bound on a single backend call; past it the attempt fails and the
    /// form returns to `Idle`.
    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = timeout;
        self
    }

    pub fn snapshot(&self) -> FormSnapshot {
        lock_state(&self.state).form.clone()
    }

    pub fn status(&self) -> SubmissionStatus {
        lock_state(&self.state).form.status
    }

    pub fn is_closed(&self) -> bool {
        lock_state(&self.state).closed
    }

    // (submission task pending, reset timer pending)
    pub(crate) fn pending_tasks(&self) -> (bool, bool) {
        let state = lock_state(&self.state);
        (state.submission.is_some(), state.reset_timer.is_some())
    }

    /// Stores `value` in `field` and drops any error currently shown for it.
    /// Other errors stay until the next submit.
    pub fn update_field(&self, field: ReservationField, value: impl Into<String>) {
        let mut state = lock_state(&self.state);
        state.form.record.set(field, value.into());
        if state.form.errors.clear(field) {
            debug!("Cleared validation error for field '{}'", field);
        }
    }

    /// Validates the record and, if it passes, hands it to the submitter.
    ///
    /// Resolves once the submission has completed (or was cancelled). The
    /// backend call itself runs on its own task, so dropping this future
    /// does not interrupt it; only [`Self::teardown`] does.
    pub async fn submit(&self) -> SubmitOutcome {
        let (record, generation) = {
            let mut state = lock_state(&self.state);

            if state.closed {
                warn!("Submit called on a closed reservation form");
                return SubmitOutcome::Cancelled;
            }

            if state.form.status == SubmissionStatus::Submitting {
                warn!("Reservation submission already in progress, ignoring submit");
                return SubmitOutcome::InProgress;
            }

            let errors = validate_now(&state.form.record);
            state.form.errors = errors.clone();

            if !errors.is_empty() {
                info!(
                    "Reservation form has {} invalid field(s): {:?}",
                    errors.len(),
                    errors.fields()
                );
                return SubmitOutcome::Invalid(errors);
            }

            if let Some(timer) = state.reset_timer.take() {
                debug!("Cancelling pending success reset");
                timer.abort();
            }

            state.generation += 1;
            state.form.status = SubmissionStatus::Submitting;
            state.form.submission_error = None;

            (state.form.record.clone(), state.generation)
        };

        info!("Submitting reservation (attempt {})", generation);

        let shared = Arc::clone(&self.state);
        let submitter = Arc::clone(&self.submitter);
        let success_display = self.success_display;
        let submission_timeout = self.submission_timeout;
        let task = tokio::spawn(async move {
            let result =
                match tokio::time::timeout(submission_timeout, submitter.submit_reservation(&record))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(SubmissionError::TimedOut {
                        after: submission_timeout,
                    }),
                };
            complete_submission(&shared, generation, result, success_display)
        });

        {
            let mut state = lock_state(&self.state);
            if state.closed || state.generation != generation {
                task.abort();
            } else if !task.is_finished() {
                state.submission = Some(task.abort_handle());
            }
        }

        let joined = task.await;

        {
            let mut state = lock_state(&self.state);
            if state.generation == generation {
                state.submission = None;
            }
        }

        match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                info!("Reservation submission cancelled");
                SubmitOutcome::Cancelled
            }
            Err(e) => {
                let err = SubmissionError::Aborted {
                    message: e.to_string(),
                };
                complete_submission(&self.state, generation, Err(err), success_display)
            }
        }
    }

    /// Stops the in-flight submission and the success timer. Later results
    /// from either are ignored. Safe to call more than once.
    pub fn teardown(&self) {
        let mut state = lock_state(&self.state);
        if state.closed {
            return;
        }

        state.closed = true;
        state.generation += 1;

        if let Some(task) = state.submission.take() {
            task.abort();
        }
        if let Some(timer) = state.reset_timer.take() {
            timer.abort();
        }

        debug!("Reservation form torn down");
    }
}

impl Drop for ReservationFormController {
    fn drop(&mut self) {
        self.teardown();
    }
}

// Applies the backend result to the form, unless the form moved on.
fn complete_submission(
    state: &Arc<Mutex<FormState>>,
    generation: u64,
    result: Result<(), SubmissionError>,
    success_display: Duration,
) -> SubmitOutcome {
    let mut guard = lock_state(state);

    if guard.closed || guard.generation != generation {
        debug!("Discarding result of stale submission {}", generation);
        return SubmitOutcome::Cancelled;
    }

    guard.submission = None;

    match result {
        Ok(()) => {
            guard.form.record = ReservationRecord::default();
            guard.form.errors = ValidationErrors::default();
            guard.form.status = SubmissionStatus::Success;

            let timer_state = Arc::clone(state);
            let timer = tokio::spawn(async move {
                tokio::time::sleep(success_display).await;

                let mut guard = lock_state(&timer_state);
                if !guard.closed
                    && guard.generation == generation
                    && guard.form.status == SubmissionStatus::Success
                {
                    guard.form.status = SubmissionStatus::Idle;
                    guard.reset_timer = None;
                    debug!("Success message dismissed");
                }
            });
            guard.reset_timer = Some(timer.abort_handle());

            info!("Reservation submitted successfully");
            SubmitOutcome::Submitted
        }
        Err(err) => {
            error!("Error submitting reservation: {}", err);
            guard.form.status = SubmissionStatus::Idle;
            guard.form.submission_error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
            SubmitOutcome::Failed(err.to_string())
        }
    }
}
