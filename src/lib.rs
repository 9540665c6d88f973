//! Restaurant Reservation Service
//!
//! This library holds the table-reservation form behind the restaurant
//! site: field validation, the submission lifecycle and the timed success
//! message, plus a small HTTP service that lets the page drive one form
//! per visitor.
//!
//! # Modules
//!
//! - `services::validator`: field rules for a reservation record
//! - `services::form_controller`: one form's state machine
//! - `services::registry`: open forms, keyed by id
//! - `client`: optional HTTP backend for accepted reservations
//! - `handlers` / `routes`: the JSON endpoints
//!
//! # Submission
//!
//! Without a configured endpoint, reservations go to a simulated backend
//! that waits 1.5 seconds and accepts. With `RESERVATION_API_ENDPOINT` set,
//! they are POSTed there as JSON, optionally HMAC-signed.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


use std::sync::Arc;

// Re-export the main API types for ease of use
pub use client::ReservationClient;
pub use config::Settings;
pub use handlers::api::AppState;
pub use models::form::{FormSnapshot, SubmissionStatus};
pub use models::reservation::{ReservationField, ReservationRecord, ValidationErrors};
pub use routes::create_router;
pub use services::form_controller::{ReservationFormController, SubmitOutcome};
pub use services::registry::FormRegistry;
pub use services::submission::{ReservationSubmitter, SimulatedSubmitter};

use models::common::FormOptions;

/// Pick the submitter the settings ask for
pub fn build_submitter(settings: &Settings) -> Arc<dyn ReservationSubmitter> {
    match &settings.reservation_endpoint {
        Some(endpoint) => Arc::new(ReservationClient::new(
            endpoint.clone(),
            settings.reservation_secret.clone(),
        )),
        None => Arc::new(SimulatedSubmitter::new(settings.submission_delay)),
    }
}

/// Shared state for the router
pub fn build_app_state(settings: &Settings, submitter: Arc<dyn ReservationSubmitter>) -> Arc<AppState> {
    Arc::new(AppState {
        registry: Arc::new(
            FormRegistry::new(submitter, settings.success_display)
                .with_submission_timeout(settings.submission_timeout)
                .with_idle_ttl(settings.form_idle_ttl)
                .with_max_open(settings.max_open_forms),
        ),
        options: FormOptions::standard(),
    })
}
