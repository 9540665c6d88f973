use serde::{Deserialize, Serialize};

use crate::models::reservation::{ReservationRecord, ValidationErrors};

/// Lifecycle of one reservation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
}

/// Everything the presentation layer needs to render the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub record: ReservationRecord,
    pub errors: ValidationErrors,
    pub status: SubmissionStatus,
    // Set when the last submission failed; cleared by the next submit.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub submission_error: Option<String>,
}

// Request body for a single field edit
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateFieldRequest {
    pub value: String,
}

// Response structure for opening a new form
#[derive(Debug, Deserialize, Serialize)]
pub struct OpenFormResponse {
    pub id: String,
    pub form: FormSnapshot,
}

// Response structure for the submit endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitResponse {
    pub outcome: String,
    pub form: FormSnapshot,
}
