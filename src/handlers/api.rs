use axum::{
    extract::{Json as ExtractJson, Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::common::FormOptions;
use crate::models::form::{FormSnapshot, OpenFormResponse, SubmitResponse, UpdateFieldRequest};
use crate::models::reservation::ReservationField;
use crate::services::form_controller::{ReservationFormController, SubmitOutcome};
use crate::services::registry::FormRegistry;

// AppState struct containing shared resources
pub struct AppState {
    pub registry: Arc<FormRegistry>,
    pub options: FormOptions,
}

fn find_form(state: &AppState, form_id: &str) -> Result<Arc<ReservationFormController>, StatusCode> {
    state.registry.get(form_id).ok_or_else(|| {
        warn!("Reservation form {} not found", form_id);
        StatusCode::NOT_FOUND
    })
}

// Select options for the guests and occasion fields
pub async fn form_options(State(state): State<Arc<AppState>>) -> Json<FormOptions> {
    Json(state.options.clone())
}

// Open a new reservation form
pub async fn open_form(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<OpenFormResponse>), StatusCode> {
    let (id, controller) = state
        .registry
        .open()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    Ok((
        StatusCode::CREATED,
        Json(OpenFormResponse {
            id,
            form: controller.snapshot(),
        }),
    ))
}

// Current state of a form
pub async fn get_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> Result<Json<FormSnapshot>, StatusCode> {
    let controller = find_form(&state, &form_id)?;
    Ok(Json(controller.snapshot()))
}

// Field edit, sent on every keystroke or selection change
pub async fn update_field(
    State(state): State<Arc<AppState>>,
    Path((form_id, field_name)): Path<(String, String)>,
    ExtractJson(request): ExtractJson<UpdateFieldRequest>,
) -> Result<Json<FormSnapshot>, StatusCode> {
    let field = field_name.parse::<ReservationField>().map_err(|e| {
        warn!("Rejected field update for form {}: {}", form_id, e);
        StatusCode::BAD_REQUEST
    })?;

    let controller = find_form(&state, &form_id)?;
    controller.update_field(field, request.value);

    Ok(Json(controller.snapshot()))
}

// Submit the form and wait for the reservation to be accepted or rejected
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> Result<(StatusCode, Json<SubmitResponse>), StatusCode> {
    let controller = find_form(&state, &form_id)?;

    info!("Received reservation submission for form {}", form_id);
    let outcome = controller.submit().await;

    let status = match &outcome {
        SubmitOutcome::Submitted => {
            info!("Reservation for form {} submitted", form_id);
            StatusCode::OK
        }
        SubmitOutcome::Invalid(errors) => {
            info!(
                "Reservation for form {} failed validation on {:?}",
                form_id,
                errors.fields()
            );
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SubmitOutcome::InProgress => StatusCode::CONFLICT,
        SubmitOutcome::Failed(reason) => {
            error!("Reservation for form {} failed: {}", form_id, reason);
            StatusCode::BAD_GATEWAY
        }
        SubmitOutcome::Cancelled => StatusCode::GONE,
    };

    Ok((
        status,
        Json(SubmitResponse {
            outcome: outcome.as_str().to_string(),
            form: controller.snapshot(),
        }),
    ))
}

// Close a form, cancelling any pending submission or timer
pub async fn close_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> StatusCode {
    if state.registry.close(&form_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
