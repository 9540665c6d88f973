use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{
    close_form, form_options, get_form, open_form, submit_form, update_field, AppState,
};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let health_route = Router::new().route("/health", get(health_check));

    let form_routes = Router::new()
        .route("/reservation/options", get(form_options))
        .route("/forms", post(open_form))
        .route("/forms/:form_id", get(get_form).delete(close_form))
        .route("/forms/:form_id/fields/:field", put(update_field))
        .route("/forms/:form_id/submit", post(submit_form));

    info!("Reservation form routes enabled");

    Router::new()
        .merge(health_route)
        .merge(form_routes)
        .with_state(app_state)
}
