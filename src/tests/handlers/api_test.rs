use axum::http::StatusCode;
use axum_test::{TestServer, TestServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::error::SubmissionError;
use crate::models::form::{FormSnapshot, OpenFormResponse, SubmissionStatus, SubmitResponse};
use crate::models::reservation::ReservationField;
use crate::routes::create_router;
use crate::services::submission::{MockReservationSubmitter, ReservationSubmitter, SimulatedSubmitter};
use crate::services::validator::{EMAIL_INVALID, NAME_REQUIRED};
use crate::tests::common::fixtures::valid_record;
use crate::{build_app_state, AppState};

/// API handler tests
#[cfg(test)]
mod api_tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            submission_delay: Duration::from_millis(10),
            success_display: Duration::from_secs(60),
            ..Settings::default()
        }
    }

    // Helper function to set up a test server around the given submitter
    fn setup_test_server_with(submitter: Arc<dyn ReservationSubmitter>) -> (TestServer, Arc<AppState>) {
        let app_state = build_app_state(&test_settings(), submitter);
        let router = create_router(Arc::clone(&app_state));

        let config = TestServerConfig::builder().mock_transport().build();
        let server = TestServer::new_with_config(router, config).unwrap();

        (server, app_state)
    }

    fn setup_test_server() -> (TestServer, Arc<AppState>) {
        let settings = test_settings();
        setup_test_server_with(Arc::new(SimulatedSubmitter::new(settings.submission_delay)))
    }

    async fn open_form(server: &TestServer) -> String {
        let response = server.post("/forms").await;
        response.assert_status(StatusCode::CREATED);
        response.json::<OpenFormResponse>().id
    }

    async fn fill_valid(server: &TestServer, id: &str) {
        let record = valid_record();
        for field in ReservationField::ALL {
            server
                .put(&format!("/forms/{}/fields/{}", id, field))
                .json(&json!({ "value": record.get(field) }))
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _) = setup_test_server();

        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_form_options() {
        let (server, _) = setup_test_server();

        let response = server.get("/reservation/options").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["guests"].as_array().unwrap().len(), 8);
        assert_eq!(body["guests"][1]["label"], "2 Guests");
        assert_eq!(body["occasions"][0]["value"], "birthday");
    }

    #[tokio::test]
    async fn test_open_form_is_empty() {
        let (server, state) = setup_test_server();

        let response = server.post("/forms").await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["form"]["status"], "idle");
        assert_eq!(body["form"]["record"]["specialRequests"], "");
        assert_eq!(body["form"]["errors"], json!({}));
        assert!(body["form"].get("submissionError").is_none());
        assert_eq!(state.registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_form_is_not_found() {
        let (server, _) = setup_test_server();

        server.get("/forms/missing").await.assert_status(StatusCode::NOT_FOUND);
        server
            .post("/forms/missing/submit")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .put("/forms/missing/fields/name")
            .json(&json!({ "value": "Ana" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let (server, _) = setup_test_server();
        let id = open_form(&server).await;

        server
            .put(&format!("/forms/{}/fields/table_number", id))
            .json(&json!({ "value": "12" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_field_returns_snapshot() {
        let (server, _) = setup_test_server();
        let id = open_form(&server).await;

        let response = server
            .put(&format!("/forms/{}/fields/specialRequests", id))
            .json(&json!({ "value": "High chair" }))
            .await;
        response.assert_status_ok();

        let snapshot: FormSnapshot = response.json();
        assert_eq!(snapshot.record.special_requests, "High chair");
        assert_eq!(snapshot.status, SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn test_invalid_submission_reports_errors() {
        let (server, _) = setup_test_server();
        let id = open_form(&server).await;

        server
            .put(&format!("/forms/{}/fields/email", id))
            .json(&json!({ "value": "not-an-email" }))
            .await
            .assert_status_ok();

        let response = server.post(&format!("/forms/{}/submit", id)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: SubmitResponse = response.json();
        assert_eq!(body.outcome, "invalid");
        assert_eq!(body.form.status, SubmissionStatus::Idle);
        assert_eq!(body.form.errors.name.as_deref(), Some(NAME_REQUIRED));
        assert_eq!(body.form.errors.email.as_deref(), Some(EMAIL_INVALID));

        // Typing into the email field clears just that message
        let snapshot: FormSnapshot = server
            .put(&format!("/forms/{}/fields/email", id))
            .json(&json!({ "value": "ana@example.com" }))
            .await
            .json();
        assert_eq!(snapshot.errors.email, None);
        assert_eq!(snapshot.errors.name.as_deref(), Some(NAME_REQUIRED));
        assert_eq!(snapshot.errors.len(), 4);
    }

    #[tokio::test]
    async fn test_valid_submission_resets_form() {
        let (server, _) = setup_test_server();
        let id = open_form(&server).await;
        fill_valid(&server, &id).await;

        let response = server.post(&format!("/forms/{}/submit", id)).await;
        response.assert_status_ok();

        let body: SubmitResponse = response.json();
        assert_eq!(body.outcome, "submitted");
        assert_eq!(body.form.status, SubmissionStatus::Success);
        assert!(body.form.record.is_empty());
        assert!(body.form.errors.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_bad_gateway() {
        let mut mock = MockReservationSubmitter::new();
        mock.expect_submit_reservation()
            .times(1)
            .returning(|_| Err(SubmissionError::Rejected { status: 503 }));
        let (server, _) = setup_test_server_with(Arc::new(mock));

        let id = open_form(&server).await;
        fill_valid(&server, &id).await;

        let response = server.post(&format!("/forms/{}/submit", id)).await;
        response.assert_status(StatusCode::BAD_GATEWAY);

        let body: Value = response.json();
        assert_eq!(body["outcome"], "failed");
        assert_eq!(body["form"]["status"], "idle");
        assert_eq!(body["form"]["record"]["name"], "Ana Rossi");
        assert_eq!(body["form"]["submissionError"], "Submission failed, please try again");
    }

    #[tokio::test]
    async fn test_open_form_refused_when_full() {
        let settings = Settings {
            max_open_forms: 1,
            ..test_settings()
        };
        let app_state = build_app_state(
            &settings,
            Arc::new(SimulatedSubmitter::new(settings.submission_delay)),
        );
        let config = TestServerConfig::builder().mock_transport().build();
        let server = TestServer::new_with_config(create_router(Arc::clone(&app_state)), config).unwrap();

        let id = open_form(&server).await;
        server.post("/forms").await.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        // Closing a form frees its slot
        server
            .delete(&format!("/forms/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server.post("/forms").await.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_close_form() {
        let (server, state) = setup_test_server();
        let id = open_form(&server).await;

        server
            .delete(&format!("/forms/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        assert!(state.registry.is_empty());

        server
            .get(&format!("/forms/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format!("/forms/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
