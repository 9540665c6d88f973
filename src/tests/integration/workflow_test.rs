use axum_test::{TestServer, TestServerConfig};
use chrono::{Datelike, Local};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::routes::create_router;
use crate::{build_app_state, build_submitter, AppState};

/// End-to-end workflow tests
#[cfg(test)]
mod workflow_tests {
    use super::*;

    // Helper function to set up a test environment with fast timers
    fn setup_test_environment() -> (TestServer, Arc<AppState>) {
        let settings = Settings {
            submission_delay: Duration::from_millis(20),
            success_display: Duration::from_millis(300),
            ..Settings::default()
        };

        // No endpoint configured, so this is the simulated backend
        let submitter = build_submitter(&settings);
        let app_state = build_app_state(&settings, submitter);
        let app = create_router(Arc::clone(&app_state));

        let config = TestServerConfig::builder().mock_transport().build();
        let server = TestServer::new_with_config(app, config).unwrap();

        (server, app_state)
    }

    // A date next year, so the test keeps passing as time goes by
    fn future_date() -> String {
        format!("{}-03-30", Local::now().year() + 1)
    }

    async fn set_field(server: &TestServer, id: &str, field: &str, value: &str) -> Value {
        let response = server
            .put(&format!("/forms/{}/fields/{}", id, field))
            .json(&json!({ "value": value }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    #[tokio::test]
    async fn test_reservation_workflow() {
        let (server, state) = setup_test_environment();

        // Step 1: open a form
        let opened: Value = server.post("/forms").await.json();
        let id = opened["id"].as_str().unwrap().to_string();

        // Step 2: guest enters only a name and submits
        set_field(&server, &id, "name", "Ana").await;
        let response = server.post(&format!("/forms/{}/submit", id)).await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        let mut failed: Vec<&str> = body["form"]["errors"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        failed.sort_unstable();
        assert_eq!(failed, ["date", "email", "guests", "time"]);

        // Step 3: guest fixes each field; errors disappear one by one
        let snapshot = set_field(&server, &id, "email", "ana@example.com").await;
        assert!(snapshot["errors"].get("email").is_none());
        assert!(snapshot["errors"].get("date").is_some());

        set_field(&server, &id, "date", &future_date()).await;
        set_field(&server, &id, "time", "20:00").await;
        set_field(&server, &id, "occasion", "birthday").await;
        let snapshot = set_field(&server, &id, "guests", "4").await;
        assert_eq!(snapshot["errors"], json!({}));
        assert_eq!(snapshot["record"]["guests"], "4");

        // Step 4: submit succeeds and the form resets
        let response = server.post(&format!("/forms/{}/submit", id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["outcome"], "submitted");
        assert_eq!(body["form"]["status"], "success");
        assert_eq!(body["form"]["record"]["name"], "");
        assert_eq!(body["form"]["record"]["occasion"], "");

        // Step 5: the success message goes away by itself
        tokio::time::sleep(Duration::from_millis(800)).await;
        let snapshot: Value = server.get(&format!("/forms/{}", id)).await.json();
        assert_eq!(snapshot["status"], "idle");
        assert_eq!(snapshot["errors"], json!({}));

        // Step 6: the page closes the form
        server
            .delete(&format!("/forms/{}", id))
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn test_past_date_is_rejected() {
        let (server, _) = setup_test_environment();
        let opened: Value = server.post("/forms").await.json();
        let id = opened["id"].as_str().unwrap().to_string();

        set_field(&server, &id, "date", "2001-01-01").await;
        let body: Value = server.post(&format!("/forms/{}/submit", id)).await.json();

        assert_eq!(body["form"]["errors"]["date"], "Please select a future date");
    }

    #[tokio::test]
    async fn test_forms_do_not_share_state() {
        let (server, _) = setup_test_environment();
        let first: Value = server.post("/forms").await.json();
        let second: Value = server.post("/forms").await.json();
        let first_id = first["id"].as_str().unwrap();
        let second_id = second["id"].as_str().unwrap();

        set_field(&server, first_id, "name", "Ana").await;
        server.post(&format!("/forms/{}/submit", second_id)).await;

        let first: Value = server.get(&format!("/forms/{}", first_id)).await.json();
        let second: Value = server.get(&format!("/forms/{}", second_id)).await.json();

        assert_eq!(first["record"]["name"], "Ana");
        assert_eq!(first["errors"], json!({}));
        assert_eq!(second["record"]["name"], "");
        assert_eq!(second["errors"]["name"], "Name is required");
    }
}
