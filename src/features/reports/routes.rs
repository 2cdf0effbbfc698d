use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::reports::handlers::{
    delete_report, report_by_id, reports_by_section, upload_report,
};
use crate::features::reports::services::ReportService;
use crate::shared::constants::MAX_FILE_SIZE;

/// Create routes for the reports feature
pub fn routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/MeausrePro/report/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_report).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route(
            "/MeausrePro/report/reports/{sectionId}",
            get(reports_by_section),
        )
        .route("/MeausrePro/report/{reportId}", get(report_by_id))
        .route("/MeausrePro/report/delete/{idx}", delete(delete_report))
        .with_state(report_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CleanupPolicy;
    use crate::shared::test_helpers::{
        FakeObjectStore, InMemoryReports, InMemorySections, InMemoryUsers,
    };
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    fn test_server() -> TestServer {
        let service = Arc::new(ReportService::new(
            Arc::new(InMemoryReports::new()),
            Arc::new(InMemoryUsers::with_ids(&[1])),
            Arc::new(InMemorySections::with_ids(&[5])),
            Arc::new(FakeObjectStore::new()),
            CleanupPolicy::BestEffort,
        ));
        TestServer::new(routes(service)).unwrap()
    }

    fn report_form(section_id: &str, user_id: &str) -> MultipartForm {
        MultipartForm::new()
            .add_part(
                "file",
                Part::bytes(b"%PDF-1.4".to_vec())
                    .file_name("survey.pdf")
                    .mime_type("application/pdf"),
            )
            .add_text("sectionId", section_id)
            .add_text("userId", user_id)
    }

    #[tokio::test]
    async fn upload_then_list_then_delete() {
        let server = test_server();

        let response = server
            .post("/MeausrePro/report/upload")
            .multipart(report_form("5", "1"))
            .await;
        // The upload surface reports success as a plain 200
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let report_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["fileName"], "survey.pdf");

        let listed: serde_json::Value = server
            .get("/MeausrePro/report/reports/5")
            .await
            .json();
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
        assert_eq!(listed["meta"]["total"], 1);

        let deleted = server
            .delete(&format!("/MeausrePro/report/delete/{}", report_id))
            .await;
        deleted.assert_status_ok();

        // Second delete of the same id is a definitive not-found
        let again = server
            .delete(&format!("/MeausrePro/report/delete/{}", report_id))
            .await;
        again.assert_status_not_found();
    }

    #[tokio::test]
    async fn upload_for_missing_user_is_404() {
        let server = test_server();

        let response = server
            .post("/MeausrePro/report/upload")
            .multipart(report_form("5", "99"))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn upload_rejects_disallowed_mime_type() {
        let server = test_server();

        let form = MultipartForm::new()
            .add_part(
                "file",
                Part::bytes(b"#!/bin/sh".to_vec())
                    .file_name("evil.sh")
                    .mime_type("application/x-sh"),
            )
            .add_text("sectionId", "5")
            .add_text("userId", "1");

        let response = server.post("/MeausrePro/report/upload").multipart(form).await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn missing_report_lookup_returns_null_data() {
        let server = test_server();

        let response = server.get("/MeausrePro/report/999").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert!(body["data"].is_null());
    }
}
