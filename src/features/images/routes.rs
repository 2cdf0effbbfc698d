use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::images::handlers::{
    delete_image, image_url, section_images, update_image_description, upload_image,
};
use crate::features::images::services::ImageService;
use crate::shared::constants::MAX_FILE_SIZE;

/// Create routes for the images feature
pub fn routes(image_service: Arc<ImageService>) -> Router {
    Router::new()
        .route(
            "/MeausrePro/img/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_image).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/MeausrePro/img/section/{sectionId}", get(section_images))
        .route(
            "/MeausrePro/img/description/{idx}",
            put(update_image_description),
        )
        .route("/MeausrePro/img/delete/{idx}", delete(delete_image))
        .route("/MeausrePro/img/url/{fileName}", get(image_url))
        .with_state(image_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CleanupPolicy;
    use crate::shared::test_helpers::{FakeObjectStore, InMemoryImages, InMemorySections};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    fn test_server() -> (Arc<FakeObjectStore>, TestServer) {
        let store = Arc::new(FakeObjectStore::new());
        let service = Arc::new(ImageService::new(
            Arc::new(InMemoryImages::new()),
            Arc::new(InMemorySections::with_ids(&[5])),
            store.clone(),
            CleanupPolicy::BestEffort,
        ));
        (store, TestServer::new(routes(service)).unwrap())
    }

    fn image_form(section_id: &str) -> MultipartForm {
        MultipartForm::new()
            .add_part(
                "file",
                Part::bytes(b"\xff\xd8\xff".to_vec())
                    .file_name("a.jpg")
                    .mime_type("image/jpeg"),
            )
            .add_text("sectionId", section_id)
    }

    #[tokio::test]
    async fn image_lifecycle_over_http() {
        let (store, server) = test_server();

        // Upload to section 5
        let response = server
            .post("/MeausrePro/img/upload")
            .multipart(image_form("5"))
            .await;
        // The upload surface reports success as a plain 200
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let image_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["sectionId"], 5);
        assert!(body["data"]["imgDes"].is_null());

        let img_src = body["data"]["imgSrc"].as_str().unwrap();
        let key = store.key_from_url(img_src).unwrap();
        assert!(key.starts_with("images/"));
        assert!(key.ends_with("_a.jpg"));

        // Listed under its section
        let listed: serde_json::Value = server.get("/MeausrePro/img/section/5").await.json();
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        // Delete attempts the blob and removes the row
        let deleted = server
            .delete(&format!("/MeausrePro/img/delete/{}", image_id))
            .await;
        deleted.assert_status_ok();
        assert_eq!(store.delete_attempts(), 1);

        let listed: serde_json::Value = server.get("/MeausrePro/img/section/5").await.json();
        assert!(listed["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_for_missing_section_is_404() {
        let (_, server) = test_server();

        let response = server
            .post("/MeausrePro/img/upload")
            .multipart(image_form("42"))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn description_update_for_missing_image_is_404() {
        let (_, server) = test_server();

        let response = server
            .put("/MeausrePro/img/description/999")
            .json(&serde_json::json!({ "imgDes": "caption" }))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn url_endpoint_is_pure() {
        let (store, server) = test_server();

        let response = server.get("/MeausrePro/img/url/a.jpg").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(
            body["data"]["url"],
            format!("{}/images/a.jpg", store.base_url())
        );
        assert_eq!(store.object_count(), 0);
    }
}
