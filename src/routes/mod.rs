pub mod products;
pub mod variants;

use crate::AppState;
use crate::error::AppError;
use crate::extract::AppMultipart;
use crate::uploads;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Largest accepted request body (covers multipart image uploads).
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Full application router: JSON API, upload endpoint, and the static
/// side-channel serving stored images straight off disk.
///
/// Layers, outermost first: request tracing, permissive CORS, body-size
/// limit. Every handler error funnels through [`AppError::into_response`].
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/test-db", get(test_db))
        .merge(products::routes())
        .merge(variants::routes())
        .nest_service(uploads::PUBLIC_ROUTE, ServeDir::new(state.uploads.dir()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /upload
///
/// Stores the multipart `image` field and answers with its public URL:
/// absolute when `PUBLIC_BASE_URL` is configured, relative otherwise.
async fn upload(
    State(state): State<AppState>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<serde_json::Value>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Invalid multipart body: {err}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Validation(format!("Invalid multipart body: {err}")))?;

        if file_name.is_empty() && bytes.is_empty() {
            break;
        }

        let stored = state.uploads.store(&file_name, &bytes).await?;
        let url = match &state.public_base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), stored.relative_path),
            None => stored.relative_path,
        };

        return Ok(Json(json!({ "success": true, "url": url })));
    }

    Err(AppError::MissingUpload)
}

/// GET /test-db
///
/// Liveness probe: one `SELECT NOW()` round-trip through the pool.
async fn test_db(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let time = crate::db::server_time(&state.pool).await?;

    Ok(Json(json!({ "success": true, "time": time })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploads::UploadStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    fn test_state(dir: &std::path::Path) -> AppState {
        // Lazy pool: nothing here connects unless a handler queries it.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap();

        AppState {
            pool,
            uploads: UploadStore::new(dir),
            public_base_url: None,
        }
    }

    fn multipart_body(boundary: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    #[tokio::test]
    async fn test_upload_stores_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let app = routes(test_state(dir.path()));

        let boundary = "test-boundary";
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(multipart_body(boundary, "shirt.png", b"png!")))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(body["success"], true);
        let url = body["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/"), "got {url}");
        assert!(url.ends_with(".png"));

        let file_name = url.strip_prefix("/uploads/").unwrap();
        assert!(dir.path().join(file_name).is_file());
    }

    #[tokio::test]
    async fn test_upload_without_file_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = routes(test_state(dir.path()));

        let boundary = "test-boundary";
        let body = format!("--{boundary}--\r\n");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_uploaded_file_is_served_back() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state.uploads.ensure_dir().await.unwrap();
        let stored = state.uploads.store("a.png", b"image bytes").await.unwrap();

        let app = routes(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(&stored.relative_path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"image bytes");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = routes(test_state(dir.path()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
