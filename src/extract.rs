use crate::error::AppError;
use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, rejection::JsonRejection},
};

/// JSON extractor whose rejection speaks the API's error envelope.
///
/// axum's built-in rejection answers malformed bodies with plain text;
/// wrapping it keeps body-parse failures on the same `{success:false,
/// error}` path as every other handler error.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|err| {
            AppError::Validation(format!("Invalid JSON body: {}", err.body_text()))
        })?;

        Ok(AppJson(value))
    }
}

/// Multipart extractor with enveloped rejections (missing or wrong
/// content type).
pub struct AppMultipart(pub Multipart);

impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(AppMultipart)
            .map_err(|err| {
                AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
            })
    }
}
