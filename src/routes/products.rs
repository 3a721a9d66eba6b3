use crate::AppState;
use crate::db::repository::{self, NewProduct};
use crate::error::AppError;
use crate::extract::AppMultipart;
use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde_json::json;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
}

/// GET /products
///
/// Rows in storage order, wrapped in the standard envelope.
async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let products = repository::list_products(&state.pool).await?;

    Ok(Json(json!({ "success": true, "products": products })))
}

/// POST /products
///
/// Multipart fields `collection_id`, `name`, `base_price` (required) plus
/// `description`, `vendor_url` (optional) and an optional `image` file.
/// Validation runs before the image is written, so a 400 stores nothing.
async fn create_product(
    State(state): State<AppState>,
    AppMultipart(multipart): AppMultipart,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let form = ProductForm::from_multipart(multipart).await?;
    let mut product = form.validate()?;

    // Create takes its image from an uploaded file or not at all; a bare
    // image_url text field only means something on update.
    if let Some(image) = &form.image {
        let stored = state.uploads.store(&image.file_name, &image.bytes).await?;
        product.image_url = Some(stored.relative_path);
    }

    let created = repository::insert_product(&state.pool, &product).await?;

    tracing::info!(id = created.id, name = %created.name, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": created })),
    ))
}

/// PUT /products/{id}
///
/// Same fields as create. A fresh upload wins; otherwise an explicitly
/// re-submitted `image_url` field keeps the previous file; absent both, the
/// column is cleared.
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppMultipart(multipart): AppMultipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let form = ProductForm::from_multipart(multipart).await?;
    let mut product = form.validate()?;

    product.image_url = match &form.image {
        Some(image) => {
            let stored = state.uploads.store(&image.file_name, &image.bytes).await?;
            Some(stored.relative_path)
        }
        None => form.image_url.clone(),
    };

    let updated = repository::update_product(&state.pool, id, &product)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    tracing::info!(id = updated.id, "Product updated");

    Ok(Json(json!({ "success": true, "product": updated })))
}

/// DELETE /products/{id}
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = repository::delete_product(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::NotFound("Product"));
    }

    tracing::info!(id, "Product deleted");

    Ok(Json(
        json!({ "success": true, "message": "Product deleted successfully" }),
    ))
}

/// Raw multipart fields for a product create/update, collected before any
/// validation. Unknown fields are ignored, like the original form parser.
#[derive(Debug, Default)]
struct ProductForm {
    collection_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    base_price: Option<String>,
    vendor_url: Option<String>,
    image_url: Option<String>,
    image: Option<ImagePart>,
}

#[derive(Debug)]
struct ImagePart {
    file_name: String,
    bytes: axum::body::Bytes,
}

impl ProductForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(bad_multipart)?;

                    // Browsers send an empty image part when no file was
                    // chosen; treat that as absent.
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.image = Some(ImagePart { file_name, bytes });
                    }
                }
                "collection_id" => form.collection_id = Some(text(field).await?),
                "name" => form.name = Some(text(field).await?),
                "description" => form.description = Some(text(field).await?),
                "base_price" => form.base_price = Some(text(field).await?),
                "vendor_url" => form.vendor_url = Some(text(field).await?),
                "image_url" => form.image_url = Some(text(field).await?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Presence-checked, parsed column values. Zero is a value: only an
    /// absent field fails the required check.
    fn validate(&self) -> Result<NewProduct, AppError> {
        let (Some(collection_id), Some(name), Some(base_price)) =
            (&self.collection_id, &self.name, &self.base_price)
        else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        if name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }

        let collection_id = collection_id
            .parse::<i32>()
            .map_err(|_| AppError::Validation("collection_id must be an integer".to_string()))?;
        let base_price = base_price
            .parse::<Decimal>()
            .map_err(|_| AppError::Validation("base_price must be a number".to_string()))?;

        Ok(NewProduct {
            collection_id,
            name: name.clone(),
            description: self.description.clone(),
            base_price,
            image_url: None,
            vendor_url: self.vendor_url.clone(),
        })
    }
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(bad_multipart)
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {err}"))
}
