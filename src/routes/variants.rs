use crate::AppState;
use crate::db::repository::{self, NewVariant};
use crate::error::AppError;
use crate::extract::AppJson;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

pub fn routes() -> Router<AppState> {
    // Append-only surface: variants are listed and created over HTTP,
    // never updated or deleted.
    Router::new().route("/variants", get(list_variants).post(create_variant))
}

/// GET /variants
async fn list_variants(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let variants = repository::list_variants(&state.pool).await?;

    Ok(Json(json!({ "success": true, "variants": variants })))
}

/// JSON body for a variant create. Every field is `Option` so the required
/// check is presence, not truthiness: `stock: 0` and `price: 0` are values.
#[derive(Debug, Deserialize)]
struct CreateVariantBody {
    product_id: Option<i32>,
    color: Option<String>,
    size: Option<String>,
    stock: Option<i32>,
    price: Option<Decimal>,
}

impl CreateVariantBody {
    fn validate(self) -> Result<NewVariant, AppError> {
        let (Some(product_id), Some(color), Some(size), Some(stock), Some(price)) =
            (self.product_id, self.color, self.size, self.stock, self.price)
        else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        Ok(NewVariant {
            product_id,
            color,
            size,
            stock,
            price,
        })
    }
}

/// POST /variants
async fn create_variant(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateVariantBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let variant = body.validate()?;
    let created = repository::insert_variant(&state.pool, &variant).await?;

    tracing::info!(
        id = created.id,
        product_id = created.product_id,
        "Variant created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "variant": created })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_body() -> CreateVariantBody {
        CreateVariantBody {
            product_id: Some(1),
            color: Some("black".to_string()),
            size: Some("M".to_string()),
            stock: Some(10),
            price: Some(Decimal::new(2499, 2)),
        }
    }

    #[test]
    fn test_validate_accepts_full_body() {
        let variant = full_body().validate().unwrap();

        assert_eq!(variant.product_id, 1);
        assert_eq!(variant.color, "black");
        assert_eq!(variant.size, "M");
        assert_eq!(variant.stock, 10);
        assert_eq!(variant.price, Decimal::new(2499, 2));
    }

    #[test]
    fn test_each_required_field_is_checked() {
        let mut body = full_body();
        body.product_id = None;
        assert!(body.validate().is_err());

        let mut body = full_body();
        body.color = None;
        assert!(body.validate().is_err());

        let mut body = full_body();
        body.size = None;
        assert!(body.validate().is_err());

        let mut body = full_body();
        body.stock = None;
        assert!(body.validate().is_err());

        let mut body = full_body();
        body.price = None;
        assert!(matches!(
            body.validate(),
            Err(AppError::Validation(msg)) if msg == "Missing required fields"
        ));
    }

    #[test]
    fn test_zero_stock_and_price_are_valid() {
        let mut body = full_body();
        body.stock = Some(0);
        body.price = Some(Decimal::ZERO);

        let variant = body.validate().unwrap();
        assert_eq!(variant.stock, 0);
        assert_eq!(variant.price, Decimal::ZERO);
    }

    #[test]
    fn test_body_parses_from_json() {
        let body: CreateVariantBody = serde_json::from_str(
            r#"{"product_id": 3, "color": "red", "size": "L", "stock": 0, "price": 19.99}"#,
        )
        .unwrap();

        let variant = body.validate().unwrap();
        assert_eq!(variant.product_id, 3);
        assert_eq!(variant.stock, 0);
    }
}
