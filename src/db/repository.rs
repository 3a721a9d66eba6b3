use crate::db::models::{Product, Variant};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Fetch all products.
///
/// Rows come back in storage order: the API exposes no explicit ordering,
/// so none is imposed here.
///
/// # Errors
/// Returns error if the database query fails
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, collection_id, name, description, base_price, image_url, vendor_url
        FROM products
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Column values for inserting or updating a product row
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub collection_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub image_url: Option<String>,
    pub vendor_url: Option<String>,
}

/// Insert a product and return the stored row.
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `product` - Column values for the new row
///
/// # Errors
/// Returns error if the insert fails (e.g. unknown collection_id when the
/// schema enforces the foreign key)
pub async fn insert_product(pool: &PgPool, product: &NewProduct) -> Result<Product, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO products (collection_id, name, description, base_price, image_url, vendor_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, collection_id, name, description, base_price, image_url, vendor_url
        "#,
    )
    .bind(product.collection_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.base_price)
    .bind(&product.image_url)
    .bind(&product.vendor_url)
    .fetch_one(pool)
    .await
}

/// Update an existing product, replacing every mutable column.
///
/// # Returns
/// The updated row, or `None` when no product has the given id
///
/// # Errors
/// Returns error if the database update fails
pub async fn update_product(
    pool: &PgPool,
    id: i32,
    product: &NewProduct,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE products
        SET collection_id = $1, name = $2, description = $3, base_price = $4,
            image_url = $5, vendor_url = $6
        WHERE id = $7
        RETURNING id, collection_id, name, description, base_price, image_url, vendor_url
        "#,
    )
    .bind(product.collection_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.base_price)
    .bind(&product.image_url)
    .bind(&product.vendor_url)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a product.
///
/// # Returns
/// `true` when a row was deleted, `false` when the id matched nothing
///
/// # Errors
/// Returns error if the database delete fails
pub async fn delete_product(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch all variants, storage order.
///
/// # Errors
/// Returns error if the database query fails
pub async fn list_variants(pool: &PgPool) -> Result<Vec<Variant>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, product_id, color, size, stock, price
        FROM variants
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Column values for inserting a variant row
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub product_id: i32,
    pub color: String,
    pub size: String,
    pub stock: i32,
    pub price: Decimal,
}

/// Insert a variant and return the stored row.
///
/// Referential integrity of `product_id` is the schema's concern: when the
/// foreign key exists the insert fails and surfaces as a database error.
///
/// # Errors
/// Returns error if the insert fails
pub async fn insert_variant(pool: &PgPool, variant: &NewVariant) -> Result<Variant, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO variants (product_id, color, size, stock, price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, product_id, color, size, stock, price
        "#,
    )
    .bind(variant.product_id)
    .bind(&variant.color)
    .bind(&variant.size)
    .bind(variant.stock)
    .bind(variant.price)
    .fetch_one(pool)
    .await
}
