//! # Product Routes
//!
//! CRUD over the inventory plus the low-stock alert listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use balcao_core::{validation, Product, DEFAULT_MIN_STOCK};
use balcao_db::repository::product::generate_product_id;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub price_centavos: i64,
    pub quantity: i64,
    pub min_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            name: p.name,
            sku: p.sku,
            price_centavos: p.price_centavos,
            quantity: p.quantity,
            min_stock: p.min_stock,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub sku: String,
    pub price_centavos: i64,
    pub quantity: i64,
    pub min_stock: Option<i64>,
}

impl ProductPayload {
    fn validate(&self) -> Result<(), ApiError> {
        validation::validate_required_text("nome", &self.name, 200)?;
        validation::validate_sku(&self.sku)?;
        validation::validate_price_centavos(self.price_centavos)?;
        Ok(())
    }
}

/// GET /api/produtos
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// GET /api/produtos/alertas
pub async fn low_stock(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.db.products().low_stock().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// GET /api/produtos/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    Ok(Json(product.into()))
}

/// POST /api/produtos
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    payload.validate()?;

    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        name: payload.name.trim().to_string(),
        sku: payload.sku.trim().to_string(),
        price_centavos: payload.price_centavos,
        quantity: payload.quantity.max(0),
        min_stock: payload.min_stock.unwrap_or(DEFAULT_MIN_STOCK),
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;
    info!(id = %product.id, sku = %product.sku, "Product created");

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /api/produtos/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductDto>, ApiError> {
    payload.validate()?;

    let existing = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    let product = Product {
        id: id.clone(),
        name: payload.name.trim().to_string(),
        sku: payload.sku.trim().to_string(),
        price_centavos: payload.price_centavos,
        quantity: payload.quantity,
        min_stock: payload.min_stock.unwrap_or(existing.min_stock),
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    state.db.products().update(&product).await?;

    let reloaded = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    Ok(Json(reloaded.into()))
}

/// DELETE /api/produtos/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.products().delete(&id).await?;
    info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
