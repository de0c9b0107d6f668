//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::Product;
use crate::db::repository::ProductRepository;
use crate::ledger::parse_id;
use crate::utils::{AppError, AppResult};

/// GET /api/products - 商品列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product_id = parse_id(&id, "product")?;
    let product = ProductRepository::new(state.db.clone())
        .find_by_id(&product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(Json(product))
}
