//! # Route Handlers
//!
//! One module per resource, mirroring the screens of the back office:
//! products, customers, sales, receivables, cash ledger, users.

pub mod cash;
pub mod customers;
pub mod products;
pub mod receivables;
pub mod sales;
pub mod users;

use axum::extract::State;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Products
        .route("/api/produtos", get(products::list).post(products::create))
        .route("/api/produtos/alertas", get(products::low_stock))
        .route(
            "/api/produtos/{id}",
            get(products::get).put(products::update).delete(products::remove),
        )
        // Customers
        .route("/api/clientes", get(customers::list).post(customers::create))
        .route(
            "/api/clientes/{id}",
            get(customers::get).put(customers::update).delete(customers::remove),
        )
        .route(
            "/api/clientes/{id}/atualizar-status",
            patch(customers::reconcile_status),
        )
        // Sales
        .route("/api/vendas", get(sales::history).post(sales::register))
        // Receivables
        .route(
            "/api/pendencias",
            get(receivables::list).post(receivables::create),
        )
        .route("/api/pendencias/{id}/pagar", patch(receivables::settle))
        .route("/api/pendencias/{id}", delete(receivables::cancel))
        // Cash ledger
        .route("/api/caixa", get(cash::report).post(cash::create))
        // Users
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/change-password", post(users::change_password))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness/readiness probe.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = state.db.health_check().await;
    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
    }))
}
