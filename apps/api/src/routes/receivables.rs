//! # Receivable Routes
//!
//! Listing with status filter, manual creation, settlement and cancellation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;
use balcao_core::{
    receivable_overdue, validation, Receivable, ReceivableStatus, DEFAULT_DUE_DAYS,
};
use balcao_db::repository::receivable::generate_receivable_id;
use balcao_db::{ReceivableEntry, ReceivableFilter};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableDto {
    pub id: String,
    pub sale_id: String,
    pub customer_id: String,
    pub amount_centavos: i64,
    pub description: String,
    pub issued_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub status: ReceivableStatus,
    /// Derived from the single overdue definition, so the display can never
    /// disagree with what reconciliation would decide.
    pub overdue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

impl ReceivableDto {
    fn from_receivable(r: Receivable) -> Self {
        let overdue = receivable_overdue(r.status, r.due_date, Utc::now());
        ReceivableDto {
            id: r.id,
            sale_id: r.sale_id,
            customer_id: r.customer_id,
            amount_centavos: r.amount_centavos,
            description: r.description,
            issued_at: r.issued_at,
            due_date: r.due_date,
            paid_at: r.paid_at,
            status: r.status,
            overdue,
            customer_name: None,
            customer_email: None,
        }
    }

    fn from_entry(entry: ReceivableEntry) -> Self {
        let mut dto = ReceivableDto::from_receivable(entry.receivable);
        dto.customer_name = Some(entry.customer_name);
        dto.customer_email = Some(entry.customer_email);
        dto
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivablePayload {
    pub sale_id: String,
    pub customer_id: String,
    pub amount_centavos: i64,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// GET /api/pendencias?filter=TODAS|ABERTAS|PAGAS|ATRASADAS
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReceivableDto>>, ApiError> {
    let filter = match params.filter.as_deref() {
        Some("ABERTAS") => ReceivableFilter::Abertas,
        Some("PAGAS") => ReceivableFilter::Pagas,
        Some("ATRASADAS") => ReceivableFilter::Atrasadas,
        _ => ReceivableFilter::Todas,
    };

    let entries = state.db.receivables().list(filter).await?;
    Ok(Json(
        entries.into_iter().map(ReceivableDto::from_entry).collect(),
    ))
}

/// POST /api/pendencias
///
/// Manual receivable creation. The due date defaults to 30 days out, the
/// description to a reference to the originating sale.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ReceivablePayload>,
) -> Result<(StatusCode, Json<ReceivableDto>), ApiError> {
    validation::validate_uuid("vendaId", &payload.sale_id)?;
    validation::validate_uuid("clienteId", &payload.customer_id)?;
    validation::validate_amount_centavos("valor", payload.amount_centavos)?;

    let now = Utc::now();
    let receivable = Receivable {
        id: generate_receivable_id(),
        sale_id: payload.sale_id.clone(),
        customer_id: payload.customer_id.clone(),
        amount_centavos: payload.amount_centavos,
        description: payload
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Venda #{}", payload.sale_id)),
        issued_at: now,
        due_date: payload
            .due_date
            .unwrap_or_else(|| now + Duration::days(DEFAULT_DUE_DAYS)),
        paid_at: None,
        status: ReceivableStatus::Aberta,
    };

    state.db.receivables().insert(&receivable).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReceivableDto::from_receivable(receivable)),
    ))
}

/// PATCH /api/pendencias/{id}/pagar
///
/// Settles the receivable: PAGA + paid date, plus the single ENTRADA for a
/// deferred sale. Reconciliation runs afterwards, so a customer clearing
/// their last overdue debt becomes active again in the same request.
pub async fn settle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReceivableDto>, ApiError> {
    let receivable = state.db.checkout().settle_receivable(&id).await?;
    Ok(Json(ReceivableDto::from_receivable(receivable)))
}

/// DELETE /api/pendencias/{id}
///
/// Cancels an open receivable. A settled one is protected by the state
/// machine and answers 422.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.checkout().cancel_receivable(&id).await?;
    Ok(Json(json!({ "message": "Pendência cancelada" })))
}
