//! # Sale Routes
//!
//! Sale registration (the checkout coordinator's HTTP face) and the
//! paginated sale history.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::customers::CustomerDto;
use crate::state::AppState;
use balcao_core::PaymentMethod;
use balcao_db::{DraftItem, SaleDraft, SaleRecord, TaxIdCipher};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDto {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_centavos: i64,
    pub line_total_centavos: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    pub id: String,
    pub total_centavos: i64,
    pub payment: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleItemDto>,
    /// Joined customer with decrypted CPF, when the sale has one.
    pub customer: Option<CustomerDto>,
}

impl SaleDto {
    fn from_record(record: SaleRecord, cipher: &TaxIdCipher) -> Result<Self, ApiError> {
        let customer = match record.customer {
            Some(c) => Some(CustomerDto::decrypted(c, cipher)?),
            None => None,
        };

        Ok(SaleDto {
            id: record.sale.id,
            total_centavos: record.sale.total_centavos,
            payment: record.sale.payment,
            created_at: record.sale.created_at,
            items: record
                .items
                .into_iter()
                .map(|i| SaleItemDto {
                    line_total_centavos: i.line_total().centavos(),
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price_centavos: i.unit_price_centavos,
                })
                .collect(),
            customer,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemRequest {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_centavos: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub total_centavos: i64,
    pub payment: PaymentMethod,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
}

impl From<SaleRequest> for SaleDraft {
    fn from(req: SaleRequest) -> Self {
        SaleDraft {
            total_centavos: req.total_centavos,
            payment: req.payment,
            customer_id: req.customer_id,
            items: req
                .items
                .into_iter()
                .map(|i| DraftItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price_centavos: i.unit_price_centavos,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub data: Vec<SaleDto>,
    pub current_page: u32,
    pub total_pages: i64,
    pub total_sales: i64,
    pub limit: u32,
}

/// POST /api/vendas
///
/// Registers a sale through the checkout coordinator. All effects - sale,
/// line items, stock decrements, customer total, ledger entry or receivable -
/// commit atomically; a failed request changes nothing.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<SaleRequest>,
) -> Result<(StatusCode, Json<SaleDto>), ApiError> {
    let record = state.db.checkout().register_sale(payload.into()).await?;
    let dto = SaleDto::from_record(record, &state.cipher)?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// GET /api/vendas?page=&limit=&search=
///
/// Paginated history, newest first. `search` matches an exact sale ID or a
/// customer-name substring.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let search = params.search.unwrap_or_default();

    let (records, total) = state.db.sales().history(page, limit, &search).await?;

    let mut data = Vec::with_capacity(records.len());
    for record in records {
        data.push(SaleDto::from_record(record, &state.cipher)?);
    }

    let total_pages = (total + i64::from(limit) - 1) / i64::from(limit);

    Ok(Json(HistoryResponse {
        data,
        current_page: page,
        total_pages,
        total_sales: total,
        limit,
    }))
}
