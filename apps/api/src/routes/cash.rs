//! # Cash Ledger Routes
//!
//! Manual movements and the period report (movements, totals, daily flow).

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use balcao_core::{validation, CashMovement, MovementKind};
use balcao_db::repository::cash::generate_movement_id;
use balcao_db::LedgerTotals;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: String,
    pub kind: MovementKind,
    pub amount_centavos: i64,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl From<CashMovement> for MovementDto {
    fn from(m: CashMovement) -> Self {
        MovementDto {
            id: m.id,
            kind: m.kind,
            amount_centavos: m.amount_centavos,
            description: m.description,
            occurred_at: m.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFlow {
    pub date: String,
    pub entradas_centavos: i64,
    pub saidas_centavos: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDto {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub kpis: LedgerTotals,
    pub daily_flow: Vec<DailyFlow>,
    pub movements: Vec<MovementDto>,
    pub period: PeriodDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementPayload {
    pub kind: MovementKind,
    pub amount_centavos: i64,
    pub description: String,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("{field} must be formatted YYYY-MM-DD")))
}

/// GET /api/caixa?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD
///
/// Period report. Defaults to the last 7 days; both bounds are inclusive
/// whole days.
pub async fn report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportResponse>, ApiError> {
    let end_date = match &params.end_date {
        Some(value) => parse_date("endDate", value)?,
        None => Utc::now().date_naive(),
    };
    let start_date = match &params.start_date {
        Some(value) => parse_date("startDate", value)?,
        None => end_date - Duration::days(7),
    };

    let start = start_date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    let end = start_date
        .max(end_date)
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .expect("end of day is always valid")
        .and_utc();

    let movements = state.db.ledger().list_between(start, end).await?;
    let kpis = state.db.ledger().totals_between(start, end).await?;

    // Per-day grouping for the flow chart, oldest day first
    let mut by_day: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for movement in &movements {
        let key = movement.occurred_at.date_naive().to_string();
        let slot = by_day.entry(key).or_default();
        match movement.kind {
            MovementKind::Entrada => slot.0 += movement.amount_centavos,
            MovementKind::Saida => slot.1 += movement.amount_centavos,
        }
    }
    let daily_flow = by_day
        .into_iter()
        .map(|(date, (entradas, saidas))| DailyFlow {
            date,
            entradas_centavos: entradas,
            saidas_centavos: saidas,
        })
        .collect();

    Ok(Json(ReportResponse {
        kpis,
        daily_flow,
        movements: movements.into_iter().map(MovementDto::from).collect(),
        period: PeriodDto {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        },
    }))
}

/// POST /api/caixa
///
/// Appends a manual movement to the ledger.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<MovementPayload>,
) -> Result<(StatusCode, Json<MovementDto>), ApiError> {
    validation::validate_amount_centavos("valor", payload.amount_centavos)?;
    validation::validate_required_text("descricao", &payload.description, 500)?;

    let movement = CashMovement {
        id: generate_movement_id(),
        kind: payload.kind,
        amount_centavos: payload.amount_centavos,
        description: payload.description.trim().to_string(),
        occurred_at: Utc::now(),
    };

    state.db.ledger().insert(&movement).await?;
    info!(id = %movement.id, kind = %movement.kind, "Manual cash movement recorded");

    Ok((StatusCode::CREATED, Json(movement.into())))
}
