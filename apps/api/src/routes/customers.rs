//! # Customer Routes
//!
//! CRUD over customers plus the status recompute endpoint.
//!
//! The CPF travels encrypted by default: the listing returns the stored
//! blob, and only the single-customer read (and the sale history) decrypts.
//! Creation and update encrypt before anything touches the store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use balcao_core::{validation, Customer, CustomerStatus};
use balcao_db::repository::customer::generate_customer_id;
use balcao_db::{StatusReport, TaxIdCipher};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Encrypted blob or plaintext, depending on the route.
    pub cpf: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub reference: Option<String>,
    pub status: CustomerStatus,
    pub total_purchases_centavos: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerDto {
    /// Maps a customer with the CPF as stored (encrypted).
    pub fn encrypted(c: Customer) -> Self {
        CustomerDto {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            cpf: c.cpf,
            street: c.street,
            district: c.district,
            city: c.city,
            state: c.state,
            reference: c.reference,
            status: c.status,
            total_purchases_centavos: c.total_purchases_centavos,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }

    /// Maps a customer with the CPF decrypted for display.
    pub fn decrypted(c: Customer, cipher: &TaxIdCipher) -> Result<Self, ApiError> {
        let plaintext = cipher.decrypt(&c.cpf)?;
        let mut dto = CustomerDto::encrypted(c);
        dto.cpf = plaintext;
        Ok(dto)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Plaintext CPF; encrypted before it reaches the store.
    pub cpf: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub reference: Option<String>,
}

impl CustomerPayload {
    fn validate(&self) -> Result<(), ApiError> {
        validation::validate_required_text("nome", &self.name, 200)?;
        validation::validate_email(&self.email)?;
        validation::validate_cpf(&self.cpf)?;
        validation::validate_required_text("endereco.rua", &self.street, 200)?;
        validation::validate_required_text("endereco.bairro", &self.district, 100)?;
        validation::validate_required_text("endereco.cidade", &self.city, 100)?;
        validation::validate_required_text("endereco.estado", &self.state, 50)?;
        Ok(())
    }
}

/// GET /api/clientes
///
/// The CPF stays encrypted here; decryption happens only in routes that
/// need the plaintext.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CustomerDto>>, ApiError> {
    let customers = state.db.customers().list().await?;
    Ok(Json(
        customers.into_iter().map(CustomerDto::encrypted).collect(),
    ))
}

/// GET /api/clientes/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerDto>, ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &id))?;
    Ok(Json(CustomerDto::decrypted(customer, &state.cipher)?))
}

/// POST /api/clientes
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> Result<(StatusCode, Json<CustomerDto>), ApiError> {
    payload.validate()?;

    let now = Utc::now();
    let customer = Customer {
        id: generate_customer_id(),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone.clone(),
        cpf: state.cipher.encrypt(payload.cpf.trim())?,
        street: payload.street.trim().to_string(),
        district: payload.district.trim().to_string(),
        city: payload.city.trim().to_string(),
        state: payload.state.trim().to_string(),
        reference: payload.reference.clone(),
        status: CustomerStatus::Ativo,
        total_purchases_centavos: 0,
        created_at: now,
        updated_at: now,
    };

    state.db.customers().insert(&customer).await?;
    info!(id = %customer.id, "Customer created");

    Ok((StatusCode::CREATED, Json(CustomerDto::encrypted(customer))))
}

/// PUT /api/clientes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Json<CustomerDto>, ApiError> {
    payload.validate()?;

    let existing = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &id))?;

    let customer = Customer {
        id: id.clone(),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone.clone(),
        cpf: state.cipher.encrypt(payload.cpf.trim())?,
        street: payload.street.trim().to_string(),
        district: payload.district.trim().to_string(),
        city: payload.city.trim().to_string(),
        state: payload.state.trim().to_string(),
        reference: payload.reference.clone(),
        status: existing.status,
        total_purchases_centavos: existing.total_purchases_centavos,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    state.db.customers().update(&customer).await?;
    Ok(Json(CustomerDto::encrypted(customer)))
}

/// DELETE /api/clientes/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.customers().delete(&id).await?;
    info!(id = %id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/clientes/{id}/atualizar-status
///
/// Standalone reconciliation: recomputes `Ativo`/`Inativo` from the
/// customer's overdue receivables. Callable at any time.
pub async fn reconcile_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusReport>, ApiError> {
    let report = state.db.reconciliation().reconcile_customer(&id).await?;
    Ok(Json(report))
}
