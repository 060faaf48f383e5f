//! # Domain Types
//!
//! Core domain types used throughout Balcão.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   Receivable    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  payment        │   │  sale_id (FK)   │       │
//! │  │  quantity       │   │  total_centavos │   │  due_date       │       │
//! │  │  min_stock      │   │  customer_id?   │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │  CashMovement   │   │     enums       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  cpf (encrypted)│   │  kind (ENTRADA/ │   │  PaymentMethod  │       │
//! │  │  status         │   │        SAIDA)   │   │  ReceivableStatus│      │
//! │  │  total_purchases│   │  append-only    │   │  CustomerStatus │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (sku, email) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
///
/// `APrazo` is the deferred method: no money enters the till at sale time;
/// instead a [`Receivable`] tracks the debt until it is settled.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Dinheiro,
    /// Card payment (credit or debit, external terminal).
    Cartao,
    /// Instant bank transfer.
    Pix,
    /// Deferred payment - settled later through a receivable.
    APrazo,
}

impl PaymentMethod {
    /// Whether this method collects money immediately at sale time.
    ///
    /// Immediate methods book their own cash-ledger entry when the sale is
    /// registered; the deferred method books one only when its receivable is
    /// settled. Exactly one of the two ever happens for a given sale.
    #[inline]
    pub const fn is_immediate(&self) -> bool {
        !matches!(self, PaymentMethod::APrazo)
    }
}

/// Human label used in ledger descriptions.
impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Dinheiro => "Dinheiro",
            PaymentMethod::Cartao => "Cartão",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::APrazo => "A Prazo",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Receivable Status
// =============================================================================

/// The status of a receivable ("pendência").
///
/// ## State Machine
/// ```text
/// ABERTA ──settle──► PAGA
/// ABERTA ──reconcile (due date passed)──► ATRASADA ──settle──► PAGA
/// ABERTA / ATRASADA ──cancel──► <deleted>
///
/// No transition out of PAGA exists.
/// ```
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReceivableStatus {
    /// Debt is outstanding and within its payment window.
    Aberta,
    /// Debt has been settled.
    Paga,
    /// Debt is outstanding and past its due date.
    Atrasada,
}

impl ReceivableStatus {
    /// Whether the debt is still outstanding (open or overdue).
    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self, ReceivableStatus::Aberta | ReceivableStatus::Atrasada)
    }

    /// Whether a settle transition is allowed from this state.
    ///
    /// Settlement is terminal: once `PAGA`, a receivable never leaves that
    /// state, which also protects the ledger from double-booking.
    #[inline]
    pub const fn may_settle(&self) -> bool {
        self.is_open()
    }

    /// Whether a cancel transition is allowed from this state.
    ///
    /// A paid receivable already produced a ledger entry; deleting it would
    /// orphan that entry, so `PAGA → cancel` is rejected.
    #[inline]
    pub const fn may_cancel(&self) -> bool {
        self.is_open()
    }
}

impl fmt::Display for ReceivableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReceivableStatus::Aberta => "ABERTA",
            ReceivableStatus::Paga => "PAGA",
            ReceivableStatus::Atrasada => "ATRASADA",
        };
        write!(f, "{}", label)
    }
}

/// Single source of truth for "is this receivable overdue?".
///
/// Used by reconciliation, listing filters and display alike, so the stored
/// `ATRASADA` status and the live due-date comparison can never disagree:
/// a receivable is overdue when it is still open and its due date has passed.
#[inline]
pub fn receivable_overdue(
    status: ReceivableStatus,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    status.is_open() && due_date < now
}

// =============================================================================
// Customer Status
// =============================================================================

/// Whether a customer may buy on credit.
///
/// Derived data: the reconciliation service recomputes it from the
/// customer's overdue receivables. Level-triggered, both states
/// re-enterable at any time.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "PascalCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CustomerStatus {
    /// No overdue debt - customer in good standing.
    Ativo,
    /// At least one overdue receivable - customer blocked.
    Inativo,
}

impl Default for CustomerStatus {
    fn default() -> Self {
        CustomerStatus::Ativo
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CustomerStatus::Ativo => "Ativo",
            CustomerStatus::Inativo => "Inativo",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Cash Movement Kind
// =============================================================================

/// Direction of a cash-ledger movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Money entering the till.
    Entrada,
    /// Money leaving the till.
    Saida,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MovementKind::Entrada => "ENTRADA",
            MovementKind::Saida => "SAIDA",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Unit price in centavos.
    pub price_centavos: i64,

    /// On-hand quantity. Not driven negative by normal operation: the
    /// checkout coordinator refuses a line item that exceeds current stock.
    pub quantity: i64,

    /// Reorder threshold. Alerting only - never blocks a sale.
    pub min_stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_centavos(self.price_centavos)
    }

    /// Whether the product is at or below its reorder threshold.
    #[inline]
    pub fn needs_restock(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
///
/// The `cpf` field holds the *encrypted* national tax ID. Encryption and
/// decryption happen at the read/write boundary (the API layer); this type
/// and the persistence layer treat it as an opaque unique string.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Unique contact email.
    pub email: String,
    pub phone: Option<String>,
    /// Encrypted national tax ID, unique.
    pub cpf: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
    /// Free-text address reference ("next to the bakery").
    pub reference: Option<String>,
    /// Derived by the reconciliation service, not hand-edited.
    pub status: CustomerStatus,
    /// Lifetime purchase total in centavos. Incremented by each sale.
    pub total_purchases_centavos: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the lifetime purchase total as Money.
    #[inline]
    pub fn total_purchases(&self) -> Money {
        Money::from_centavos(self.total_purchases_centavos)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A registered sale. Immutable once created - there is no update path,
/// only create and read.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Total charged, in centavos. Equals the sum of line items minus any
    /// discount applied upstream.
    pub total_centavos: i64,
    pub payment: PaymentMethod,
    /// Walk-in sales have no customer.
    pub customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_centavos(self.total_centavos)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// The unit price is a snapshot taken at sale time, not a live reference to
/// the current product price.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_centavos: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_centavos(self.unit_price_centavos)
    }

    /// Returns the line total (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Receivable
// =============================================================================

/// A deferred-payment obligation ("pendência") owed by a customer,
/// tracked until paid or cancelled.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receivable {
    pub id: String,
    /// The originating sale.
    pub sale_id: String,
    pub customer_id: String,
    /// Amount due in centavos.
    pub amount_centavos: i64,
    pub description: String,
    /// When the debt was created.
    pub issued_at: DateTime<Utc>,
    /// Defaulted to `issued_at` + [`crate::DEFAULT_DUE_DAYS`] when not supplied.
    pub due_date: DateTime<Utc>,
    /// Null until settled.
    pub paid_at: Option<DateTime<Utc>>,
    pub status: ReceivableStatus,
}

impl Receivable {
    /// Returns the amount due as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_centavos(self.amount_centavos)
    }

    /// Whether this receivable is overdue as of `now`.
    /// Delegates to [`receivable_overdue`], the single derived-status
    /// definition.
    #[inline]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        receivable_overdue(self.status, self.due_date, now)
    }
}

// =============================================================================
// Cash Movement
// =============================================================================

/// An append-only record of money entering or leaving the till
/// ("movimentação de caixa"). Never updated or deleted through the core flow.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: String,
    pub kind: MovementKind,
    /// Always positive; direction is carried by `kind`.
    pub amount_centavos: i64,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl CashMovement {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_centavos(self.amount_centavos)
    }
}

// =============================================================================
// User
// =============================================================================

/// A back-office user account.
///
/// Only identity and the argon2 password hash - token/session mechanics
/// live outside this system.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// argon2 hash, never the plaintext.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_payment_method_immediate() {
        assert!(PaymentMethod::Dinheiro.is_immediate());
        assert!(PaymentMethod::Cartao.is_immediate());
        assert!(PaymentMethod::Pix.is_immediate());
        assert!(!PaymentMethod::APrazo.is_immediate());
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::APrazo.to_string(), "A Prazo");
        assert_eq!(PaymentMethod::Dinheiro.to_string(), "Dinheiro");
    }

    #[test]
    fn test_receivable_state_machine() {
        // Open states may settle and cancel
        assert!(ReceivableStatus::Aberta.may_settle());
        assert!(ReceivableStatus::Atrasada.may_settle());
        assert!(ReceivableStatus::Aberta.may_cancel());
        assert!(ReceivableStatus::Atrasada.may_cancel());

        // No transition out of PAGA
        assert!(!ReceivableStatus::Paga.may_settle());
        assert!(!ReceivableStatus::Paga.may_cancel());
    }

    #[test]
    fn test_receivable_overdue_derivation() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let tomorrow = now + Duration::days(1);

        // Open + past due = overdue, regardless of stored status
        assert!(receivable_overdue(ReceivableStatus::Aberta, yesterday, now));
        assert!(receivable_overdue(ReceivableStatus::Atrasada, yesterday, now));

        // Open but not yet due
        assert!(!receivable_overdue(ReceivableStatus::Aberta, tomorrow, now));

        // Paid is never overdue
        assert!(!receivable_overdue(ReceivableStatus::Paga, yesterday, now));
    }

    #[test]
    fn test_sale_item_line_total() {
        let item = SaleItem {
            id: "i".to_string(),
            sale_id: "s".to_string(),
            product_id: "p".to_string(),
            quantity: 3,
            unit_price_centavos: 7500,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().centavos(), 22500);
    }

    #[test]
    fn test_product_needs_restock() {
        let mut product = Product {
            id: "p".to_string(),
            name: "Teclado Mecânico".to_string(),
            sku: "TEC-001".to_string(),
            price_centavos: 25050,
            quantity: 30,
            min_stock: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!product.needs_restock());

        product.quantity = 10;
        assert!(product.needs_restock());
    }

    #[test]
    fn test_customer_status_default() {
        assert_eq!(CustomerStatus::default(), CustomerStatus::Ativo);
    }
}
