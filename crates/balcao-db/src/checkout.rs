//! # Checkout Coordinator
//!
//! The transactional core: sale registration, receivable settlement and
//! receivable cancellation. Every multi-entity update here is a single
//! SQLite transaction - either all effects happen or none do.
//!
//! ## Sale Registration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    register_sale (one transaction)                      │
//! │                                                                         │
//! │  validate draft ── ValidationError? → reject, zero side effects        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── INSERT sale                                                       │
//! │  ├── per item: INSERT sale_item                                        │
//! │  │             UPDATE products SET quantity = quantity - n             │
//! │  │                    WHERE quantity >= n   ← oversell guard           │
//! │  ├── customer? UPDATE customers SET total += sale total                │
//! │  ├── immediate payment? INSERT cash_movements (ENTRADA)                │
//! │  ├── deferred + customer? INSERT receivables (ABERTA, due +30d)        │
//! │  └── re-read sale with items + customer                                │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A reader never observes a sale with some stock decremented and some   │
//! │  not, and a deferred sale never exists without its receivable.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ledger Exclusivity
//! An immediate-payment sale books its ENTRADA at sale time and never again.
//! A deferred sale books nothing at sale time; its single ENTRADA is written
//! when the receivable is settled. The settlement guard on the sale's payment
//! method keeps a receivable that was somehow attached to a non-deferred sale
//! from double-booking the till.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::reconcile::ReconciliationService;
use crate::repository::cash::{generate_movement_id, LedgerRepository};
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::receivable::{generate_receivable_id, ReceivableRepository};
use crate::repository::sale::{
    generate_sale_id, generate_sale_item_id, SaleRecord, SaleRepository,
};
use balcao_core::{
    validation, CashMovement, CoreError, MovementKind, PaymentMethod, Receivable,
    ReceivableStatus, Sale, SaleItem, ValidationError, DEFAULT_DUE_DAYS,
};

/// Name used in ledger descriptions for walk-in sales.
const WALK_IN_CUSTOMER: &str = "Consumidor Final";

// =============================================================================
// Errors
// =============================================================================

/// Errors from checkout operations.
///
/// Business rule violations (validation, insufficient stock, bad state
/// transitions) and store failures stay distinguishable so the API layer can
/// map them to the right status codes.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

// =============================================================================
// Sale Draft
// =============================================================================

/// One line of a sale draft.
#[derive(Debug, Clone)]
pub struct DraftItem {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price charged, in centavos. Captured as the line item's price
    /// snapshot - deliberately not re-read from the product row, so a price
    /// negotiated at the counter is what history records.
    pub unit_price_centavos: i64,
}

/// Input to [`CheckoutCoordinator::register_sale`].
///
/// The payment method's presence is enforced by the type system; the rest is
/// validated explicitly before any store mutation.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    /// Total charged, in centavos. The client applies any discount upstream;
    /// the server accepts the total as given.
    pub total_centavos: i64,
    pub payment: PaymentMethod,
    pub customer_id: Option<String>,
    pub items: Vec<DraftItem>,
}

impl SaleDraft {
    /// Validates the draft. Runs before any store mutation, so a rejected
    /// draft has zero side effects.
    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_amount_centavos("total", self.total_centavos)?;

        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "itens".to_string(),
            });
        }

        if let Some(customer_id) = &self.customer_id {
            validation::validate_uuid("clienteId", customer_id)?;
        }

        for item in &self.items {
            validation::validate_uuid("produtoId", &item.product_id)?;
            validation::validate_quantity(item.quantity)?;
            validation::validate_price_centavos(item.unit_price_centavos)?;
        }

        Ok(())
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Coordinates the atomic multi-entity updates of the sale and receivable
/// workflows.
///
/// Constructed per call site from [`crate::Database::checkout`]; holds only a
/// pool clone. All locking is delegated to SQLite's transaction machinery -
/// the coordinator never implements its own.
#[derive(Debug, Clone)]
pub struct CheckoutCoordinator {
    pool: SqlitePool,
}

impl CheckoutCoordinator {
    /// Creates a new coordinator over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutCoordinator { pool }
    }

    /// Registers a sale as a single atomic unit of work.
    ///
    /// ## What This Does (all-or-nothing)
    /// 1. Creates the sale row
    /// 2. Creates one line item per draft item and decrements each product's
    ///    stock with an oversell guard
    /// 3. Increments the customer's lifetime purchase total, if a customer
    ///    was given
    /// 4. Books the ENTRADA ledger entry for immediate payment methods
    /// 5. Creates the ABERTA receivable (due in [`DEFAULT_DUE_DAYS`] days)
    ///    for a deferred sale with a customer
    /// 6. Re-reads the sale with items and customer for the response
    ///
    /// ## Failure Modes
    /// * `ValidationError` - bad input, nothing written
    /// * `CoreError::InsufficientStock` - a line item exceeds on-hand stock;
    ///   the whole unit rolls back
    /// * `DbError::NotFound` - unknown product or customer; rolls back
    pub async fn register_sale(&self, draft: SaleDraft) -> Result<SaleRecord, CheckoutError> {
        draft.validate()?;

        let now = Utc::now();
        let sale_id = generate_sale_id();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let sale = Sale {
            id: sale_id.clone(),
            total_centavos: draft.total_centavos,
            payment: draft.payment,
            customer_id: draft.customer_id.clone(),
            created_at: now,
        };
        SaleRepository::insert_in_tx(&mut tx, &sale).await?;

        for item in &draft.items {
            let sale_item = SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale_id.clone(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price_centavos: item.unit_price_centavos,
                created_at: now,
            };
            SaleRepository::insert_item_in_tx(&mut tx, &sale_item).await?;

            let applied =
                ProductRepository::decrement_stock_in_tx(&mut tx, &item.product_id, item.quantity)
                    .await?;
            if !applied {
                // Zero rows matched: the product is missing or short on
                // stock. Dropping the transaction rolls everything back.
                let err = match ProductRepository::get_by_id_in_tx(&mut tx, &item.product_id)
                    .await?
                {
                    None => CheckoutError::Db(DbError::not_found("Product", &item.product_id)),
                    Some(_) => CheckoutError::Core(CoreError::InsufficientStock {
                        product_id: item.product_id.clone(),
                        requested: item.quantity,
                    }),
                };
                return Err(err);
            }
        }

        let customer_name = match &draft.customer_id {
            Some(customer_id) => {
                CustomerRepository::increment_total_in_tx(
                    &mut tx,
                    customer_id,
                    draft.total_centavos,
                )
                .await?;
                CustomerRepository::get_by_id_in_tx(&mut tx, customer_id)
                    .await?
                    .map(|c| c.name)
            }
            None => None,
        };

        if draft.payment.is_immediate() {
            let movement = CashMovement {
                id: generate_movement_id(),
                kind: MovementKind::Entrada,
                amount_centavos: draft.total_centavos,
                description: format!(
                    "Venda #{} | Cliente: {} | {}",
                    sale_id,
                    customer_name.as_deref().unwrap_or(WALK_IN_CUSTOMER),
                    draft.payment
                ),
                occurred_at: now,
            };
            LedgerRepository::insert_in_tx(&mut tx, &movement).await?;
        } else if let Some(customer_id) = &draft.customer_id {
            // Deferred sale: the receivable commits together with the sale,
            // so a crash can never leave a deferred sale without its debt.
            let receivable = Receivable {
                id: generate_receivable_id(),
                sale_id: sale_id.clone(),
                customer_id: customer_id.clone(),
                amount_centavos: draft.total_centavos,
                description: format!("Venda #{}", sale_id),
                issued_at: now,
                due_date: now + Duration::days(DEFAULT_DUE_DAYS),
                paid_at: None,
                status: ReceivableStatus::Aberta,
            };
            ReceivableRepository::insert_in_tx(&mut tx, &receivable).await?;
        }

        let record = SaleRepository::get_record_in_tx(&mut tx, &sale_id)
            .await?
            .ok_or_else(|| DbError::Internal("sale missing inside its own transaction".into()))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale_id,
            total = %record.sale.total(),
            payment = %draft.payment,
            items = record.items.len(),
            "Sale registered"
        );

        Ok(record)
    }

    /// Settles a receivable: marks it PAGA and books the till entry.
    ///
    /// ## What This Does (one transaction)
    /// 1. Loads the receivable with its sale and customer
    /// 2. Rejects the settle if the receivable is already `PAGA`
    ///    (settlement is terminal)
    /// 3. Sets status `PAGA` and the paid timestamp
    /// 4. If the originating sale's payment was deferred, books exactly one
    ///    ENTRADA for the receivable's amount. The guard is defensive: the
    ///    immediate-payment path already booked its entry at sale time, so a
    ///    receivable mistakenly attached to such a sale must not book again.
    ///
    /// After the commit, the customer's status is reconciled so clearing the
    /// last overdue debt reactivates them.
    pub async fn settle_receivable(&self, id: &str) -> Result<Receivable, CheckoutError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let receivable = ReceivableRepository::get_by_id_in_tx(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Receivable", id))?;

        if !receivable.status.may_settle() {
            return Err(CheckoutError::Core(CoreError::InvalidStateTransition {
                entity: "Receivable",
                id: id.to_string(),
                current: receivable.status.to_string(),
                action: "settle",
            }));
        }

        let record = SaleRepository::get_record_in_tx(&mut tx, &receivable.sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", &receivable.sale_id))?;
        let customer =
            CustomerRepository::get_by_id_in_tx(&mut tx, &receivable.customer_id)
                .await?
                .ok_or_else(|| DbError::not_found("Customer", &receivable.customer_id))?;

        ReceivableRepository::mark_paid_in_tx(&mut tx, id, now).await?;

        if record.sale.payment == PaymentMethod::APrazo {
            let movement = CashMovement {
                id: generate_movement_id(),
                kind: MovementKind::Entrada,
                amount_centavos: receivable.amount_centavos,
                description: format!(
                    "Recebimento da Venda #{} | Cliente: {} | A Prazo",
                    record.sale.id, customer.name
                ),
                occurred_at: now,
            };
            LedgerRepository::insert_in_tx(&mut tx, &movement).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            receivable_id = %id,
            customer_id = %receivable.customer_id,
            amount = %receivable.amount(),
            "Receivable settled"
        );

        // A settled debt may have been the customer's last overdue one.
        ReconciliationService::new(self.pool.clone())
            .reconcile_customer(&receivable.customer_id)
            .await?;

        let updated = self
            .get_receivable(id)
            .await?
            .ok_or_else(|| DbError::not_found("Receivable", id))?;
        Ok(updated)
    }

    /// Cancels (deletes) a receivable.
    ///
    /// State-machine enforced: only `ABERTA` and `ATRASADA` receivables may
    /// be cancelled. No compensating ledger entry is written - nothing was
    /// ever booked for an unsettled debt. The customer's status is
    /// reconciled afterwards.
    pub async fn cancel_receivable(&self, id: &str) -> Result<(), CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let receivable = ReceivableRepository::get_by_id_in_tx(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Receivable", id))?;

        if !receivable.status.may_cancel() {
            return Err(CheckoutError::Core(CoreError::InvalidStateTransition {
                entity: "Receivable",
                id: id.to_string(),
                current: receivable.status.to_string(),
                action: "cancel",
            }));
        }

        ReceivableRepository::delete_in_tx(&mut tx, id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(receivable_id = %id, customer_id = %receivable.customer_id, "Receivable cancelled");

        ReconciliationService::new(self.pool.clone())
            .reconcile_customer(&receivable.customer_id)
            .await?;

        Ok(())
    }

    async fn get_receivable(&self, id: &str) -> DbResult<Option<Receivable>> {
        ReceivableRepository::new(self.pool.clone()).get_by_id(id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Database;
    use crate::test_support::{seed_customer, seed_product, test_db};
    use balcao_core::CustomerStatus;

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    fn draft(
        total: i64,
        payment: PaymentMethod,
        customer_id: Option<&str>,
        items: Vec<DraftItem>,
    ) -> SaleDraft {
        SaleDraft {
            total_centavos: total,
            payment,
            customer_id: customer_id.map(str::to_string),
            items,
        }
    }

    /// Cash sale: stock drops, one ENTRADA is booked, no receivable exists.
    #[tokio::test]
    async fn test_cash_sale() {
        let db = test_db().await;
        let product = seed_product(&db, "TEC-001", 7500, 30).await;

        let record = db
            .checkout()
            .register_sale(draft(
                15000,
                PaymentMethod::Dinheiro,
                None,
                vec![DraftItem {
                    product_id: product.id.clone(),
                    quantity: 2,
                    unit_price_centavos: 7500,
                }],
            ))
            .await
            .unwrap();

        assert_eq!(record.sale.total_centavos, 15000);
        assert_eq!(record.items.len(), 1);
        assert!(record.customer.is_none());

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 28);

        assert_eq!(count(&db, "cash_movements").await, 1);
        assert_eq!(count(&db, "receivables").await, 0);

        let movements = db.ledger().find_by_description(&record.sale.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Entrada);
        assert_eq!(movements[0].amount_centavos, 15000);
        assert!(movements[0].description.contains("Consumidor Final"));
        assert!(movements[0].description.contains("Dinheiro"));
    }

    /// Deferred sale: no ledger entry, one ABERTA receivable due in 30 days,
    /// customer lifetime total incremented.
    #[tokio::test]
    async fn test_deferred_sale_creates_receivable() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 15).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;

        let record = db
            .checkout()
            .register_sale(draft(
                50000,
                PaymentMethod::APrazo,
                Some(&customer.id),
                vec![DraftItem {
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_centavos: 50000,
                }],
            ))
            .await
            .unwrap();

        let reloaded_product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded_product.quantity, 14);

        let reloaded_customer = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded_customer.total_purchases_centavos, 50000);

        // Zero ledger entries at sale time
        assert_eq!(count(&db, "cash_movements").await, 0);

        // Exactly one open receivable, due 30 days out
        assert_eq!(count(&db, "receivables").await, 1);
        let entries = db
            .receivables()
            .list(crate::repository::receivable::ReceivableFilter::Abertas)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        let receivable = &entries[0].receivable;
        assert_eq!(receivable.sale_id, record.sale.id);
        assert_eq!(receivable.amount_centavos, 50000);
        assert_eq!(receivable.status, ReceivableStatus::Aberta);
        assert!(receivable.paid_at.is_none());
        let window = receivable.due_date - receivable.issued_at;
        assert_eq!(window.num_days(), DEFAULT_DUE_DAYS);
    }

    /// Deferred sale without a customer: no receivable and no ledger entry.
    #[tokio::test]
    async fn test_deferred_sale_without_customer() {
        let db = test_db().await;
        let product = seed_product(&db, "SSD-006", 65000, 22).await;

        db.checkout()
            .register_sale(draft(
                65000,
                PaymentMethod::APrazo,
                None,
                vec![DraftItem {
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_centavos: 65000,
                }],
            ))
            .await
            .unwrap();

        assert_eq!(count(&db, "receivables").await, 0);
        assert_eq!(count(&db, "cash_movements").await, 0);
    }

    /// Settlement: PAGA + paid_at + exactly one ENTRADA; a second settle is
    /// rejected and books nothing (settlement terminality).
    #[tokio::test]
    async fn test_settlement() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 15).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;

        db.checkout()
            .register_sale(draft(
                50000,
                PaymentMethod::APrazo,
                Some(&customer.id),
                vec![DraftItem {
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_centavos: 50000,
                }],
            ))
            .await
            .unwrap();

        let entries = db
            .receivables()
            .list(crate::repository::receivable::ReceivableFilter::Abertas)
            .await
            .unwrap();
        let receivable_id = entries[0].receivable.id.clone();

        let settled = db.checkout().settle_receivable(&receivable_id).await.unwrap();
        assert_eq!(settled.status, ReceivableStatus::Paga);
        assert!(settled.paid_at.is_some());

        assert_eq!(count(&db, "cash_movements").await, 1);
        let movements = db
            .ledger()
            .find_by_description("Recebimento da Venda")
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].amount_centavos, 50000);
        assert!(movements[0].description.contains("Maria Silva"));

        // No transition out of PAGA, and no second ledger entry
        let err = db
            .checkout()
            .settle_receivable(&receivable_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InvalidStateTransition { .. })
        ));
        assert_eq!(count(&db, "cash_movements").await, 1);
    }

    /// Settling the last overdue debt reactivates the customer.
    #[tokio::test]
    async fn test_settlement_reactivates_customer() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 15).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;

        db.checkout()
            .register_sale(draft(
                50000,
                PaymentMethod::APrazo,
                Some(&customer.id),
                vec![DraftItem {
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_centavos: 50000,
                }],
            ))
            .await
            .unwrap();

        // Backdate the due date, then reconcile: customer goes Inativo
        sqlx::query("UPDATE receivables SET due_date = ?1")
            .bind(Utc::now() - Duration::days(2))
            .execute(db.pool())
            .await
            .unwrap();
        db.reconciliation()
            .reconcile_customer(&customer.id)
            .await
            .unwrap();
        let blocked = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(blocked.status, CustomerStatus::Inativo);

        let entries = db
            .receivables()
            .list(crate::repository::receivable::ReceivableFilter::Atrasadas)
            .await
            .unwrap();
        let receivable_id = entries[0].receivable.id.clone();

        // Settling the overdue debt flips the customer back to Ativo
        db.checkout().settle_receivable(&receivable_id).await.unwrap();
        let reactivated = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(reactivated.status, CustomerStatus::Ativo);
    }

    /// Cancel: open receivables delete cleanly; paid ones are protected.
    #[tokio::test]
    async fn test_cancel_state_machine() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 15).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;

        // First deferred sale: cancel while open
        db.checkout()
            .register_sale(draft(
                50000,
                PaymentMethod::APrazo,
                Some(&customer.id),
                vec![DraftItem {
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_centavos: 50000,
                }],
            ))
            .await
            .unwrap();
        let entries = db
            .receivables()
            .list(crate::repository::receivable::ReceivableFilter::Abertas)
            .await
            .unwrap();
        let open_id = entries[0].receivable.id.clone();
        db.checkout().cancel_receivable(&open_id).await.unwrap();
        assert_eq!(count(&db, "receivables").await, 0);

        // Second deferred sale: settle, then try to cancel
        db.checkout()
            .register_sale(draft(
                50000,
                PaymentMethod::APrazo,
                Some(&customer.id),
                vec![DraftItem {
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_centavos: 50000,
                }],
            ))
            .await
            .unwrap();
        let entries = db
            .receivables()
            .list(crate::repository::receivable::ReceivableFilter::Abertas)
            .await
            .unwrap();
        let paid_id = entries[0].receivable.id.clone();
        db.checkout().settle_receivable(&paid_id).await.unwrap();

        let err = db.checkout().cancel_receivable(&paid_id).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InvalidStateTransition { .. })
        ));
        assert_eq!(count(&db, "receivables").await, 1);
    }

    /// Validation failure: zero total, empty items - rejected with no writes.
    #[tokio::test]
    async fn test_validation_failure_has_no_side_effects() {
        let db = test_db().await;

        let err = db
            .checkout()
            .register_sale(draft(0, PaymentMethod::Dinheiro, None, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::Validation(_))
        ));

        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
        assert_eq!(count(&db, "cash_movements").await, 0);
    }

    /// Atomicity: when the second line item is short on stock, nothing from
    /// the sale survives - not the sale, not the first item's decrement, not
    /// the ledger entry.
    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = test_db().await;
        let plenty = seed_product(&db, "TEC-001", 7500, 30).await;
        let scarce = seed_product(&db, "CAM-005", 45000, 1).await;

        let err = db
            .checkout()
            .register_sale(draft(
                105000,
                PaymentMethod::Dinheiro,
                None,
                vec![
                    DraftItem {
                        product_id: plenty.id.clone(),
                        quantity: 2,
                        unit_price_centavos: 7500,
                    },
                    DraftItem {
                        product_id: scarce.id.clone(),
                        quantity: 2,
                        unit_price_centavos: 45000,
                    },
                ],
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InsufficientStock { .. })
        ));

        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
        assert_eq!(count(&db, "cash_movements").await, 0);

        let untouched = db.products().get_by_id(&plenty.id).await.unwrap().unwrap();
        assert_eq!(untouched.quantity, 30);
        let untouched = db.products().get_by_id(&scarce.id).await.unwrap().unwrap();
        assert_eq!(untouched.quantity, 1);
    }

    /// Unknown product surfaces as NotFound and rolls back.
    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_db().await;

        let err = db
            .checkout()
            .register_sale(draft(
                1000,
                PaymentMethod::Pix,
                None,
                vec![DraftItem {
                    product_id: uuid::Uuid::new_v4().to_string(),
                    quantity: 1,
                    unit_price_centavos: 1000,
                }],
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Db(DbError::NotFound { .. })
        ));

        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
    }

    /// Settling an unknown receivable surfaces a distinct NotFound.
    #[tokio::test]
    async fn test_settle_unknown_receivable() {
        let db = test_db().await;

        let err = db
            .checkout()
            .settle_receivable(&uuid::Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Db(DbError::NotFound { .. })));
    }

    /// Same product twice in one draft: both decrements apply.
    #[tokio::test]
    async fn test_repeated_product_decrements_sum() {
        let db = test_db().await;
        let product = seed_product(&db, "MOU-002", 18000, 10).await;

        db.checkout()
            .register_sale(draft(
                90000,
                PaymentMethod::Cartao,
                None,
                vec![
                    DraftItem {
                        product_id: product.id.clone(),
                        quantity: 3,
                        unit_price_centavos: 18000,
                    },
                    DraftItem {
                        product_id: product.id.clone(),
                        quantity: 2,
                        unit_price_centavos: 18000,
                    },
                ],
            ))
            .await
            .unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 5);
    }
}
