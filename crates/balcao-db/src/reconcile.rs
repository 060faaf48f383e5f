//! # Status Reconciliation Service
//!
//! Derives a customer's `Ativo`/`Inativo` status from the current state of
//! their receivables.
//!
//! ## Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  reconcile_customer (one transaction)                   │
//! │                                                                         │
//! │  load customer ── missing? → NotFound                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  any open receivable past due?                                         │
//! │  (ABERTA or ATRASADA, due_date < now - the single derived definition)  │
//! │       │                                                                 │
//! │       ├── yes → customer := Inativo                                    │
//! │       │         past-due ABERTA rows := ATRASADA                       │
//! │       │                                                                 │
//! │       └── no  → customer := Ativo                                      │
//! │                                                                         │
//! │  Level-triggered and idempotent: a second call with no state change    │
//! │  writes the same values again.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invocation Points
//! - After every settle/cancel (the coordinator calls it)
//! - The standalone recompute endpoint
//! - The periodic sweep ([`ReconciliationService::reconcile_all`]), which
//!   bounds the staleness window for customers whose debt went overdue with
//!   no receivable-touching action since

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::receivable::ReceivableRepository;
use balcao_core::CustomerStatus;

/// Outcome of one customer reconciliation.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub customer_id: String,
    pub customer_name: String,
    pub status: CustomerStatus,
    /// Open receivables past their due date at reconciliation time.
    pub overdue_count: usize,
}

/// Recomputes customer status from overdue receivables.
///
/// Holds only a pool clone; constructed from [`crate::Database::reconciliation`]
/// or by the checkout coordinator after settle/cancel.
#[derive(Debug, Clone)]
pub struct ReconciliationService {
    pool: SqlitePool,
}

impl ReconciliationService {
    /// Creates a new service over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationService { pool }
    }

    /// Reconciles one customer's status.
    ///
    /// ## Returns
    /// * `Ok(StatusReport)` - the status after reconciliation
    /// * `Err(DbError::NotFound)` - unknown customer
    pub async fn reconcile_customer(&self, customer_id: &str) -> DbResult<StatusReport> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let customer = CustomerRepository::get_by_id_in_tx(&mut tx, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer_id))?;

        let overdue =
            ReceivableRepository::overdue_open_for_customer_in_tx(&mut tx, customer_id, now)
                .await?;

        let status = if overdue.is_empty() {
            CustomerStatus::Ativo
        } else {
            CustomerStatus::Inativo
        };

        CustomerRepository::set_status_in_tx(&mut tx, customer_id, status).await?;

        let stamped = if overdue.is_empty() {
            0
        } else {
            ReceivableRepository::mark_overdue_in_tx(&mut tx, customer_id, now).await?
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(
            customer_id = %customer_id,
            status = %status,
            overdue = overdue.len(),
            stamped = stamped,
            "Customer status reconciled"
        );

        Ok(StatusReport {
            customer_id: customer_id.to_string(),
            customer_name: customer.name,
            status,
            overdue_count: overdue.len(),
        })
    }

    /// Sweeps every customer that currently has open receivables.
    ///
    /// Customers without open receivables are already `Ativo` (or become so
    /// the next time something touches them); the sweep only needs to catch
    /// debts that silently crossed their due date.
    pub async fn reconcile_all(&self) -> DbResult<Vec<StatusReport>> {
        let customer_ids = ReceivableRepository::new(self.pool.clone())
            .customers_with_open()
            .await?;

        let mut reports = Vec::with_capacity(customer_ids.len());
        for customer_id in customer_ids {
            reports.push(self.reconcile_customer(&customer_id).await?);
        }

        let blocked = reports
            .iter()
            .filter(|r| r.status == CustomerStatus::Inativo)
            .count();
        info!(
            customers = reports.len(),
            blocked = blocked,
            "Reconciliation sweep complete"
        );

        Ok(reports)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{DraftItem, SaleDraft};
    use crate::repository::receivable::ReceivableFilter;
    use crate::test_support::{seed_customer, seed_product, test_db};
    use balcao_core::{PaymentMethod, ReceivableStatus};
    use chrono::Duration;

    async fn deferred_sale(
        db: &crate::pool::Database,
        customer_id: &str,
        product_id: &str,
        amount: i64,
    ) -> String {
        let record = db
            .checkout()
            .register_sale(SaleDraft {
                total_centavos: amount,
                payment: PaymentMethod::APrazo,
                customer_id: Some(customer_id.to_string()),
                items: vec![DraftItem {
                    product_id: product_id.to_string(),
                    quantity: 1,
                    unit_price_centavos: amount,
                }],
            })
            .await
            .unwrap();
        record.sale.id
    }

    async fn backdate_receivables(db: &crate::pool::Database, days: i64) {
        sqlx::query("UPDATE receivables SET due_date = ?1")
            .bind(Utc::now() - Duration::days(days))
            .execute(db.pool())
            .await
            .unwrap();
    }

    /// Overdue debt blocks the customer and stamps the receivable ATRASADA.
    #[tokio::test]
    async fn test_overdue_blocks_customer() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 15).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;
        deferred_sale(&db, &customer.id, &product.id, 50000).await;
        backdate_receivables(&db, 1).await;

        let report = db
            .reconciliation()
            .reconcile_customer(&customer.id)
            .await
            .unwrap();
        assert_eq!(report.status, CustomerStatus::Inativo);
        assert_eq!(report.overdue_count, 1);

        let loaded = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, CustomerStatus::Inativo);

        let entries = db
            .receivables()
            .list(ReceivableFilter::Atrasadas)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].receivable.status, ReceivableStatus::Atrasada);
    }

    /// No overdue debt: the customer is (re)activated.
    #[tokio::test]
    async fn test_no_overdue_activates_customer() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 15).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;
        // Debt exists but is not yet due
        deferred_sale(&db, &customer.id, &product.id, 50000).await;

        let report = db
            .reconciliation()
            .reconcile_customer(&customer.id)
            .await
            .unwrap();
        assert_eq!(report.status, CustomerStatus::Ativo);
        assert_eq!(report.overdue_count, 0);
    }

    /// Idempotence: a second call with no intervening change produces the
    /// same customer status and the same receivable statuses.
    #[tokio::test]
    async fn test_reconciliation_is_idempotent() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 15).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;
        deferred_sale(&db, &customer.id, &product.id, 50000).await;
        backdate_receivables(&db, 1).await;

        let first = db
            .reconciliation()
            .reconcile_customer(&customer.id)
            .await
            .unwrap();
        let second = db
            .reconciliation()
            .reconcile_customer(&customer.id)
            .await
            .unwrap();

        // An ATRASADA receivable stays overdue-open: the customer must stay
        // blocked, not flap back to Ativo because nothing is ABERTA anymore.
        assert_eq!(first.status, CustomerStatus::Inativo);
        assert_eq!(second.status, CustomerStatus::Inativo);
        assert_eq!(first.overdue_count, second.overdue_count);

        let entries = db
            .receivables()
            .list(ReceivableFilter::Atrasadas)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    /// Unknown customer surfaces a distinct NotFound.
    #[tokio::test]
    async fn test_unknown_customer() {
        let db = test_db().await;
        let err = db
            .reconciliation()
            .reconcile_customer(&uuid::Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    /// The sweep reconciles every customer with open receivables.
    #[tokio::test]
    async fn test_sweep() {
        let db = test_db().await;
        let product = seed_product(&db, "MON-003", 50000, 50).await;
        let maria = seed_customer(&db, "Maria Silva", "maria@example.com").await;
        let joao = seed_customer(&db, "João Souza", "joao@example.com").await;

        deferred_sale(&db, &maria.id, &product.id, 50000).await;
        deferred_sale(&db, &joao.id, &product.id, 30000).await;
        backdate_receivables(&db, 3).await;

        let reports = db.reconciliation().reconcile_all().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports
            .iter()
            .all(|r| r.status == CustomerStatus::Inativo && r.overdue_count == 1));
    }
}
