//! # Receivable Repository
//!
//! Database operations for receivables ("pendências").
//!
//! Receivable rows are written by the checkout coordinator (in the same
//! transaction as their deferred sale) or by manual creation; transitions
//! run through the coordinator and the reconciliation service, which enforce
//! the state machine in `balcao_core::ReceivableStatus`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use balcao_core::{Receivable, ReceivableStatus};

const RECEIVABLE_COLUMNS: &str = r#"
    id, sale_id, customer_id, amount_centavos, description,
    issued_at, due_date, paid_at, status
"#;

/// A receivable joined with the customer fields the listing shows.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ReceivableEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub receivable: Receivable,
    pub customer_name: String,
    pub customer_email: String,
}

/// Listing filter mirroring the receivables screen tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceivableFilter {
    Todas,
    Abertas,
    Pagas,
    Atrasadas,
}

impl ReceivableFilter {
    fn status(self) -> Option<ReceivableStatus> {
        match self {
            ReceivableFilter::Todas => None,
            ReceivableFilter::Abertas => Some(ReceivableStatus::Aberta),
            ReceivableFilter::Pagas => Some(ReceivableStatus::Paga),
            ReceivableFilter::Atrasadas => Some(ReceivableStatus::Atrasada),
        }
    }
}

/// Repository for receivable database operations.
#[derive(Debug, Clone)]
pub struct ReceivableRepository {
    pool: SqlitePool,
}

impl ReceivableRepository {
    /// Creates a new ReceivableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceivableRepository { pool }
    }

    /// Gets a receivable by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Receivable>> {
        let receivable = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivables WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receivable)
    }

    /// Lists receivables newest-first, joined with customer name/email,
    /// optionally filtered by status.
    pub async fn list(&self, filter: ReceivableFilter) -> DbResult<Vec<ReceivableEntry>> {
        debug!(?filter, "Listing receivables");

        let base = format!(
            r#"
            SELECT r.id, r.sale_id, r.customer_id, r.amount_centavos, r.description,
                   r.issued_at, r.due_date, r.paid_at, r.status,
                   c.name AS customer_name, c.email AS customer_email
            FROM receivables r
            JOIN customers c ON c.id = r.customer_id
            {where_clause}
            ORDER BY r.issued_at DESC
            "#,
            where_clause = if filter.status().is_some() {
                "WHERE r.status = ?1"
            } else {
                ""
            }
        );

        let mut query = sqlx::query_as::<_, ReceivableEntry>(&base);
        if let Some(status) = filter.status() {
            query = query.bind(status);
        }

        let entries = query.fetch_all(&self.pool).await?;
        Ok(entries)
    }

    /// Inserts a manually created receivable.
    pub async fn insert(&self, receivable: &Receivable) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_in_tx(&mut conn, receivable).await
    }

    /// Inserts a receivable inside the caller's transaction.
    ///
    /// The checkout coordinator uses this so a deferred sale and its
    /// receivable commit or roll back together - there is no window in which
    /// a deferred sale exists without its receivable.
    pub async fn insert_in_tx(conn: &mut SqliteConnection, receivable: &Receivable) -> DbResult<()> {
        debug!(
            id = %receivable.id,
            sale_id = %receivable.sale_id,
            due = %receivable.due_date,
            "Inserting receivable"
        );

        sqlx::query(
            r#"
            INSERT INTO receivables (
                id, sale_id, customer_id, amount_centavos, description,
                issued_at, due_date, paid_at, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&receivable.id)
        .bind(&receivable.sale_id)
        .bind(&receivable.customer_id)
        .bind(receivable.amount_centavos)
        .bind(&receivable.description)
        .bind(receivable.issued_at)
        .bind(receivable.due_date)
        .bind(receivable.paid_at)
        .bind(receivable.status)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a receivable by ID inside the caller's transaction.
    pub async fn get_by_id_in_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Receivable>> {
        let receivable = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivables WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(receivable)
    }

    /// Marks a receivable paid inside the caller's transaction.
    pub async fn mark_paid_in_tx(
        conn: &mut SqliteConnection,
        id: &str,
        paid_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE receivables
            SET status = ?2, paid_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(ReceivableStatus::Paga)
        .bind(paid_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Receivable", id));
        }

        Ok(())
    }

    /// Deletes a receivable inside the caller's transaction.
    pub async fn delete_in_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM receivables WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Receivable", id));
        }

        Ok(())
    }

    /// Open receivables (ABERTA or ATRASADA) past their due date for one
    /// customer, inside the caller's transaction.
    ///
    /// This is the persisted form of `balcao_core::receivable_overdue`: the
    /// reconciliation decision looks at both open states so a debt that was
    /// already stamped ATRASADA keeps the customer blocked until settled.
    pub async fn overdue_open_for_customer_in_tx(
        conn: &mut SqliteConnection,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<Receivable>> {
        let receivables = sqlx::query_as::<_, Receivable>(&format!(
            r#"
            SELECT {RECEIVABLE_COLUMNS}
            FROM receivables
            WHERE customer_id = ?1
              AND status IN ('ABERTA', 'ATRASADA')
              AND due_date < ?2
            "#
        ))
        .bind(customer_id)
        .bind(now)
        .fetch_all(&mut *conn)
        .await?;

        Ok(receivables)
    }

    /// Stamps all of a customer's past-due ABERTA receivables as ATRASADA,
    /// inside the caller's transaction. Returns how many rows changed.
    pub async fn mark_overdue_in_tx(
        conn: &mut SqliteConnection,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE receivables
            SET status = ?3
            WHERE customer_id = ?1
              AND status = ?4
              AND due_date < ?2
            "#,
        )
        .bind(customer_id)
        .bind(now)
        .bind(ReceivableStatus::Atrasada)
        .bind(ReceivableStatus::Aberta)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Distinct customers that currently have open receivables.
    /// Drives the periodic reconciliation sweep.
    pub async fn customers_with_open(&self) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT customer_id
            FROM receivables
            WHERE status IN ('ABERTA', 'ATRASADA')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

/// Generates a new receivable ID.
pub fn generate_receivable_id() -> String {
    Uuid::new_v4().to_string()
}
