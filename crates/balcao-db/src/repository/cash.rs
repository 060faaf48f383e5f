//! # Cash Ledger Repository
//!
//! Database operations for the cash-flow ledger ("movimentação de caixa").
//!
//! The ledger is append-only: entries are created by manual movements, by
//! immediate-payment sales, and by receivable settlement. Nothing in the
//! core flow ever updates or deletes one.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use balcao_core::CashMovement;

const MOVEMENT_COLUMNS: &str = "id, kind, amount_centavos, description, occurred_at";

/// Entry/exit/balance totals for a ledger period.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub entradas_centavos: i64,
    pub saidas_centavos: i64,
    pub saldo_centavos: i64,
}

/// Repository for cash-ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Appends a manual movement.
    pub async fn insert(&self, movement: &CashMovement) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_in_tx(&mut conn, movement).await
    }

    /// Appends a movement inside the caller's transaction
    /// (sale-time entries and settlement entries).
    pub async fn insert_in_tx(conn: &mut SqliteConnection, movement: &CashMovement) -> DbResult<()> {
        debug!(
            kind = %movement.kind,
            amount = %movement.amount_centavos,
            "Appending cash movement"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_movements (id, kind, amount_centavos, description, occurred_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&movement.id)
        .bind(movement.kind)
        .bind(movement.amount_centavos)
        .bind(&movement.description)
        .bind(movement.occurred_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Movements inside a period, newest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM cash_movements
            WHERE occurred_at >= ?1 AND occurred_at <= ?2
            ORDER BY occurred_at DESC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Entry/exit/balance totals for a period.
    pub async fn totals_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<LedgerTotals> {
        let (entradas, saidas): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'ENTRADA' THEN amount_centavos ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN kind = 'SAIDA' THEN amount_centavos ELSE 0 END), 0)
            FROM cash_movements
            WHERE occurred_at >= ?1 AND occurred_at <= ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(LedgerTotals {
            entradas_centavos: entradas,
            saidas_centavos: saidas,
            saldo_centavos: entradas - saidas,
        })
    }

    /// All movements for a sale id substring match in the description.
    /// Diagnostic helper for reconciling a sale against the till.
    pub async fn find_by_description(&self, needle: &str) -> DbResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM cash_movements
            WHERE description LIKE '%' || ?1 || '%'
            ORDER BY occurred_at DESC
            "#
        ))
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

/// Generates a new movement ID.
pub fn generate_movement_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use balcao_core::MovementKind;
    use chrono::Duration;

    fn movement(kind: MovementKind, amount: i64, description: &str) -> CashMovement {
        CashMovement {
            id: generate_movement_id(),
            kind,
            amount_centavos: amount,
            description: description.to_string(),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_period_report() {
        let db = test_db().await;
        let ledger = db.ledger();

        ledger
            .insert(&movement(MovementKind::Entrada, 15000, "Venda avulsa"))
            .await
            .unwrap();
        ledger
            .insert(&movement(MovementKind::Entrada, 5000, "Recebimento"))
            .await
            .unwrap();
        ledger
            .insert(&movement(MovementKind::Saida, 3000, "Compra de material"))
            .await
            .unwrap();

        let start = Utc::now() - Duration::days(1);
        let end = Utc::now() + Duration::days(1);

        let movements = ledger.list_between(start, end).await.unwrap();
        assert_eq!(movements.len(), 3);

        let totals = ledger.totals_between(start, end).await.unwrap();
        assert_eq!(totals.entradas_centavos, 20000);
        assert_eq!(totals.saidas_centavos, 3000);
        assert_eq!(totals.saldo_centavos, 17000);
    }

    #[tokio::test]
    async fn test_empty_period_totals_are_zero() {
        let db = test_db().await;
        let start = Utc::now() - Duration::days(7);
        let end = Utc::now();

        let totals = db.ledger().totals_between(start, end).await.unwrap();
        assert_eq!(totals.entradas_centavos, 0);
        assert_eq!(totals.saidas_centavos, 0);
        assert_eq!(totals.saldo_centavos, 0);
    }
}
