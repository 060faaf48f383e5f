//! # Customer Repository
//!
//! Database operations for customers.
//!
//! The CPF column holds the encrypted blob produced by
//! [`crate::crypto::TaxIdCipher`]; this repository never sees a plaintext
//! tax ID. Unique violations on email or CPF surface as
//! `DbError::UniqueViolation` so the API layer can report a distinct
//! conflict ("this email is already registered").

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use balcao_core::{Customer, CustomerStatus};

const CUSTOMER_COLUMNS: &str = r#"
    id, name, email, phone, cpf, street, district, city, state, reference,
    status, total_purchases_centavos, created_at, updated_at
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - email or CPF already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, email = %customer.email, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, cpf,
                street, district, city, state, reference,
                status, total_purchases_centavos, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.cpf)
        .bind(&customer.street)
        .bind(&customer.district)
        .bind(&customer.city)
        .bind(&customer.state)
        .bind(&customer.reference)
        .bind(customer.status)
        .bind(customer.total_purchases_centavos)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a customer's editable fields.
    ///
    /// Status and lifetime purchase total are deliberately excluded: the
    /// first belongs to the reconciliation service, the second to the
    /// checkout coordinator.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                cpf = ?5,
                street = ?6,
                district = ?7,
                city = ?8,
                state = ?9,
                reference = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.cpf)
        .bind(&customer.street)
        .bind(&customer.district)
        .bind(&customer.city)
        .bind(&customer.state)
        .bind(&customer.reference)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer.
    ///
    /// Customers referenced by sales or receivables are protected by the
    /// foreign key constraint and surface as `ForeignKeyViolation`.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Atomically increments the lifetime purchase total inside the caller's
    /// transaction. Never read-modify-write: concurrent sales for the same
    /// customer serialize on the row.
    pub async fn increment_total_in_tx(
        conn: &mut SqliteConnection,
        customer_id: &str,
        amount_centavos: i64,
    ) -> DbResult<()> {
        debug!(id = %customer_id, amount = %amount_centavos, "Incrementing purchase total");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET total_purchases_centavos = total_purchases_centavos + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(customer_id)
        .bind(amount_centavos)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        Ok(())
    }

    /// Sets the derived status inside the caller's transaction.
    /// Only the reconciliation service calls this.
    pub async fn set_status_in_tx(
        conn: &mut SqliteConnection,
        customer_id: &str,
        status: CustomerStatus,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET status = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(customer_id)
        .bind(status)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        Ok(())
    }

    /// Gets a customer by ID inside the caller's transaction.
    pub async fn get_by_id_in_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(customer)
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_customer, test_db};

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;

        let loaded = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Maria Silva");
        assert_eq!(loaded.status, CustomerStatus::Ativo);
        assert_eq!(loaded.total_purchases_centavos, 0);

        let mut updated = loaded.clone();
        updated.phone = Some("(41) 99999-0000".to_string());
        db.customers().update(&updated).await.unwrap();
        let reloaded = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.phone.as_deref(), Some("(41) 99999-0000"));

        db.customers().delete(&customer.id).await.unwrap();
        assert!(db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let db = test_db().await;
        seed_customer(&db, "Maria Silva", "maria@example.com").await;

        let mut dup = seed_customer(&db, "Outra Maria", "outra@example.com").await;
        dup.id = generate_customer_id();
        dup.email = "maria@example.com".to_string();
        dup.cpf = "different-blob".to_string();

        let err = db.customers().insert(&dup).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field } => assert!(field.contains("email")),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_increment_total() {
        let db = test_db().await;
        let customer = seed_customer(&db, "João Souza", "joao@example.com").await;

        let mut tx = db.pool().begin().await.unwrap();
        CustomerRepository::increment_total_in_tx(&mut tx, &customer.id, 50000)
            .await
            .unwrap();
        CustomerRepository::increment_total_in_tx(&mut tx, &customer.id, 15000)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let loaded = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.total_purchases_centavos, 65000);
    }
}
