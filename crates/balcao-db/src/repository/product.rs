//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Guarded stock decrements (inside the checkout transaction)
//! - Low-stock listing for the restock alert
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: read-modify-write in application code (lost updates)        │
//! │     let p = get(id); update(id, p.quantity - 3);                       │
//! │                                                                         │
//! │  ✅ CORRECT: atomic delta with a sufficiency guard                     │
//! │     UPDATE products SET quantity = quantity - ?                        │
//! │     WHERE id = ? AND quantity >= ?                                     │
//! │                                                                         │
//! │  Concurrent sales of the same product serialize on the row; a sale     │
//! │  that would drive stock negative simply matches zero rows and fails.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use balcao_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, price_centavos, quantity, min_stock,
                   created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, price_centavos, quantity, min_stock,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, price_centavos, quantity, min_stock,
                   created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, sku, price_centavos, quantity, min_stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price_centavos)
        .bind(product.quantity)
        .bind(product.min_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                sku = ?3,
                price_centavos = ?4,
                quantity = ?5,
                min_stock = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price_centavos)
        .bind(product.quantity)
        .bind(product.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Products referenced by historical sale line items are protected by the
    /// foreign key constraint and surface as `ForeignKeyViolation`.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Lists products at or below their reorder threshold.
    ///
    /// Backs the restock alert. The threshold never blocks a sale.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, price_centavos, quantity, min_stock,
                   created_at, updated_at
            FROM products
            WHERE quantity <= min_stock
            ORDER BY quantity
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Atomically decrements stock inside the caller's transaction.
    ///
    /// The `quantity >= ?` guard makes oversell impossible: a decrement that
    /// would drive stock negative matches zero rows and returns `false`,
    /// leaving the caller to abort the transaction.
    ///
    /// ## Returns
    /// * `Ok(true)` - Stock decremented
    /// * `Ok(false)` - Product missing or insufficient stock (caller decides which)
    pub async fn decrement_stock_in_tx(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        debug!(id = %product_id, quantity = %quantity, "Decrementing stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - ?2,
                updated_at = ?3
            WHERE id = ?1 AND quantity >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Gets a product by ID inside the caller's transaction.
    pub async fn get_by_id_in_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, price_centavos, quantity, min_stock,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(product)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_product, test_db};

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let db = test_db().await;
        let product = seed_product(&db, "TEC-001", 25050, 30).await;

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.sku, "TEC-001");
        assert_eq!(loaded.price_centavos, 25050);
        assert_eq!(loaded.quantity, 30);
        assert_eq!(loaded.min_stock, 10);

        let by_sku = db.products().get_by_sku("TEC-001").await.unwrap().unwrap();
        assert_eq!(by_sku.id, product.id);

        let mut updated = loaded.clone();
        updated.price_centavos = 19990;
        db.products().update(&updated).await.unwrap();
        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.price_centavos, 19990);

        db.products().delete(&product.id).await.unwrap();
        assert!(db.products().get_by_id(&product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        seed_product(&db, "MOU-002", 18000, 50).await;

        let mut dup = seed_product(&db, "MOU-002-TMP", 18000, 50).await;
        dup.sku = "MOU-002".to_string();
        dup.id = generate_product_id();
        let err = db.products().insert(&dup).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        seed_product(&db, "HEA-004", 35000, 8).await; // below default threshold
        seed_product(&db, "SSD-006", 65000, 22).await;

        let alerts = db.products().low_stock().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sku, "HEA-004");
    }

    #[tokio::test]
    async fn test_guarded_decrement() {
        let db = test_db().await;
        let product = seed_product(&db, "CAM-005", 45000, 2).await;

        let mut tx = db.pool().begin().await.unwrap();
        let applied = ProductRepository::decrement_stock_in_tx(&mut tx, &product.id, 2)
            .await
            .unwrap();
        assert!(applied);

        // Stock is now zero; a further decrement must not apply
        let applied = ProductRepository::decrement_stock_in_tx(&mut tx, &product.id, 1)
            .await
            .unwrap();
        assert!(!applied);
        tx.commit().await.unwrap();

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.quantity, 0);
    }
}
