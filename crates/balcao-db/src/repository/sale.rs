//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! Sales are immutable once registered: there is no update path, only
//! create (through the checkout coordinator) and read. Line items carry a
//! price snapshot so sale history survives later product edits.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use balcao_core::{Customer, Sale, SaleItem};

const SALE_COLUMNS: &str = "id, total_centavos, payment, customer_id, created_at";
const ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, unit_price_centavos, created_at";

/// A sale joined with its line items and customer, as returned to callers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SaleRecord {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub customer: Option<Customer>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Paginated sale history, newest first.
    ///
    /// `search` filters by exact sale ID or by customer-name substring
    /// (case-insensitive via LIKE). An empty search returns everything.
    ///
    /// ## Returns
    /// The page of joined records plus the total (unpaginated) match count.
    pub async fn history(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> DbResult<(Vec<SaleRecord>, i64)> {
        let search = search.trim();
        let offset = (page.saturating_sub(1)) * limit;

        debug!(page = %page, limit = %limit, search = %search, "Listing sale history");

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            WHERE ?1 = '' OR s.id = ?1 OR c.name LIKE '%' || ?1 || '%'
            "#,
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT s.id, s.total_centavos, s.payment, s.customer_id, s.created_at
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            WHERE ?1 = '' OR s.id = ?1 OR c.name LIKE '%' || ?1 || '%'
            ORDER BY s.created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(sales.len());
        for sale in sales {
            let items = self.get_items(&sale.id).await?;
            let customer = match &sale.customer_id {
                Some(customer_id) => {
                    sqlx::query_as::<_, Customer>(
                        r#"
                        SELECT id, name, email, phone, cpf, street, district, city, state,
                               reference, status, total_purchases_centavos,
                               created_at, updated_at
                        FROM customers WHERE id = ?1
                        "#,
                    )
                    .bind(customer_id)
                    .fetch_optional(&self.pool)
                    .await?
                }
                None => None,
            };
            records.push(SaleRecord {
                sale,
                items,
                customer,
            });
        }

        Ok((records, total))
    }

    /// Inserts a sale inside the caller's transaction.
    pub async fn insert_in_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total = %sale.total_centavos, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, total_centavos, payment, customer_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.total_centavos)
        .bind(sale.payment)
        .bind(&sale.customer_id)
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts a sale line item inside the caller's transaction.
    pub async fn insert_item_in_tx(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
        debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Inserting sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price_centavos, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_centavos)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Re-reads a sale with items and customer inside the caller's
    /// transaction (for the register-sale response).
    pub async fn get_record_in_tx(
        conn: &mut SqliteConnection,
        sale_id: &str,
    ) -> DbResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(sale_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;

        let customer = match &sale.customer_id {
            Some(customer_id) => {
                crate::repository::customer::CustomerRepository::get_by_id_in_tx(conn, customer_id)
                    .await?
            }
            None => None,
        };

        Ok(Some(SaleRecord {
            sale,
            items,
            customer,
        }))
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::checkout::{DraftItem, SaleDraft};
    use crate::test_support::{seed_customer, seed_product, test_db};
    use balcao_core::PaymentMethod;

    #[tokio::test]
    async fn test_history_pagination_and_search() {
        let db = test_db().await;
        let product = seed_product(&db, "TEC-001", 7500, 100).await;
        let customer = seed_customer(&db, "Maria Silva", "maria@example.com").await;

        for customer_id in [None, None, Some(customer.id.as_str())] {
            db.checkout()
                .register_sale(SaleDraft {
                    total_centavos: 7500,
                    payment: PaymentMethod::Dinheiro,
                    customer_id: customer_id.map(str::to_string),
                    items: vec![DraftItem {
                        product_id: product.id.clone(),
                        quantity: 1,
                        unit_price_centavos: 7500,
                    }],
                })
                .await
                .unwrap();
        }

        // Page 1 of 2 with limit 2
        let (page1, total) = db.sales().history(1, 2, "").await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page1.len(), 2);
        let (page2, _) = db.sales().history(2, 2, "").await.unwrap();
        assert_eq!(page2.len(), 1);

        // Search by customer-name substring
        let (found, total) = db.sales().history(1, 10, "Maria").await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found.len(), 1);
        assert!(found[0].customer.is_some());

        // Search by exact sale id
        let sale_id = found[0].sale.id.clone();
        let (by_id, total) = db.sales().history(1, 10, &sale_id).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(by_id[0].sale.id, sale_id);
    }
}
