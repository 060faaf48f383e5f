//! # balcao-db: Database Layer for Balcão
//!
//! This crate provides database access for the Balcão back office.
//! It uses SQLite for local storage with sqlx for async operations, and it
//! owns the transactional core of the system: the checkout coordinator and
//! the customer status reconciliation service.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Balcão Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /api/vendas)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     balcao-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐  │   │
//! │  │   │   Database    │   │  Repositories  │   │  Coordinators │  │   │
//! │  │   │   (pool.rs)   │   │ (product.rs,   │   │ (checkout.rs, │  │   │
//! │  │   │               │   │  customer.rs,  │   │  reconcile.rs)│  │   │
//! │  │   │ SqlitePool    │◄──│  sale.rs, ...) │◄──│               │  │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys ON)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, customer, ...)
//! - [`checkout`] - Sale registration and receivable settlement/cancellation
//! - [`reconcile`] - Customer status reconciliation
//! - [`crypto`] - Tax-ID encryption collaborator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use balcao_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/balcao.db")).await?;
//!
//! let sale = db.checkout().register_sale(draft).await?;
//! let report = db.reconciliation().reconcile_customer(&customer_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod crypto;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod reconcile;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutCoordinator, CheckoutError, DraftItem, SaleDraft};
pub use crypto::TaxIdCipher;
pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use reconcile::{ReconciliationService, StatusReport};

// Repository re-exports for convenience
pub use repository::cash::{LedgerRepository, LedgerTotals};
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::receivable::{ReceivableEntry, ReceivableFilter, ReceivableRepository};
pub use repository::sale::{SaleRecord, SaleRepository};
pub use repository::user::UserRepository;

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared helpers for tests that need a migrated in-memory database.

    use chrono::Utc;
    use uuid::Uuid;

    use crate::pool::{Database, DbConfig};
    use balcao_core::{Customer, CustomerStatus, Product};

    /// Creates a fresh in-memory database with all migrations applied.
    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database")
    }

    /// Inserts a product with the given stock and price and returns it.
    pub async fn seed_product(db: &Database, sku: &str, price_centavos: i64, quantity: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: format!("Produto {}", sku),
            sku: sku.to_string(),
            price_centavos,
            quantity,
            min_stock: 10,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.expect("seed product");
        product
    }

    /// Inserts an active customer and returns it.
    pub async fn seed_customer(db: &Database, name: &str, email: &str) -> Customer {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            cpf: format!("cpf-blob-{}", email),
            street: "Rua das Flores, 10".to_string(),
            district: "Centro".to_string(),
            city: "Curitiba".to_string(),
            state: "PR".to_string(),
            reference: None,
            status: CustomerStatus::Ativo,
            total_purchases_centavos: 0,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await.expect("seed customer");
        customer
    }
}
