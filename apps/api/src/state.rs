//! Shared application state.
//!
//! Explicitly constructed in `main` and injected into handlers through
//! axum's `State` extractor - never a module-global.

use balcao_db::{Database, TaxIdCipher};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (pool + repositories + coordinators).
    pub db: Database,

    /// Cipher for the customer tax-ID field, applied at the read/write
    /// boundary of customer data.
    pub cipher: TaxIdCipher,
}
