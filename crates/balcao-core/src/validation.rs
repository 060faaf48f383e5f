//! # Validation Module
//!
//! Input validation utilities for Balcão.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (serde)                                        │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Shape of the request body                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Runs before any store mutation                                    │
//! │  └── A failed request has no side effects                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field (name, description, ...).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use balcao_core::validation::validate_sku;
///
/// assert!(validate_sku("TEC-001").is_ok());
/// assert!(validate_sku("").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with text on both sides
///
/// Intentionally loose: the unique constraint and the mail system are the
/// real arbiters of a usable address.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let mut parts = email.split('@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || parts.next().is_some() || !domain.contains('.') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(())
}

/// Validates a CPF (Brazilian national tax ID) in its plaintext form.
///
/// ## Rules
/// - Must be exactly 11 digits once punctuation (`.` and `-`) is stripped
///
/// Check-digit verification is deliberately not performed here; the field
/// is stored encrypted and opaque, so a typo is an operator problem, not a
/// data-integrity one.
pub fn validate_cpf(cpf: &str) -> ValidationResult<()> {
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    let stripped: String = cpf
        .chars()
        .filter(|c| !c.is_ascii_digit() && *c != '.' && *c != '-' && !c.is_whitespace())
        .collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "cpf".to_string(),
        });
    }

    if digits.len() != 11 || !stripped.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "cpf".to_string(),
            reason: "must contain exactly 11 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantidade".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantidade".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in centavos.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaway items)
pub fn validate_price_centavos(centavos: i64) -> ValidationResult<()> {
    if centavos < 0 {
        return Err(ValidationError::OutOfRange {
            field: "preco".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a monetary amount that must be strictly positive
/// (sale totals, receivable amounts, ledger movements).
pub fn validate_amount_centavos(field: &str, centavos: i64) -> ValidationResult<()> {
    if centavos <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use balcao_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("nome", "Teclado Mecânico", 200).is_ok());
        assert!(validate_required_text("nome", "", 200).is_err());
        assert!(validate_required_text("nome", "   ", 200).is_err());
        assert!(validate_required_text("nome", &"A".repeat(300), 200).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("TEC-001").is_ok());
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku("produto_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("maria@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn test_validate_cpf() {
        assert!(validate_cpf("123.456.789-09").is_ok());
        assert!(validate_cpf("12345678909").is_ok());

        assert!(validate_cpf("").is_err());
        assert!(validate_cpf("1234567890").is_err()); // 10 digits
        assert!(validate_cpf("123456789091").is_err()); // 12 digits
        assert!(validate_cpf("12a45678909").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_centavos() {
        assert!(validate_price_centavos(0).is_ok());
        assert!(validate_price_centavos(1099).is_ok());
        assert!(validate_price_centavos(-100).is_err());
    }

    #[test]
    fn test_validate_amount_centavos() {
        assert!(validate_amount_centavos("total", 15000).is_ok());
        assert!(validate_amount_centavos("total", 0).is_err());
        assert!(validate_amount_centavos("total", -1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }
}
