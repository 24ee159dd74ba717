//! # Validation Module
//!
//! Input validation for the inventory & sale ledger.
//!
//! ## Validation Strategy
//! Validators run at the service boundary, before any business logic, so a
//! rejected input leaves every counter and flag untouched. Business rules
//! that need catalog state (stock checks, duplicate lines) live in the
//! services themselves; this module covers shape and range only.

use crate::error::ValidationError;
use crate::types::{LineRequest, NewItem};
use crate::{MAX_AMOUNT_CENTS, MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item or client name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an item type/category.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
pub fn validate_item_type(item_type: &str) -> ValidationResult<()> {
    let item_type = item_type.trim();

    if item_type.is_empty() {
        return Err(ValidationError::Required {
            field: "item_type".to_string(),
        });
    }

    if item_type.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "item_type".to_string(),
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount that may be zero (cost, freight, stock price).
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed
/// - Must not exceed MAX_AMOUNT_CENTS
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
        });
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a sale price: every line entering a sale must be priced.
///
/// ## Rules
/// - Must be strictly positive (> 0)
/// - Must not exceed MAX_AMOUNT_CENTS, so line totals stay bounded
pub fn validate_sale_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "sale price".to_string(),
        });
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "sale price".to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the line set of a new sale.
///
/// ## Rules
/// - Must not be empty
/// - Must not exceed MAX_SALE_LINES
/// - Every requested quantity must pass `validate_quantity`
pub fn validate_line_requests(requests: &[LineRequest]) -> ValidationResult<()> {
    if requests.is_empty() {
        return Err(ValidationError::Empty {
            field: "lines".to_string(),
        });
    }

    if requests.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    for request in requests {
        validate_quantity(request.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a new item registration.
pub fn validate_new_item(input: &NewItem) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_item_type(&input.item_type)?;
    validate_amount_cents("cost", input.cost_cents)?;

    if let Some(price_cents) = input.price_cents {
        validate_sale_price_cents(price_cents)?;
    }

    if input.quantity < 0 {
        return Err(ValidationError::NegativeAmount {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Vestido floral").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_item_type() {
        assert!(validate_item_type("vestido").is_ok());
        assert!(validate_item_type("").is_err());
        assert!(validate_item_type(&"A".repeat(60)).is_err());
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
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("freight", 0).is_ok());
        assert!(validate_amount_cents("freight", 1500).is_ok());
        assert!(validate_amount_cents("freight", MAX_AMOUNT_CENTS).is_ok());

        assert!(validate_amount_cents("freight", -1).is_err());
        assert!(validate_amount_cents("freight", MAX_AMOUNT_CENTS + 1).is_err());
    }

    #[test]
    fn test_validate_sale_price() {
        assert!(validate_sale_price_cents(100).is_ok());
        assert!(validate_sale_price_cents(MAX_AMOUNT_CENTS).is_ok());

        assert!(validate_sale_price_cents(0).is_err());
        assert!(validate_sale_price_cents(-100).is_err());
        assert!(validate_sale_price_cents(MAX_AMOUNT_CENTS + 1).is_err());
    }

    #[test]
    fn test_validate_line_requests() {
        assert!(validate_line_requests(&[]).is_err());
        assert!(validate_line_requests(&[LineRequest::new("a", 1)]).is_ok());
        assert!(validate_line_requests(&[LineRequest::new("a", 0)]).is_err());
    }

}
