//! # Validation Module
//!
//! Business rule validation for items and sale requests.
//!
//! Validation runs before any store interaction: a draft that fails here
//! never reaches the network. The store layer calls these functions from
//! `add_item`, `update_item`, and `record_sale`.

use crate::error::{ValidationError, ValidationResult};
use crate::types::{Category, Item, ItemDraft, StockBySize};
use crate::{MAX_NAME_LEN, MAX_SALE_QUANTITY};

// =============================================================================
// Item Validators
// =============================================================================

/// Validates an item draft before identity assignment.
///
/// ## Rules
/// - `name` non-empty after trimming, at most `MAX_NAME_LEN` characters
/// - `price` strictly positive
/// - `cost`, when present, not negative
/// - every stock counter >= 0
/// - `low_stock_threshold` >= 0
/// - `subcategory`, when present, legal for the category
pub fn validate_item_draft(draft: &ItemDraft) -> ValidationResult<()> {
    validate_name(&draft.name)?;

    if !draft.price.is_positive() {
        return Err(ValidationError::MustBePositive { field: "price" });
    }

    if let Some(cost) = draft.cost {
        if cost.cents() < 0 {
            return Err(ValidationError::MustNotBeNegative { field: "cost" });
        }
    }

    validate_stock(&draft.stock)?;

    if draft.low_stock_threshold < 0 {
        return Err(ValidationError::MustNotBeNegative { field: "low_stock_threshold" });
    }

    validate_subcategory(draft.category, draft.subcategory.as_deref())?;

    Ok(())
}

/// Validates a full item (update path). Same rules as the draft.
pub fn validate_item(item: &Item) -> ValidationResult<()> {
    validate_name(&item.name)?;

    if !item.price.is_positive() {
        return Err(ValidationError::MustBePositive { field: "price" });
    }

    if let Some(cost) = item.cost {
        if cost.cents() < 0 {
            return Err(ValidationError::MustNotBeNegative { field: "cost" });
        }
    }

    validate_stock(&item.stock)?;

    if item.low_stock_threshold < 0 {
        return Err(ValidationError::MustNotBeNegative { field: "low_stock_threshold" });
    }

    validate_subcategory(item.category, item.subcategory.as_deref())?;

    Ok(())
}

fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong { field: "name", max: MAX_NAME_LEN });
    }

    Ok(())
}

fn validate_stock(stock: &StockBySize) -> ValidationResult<()> {
    for (_, count) in stock.counters() {
        if count < 0 {
            return Err(ValidationError::MustNotBeNegative { field: "stock" });
        }
    }
    Ok(())
}

fn validate_subcategory(category: Category, subcategory: Option<&str>) -> ValidationResult<()> {
    if let Some(sub) = subcategory {
        if !category.allows_subcategory(sub) {
            return Err(ValidationError::IllegalSubcategory {
                subcategory: sub.to_string(),
                category: category.to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Sale Validators
// =============================================================================

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_SALE_QUANTITY`
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if quantity > MAX_SALE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_SALE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
