//! # SKU Generator
//!
//! Pure, deterministic derivation of a stock-keeping identifier from item
//! attributes. No I/O, no clock: the same category, subcategory, name, and
//! identity always yield the same SKU, so repeated calls before the first
//! persist are reproducible.
//!
//! ## Construction
//! ```text
//! <category-code><subcategory-code>-<name-slug>-<stable-suffix>
//!
//! CLTS-TOURTEE-550E8400
//! ││ │  │        └── first 8 alphanumerics of the item id, uppercased
//! ││ │  └── name, uppercased, alphanumerics only, truncated
//! ││ └── first two letters of the subcategory ("GN" when absent)
//! │└── two-letter category code
//! ```
//!
//! The suffix is derived from the item's identity rather than wall-clock
//! time; identities are UUIDs, so two items with different identities get
//! distinct suffixes with high probability.

use crate::types::Category;

/// Maximum length of the name slug segment.
const SLUG_LEN: usize = 10;

/// Length of the identity-derived suffix segment.
const SUFFIX_LEN: usize = 8;

/// Subcategory code used when the item carries no subcategory.
const GENERIC_SUB_CODE: &str = "GN";

/// Derives the SKU for an item.
///
/// ## Arguments
/// * `category` - the item's category (two-letter code prefix)
/// * `subcategory` - optional subcategory (two-letter code)
/// * `name` - display name (slug segment)
/// * `id` - assigned identity (stable suffix segment)
///
/// ## Example
/// ```rust
/// use merch_core::sku::generate_sku;
/// use merch_core::types::Category;
///
/// let sku = generate_sku(
///     Category::Clothing,
///     Some("tshirt"),
///     "Tour Tee",
///     "550e8400-e29b-41d4-a716-446655440000",
/// );
/// assert_eq!(sku, "CLTS-TOURTEE-550E8400");
/// ```
pub fn generate_sku(
    category: Category,
    subcategory: Option<&str>,
    name: &str,
    id: &str,
) -> String {
    format!(
        "{}{}-{}-{}",
        category.code(),
        sub_code(subcategory),
        name_slug(name),
        stable_suffix(id),
    )
}

fn sub_code(subcategory: Option<&str>) -> String {
    let code: String = subcategory
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(2)
        .collect::<String>()
        .to_uppercase();

    if code.len() < 2 {
        GENERIC_SUB_CODE.to_string()
    } else {
        code
    }
}

fn name_slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(SLUG_LEN)
        .collect::<String>()
        .to_uppercase();

    if slug.is_empty() {
        "ITEM".to_string()
    } else {
        slug
    }
}

fn stable_suffix(id: &str) -> String {
    let suffix: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(SUFFIX_LEN)
        .collect::<String>()
        .to_uppercase();

    if suffix.is_empty() {
        "00000000".to_string()
    } else {
        suffix
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
