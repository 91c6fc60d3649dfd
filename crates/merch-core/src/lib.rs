//! # merch-core: Pure Business Logic for the Merchandise Ledger
//!
//! This crate is the **heart** of the merchandise inventory and sales
//! ledger. It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Merchandise Ledger Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI layer (external collaborator)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          merch-store (catalog, ledger, coordinator)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ merch-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │    sku    │  │   codec   │  │   │
//! │  │   │   Item    │  │   Money   │  │  derive   │  │ CSV wire  │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │   SKUs    │  │  format   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Sale, Category, Size, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`sku`] - Deterministic SKU derivation
//! - [`codec`] - CSV import/export wire format

// =============================================================================
// Module Declarations
// =============================================================================

pub mod codec;
pub mod error;
pub mod money;
pub mod sku;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CodecError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an item name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum quantity of a single sale line.
pub const MAX_SALE_QUANTITY: i64 = 999;

/// Low-stock threshold applied to imported rows, which carry no threshold
/// column of their own.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// serde default hook for [`types::ItemDraft::low_stock_threshold`].
pub(crate) const fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}
