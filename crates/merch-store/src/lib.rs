//! # merch-store: Catalog, Ledger, and Stock Coordination
//!
//! This crate provides the remote-store-facing services of the merchandise
//! ledger: the item catalog, the sales ledger, and the stock transaction
//! coordinator that serializes concurrent stock mutations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Merchandise Ledger Data Flow                        │
//! │                                                                         │
//! │  UI layer (external)                                                   │
//! │       │ add/update/delete item          │ record/cancel/amend sale     │
//! │       ▼                                 ▼                              │
//! │  ┌───────────────┐              ┌───────────────┐                      │
//! │  │  ItemCatalog  │              │  SalesLedger  │                      │
//! │  │ (catalog.rs)  │              │  (ledger.rs)  │                      │
//! │  └───────┬───────┘              └───────┬───────┘                      │
//! │          │ direct writes               │ every stock mutation         │
//! │          │ (admin path)                ▼                              │
//! │          │                     ┌──────────────────┐                    │
//! │          │                     │ StockCoordinator │                    │
//! │          │                     │ (coordinator.rs) │                    │
//! │          │                     └────────┬─────────┘                    │
//! │          ▼                              ▼ versioned CAS               │
//! │  ┌─────────────────────────────────────────────────────────────────┐  │
//! │  │          RemoteStore seam (store.rs / memory.rs)                │  │
//! │  └─────────────────────────────────────────────────────────────────┘  │
//! │          │ opportunistic refresh, read fallback                       │
//! │          ▼                                                             │
//! │  OfflineCache (merch-cache)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `RemoteStore` contract (versioned documents, CAS)
//! - [`memory`] - In-memory reference implementation
//! - [`coordinator`] - Optimistic stock transactions with bounded retry
//! - [`catalog`] - Item catalog operations
//! - [`ledger`] - Sales ledger operations and aggregates
//! - [`error`] - Typed expected-outcome errors

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::ItemCatalog;
pub use coordinator::{StockCoordinator, DEFAULT_MAX_ATTEMPTS};
pub use error::{StoreError, StoreResult};
pub use ledger::{SalesLedger, SalesSummary};
pub use memory::MemoryStore;
pub use store::{RemoteStore, VersionedItem, VersionedSale};
