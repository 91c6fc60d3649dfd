//! # Domain Types
//!
//! Core domain types for the merchandise inventory and sales ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      Sale       │   │  StockBySize    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  s / m / l      │       │
//! │  │  sku (business) │   │  item_id (FK)   │   │  xl / xxl       │       │
//! │  │  name, price    │   │  size, quantity │   │  five counters, │       │
//! │  │  stock, images  │   │  channel, date  │   │  all >= 0       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │   SaleStatus    │   │  SaleChannel    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Clothing       │   │  Active         │   │  Concert        │       │
//! │  │  Music          │   │  Voided         │   │  Online         │       │
//! │  │  Accessory      │   └─────────────────┘   │  Partner        │       │
//! │  │  Other          │                         │  Gift (0 rev)   │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Items carry two identifiers:
//! - `id`: UUID v4 - immutable, used for store document keys and relations
//! - `sku`: business identifier, deterministically derived (see [`crate::sku`])

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// The merchandise category of an item.
///
/// Only clothing tracks stock across the five garment sizes; every other
/// category uses the S slot as a single undifferentiated count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Clothing,
    Music,
    Accessory,
    Other,
}

impl Category {
    /// Two-letter code used as the SKU prefix.
    pub const fn code(&self) -> &'static str {
        match self {
            Category::Clothing => "CL",
            Category::Music => "MU",
            Category::Accessory => "AC",
            Category::Other => "OT",
        }
    }

    /// The subcategories an item of this category may carry.
    ///
    /// An empty slice means the category accepts no subcategory at all.
    pub const fn allowed_subcategories(&self) -> &'static [&'static str] {
        match self {
            Category::Clothing => &["tshirt", "longsleeve", "hoodie", "tanktop", "hat"],
            Category::Music => &["cd", "vinyl", "cassette", "digital"],
            Category::Accessory => &["poster", "sticker", "pin", "patch", "tote"],
            Category::Other => &[],
        }
    }

    /// Whether `subcategory` is legal for this category.
    pub fn allows_subcategory(&self, subcategory: &str) -> bool {
        self.allowed_subcategories().contains(&subcategory)
    }

    /// True for categories whose stock is differentiated by garment size.
    pub const fn uses_sizes(&self) -> bool {
        matches!(self, Category::Clothing)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Clothing => write!(f, "Clothing"),
            Category::Music => write!(f, "Music"),
            Category::Accessory => write!(f, "Accessory"),
            Category::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clothing" => Ok(Category::Clothing),
            "music" => Ok(Category::Music),
            "accessory" => Ok(Category::Accessory),
            "other" => Ok(Category::Other),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Size
// =============================================================================

/// A size tag for stock counters and sale lines.
///
/// `OneSize` is the sentinel for non-clothing items; it shares the S slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    S,
    M,
    L,
    Xl,
    Xxl,
    OneSize,
}

impl Size {
    /// The five slot tags in stock-counter order.
    pub const SLOTS: [Size; 5] = [Size::S, Size::M, Size::L, Size::Xl, Size::Xxl];

    /// The counter slot this size maps to. `OneSize` shares the S slot.
    pub const fn slot(&self) -> Size {
        match self {
            Size::OneSize => Size::S,
            other => *other,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::S => write!(f, "S"),
            Size::M => write!(f, "M"),
            Size::L => write!(f, "L"),
            Size::Xl => write!(f, "XL"),
            Size::Xxl => write!(f, "XXL"),
            Size::OneSize => write!(f, "one_size"),
        }
    }
}

impl std::str::FromStr for Size {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" => Ok(Size::S),
            "m" => Ok(Size::M),
            "l" => Ok(Size::L),
            "xl" => Ok(Size::Xl),
            "xxl" => Ok(Size::Xxl),
            "one_size" | "onesize" | "one size" => Ok(Size::OneSize),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Stock Counters
// =============================================================================

/// Per-size stock counters.
///
/// ## Invariants
/// - Every counter >= 0 at all times (enforced at validation and by the
///   stock transaction coordinator).
/// - `total()` = sum of the five counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBySize {
    pub s: i64,
    pub m: i64,
    pub l: i64,
    pub xl: i64,
    pub xxl: i64,
}

impl StockBySize {
    /// A stock distribution with every counter at zero.
    pub const fn empty() -> Self {
        StockBySize { s: 0, m: 0, l: 0, xl: 0, xxl: 0 }
    }

    /// Stock for a non-clothing item: a single undifferentiated count
    /// living in the S slot.
    pub const fn single(count: i64) -> Self {
        StockBySize { s: count, m: 0, l: 0, xl: 0, xxl: 0 }
    }

    /// Returns the counter for a size tag (`OneSize` reads the S slot).
    pub const fn get(&self, size: Size) -> i64 {
        match size.slot() {
            Size::S => self.s,
            Size::M => self.m,
            Size::L => self.l,
            Size::Xl => self.xl,
            Size::Xxl => self.xxl,
            // slot() never returns OneSize
            Size::OneSize => self.s,
        }
    }

    /// Sets the counter for a size tag (`OneSize` writes the S slot).
    pub fn set(&mut self, size: Size, count: i64) {
        match size.slot() {
            Size::S | Size::OneSize => self.s = count,
            Size::M => self.m = count,
            Size::L => self.l = count,
            Size::Xl => self.xl = count,
            Size::Xxl => self.xxl = count,
        }
    }

    /// Total units across all five counters.
    pub const fn total(&self) -> i64 {
        self.s + self.m + self.l + self.xl + self.xxl
    }

    /// The five counters in slot order, for iteration.
    pub const fn counters(&self) -> [(Size, i64); 5] {
        [
            (Size::S, self.s),
            (Size::M, self.m),
            (Size::L, self.l),
            (Size::Xl, self.xl),
            (Size::Xxl, self.xxl),
        ]
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable catalog entry with per-size stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Scope this item belongs to (one group per deployment tenant).
    pub group_id: String,

    /// Display name, non-empty.
    pub name: String,

    /// Free-text description, may be empty.
    pub description: String,

    /// Sale price per unit, strictly positive.
    pub price: Money,

    /// Unit cost (for margin computation).
    pub cost: Option<Money>,

    /// Merchandise category.
    pub category: Category,

    /// Subcategory, legal for `category` when present.
    pub subcategory: Option<String>,

    /// Per-size stock counters.
    pub stock: StockBySize,

    /// Threshold at or below which (but above zero) the item is low-stock.
    pub low_stock_threshold: i64,

    /// Stock keeping unit - business identifier, derived when absent.
    pub sku: Option<String>,

    /// Opaque references into the external image store.
    pub image_refs: Vec<String>,

    /// When the item was last written.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Total units in stock across all sizes.
    #[inline]
    pub fn total_stock(&self) -> i64 {
        self.stock.total()
    }

    /// Low-stock flag: some stock remains, but no more than the threshold.
    ///
    /// A fully depleted item is *out of stock*, which is a distinct state.
    pub fn is_low_stock(&self) -> bool {
        let total = self.total_stock();
        total > 0 && total <= self.low_stock_threshold
    }

    /// True when every counter is depleted.
    pub fn is_out_of_stock(&self) -> bool {
        self.total_stock() == 0
    }

    /// Unit margin, when a cost is recorded.
    pub fn margin(&self) -> Option<Money> {
        self.cost.map(|cost| self.price - cost)
    }
}

// =============================================================================
// Item Draft
// =============================================================================

/// Input shape for creating an item: everything but the assigned identity,
/// scope, and timestamps. Produced by callers of the catalog and by the CSV
/// import codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub cost: Option<Money>,
    pub category: Category,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub stock: StockBySize,
    #[serde(default = "crate::default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub image_refs: Vec<String>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale stands and its stock reservation is in effect.
    Active,
    /// Sale was cancelled; its stock was restored.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Active
    }
}

// =============================================================================
// Sale Channel
// =============================================================================

/// Where a sale happened.
///
/// `Gift` reduces stock like any other channel but contributes zero revenue
/// to every aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    Concert,
    Online,
    Partner,
    Gift,
    Other,
}

impl fmt::Display for SaleChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleChannel::Concert => write!(f, "concert"),
            SaleChannel::Online => write!(f, "online"),
            SaleChannel::Partner => write!(f, "partner"),
            SaleChannel::Gift => write!(f, "gift"),
            SaleChannel::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for SaleChannel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concert" => Ok(SaleChannel::Concert),
            "online" => Ok(SaleChannel::Online),
            "partner" => Ok(SaleChannel::Partner),
            "gift" => Ok(SaleChannel::Gift),
            "other" => Ok(SaleChannel::Other),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A ledger entry recording a quantity sold or gifted against an item.
///
/// Sales are immutable once recorded except for the single allowed
/// transition active → voided, and the atomic field replacement performed
/// by the ledger's amend operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Scope this sale belongs to.
    pub group_id: String,

    /// The item sold. May reference a deleted item (orphaned sales are
    /// tolerated by the ledger, not treated as corruption).
    pub item_id: String,

    /// Size sold; `OneSize` for non-clothing items.
    pub size: Size,

    /// Units sold, strictly positive.
    pub quantity: i64,

    /// Sale channel.
    pub channel: SaleChannel,

    /// When the sale was recorded.
    pub date: DateTime<Utc>,

    /// Active or voided.
    pub status: SaleStatus,
}

impl Sale {
    /// True while the sale stands (its reservation is in effect).
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SaleStatus::Active
    }

    /// Revenue this sale contributes given the item's unit price.
    ///
    /// Gift sales contribute zero regardless of price.
    pub fn revenue(&self, unit_price: Money) -> Money {
        if self.channel == SaleChannel::Gift {
            Money::zero()
        } else {
            unit_price * self.quantity
        }
    }
}

/// Input shape for a sale row parsed by the CSV import codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub date: DateTime<Utc>,
    pub size: Size,
    pub quantity: i64,
    pub channel: SaleChannel,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_stock(stock: StockBySize, threshold: i64) -> Item {
        Item {
            id: "item-1".to_string(),
            group_id: "group-1".to_string(),
            name: "Tour Tee".to_string(),
            description: String::new(),
            price: Money::from_cents(2000),
            cost: None,
            category: Category::Clothing,
            subcategory: Some("tshirt".to_string()),
            stock,
            low_stock_threshold: threshold,
            sku: None,
            image_refs: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_stock_is_sum_of_counters() {
        let item = item_with_stock(StockBySize { s: 10, m: 5, l: 2, xl: 1, xxl: 0 }, 5);
        assert_eq!(item.total_stock(), 18);
    }

    #[test]
    fn test_low_stock_requires_nonzero_total() {
        // At threshold: low stock
        let item = item_with_stock(StockBySize::single(5), 5);
        assert!(item.is_low_stock());
        assert!(!item.is_out_of_stock());

        // Above threshold: not low stock
        let item = item_with_stock(StockBySize::single(6), 5);
        assert!(!item.is_low_stock());

        // Fully depleted: out of stock, NOT low stock
        let item = item_with_stock(StockBySize::empty(), 5);
        assert!(!item.is_low_stock());
        assert!(item.is_out_of_stock());
    }

    #[test]
    fn test_one_size_shares_s_slot() {
        let mut stock = StockBySize::empty();
        stock.set(Size::OneSize, 7);
        assert_eq!(stock.s, 7);
        assert_eq!(stock.get(Size::OneSize), 7);
        assert_eq!(stock.get(Size::S), 7);
    }

    #[test]
    fn test_subcategory_legality() {
        assert!(Category::Clothing.allows_subcategory("tshirt"));
        assert!(!Category::Clothing.allows_subcategory("vinyl"));
        assert!(Category::Music.allows_subcategory("vinyl"));
        assert!(Category::Other.allowed_subcategories().is_empty());
    }

    #[test]
    fn test_category_display_round_trip() {
        for category in [Category::Clothing, Category::Music, Category::Accessory, Category::Other] {
            let rendered = category.to_string();
            assert_eq!(rendered.parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_size_parse() {
        assert_eq!("XL".parse::<Size>().unwrap(), Size::Xl);
        assert_eq!("one_size".parse::<Size>().unwrap(), Size::OneSize);
        assert!("XS".parse::<Size>().is_err());
    }

    #[test]
    fn test_gift_sale_contributes_zero_revenue() {
        let sale = Sale {
            id: "sale-1".to_string(),
            group_id: "group-1".to_string(),
            item_id: "item-1".to_string(),
            size: Size::S,
            quantity: 3,
            channel: SaleChannel::Gift,
            date: Utc::now(),
            status: SaleStatus::Active,
        };
        assert_eq!(sale.revenue(Money::from_cents(2000)), Money::zero());

        let paid = Sale { channel: SaleChannel::Concert, ..sale };
        assert_eq!(paid.revenue(Money::from_cents(2000)), Money::from_cents(6000));
    }

    #[test]
    fn test_margin() {
        let mut item = item_with_stock(StockBySize::single(1), 0);
        assert_eq!(item.margin(), None);
        item.cost = Some(Money::from_cents(700));
        assert_eq!(item.margin(), Some(Money::from_cents(1300)));
    }
}
