//! # Import/Export Codec
//!
//! Translates the catalog and ledger to/from the CSV wire format. Operates
//! on in-memory strings only; the file-export surface that shares the bytes
//! is an external collaborator.
//!
//! ## Wire Contract
//! ```text
//! Items:  Name,Description,Price,Category,Subcategory,S,M,L,XL,XXL
//! Sales:  Date,Size,Quantity,Channel,Amount
//! ```
//! Header row, column order, and the `yyyy-MM-dd HH:mm:ss` date format are
//! part of the contract and reproduced bit-exact for interoperability with
//! prior exports.
//!
//! ## Import Semantics
//! - A malformed header is a [`CodecError::Header`]; nothing is parsed.
//! - A row whose required numeric field fails to parse (or parses outside
//!   its domain: negative stock, non-positive price or quantity) is skipped,
//!   and the outcome reports how many rows were skipped.
//! - Zero valid rows is an empty outcome, not an error.

use chrono::NaiveDateTime;

use crate::error::{CodecError, CodecResult};
use crate::money::Money;
use crate::default_low_stock_threshold;
use crate::types::{Category, Item, ItemDraft, Sale, SaleChannel, SaleDraft, Size, StockBySize};

// =============================================================================
// Wire Constants
// =============================================================================

/// Fixed item export header, in exactly this order.
pub const ITEM_EXPORT_HEADER: [&str; 10] = [
    "Name",
    "Description",
    "Price",
    "Category",
    "Subcategory",
    "S",
    "M",
    "L",
    "XL",
    "XXL",
];

/// Fixed sale export header, in exactly this order.
pub const SALE_EXPORT_HEADER: [&str; 5] = ["Date", "Size", "Quantity", "Channel", "Amount"];

/// Literal rendered in the `Amount` column for gift-channel sales.
pub const GIFT_AMOUNT_MARKER: &str = "Gift";

/// Sale `Date` column format (`yyyy-MM-dd HH:mm:ss`).
pub const SALE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Import Outcomes
// =============================================================================

/// Result of an item import: the parsed drafts plus the skipped-row count.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemImport {
    pub drafts: Vec<ItemDraft>,
    pub skipped: usize,
}

/// Result of a sale import: the parsed drafts plus the skipped-row count.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleImport {
    pub drafts: Vec<SaleDraft>,
    pub skipped: usize,
}

// =============================================================================
// Item Export / Import
// =============================================================================

/// Exports items to the CSV wire format.
///
/// Stock counters render as plain integers, `Price` in plain money form,
/// `Subcategory` as the empty string when absent.
pub fn export_items(items: &[Item]) -> CodecResult<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(ITEM_EXPORT_HEADER)
        .map_err(|e| CodecError::Write(e.to_string()))?;

    for item in items {
        let price = item.price.to_plain_string();
        let category = item.category.to_string();
        let counters = item.stock.counters().map(|(_, count)| count.to_string());

        writer
            .write_record([
                item.name.as_str(),
                item.description.as_str(),
                price.as_str(),
                category.as_str(),
                item.subcategory.as_deref().unwrap_or(""),
                counters[0].as_str(),
                counters[1].as_str(),
                counters[2].as_str(),
                counters[3].as_str(),
                counters[4].as_str(),
            ])
            .map_err(|e| CodecError::Write(e.to_string()))?;
    }

    finish(writer)
}

/// Imports items from the CSV wire format.
///
/// ## Returns
/// * `Ok(ItemImport)` - parsed drafts and the number of skipped rows
/// * `Err(CodecError::Header)` - the header row does not match the contract
pub fn import_items(input: &str) -> CodecResult<ItemImport> {
    let mut reader = reader_for(input);
    check_header(&mut reader, &ITEM_EXPORT_HEADER)?;

    let mut drafts = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        match parse_item_row(&record) {
            Some(draft) => drafts.push(draft),
            None => skipped += 1,
        }
    }

    Ok(ItemImport { drafts, skipped })
}

fn parse_item_row(record: &csv::StringRecord) -> Option<ItemDraft> {
    if record.len() != ITEM_EXPORT_HEADER.len() {
        return None;
    }

    let price = Money::parse_plain(record.get(2)?)?;
    if !price.is_positive() {
        return None;
    }

    let category: Category = record.get(3)?.parse().ok()?;

    let mut counters = [0i64; 5];
    for (i, counter) in counters.iter_mut().enumerate() {
        let parsed: i64 = record.get(5 + i)?.trim().parse().ok()?;
        if parsed < 0 {
            return None;
        }
        *counter = parsed;
    }

    let subcategory = record.get(4)?.trim();
    let subcategory = if subcategory.is_empty() {
        None
    } else {
        Some(subcategory.to_string())
    };

    Some(ItemDraft {
        name: record.get(0)?.to_string(),
        description: record.get(1)?.to_string(),
        price,
        cost: None,
        category,
        subcategory,
        stock: StockBySize {
            s: counters[0],
            m: counters[1],
            l: counters[2],
            xl: counters[3],
            xxl: counters[4],
        },
        low_stock_threshold: default_low_stock_threshold(),
        sku: None,
        image_refs: Vec::new(),
    })
}

// =============================================================================
// Sale Export / Import
// =============================================================================

/// Exports sales to the CSV wire format.
///
/// ## Arguments
/// * `sales` - the sale records to render
/// * `price_of` - unit-price lookup by item id; orphaned sales (deleted
///   item) render a zero amount
///
/// Gift-channel sales render the literal [`GIFT_AMOUNT_MARKER`] in the
/// `Amount` column regardless of price.
pub fn export_sales<F>(sales: &[Sale], price_of: F) -> CodecResult<String>
where
    F: Fn(&str) -> Option<Money>,
{
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(SALE_EXPORT_HEADER)
        .map_err(|e| CodecError::Write(e.to_string()))?;

    for sale in sales {
        let amount = if sale.channel == SaleChannel::Gift {
            GIFT_AMOUNT_MARKER.to_string()
        } else {
            let unit_price = price_of(&sale.item_id).unwrap_or_else(Money::zero);
            (unit_price * sale.quantity).to_plain_string()
        };

        writer
            .write_record([
                &sale.date.format(SALE_DATE_FORMAT).to_string(),
                &sale.size.to_string(),
                &sale.quantity.to_string(),
                &sale.channel.to_string(),
                &amount,
            ])
            .map_err(|e| CodecError::Write(e.to_string()))?;
    }

    finish(writer)
}

/// Imports sale rows from the CSV wire format.
///
/// The `Amount` column is derived on export and ignored on import.
pub fn import_sales(input: &str) -> CodecResult<SaleImport> {
    let mut reader = reader_for(input);
    check_header(&mut reader, &SALE_EXPORT_HEADER)?;

    let mut drafts = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        match parse_sale_row(&record) {
            Some(draft) => drafts.push(draft),
            None => skipped += 1,
        }
    }

    Ok(SaleImport { drafts, skipped })
}

fn parse_sale_row(record: &csv::StringRecord) -> Option<SaleDraft> {
    if record.len() != SALE_EXPORT_HEADER.len() {
        return None;
    }

    let date = NaiveDateTime::parse_from_str(record.get(0)?.trim(), SALE_DATE_FORMAT)
        .ok()?
        .and_utc();
    let size: Size = record.get(1)?.parse().ok()?;

    let quantity: i64 = record.get(2)?.trim().parse().ok()?;
    if quantity <= 0 {
        return None;
    }

    let channel = record.get(3)?.parse().ok()?;

    Some(SaleDraft { date, size, quantity, channel })
}

// =============================================================================
// Shared Helpers
// =============================================================================

fn reader_for(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes())
}

fn check_header(reader: &mut csv::Reader<&[u8]>, expected: &[&str]) -> CodecResult<()> {
    let expected_joined = expected.join(",");

    let headers = match reader.headers() {
        Ok(headers) => headers,
        Err(err) => {
            return Err(CodecError::Header {
                expected: expected_joined,
                found: err.to_string(),
            })
        }
    };

    let found: Vec<&str> = headers.iter().collect();
    if found != expected {
        return Err(CodecError::Header {
            expected: expected_joined,
            found: found.join(","),
        });
    }

    Ok(())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> CodecResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CodecError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CodecError::Write(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SaleChannel, SaleStatus};
    use chrono::{TimeZone, Utc};

    fn tee() -> Item {
        Item {
            id: "item-1".to_string(),
            group_id: "group-1".to_string(),
            name: "Tee".to_string(),
            description: String::new(),
            price: Money::from_cents(2000),
            cost: None,
            category: Category::Clothing,
            subcategory: None,
            stock: StockBySize { s: 10, m: 5, l: 0, xl: 0, xxl: 0 },
            low_stock_threshold: 5,
            sku: Some("CLGN-TEE-ITEM1".to_string()),
            image_refs: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_export_row_is_bit_exact() {
        let out = export_items(&[tee()]).unwrap();
        assert_eq!(
            out,
            "Name,Description,Price,Category,Subcategory,S,M,L,XL,XXL\n\
             Tee,,20,Clothing,,10,5,0,0,0\n"
        );
    }

    #[test]
    fn test_item_round_trip() {
        let mut item = tee();
        item.subcategory = Some("tshirt".to_string());
        item.price = Money::from_cents(2050);

        let out = export_items(&[item.clone()]).unwrap();
        let imported = import_items(&out).unwrap();

        assert_eq!(imported.skipped, 0);
        assert_eq!(imported.drafts.len(), 1);
        let draft = &imported.drafts[0];
        assert_eq!(draft.name, item.name);
        assert_eq!(draft.price, item.price);
        assert_eq!(draft.category, item.category);
        assert_eq!(draft.subcategory, item.subcategory);
        assert_eq!(draft.stock, item.stock);
    }

    #[test]
    fn test_unparseable_rows_are_skipped_not_fatal() {
        let input = "Name,Description,Price,Category,Subcategory,S,M,L,XL,XXL\n\
                     Tee,,20,Clothing,,10,5,0,0,0\n\
                     Bad,,notaprice,Clothing,,1,0,0,0,0\n\
                     Negative,,20,Clothing,,-1,0,0,0,0\n\
                     Hat,,15,Clothing,hat,3,0,0,0,0\n";
        let imported = import_items(input).unwrap();
        assert_eq!(imported.drafts.len(), 2);
        assert_eq!(imported.skipped, 2);
    }

    #[test]
    fn test_zero_valid_rows_is_empty_not_error() {
        let input = "Name,Description,Price,Category,Subcategory,S,M,L,XL,XXL\n";
        let imported = import_items(input).unwrap();
        assert!(imported.drafts.is_empty());
        assert_eq!(imported.skipped, 0);
    }

    #[test]
    fn test_malformed_header_is_fatal() {
        let input = "Name,Price\nTee,20\n";
        assert!(matches!(import_items(input), Err(CodecError::Header { .. })));

        assert!(matches!(import_items(""), Err(CodecError::Header { .. })));
    }

    #[test]
    fn test_sale_export_renders_date_and_amount() {
        let date = Utc.with_ymd_and_hms(2026, 6, 14, 20, 30, 0).unwrap();
        let sale = Sale {
            id: "sale-1".to_string(),
            group_id: "group-1".to_string(),
            item_id: "item-1".to_string(),
            size: Size::S,
            quantity: 2,
            channel: SaleChannel::Concert,
            date,
            status: SaleStatus::Active,
        };

        let out = export_sales(&[sale], |_| Some(Money::from_cents(2000))).unwrap();
        assert_eq!(
            out,
            "Date,Size,Quantity,Channel,Amount\n\
             2026-06-14 20:30:00,S,2,concert,40\n"
        );
    }

    #[test]
    fn test_gift_sale_renders_marker() {
        let date = Utc.with_ymd_and_hms(2026, 6, 14, 20, 30, 0).unwrap();
        let sale = Sale {
            id: "sale-1".to_string(),
            group_id: "group-1".to_string(),
            item_id: "item-1".to_string(),
            size: Size::OneSize,
            quantity: 3,
            channel: SaleChannel::Gift,
            date,
            status: SaleStatus::Active,
        };

        let out = export_sales(&[sale], |_| Some(Money::from_cents(2000))).unwrap();
        assert!(out.contains("2026-06-14 20:30:00,one_size,3,gift,Gift"));
    }

    #[test]
    fn test_sale_import_round_trip() {
        let input = "Date,Size,Quantity,Channel,Amount\n\
                     2026-06-14 20:30:00,S,2,concert,40\n\
                     2026-06-14 21:00:00,one_size,1,gift,Gift\n\
                     bad-date,S,1,online,10\n";
        let imported = import_sales(input).unwrap();
        assert_eq!(imported.drafts.len(), 2);
        assert_eq!(imported.skipped, 1);
        assert_eq!(imported.drafts[0].quantity, 2);
        assert_eq!(imported.drafts[1].channel, SaleChannel::Gift);
        assert_eq!(imported.drafts[1].size, Size::OneSize);
    }
}
