//! # CSV Import / Export
//!
//! Bulk catalog transfer.
//!
//! ## Import Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each row:                                                          │
//! │    name / sku / purchase_price / selling_price blank? ──► skipped       │
//! │    a number fails to parse?                           ──► skipped       │
//! │    category / supplier named?      ──► found or created by name         │
//! │    insert product                                                       │
//! │      ├── ok                                           ──► added         │
//! │      ├── duplicate SKU or invalid field               ──► skipped       │
//! │      └── any other database error                     ──► abort (Err)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing file imports nothing.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use tally_core::{Money, NewProduct};

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImportRow {
    name: Option<String>,
    sku: Option<String>,
    purchase_price: Option<String>,
    selling_price: Option<String>,
    stock: Option<String>,
    category: Option<String>,
    supplier: Option<String>,
    description: Option<String>,
    image_path: Option<String>,
    min_stock: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    name: &'a str,
    sku: &'a str,
    purchase_price: String,
    selling_price: String,
    stock: i64,
    category_id: Option<&'a str>,
    supplier_id: Option<&'a str>,
    description: Option<&'a str>,
    image_path: Option<&'a str>,
    min_stock: i64,
}

/// A row that passed the required-field and number checks.
struct ParsedRow {
    product: NewProduct,
    category: Option<String>,
    supplier: Option<String>,
}

fn present(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_count(field: Option<String>) -> Result<i64, String> {
    match present(field) {
        None => Ok(0),
        Some(raw) => raw.parse::<i64>().map_err(|_| raw),
    }
}

impl ImportRow {
    fn parse(self) -> Result<ParsedRow, String> {
        let (Some(name), Some(sku), Some(purchase), Some(selling)) = (
            present(self.name),
            present(self.sku),
            present(self.purchase_price),
            present(self.selling_price),
        ) else {
            return Err("missing name, sku or price".to_string());
        };

        let purchase_price: Money = purchase.parse().map_err(|_| purchase.clone())?;
        let selling_price: Money = selling.parse().map_err(|_| selling.clone())?;

        let mut product = NewProduct::new(name, sku, purchase_price, selling_price);
        product.stock = parse_count(self.stock)?;
        product.min_stock = parse_count(self.min_stock)?;
        product.description = present(self.description);
        product.image_path = present(self.image_path);

        Ok(ParsedRow {
            product,
            category: present(self.category),
            supplier: present(self.supplier),
        })
    }
}

/// Imports products from a CSV file with a header row.
pub async fn import_products(db: &Database, path: &Path) -> DbResult<ImportReport> {
    let mut report = ImportReport::default();

    if !path.exists() {
        warn!(path = %path.display(), "Import file not found; nothing imported");
        return Ok(report);
    }

    info!(path = %path.display(), "Importing products");

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    for (index, record) in reader.deserialize::<ImportRow>().enumerate() {
        let line = index + 2; // header is line 1

        let parsed = match record {
            Ok(row) => row.parse(),
            Err(e) => Err(e.to_string()),
        };
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(reason) => {
                debug!(line, reason = %reason, "Skipping row");
                report.skipped += 1;
                continue;
            }
        };

        let ParsedRow {
            mut product,
            category,
            supplier,
        } = parsed;

        if let Some(name) = category {
            product.category_id = Some(db.categories().get_or_create(&name).await?.id);
        }
        if let Some(name) = supplier {
            product.supplier_id = Some(db.suppliers().get_or_create(&name).await?.id);
        }

        match db.products().insert(&product).await {
            Ok(_) => report.added += 1,
            Err(err @ (DbError::UniqueViolation { .. } | DbError::Core(_))) => {
                debug!(line, sku = %product.sku, error = %err, "Skipping row");
                report.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(added = report.added, skipped = report.skipped, "Import finished");
    Ok(report)
}

/// Writes every product to a CSV file. Returns the number of rows written.
pub async fn export_products(db: &Database, path: &Path) -> DbResult<usize> {
    let listings = db.products().list_all().await?;

    let mut writer = csv::Writer::from_path(path)?;
    for listing in &listings {
        let p = &listing.product;
        writer.serialize(ExportRow {
            id: &p.id,
            name: &p.name,
            sku: &p.sku,
            purchase_price: p.purchase_price.to_storage_string(),
            selling_price: p.selling_price.to_storage_string(),
            stock: p.stock,
            category_id: p.category_id.as_deref(),
            supplier_id: p.supplier_id.as_deref(),
            description: p.description.as_deref(),
            image_path: p.image_path.as_deref(),
            min_stock: p.min_stock,
        })?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = listings.len(), "Products exported");
    Ok(listings.len())
}

// =============================================================================
// Unit Tests
// =============================================================================
