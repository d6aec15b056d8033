//! Bulk product import reconciler
//!
//! Parses `;`-delimited CSV exports and reconciles them against the
//! catalog: existing products (matched by barcode, then by reference) are
//! overwritten in place, unknown ones are inserted. Import is the one path
//! that sets `current_stock` directly instead of going through the ledger:
//! an imported file states absolute stock counts, not deltas.
//!
//! Rows that fail validation are skipped and reported individually; they do
//! not abort the batch. The batch itself is one transaction: a storage
//! failure rolls back every insert and update.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{normalize_header, parse_import_integer, parse_lenient_decimal};

/// Headers that must be present in an import file
pub const REQUIRED_HEADERS: [&str; 6] = [
    "name",
    "category_id",
    "purchase_price",
    "sale_price",
    "current_stock",
    "alert_threshold",
];

/// Headers that may be present in an import file
pub const OPTIONAL_HEADERS: [&str; 3] = ["barcode", "reference", "location"];

/// Bulk import service
#[derive(Clone)]
pub struct ImportService {
    db: PgPool,
}

/// One raw CSV row, fields still unvalidated strings
#[derive(Debug, Clone, Default)]
pub struct RawProductRow {
    /// 1-based line number in the file (the header is line 1)
    pub row_number: usize,
    pub name: String,
    pub barcode: String,
    pub reference: String,
    pub category: String,
    pub purchase_price: String,
    pub sale_price: String,
    pub current_stock: String,
    pub alert_threshold: String,
    pub location: String,
}

impl RawProductRow {
    fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.barcode.is_empty()
            && self.reference.is_empty()
            && self.category.is_empty()
            && self.purchase_price.is_empty()
            && self.sale_price.is_empty()
            && self.current_stock.is_empty()
            && self.alert_threshold.is_empty()
            && self.location.is_empty()
    }
}

/// Why a row was skipped
#[derive(Debug, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

/// Outcome of an import batch
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub rows_processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

/// A row that passed validation and is ready to reconcile
struct ValidatedRow {
    name: String,
    barcode: Option<String>,
    reference: Option<String>,
    category_id: Uuid,
    purchase_price: Decimal,
    sale_price: Decimal,
    current_stock: i32,
    alert_threshold: i32,
    location: Option<String>,
}

impl ImportService {
    /// Create a new ImportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Parse the raw CSV bytes into rows
    ///
    /// Headers are matched case-insensitively after normalization, so
    /// "Purchase Price" and "purchase-price" both resolve. Missing required
    /// headers abort the import before any row is looked at.
    pub fn parse_rows(data: &[u8]) -> AppResult<Vec<RawProductRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data);

        let headers = reader
            .headers()
            .map_err(|e| AppError::Validation {
                field: "csv_file".to_string(),
                message: format!("Unable to read CSV headers: {}", e),
                message_fr: "Impossible de lire les en-têtes du fichier CSV".to_string(),
            })?
            .clone();

        // Map only the expected headers; anything else in the file is ignored
        let mut header_map: HashMap<String, usize> = HashMap::new();
        for (index, raw_name) in headers.iter().enumerate() {
            let normalized = normalize_header(raw_name);
            let known = REQUIRED_HEADERS.contains(&normalized.as_str())
                || OPTIONAL_HEADERS.contains(&normalized.as_str());
            if known {
                header_map.insert(normalized, index);
            }
        }

        let missing: Vec<&str> = REQUIRED_HEADERS
            .iter()
            .filter(|h| !header_map.contains_key(**h))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation {
                field: "csv_file".to_string(),
                message: format!("Invalid CSV file. Missing headers: {}", missing.join(", ")),
                message_fr: format!(
                    "Fichier CSV invalide. En-têtes manquants : {}",
                    missing.join(", ")
                ),
            });
        }

        let field = |record: &csv::StringRecord, name: &str| -> String {
            header_map
                .get(name)
                .and_then(|i| record.get(*i))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| AppError::Validation {
                field: "csv_file".to_string(),
                message: format!("Malformed CSV record on line {}: {}", index + 2, e),
                message_fr: format!("Ligne CSV malformée (ligne {})", index + 2),
            })?;

            rows.push(RawProductRow {
                row_number: index + 2,
                name: field(&record, "name"),
                barcode: field(&record, "barcode"),
                reference: field(&record, "reference"),
                category: field(&record, "category_id"),
                purchase_price: field(&record, "purchase_price"),
                sale_price: field(&record, "sale_price"),
                current_stock: field(&record, "current_stock"),
                alert_threshold: field(&record, "alert_threshold"),
                location: field(&record, "location"),
            });
        }

        Ok(rows)
    }

    /// Reconcile parsed rows against the catalog in one transaction
    pub async fn import_products(
        &self,
        user_id: Uuid,
        rows: Vec<RawProductRow>,
    ) -> AppResult<ImportSummary> {
        debug!(user = %user_id, rows = rows.len(), "Starting product import");

        // Categories are resolvable by id or by case-insensitive name
        let category_rows =
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM categories")
                .fetch_all(&self.db)
                .await?;
        let category_ids: Vec<Uuid> = category_rows.iter().map(|(id, _)| *id).collect();
        let categories_by_name: HashMap<String, Uuid> = category_rows
            .into_iter()
            .map(|(id, name)| (name.trim().to_lowercase(), id))
            .collect();

        let mut summary = ImportSummary {
            rows_processed: rows.len(),
            inserted: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
        };

        let mut tx = self.db.begin().await?;

        for row in rows {
            if row.is_blank() {
                summary.skipped += 1;
                summary.errors.push(ImportRowError {
                    row: row.row_number,
                    message: "Empty row".to_string(),
                });
                continue;
            }

            let row_number = row.row_number;
            match validate_row(row, &category_ids, &categories_by_name) {
                Ok(validated) => {
                    if self.reconcile_row(&mut tx, &validated).await? {
                        summary.updated += 1;
                    } else {
                        summary.inserted += 1;
                    }
                }
                Err(messages) => {
                    summary.skipped += 1;
                    summary.errors.push(ImportRowError {
                        row: row_number,
                        message: messages.join(", "),
                    });
                }
            }
        }

        tx.commit().await?;

        debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            "Product import finished"
        );

        Ok(summary)
    }

    /// Insert or update one validated row. Returns true when an existing
    /// product was updated.
    async fn reconcile_row(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        row: &ValidatedRow,
    ) -> AppResult<bool> {
        // Match by barcode first, then by reference
        let mut existing_id: Option<Uuid> = None;
        if let Some(barcode) = &row.barcode {
            existing_id =
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE barcode = $1 LIMIT 1")
                    .bind(barcode)
                    .fetch_optional(&mut **tx)
                    .await?;
        }
        if existing_id.is_none() {
            if let Some(reference) = &row.reference {
                existing_id = sqlx::query_scalar::<_, Uuid>(
                    "SELECT id FROM products WHERE reference = $1 LIMIT 1",
                )
                .bind(reference)
                .fetch_optional(&mut **tx)
                .await?;
            }
        }

        match existing_id {
            Some(id) => {
                // Direct overwrite, including the cached stock: import states
                // absolute counts and bypasses the ledger on purpose
                sqlx::query(
                    r#"
                    UPDATE products
                    SET name = $1, category_id = $2, purchase_price = $3, sale_price = $4,
                        current_stock = $5, alert_threshold = $6, location = $7,
                        updated_at = NOW()
                    WHERE id = $8
                    "#,
                )
                .bind(&row.name)
                .bind(row.category_id)
                .bind(row.purchase_price)
                .bind(row.sale_price)
                .bind(row.current_stock)
                .bind(row.alert_threshold)
                .bind(&row.location)
                .bind(id)
                .execute(&mut **tx)
                .await?;
                Ok(true)
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO products
                        (name, barcode, reference, category_id, purchase_price, sale_price,
                         current_stock, alert_threshold, location)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(&row.name)
                .bind(&row.barcode)
                .bind(&row.reference)
                .bind(row.category_id)
                .bind(row.purchase_price)
                .bind(row.sale_price)
                .bind(row.current_stock)
                .bind(row.alert_threshold)
                .bind(&row.location)
                .execute(&mut **tx)
                .await?;
                Ok(false)
            }
        }
    }
}

/// Validate one raw row, collecting every problem instead of stopping at
/// the first so the report names them all
fn validate_row(
    row: RawProductRow,
    category_ids: &[Uuid],
    categories_by_name: &HashMap<String, Uuid>,
) -> Result<ValidatedRow, Vec<String>> {
    let mut errors = Vec::new();

    if row.name.is_empty() {
        errors.push("Missing product name".to_string());
    }

    let category_id = if row.category.is_empty() {
        errors.push("Missing category".to_string());
        None
    } else {
        match Uuid::parse_str(&row.category) {
            Ok(id) if category_ids.contains(&id) => Some(id),
            // Not a known id: fall back to a case-insensitive name match
            _ => match categories_by_name.get(&row.category.trim().to_lowercase()) {
                Some(id) => Some(*id),
                None => {
                    errors.push(format!("Unknown category '{}'", row.category));
                    None
                }
            },
        }
    };

    let purchase_price = match parse_lenient_decimal(&row.purchase_price) {
        Some(p) if p >= Decimal::ZERO => Some(p),
        _ => {
            errors.push("Invalid purchase price".to_string());
            None
        }
    };

    let sale_price = match parse_lenient_decimal(&row.sale_price) {
        Some(p) if p >= Decimal::ZERO => Some(p),
        _ => {
            errors.push("Invalid sale price".to_string());
            None
        }
    };

    // Initial stock and alert threshold may both be zero
    let current_stock = match parse_import_integer(&row.current_stock) {
        Some(s) if s >= 0 => Some(s),
        _ => {
            errors.push("Invalid stock level".to_string());
            None
        }
    };

    let alert_threshold = match parse_import_integer(&row.alert_threshold) {
        Some(t) if t >= 0 => Some(t),
        _ => {
            errors.push("Invalid alert threshold".to_string());
            None
        }
    };

    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

    match (
        category_id,
        purchase_price,
        sale_price,
        current_stock,
        alert_threshold,
    ) {
        (
            Some(category_id),
            Some(purchase_price),
            Some(sale_price),
            Some(current_stock),
            Some(alert_threshold),
        ) if errors.is_empty() => Ok(ValidatedRow {
            name: row.name,
            barcode: non_empty(row.barcode),
            reference: non_empty(row.reference),
            category_id,
            purchase_price,
            sale_price,
            current_stock,
            alert_threshold,
            location: non_empty(row.location),
        }),
        _ => Err(errors),
    }
}
