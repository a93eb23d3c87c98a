use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::{LoadError, LoadResult};
use super::model::{ProductCatalog, ProductRecord};

// ---------------------------------------------------------------------------
// Column contract
// ---------------------------------------------------------------------------

pub const COL_ID: &str = "uniq_id";
pub const COL_NAME: &str = "product_name";
pub const COL_URL: &str = "product_url";
pub const COL_CATEGORY_TREE: &str = "product_category_tree";
pub const COL_RETAIL_PRICE: &str = "retail_price";
pub const COL_DISCOUNTED_PRICE: &str = "discounted_price";
pub const COL_BRAND: &str = "brand";
pub const COL_CRAWL_TIMESTAMP: &str = "crawl_timestamp";
pub const COL_RATING: &str = "product_rating";

/// Which columns a source must provide and which nulls drop a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogSchema {
    /// The bundled catalog: every column the dashboard reads is required.
    Full,
    /// A user-picked file: only the price and brand columns are required.
    Minimal,
}

impl CatalogSchema {
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            CatalogSchema::Full => &[
                COL_RETAIL_PRICE,
                COL_DISCOUNTED_PRICE,
                COL_BRAND,
                COL_CATEGORY_TREE,
                COL_CRAWL_TIMESTAMP,
                COL_RATING,
                COL_NAME,
            ],
            CatalogSchema::Minimal => &[COL_RETAIL_PRICE, COL_DISCOUNTED_PRICE, COL_BRAND],
        }
    }

    fn requires_category_tree(self) -> bool {
        matches!(self, CatalogSchema::Full)
    }

    fn check_columns<'a>(self, present: impl IntoIterator<Item = &'a str>) -> LoadResult<()> {
        let present: HashSet<&str> = present.into_iter().collect();
        match self.required_columns().iter().find(|c| !present.contains(*c)) {
            Some(missing) => Err(LoadError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a product catalog from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma-separated with a header row (the catalog's native format)
/// * `.parquet` – the same table exported by a dataframe library
pub fn load_file(path: &Path, schema: CatalogSchema) -> LoadResult<ProductCatalog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let open = || {
        File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    match ext.as_str() {
        "csv" => load_csv_reader(open()?, schema),
        "parquet" | "pq" => load_parquet(open()?, schema),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Row assembly shared by both formats
// ---------------------------------------------------------------------------

/// One source row before null-dropping and derivation.
#[derive(Debug)]
struct RawProduct {
    id: Option<String>,
    name: Option<String>,
    url: Option<String>,
    category_tree: Option<String>,
    retail_price: Option<f64>,
    discounted_price: Option<f64>,
    brand: Option<String>,
    crawl_timestamp: Option<String>,
    rating: Option<String>,
}

impl RawProduct {
    /// `None` when a field the schema treats as mandatory is null.
    fn into_record(self, schema: CatalogSchema) -> Option<ProductRecord> {
        let retail_price = self.retail_price?;
        let discounted_price = self.discounted_price?;
        let brand = self.brand?;
        if schema.requires_category_tree() && self.category_tree.is_none() {
            return None;
        }
        let crawl_timestamp = self.crawl_timestamp.as_deref().and_then(parse_timestamp);
        Some(ProductRecord::new(
            self.id,
            self.name,
            self.url,
            self.category_tree,
            retail_price,
            discounted_price,
            brand,
            crawl_timestamp,
            self.rating,
        ))
    }
}

fn assemble(raw: Vec<RawProduct>, schema: CatalogSchema) -> ProductCatalog {
    let total = raw.len();
    let records: Vec<ProductRecord> = raw
        .into_iter()
        .filter_map(|r| r.into_record(schema))
        .collect();
    let dropped = total - records.len();
    log::info!(
        "Loaded {} products ({} dropped for missing price/brand fields)",
        records.len(),
        dropped
    );
    ProductCatalog::from_records(records, dropped)
}

/// Parse a crawl timestamp; anything unrecognised is treated as missing.
///
/// Zone-less forms are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts);
    }
    let utc = FixedOffset::east_opt(0)?;
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return naive.and_local_timezone(utc).single();
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(utc).single())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Cell text read as missing, matching the dataframe tooling that exports
/// these catalogs.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn not_na(cell: Option<String>) -> Option<String> {
    cell.filter(|c| !NA_TOKENS.contains(&c.as_str()))
}

/// Header-keyed CSV row. Missing optional columns deserialize to `None`,
/// and so do empty cells.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "uniq_id", default)]
    id: Option<String>,
    #[serde(rename = "product_name", default)]
    name: Option<String>,
    #[serde(rename = "product_url", default)]
    url: Option<String>,
    #[serde(rename = "product_category_tree", default)]
    category_tree: Option<String>,
    #[serde(default)]
    retail_price: Option<String>,
    #[serde(default)]
    discounted_price: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    crawl_timestamp: Option<String>,
    #[serde(rename = "product_rating", default)]
    rating: Option<String>,
}

/// Parse a catalog from any CSV source with a header row.
pub fn load_csv_reader<R: Read>(reader: R, schema: CatalogSchema) -> LoadResult<ProductCatalog> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    schema.check_columns(headers.iter())?;

    let mut raw = Vec::new();
    for (row_no, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line = row_no + 2;
        let row = result?;
        raw.push(RawProduct {
            retail_price: parse_price(row.retail_price.as_deref(), line, COL_RETAIL_PRICE)?,
            discounted_price: parse_price(
                row.discounted_price.as_deref(),
                line,
                COL_DISCOUNTED_PRICE,
            )?,
            id: not_na(row.id),
            name: not_na(row.name),
            url: not_na(row.url),
            category_tree: not_na(row.category_tree),
            brand: not_na(row.brand),
            crawl_timestamp: not_na(row.crawl_timestamp),
            rating: not_na(row.rating),
        });
    }

    Ok(assemble(raw, schema))
}

/// Empty, NA or non-finite → `None`; other non-numeric text fails the whole load.
fn parse_price(cell: Option<&str>, line: usize, col: &str) -> LoadResult<Option<f64>> {
    let Some(text) = cell
        .map(str::trim)
        .filter(|t| !t.is_empty() && !NA_TOKENS.contains(t))
    else {
        return Ok(None);
    };
    text.parse::<f64>()
        .map(|v| v.is_finite().then_some(v))
        .map_err(|_| LoadError::InvalidRecord {
            row: line,
            message: format!("{col} '{text}' is not a number"),
        })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the catalog.
///
/// Price columns may be any numeric type or numeric text; all other columns
/// are read as text (timestamps included, then parsed like the CSV form).
fn load_parquet(file: File, schema: CatalogSchema) -> LoadResult<ProductCatalog> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let arrow_schema = builder.schema().clone();
    schema.check_columns(arrow_schema.fields().iter().map(|f| f.name().as_str()))?;

    let reader = builder.build()?;
    let mut raw = Vec::new();
    for batch in reader {
        let batch = batch?;
        raw.extend(batch_rows(&batch)?);
    }

    Ok(assemble(raw, schema))
}

fn batch_rows(batch: &RecordBatch) -> LoadResult<Vec<RawProduct>> {
    let text = |name: &str| -> LoadResult<Option<ArrayRef>> {
        batch
            .column_by_name(name)
            .map(|col| cast_strict(col, &DataType::Utf8))
            .transpose()
    };
    let number = |name: &str| -> LoadResult<Option<ArrayRef>> {
        batch
            .column_by_name(name)
            .map(|col| cast_strict(col, &DataType::Float64))
            .transpose()
    };

    let id = text(COL_ID)?;
    let name = text(COL_NAME)?;
    let url = text(COL_URL)?;
    let tree = text(COL_CATEGORY_TREE)?;
    let retail = number(COL_RETAIL_PRICE)?;
    let discounted = number(COL_DISCOUNTED_PRICE)?;
    let brand = text(COL_BRAND)?;
    let crawl = text(COL_CRAWL_TIMESTAMP)?;
    let rating = text(COL_RATING)?;

    Ok((0..batch.num_rows())
        .map(|row| RawProduct {
            id: string_at(id.as_ref(), row),
            name: string_at(name.as_ref(), row),
            url: string_at(url.as_ref(), row),
            category_tree: string_at(tree.as_ref(), row),
            retail_price: f64_at(retail.as_ref(), row),
            discounted_price: f64_at(discounted.as_ref(), row),
            brand: string_at(brand.as_ref(), row),
            crawl_timestamp: string_at(crawl.as_ref(), row),
            rating: string_at(rating.as_ref(), row),
        })
        .collect())
}

/// Cast that fails on unparseable values instead of nulling them.
fn cast_strict(col: &ArrayRef, to: &DataType) -> LoadResult<ArrayRef> {
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    Ok(cast_with_options(col, to, &options)?)
}

/// Only a null slot is missing; an empty string is kept as a value.
fn string_at(col: Option<&ArrayRef>, row: usize) -> Option<String> {
    let col = col?;
    if col.is_null(row) {
        return None;
    }
    Some(col.as_string::<i32>().value(row).to_string())
}

/// NaN and infinities count as missing.
fn f64_at(col: Option<&ArrayRef>, row: usize) -> Option<f64> {
    let col = col?;
    if col.is_null(row) {
        return None;
    }
    let value = col.as_primitive::<Float64Type>().value(row);
    value.is_finite().then_some(value)
}
