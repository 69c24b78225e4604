use crate::BoxError;
use crate::dataset::Dataset;
use crate::record::{MonthKey, SalesRecord};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::io::Read;
use std::path::Path;

lazy_static! {
    static ref UNIT_SUFFIX: Regex = Regex::new(r"\s*\([^)]*\)\s*$").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[\s_]+").unwrap();
}

/// A cell as read from either a workbook or a CSV file
#[derive(Clone, Debug, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Empty,
}

/// Required columns, keyed by their normalised header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Brand,
    Year,
    Month,
    Segment,
    EngineType,
    Model,
    SalesVolume,
    TotalSales,
    MarketShare,
    Price,
}

const FIELDS: [(Field, &str, &str); 10] = [
    (Field::Brand, "brand", "Brand"),
    (Field::Year, "year", "Year"),
    (Field::Month, "month", "Month"),
    (Field::Segment, "segment", "Segment"),
    (Field::EngineType, "engine type", "Engine Type"),
    (Field::Model, "model", "Model"),
    (Field::SalesVolume, "sales volume", "Sales Volume"),
    (Field::TotalSales, "total sales", "Total Sales"),
    (Field::MarketShare, "market share", "Market Share (%)"),
    (Field::Price, "price", "Price"),
];

/// Normalises a header for matching: lowercase, unit suffix such as
/// `(₹)` or `(%)` removed, runs of spaces and underscores collapsed.
///
/// # Examples
/// ```
/// use salesdash::loader::normalize_header;
///
/// assert_eq!(normalize_header("Price (₹)"), "price");
/// assert_eq!(normalize_header(" Market Share (%) "), "market share");
/// assert_eq!(normalize_header("Engine_Type"), "engine type");
/// ```
pub fn normalize_header(header: &str) -> String {
    let trimmed = header.trim();
    let without_unit = UNIT_SUFFIX.replace(trimmed, "");
    SEPARATORS
        .replace_all(without_unit.trim(), " ")
        .to_lowercase()
}

/// Maps each required field to its column index in the header row
struct ColumnMap {
    indices: [usize; 10],
}

impl ColumnMap {
    fn resolve(headers: &[RawCell]) -> Result<Self, BoxError> {
        let normalized: Vec<Option<String>> = headers
            .iter()
            .map(|cell| match cell {
                RawCell::Text(s) => Some(normalize_header(s)),
                RawCell::Number(n) => Some(format_number(*n)),
                RawCell::Empty => None,
            })
            .collect();

        let mut indices = [0usize; 10];
        for (slot, (_, key, display)) in indices.iter_mut().zip(FIELDS.iter()) {
            *slot = normalized
                .iter()
                .position(|h| h.as_deref() == Some(*key))
                .ok_or_else(|| format!("Missing required column '{}'", display))?;
        }

        Ok(ColumnMap { indices })
    }

    fn cell<'a>(&self, row: &'a [RawCell], field: Field) -> (&'a RawCell, &'static str) {
        // FIELDS is listed in declaration order
        let pos = field as usize;
        (row.get(self.indices[pos]).unwrap_or(&RawCell::Empty), FIELDS[pos].2)
    }
}

/// Builds records from a header row and data rows.
///
/// Blank rows are skipped. `first_line` is the 1-based line number of the
/// first data row, used in error messages.
pub fn records_from_rows(
    headers: &[RawCell],
    rows: impl IntoIterator<Item = Vec<RawCell>>,
    first_line: usize,
) -> Result<Vec<SalesRecord>, BoxError> {
    let columns = ColumnMap::resolve(headers)?;
    let mut records = Vec::new();

    for (offset, row) in rows.into_iter().enumerate() {
        if row.iter().all(|c| *c == RawCell::Empty) {
            continue;
        }
        let line = first_line + offset;
        let ctx = RowContext { columns: &columns, row: &row, line };

        records.push(SalesRecord {
            brand: ctx.text(Field::Brand)?,
            year: ctx.year()?,
            month: ctx.month()?,
            segment: ctx.text(Field::Segment)?,
            engine_type: ctx.text(Field::EngineType)?,
            model: ctx.text(Field::Model)?,
            sales_volume: ctx.number(Field::SalesVolume)?,
            total_sales: ctx.number(Field::TotalSales)?,
            market_share: ctx.number(Field::MarketShare)?,
            price: ctx.number(Field::Price)?,
            growth_rate: 0.0,
        });
    }

    Ok(records)
}

struct RowContext<'a> {
    columns: &'a ColumnMap,
    row: &'a [RawCell],
    line: usize,
}

impl RowContext<'_> {
    fn text(&self, field: Field) -> Result<String, BoxError> {
        match self.columns.cell(self.row, field) {
            (RawCell::Text(s), display) => {
                let s = s.trim();
                if s.is_empty() {
                    Err(self.blank(display))
                } else {
                    Ok(s.to_string())
                }
            }
            (RawCell::Number(n), _) => Ok(format_number(*n)),
            (RawCell::Empty, display) => Err(self.blank(display)),
        }
    }

    fn number(&self, field: Field) -> Result<f64, BoxError> {
        match self.columns.cell(self.row, field) {
            (RawCell::Number(n), _) => Ok(*n),
            (RawCell::Text(s), display) => parse_number(s).ok_or_else(|| {
                format!(
                    "Row {}, column '{}': expected a number, found '{}'",
                    self.line, display, s
                )
                .into()
            }),
            (RawCell::Empty, display) => Err(self.blank(display)),
        }
    }

    fn year(&self) -> Result<i32, BoxError> {
        let value = self.number(Field::Year)?;
        if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
            return Err(
                format!("Row {}, column 'Year': '{}' is not a year", self.line, value).into(),
            );
        }
        Ok(value as i32)
    }

    fn month(&self) -> Result<MonthKey, BoxError> {
        match self.columns.cell(self.row, Field::Month) {
            (RawCell::Number(n), _) if n.fract() == 0.0 => Ok(MonthKey::from_number(*n as i64)),
            (RawCell::Number(n), _) => Ok(MonthKey::parse(&format_number(*n))),
            (RawCell::Text(s), display) if s.trim().is_empty() => Err(self.blank(display)),
            (RawCell::Text(s), _) => Ok(MonthKey::parse(s)),
            (RawCell::Empty, display) => Err(self.blank(display)),
        }
    }

    fn blank(&self, display: &str) -> BoxError {
        format!("Row {}, column '{}': value is empty", self.line, display).into()
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats a numeric cell that is used as text (`2021.0` becomes `2021`)
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Load sales rows from CSV data
///
/// The first record is the header row. Cells are read as text and numeric
/// columns are parsed from it.
///
/// # Arguments
/// * `reader` - Any source of CSV bytes
///
/// # Returns
/// * `Result<Vec<SalesRecord>, BoxError>` - Rows in file order, growth not yet computed
pub fn records_from_csv_reader(reader: impl Read) -> Result<Vec<SalesRecord>, BoxError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<RawCell> = csv_reader
        .headers()?
        .iter()
        .map(|h| RawCell::Text(h.to_string()))
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    // Line 1 is the header
    records_from_rows(&headers, rows, 2)
}

/// Load a dataset from a CSV file
///
/// # Examples
/// ```no_run
/// use salesdash::loader::from_csv;
///
/// match from_csv("sales.csv") {
///     Ok(data) => println!("Loaded {} rows", data.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Dataset, BoxError> {
    let file = std::fs::File::open(filepath)?;
    let records = records_from_csv_reader(std::io::BufReader::new(file))?;
    Ok(Dataset::from_records(records))
}

/// Load a dataset from the first worksheet of an Excel or OpenDocument file
///
/// # Examples
/// ```no_run
/// use salesdash::loader::from_excel;
///
/// match from_excel("Tata_Mahindra_sales.xlsx") {
///     Ok(data) => println!("Loaded {} rows", data.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<Dataset, BoxError> {
    use calamine::{Data, Reader, open_workbook_auto};

    let mut workbook = open_workbook_auto(filepath)?;

    // Get the first worksheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or("No sheets found in workbook")?;

    let range = workbook.worksheet_range(&sheet_name)?;
    debug!("Reading worksheet '{}' ({} x {})", sheet_name, range.height(), range.width());

    let mut rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| match cell {
                Data::Int(i) => RawCell::Number(*i as f64),
                Data::Float(f) => RawCell::Number(*f),
                Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                    if s.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(s.clone())
                    }
                }
                Data::Bool(b) => RawCell::Text(b.to_string()),
                Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
                Data::Error(e) => RawCell::Text(format!("#{:?}", e)),
                _ => RawCell::Empty,
            })
            .collect::<Vec<_>>()
    });

    let headers = rows.next().ok_or("Worksheet is empty")?;
    let records = records_from_rows(&headers, rows, 2)?;
    Ok(Dataset::from_records(records))
}

/// Detect file type and load appropriate format
///
/// # Arguments
/// * `filepath` - Path to a `.csv`, `.xlsx`, `.xlsm`, `.xls` or `.ods` file
///
/// # Returns
/// * `Result<Dataset, BoxError>` - The loaded table with growth rates, or an error
pub fn load_dataset(filepath: impl AsRef<Path>) -> Result<Dataset, BoxError> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let dataset = match extension.as_deref() {
        Some("csv") => from_csv(path)?,
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => from_excel(path)?,
        Some(ext) => return Err(format!("Unsupported file extension: {}", ext).into()),
        None => return Err("File has no extension".into()),
    };

    info!("Loaded {} sales rows from {}", dataset.len(), path.display());
    Ok(dataset)
}
