use chrono::Month;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Column names as they appear in exports and error messages
pub const COLUMNS: [&str; 11] = [
    "Brand",
    "Year",
    "Month",
    "Segment",
    "Engine Type",
    "Model",
    "Sales Volume",
    "Total Sales",
    "Market Share (%)",
    "Price",
    "Yearly Growth Rate (%)",
];

/// One row of the sales table.
///
/// `growth_rate` is not read from the file; it is filled in by
/// [`crate::dataset::Dataset::from_records`] once the rows are ordered.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SalesRecord {
    pub brand: String,
    pub year: i32,
    pub month: MonthKey,
    pub segment: String,
    pub engine_type: String,
    pub model: String,
    pub sales_volume: f64,
    pub total_sales: f64,
    pub market_share: f64,
    pub price: f64,
    pub growth_rate: f64,
}

impl SalesRecord {
    /// Values in [`COLUMNS`] order, formatted for text exports
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.brand.clone(),
            self.year.to_string(),
            self.month.label.clone(),
            self.segment.clone(),
            self.engine_type.clone(),
            self.model.clone(),
            self.sales_volume.to_string(),
            self.total_sales.to_string(),
            self.market_share.to_string(),
            self.price.to_string(),
            self.growth_rate.to_string(),
        ]
    }
}

/// Month label with its calendar position, when one could be recognised.
///
/// Months order chronologically; labels that are not a month name or number
/// sort after every recognised month, alphabetically.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub label: String,
    pub ordinal: Option<u32>,
}

impl MonthKey {
    pub fn parse(raw: &str) -> Self {
        let label = raw.trim().to_string();
        let ordinal = match label.parse::<u32>() {
            Ok(n) if (1..=12).contains(&n) => Some(n),
            Ok(_) => None,
            Err(_) => label
                .parse::<Month>()
                .ok()
                .map(|m| m.number_from_month()),
        };
        MonthKey { label, ordinal }
    }

    /// Builds a key from a numeric cell (1 = January)
    pub fn from_number(n: i64) -> Self {
        Self::parse(&n.to_string())
    }
}

impl Ord for MonthKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.ordinal, other.ordinal) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.label.cmp(&other.label)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.label.cmp(&other.label),
        }
    }
}

impl PartialOrd for MonthKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
