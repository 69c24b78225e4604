#![allow(dead_code)]

use salesdash::BoxError;
use salesdash::dataset::Dataset;
use salesdash::record::{MonthKey, SalesRecord};
use std::path::Path;

pub const HEADERS: [&str; 10] = [
    "Brand",
    "Year",
    "Month",
    "Segment",
    "Engine Type",
    "Model",
    "Sales Volume",
    "Total Sales",
    "Market Share (%)",
    "Price (₹)",
];

#[allow(clippy::too_many_arguments)]
pub fn record(
    brand: &str,
    year: i32,
    month: &str,
    segment: &str,
    engine: &str,
    model: &str,
    volume: f64,
    total: f64,
    share: f64,
    price: f64,
) -> SalesRecord {
    SalesRecord {
        brand: brand.to_string(),
        year,
        month: MonthKey::parse(month),
        segment: segment.to_string(),
        engine_type: engine.to_string(),
        model: model.to_string(),
        sales_volume: volume,
        total_sales: total,
        market_share: share,
        price,
        growth_rate: 0.0,
    }
}

/// Two brands over two years, in file order (Tata first)
#[rustfmt::skip]
pub fn sample_records() -> Vec<SalesRecord> {
    vec![
        record("Tata", 2021, "Jan", "Compact SUV", "Petrol", "Nexon", 100.0, 1000.0, 12.0, 800000.0),
        record("Tata", 2021, "Feb", "Mid Size SUV", "Diesel", "Harrier", 50.0, 1000.0, 8.0, 1500000.0),
        record("Tata", 2022, "Jan", "Compact SUV", "EV", "Nexon EV", 80.0, 1500.0, 14.0, 1400000.0),
        record("Tata", 2022, "Feb", "Compact SUV", "Petrol", "Nexon", 120.0, 1500.0, 13.0, 820000.0),
        record("Mahindra", 2021, "Jan", "Compact SUV", "Diesel", "XUV300", 90.0, 2000.0, 10.0, 900000.0),
        record("Mahindra", 2021, "Feb", "Mid Size SUV", "Diesel", "XUV700", 70.0, 2000.0, 9.0, 1800000.0),
        record("Mahindra", 2022, "Jan", "Mid Size SUV", "Petrol", "Scorpio N", 110.0, 1800.0, 11.0, 1600000.0),
        record("Mahindra", 2022, "Feb", "Compact SUV", "Petrol", "XUV300", 60.0, 1800.0, 7.0, 950000.0),
    ]
}

pub fn sample_dataset() -> Dataset {
    Dataset::from_records(sample_records())
}

/// Writes `records` to a CSV file under `headers`
pub fn write_csv(path: &Path, headers: &[&str], records: &[SalesRecord]) -> Result<(), BoxError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for r in records {
        let fields = r.to_fields();
        writer.write_record(&fields[..headers.len()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `records` to the first sheet of an XLSX workbook, numbers as numeric cells
pub fn write_xlsx(path: &Path, headers: &[&str], records: &[SalesRecord]) -> Result<(), BoxError> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (c, h) in headers.iter().enumerate() {
        worksheet.write_string(0, c as u16, *h)?;
    }
    for (i, r) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, r.brand.as_str())?;
        worksheet.write_number(row, 1, r.year as f64)?;
        match r.month.ordinal {
            Some(n) if r.month.label == n.to_string() => {
                worksheet.write_number(row, 2, n as f64)?;
            }
            _ => {
                worksheet.write_string(row, 2, r.month.label.as_str())?;
            }
        }
        worksheet.write_string(row, 3, r.segment.as_str())?;
        worksheet.write_string(row, 4, r.engine_type.as_str())?;
        worksheet.write_string(row, 5, r.model.as_str())?;
        worksheet.write_number(row, 6, r.sales_volume)?;
        worksheet.write_number(row, 7, r.total_sales)?;
        worksheet.write_number(row, 8, r.market_share)?;
        worksheet.write_number(row, 9, r.price)?;
    }

    workbook.save(path)?;
    Ok(())
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
