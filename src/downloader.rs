use crate::BoxError;
use crate::filter::FilteredView;
use crate::record::COLUMNS;

/// Convert the filtered rows to CSV format
///
/// The header row uses the canonical column names, including the derived
/// "Yearly Growth Rate (%)" column. Quoting of commas, quotes and newlines
/// is handled by the csv writer.
///
/// # Arguments
/// * `view` - Rows selected by the current filters
///
/// # Returns
/// * `Result<String, BoxError>` - CSV content as a string or an error
pub fn to_csv(view: &FilteredView) -> Result<String, BoxError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for record in view.iter() {
        writer.write_record(record.to_fields())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Convert the filtered rows to XLSX format
///
/// Text columns are written as strings and numeric columns as numbers so
/// the sheet can be re-aggregated in a spreadsheet application.
///
/// # Arguments
/// * `view` - Rows selected by the current filters
///
/// # Returns
/// * `Result<Vec<u8>, BoxError>` - XLSX file content as bytes or an error
pub fn to_xlsx(view: &FilteredView) -> Result<Vec<u8>, BoxError> {
    use rust_xlsxwriter::{Format, Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Sales")?;

    let bold = Format::new().set_bold();
    for (c, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *header, &bold)?;
    }

    for (i, r) in view.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, r.brand.as_str())?;
        worksheet.write_number(row, 1, r.year as f64)?;
        worksheet.write_string(row, 2, r.month.label.as_str())?;
        worksheet.write_string(row, 3, r.segment.as_str())?;
        worksheet.write_string(row, 4, r.engine_type.as_str())?;
        worksheet.write_string(row, 5, r.model.as_str())?;
        worksheet.write_number(row, 6, r.sales_volume)?;
        worksheet.write_number(row, 7, r.total_sales)?;
        worksheet.write_number(row, 8, r.market_share)?;
        worksheet.write_number(row, 9, r.price)?;
        worksheet.write_number(row, 10, r.growth_rate)?;
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}
