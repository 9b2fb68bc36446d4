//! Excel export and import of the print ledger
//!
//! Export writes one sheet named `prints` with a fixed column order. Import
//! reads the first sheet of an `.xlsx`/`.xls` workbook, treats the first row
//! as headers and resolves each field through an ordered list of header
//! spellings.

use crate::error::{CoreError, Result};
use crate::ledger::Totals;
use crate::models::{PrintPayload, PrintRecord};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Sheet name used for exports
pub const EXPORT_SHEET: &str = "prints";

/// Export column order
pub const EXPORT_COLUMNS: [&str; 12] = [
    "clientName",
    "address",
    "phone",
    "email",
    "totalPages",
    "chargePerPage",
    "costPerPage",
    "totalCharge",
    "totalCost",
    "profit",
    "image",
    "date",
];

/// Accepted header spellings per payload field, first non-blank match wins
pub const IMPORT_FIELDS: [(&str, &[&str]); 11] = [
    ("clientName", &["clientName", "Client"]),
    ("address", &["address", "Address"]),
    ("phone", &["phone", "Phone"]),
    ("email", &["email", "Email"]),
    ("totalPages", &["totalPages", "Pages"]),
    ("chargePerPage", &["chargePerPage", "Charge/Page"]),
    ("costPerPage", &["costPerPage", "Cost/Page"]),
    ("totalCharge", &["totalCharge"]),
    ("totalCost", &["totalCost"]),
    ("profit", &["profit"]),
    ("image", &["image", "Image"]),
];

/// `prints_YYYY-MM-DD.xlsx`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("prints_{}.xlsx", date.format("%Y-%m-%d"))
}

fn xlsx_error(e: XlsxError) -> CoreError {
    CoreError::Spreadsheet {
        message: e.to_string(),
    }
}

fn build_workbook(records: &[PrintRecord]) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET)?;

    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, r) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, r.client_name.as_str())?;
        sheet.write_string(row, 1, r.address.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 2, r.phone.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 3, r.email.as_deref().unwrap_or_default())?;
        sheet.write_number(row, 4, r.total_pages)?;
        sheet.write_number(row, 5, r.charge_per_page)?;
        sheet.write_number(row, 6, r.cost_per_page)?;
        sheet.write_number(row, 7, r.total_charge)?;
        sheet.write_number(row, 8, r.total_cost)?;
        sheet.write_number(row, 9, r.profit)?;
        sheet.write_string(row, 10, r.image.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 11, r.date.as_deref().unwrap_or_default())?;
    }

    Ok(workbook)
}

/// Export records to an in-memory `.xlsx`
pub fn export_to_bytes(records: &[PrintRecord]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(records).map_err(xlsx_error)?;
    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Export records to an `.xlsx` file
///
/// # Errors
///
/// Returns `CoreError::FileWrite` if the file cannot be written and
/// `CoreError::Spreadsheet` if the workbook cannot be built.
pub fn export_prints(records: &[PrintRecord], path: &Path) -> Result<()> {
    let bytes = export_to_bytes(records)?;
    std::fs::write(path, bytes).map_err(|source| CoreError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), count = records.len(), "Exported print records");
    Ok(())
}

/// One cell of an imported row
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Numeric reading; unreadable values are `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Bool(_) => None,
        }
    }
}

/// Header → value map of one data row
pub type ImportRow = HashMap<String, CellValue>;

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::Error(_) => None,
        other => Some(CellValue::Text(other.to_string())),
    }
}

/// Read the first sheet of a workbook into header-keyed rows.
///
/// Rows without any value are skipped.
pub fn read_first_sheet(bytes: Vec<u8>) -> Result<Vec<ImportRow>> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| CoreError::Spreadsheet {
            message: e.to_string(),
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CoreError::Spreadsheet {
            message: "workbook has no sheets".to_string(),
        })?
        .map_err(|e| CoreError::Spreadsheet {
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(cells) => cells
            .iter()
            .map(|c| cell_value(c).map(|v| v.as_text()).unwrap_or_default())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let parsed: Vec<ImportRow> = rows
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(h, _)| !h.is_empty())
                .filter_map(|(h, c)| cell_value(c).map(|v| (h.clone(), v)))
                .collect::<ImportRow>()
        })
        .filter(|row| row.values().any(|v| !v.is_blank()))
        .collect();

    debug!(rows = parsed.len(), columns = headers.len(), "Read import sheet");
    Ok(parsed)
}

/// Value of a field through its candidate headers
pub fn resolve<'a>(row: &'a ImportRow, candidates: &[&str]) -> Option<&'a CellValue> {
    candidates
        .iter()
        .filter_map(|h| row.get(*h))
        .find(|v| !v.is_blank())
}

fn candidates(field: &str) -> &'static [&'static str] {
    IMPORT_FIELDS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, c)| *c)
        .unwrap_or(&[])
}

fn text_field(row: &ImportRow, field: &str) -> String {
    resolve(row, candidates(field))
        .map(CellValue::as_text)
        .unwrap_or_default()
}

fn number_field(row: &ImportRow, field: &str) -> f64 {
    resolve(row, candidates(field))
        .and_then(CellValue::as_number)
        .unwrap_or(0.0)
}

/// Map one sheet row to a create payload.
///
/// Missing numbers default to zero. A derived total present and non-zero in
/// the row is kept; otherwise it is recomputed from the resolved inputs.
pub fn row_to_payload(row: &ImportRow) -> PrintPayload {
    let total_pages = number_field(row, "totalPages");
    let charge_per_page = number_field(row, "chargePerPage");
    let cost_per_page = number_field(row, "costPerPage");
    let computed = Totals::compute(total_pages, charge_per_page, cost_per_page);

    let given = |field: &str| Some(number_field(row, field)).filter(|n| *n != 0.0);
    let total_charge = given("totalCharge").unwrap_or(computed.total_charge);
    let total_cost = given("totalCost").unwrap_or(computed.total_cost);
    let profit = given("profit").unwrap_or(total_charge - total_cost);

    let image = text_field(row, "image");

    PrintPayload {
        client_name: text_field(row, "clientName"),
        address: text_field(row, "address"),
        phone: text_field(row, "phone"),
        email: text_field(row, "email"),
        total_pages,
        charge_per_page,
        cost_per_page,
        total_charge,
        total_cost,
        profit,
        image: Some(image),
    }
}

/// Parse a workbook into create payloads, in file order
pub fn parse_import(bytes: Vec<u8>) -> Result<Vec<PrintPayload>> {
    Ok(read_first_sheet(bytes)?.iter().map(row_to_payload).collect())
}
