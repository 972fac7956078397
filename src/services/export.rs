//! Spreadsheet serialization for lead exports.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::db::models::Lead;

const HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "Phone Number",
    "Message",
    "Source",
    "Status",
    "Created At",
];

/// Serialize leads into an `.xlsx` workbook with a bold header row.
///
/// # Errors
/// Returns `XlsxError` if the workbook fails to serialize.
pub fn leads_to_xlsx(leads: &[Lead]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name("Leads")?;

    let header_format = Format::new().set_bold();
    for (col, title) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (i, lead) in leads.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, lead.id.to_string())?;
        worksheet.write_string(row, 1, &lead.name)?;
        worksheet.write_string(row, 2, &lead.email)?;
        worksheet.write_string(row, 3, &lead.phone_number)?;
        worksheet.write_string(row, 4, lead.message.as_deref().unwrap_or_default())?;
        worksheet.write_string(row, 5, &lead.source)?;
        worksheet.write_string(row, 6, lead.status.to_string())?;
        worksheet.write_string(
            row,
            7,
            lead.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        )?;
    }

    worksheet.autofit();
    workbook.save_to_buffer()
}
