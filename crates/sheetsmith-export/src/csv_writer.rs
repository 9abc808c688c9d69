use sheetsmith_core::GridData;

use crate::ExportError;

pub const CSV_FILE_NAME: &str = "spreadsheet.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Values only, one record per grid row
pub fn export_csv(data: &GridData) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    for row in data.rows() {
        writer.write_record(row)?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
