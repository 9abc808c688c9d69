use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("grid too large for a worksheet: {0}")]
    OutOfBounds(String),
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::Io(_) => "EXPORT_IO",
            ExportError::Xlsx(_) => "EXPORT_XLSX",
            ExportError::Csv(_) => "EXPORT_CSV",
            ExportError::OutOfBounds(_) => "EXPORT_OUT_OF_BOUNDS",
        }
    }
}
