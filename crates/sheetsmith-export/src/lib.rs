//! Download formats for the editor grid.
//!
//! XLSX keeps values, per-cell styles and merged regions. CSV keeps values only.

pub mod csv_writer;
pub mod error;
pub mod xlsx_writer;

pub use csv_writer::{export_csv, CSV_CONTENT_TYPE, CSV_FILE_NAME};
pub use error::ExportError;
pub use xlsx_writer::{export_xlsx, XlsxExport, XLSX_CONTENT_TYPE, XLSX_FILE_NAME};
