//! CSV import and export
//!
//! Export renders JSON rows (typically encoded entities) to comma separated
//! bytes; import parses uploaded CSV blobs back into string rows.

pub mod download;
pub mod reader;
pub mod writer;

pub use download::{send_csv_download, send_file_download};
pub use reader::{CsvRow, parse_csv_upload, read_rows};
pub use writer::CsvWriter;

/// Whether a file name has a `.csv` extension (case-insensitive)
pub fn is_csv(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".csv")
}
