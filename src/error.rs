use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForensicError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file format: {0} (expected .xlsx, .xls, .ods or .csv)")]
    UnsupportedFormat(String),

    #[error("Sheet not found: {0}")]
    MissingSheet(String),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid value in row {row}, column {column}: {value:?}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("No company records found in {0}")]
    EmptyDataset(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ForensicError>;
