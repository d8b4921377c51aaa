use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterImportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read workbook {path}: {message}")]
    Workbook { path: String, message: String },

    #[error("Workbook has no rows: {0}")]
    EmptyWorkbook(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel generation error: {0}")]
    ExcelGeneration(String),

    #[error("Export not allowed: {0}")]
    ExportNotAllowed(String),

    #[error("CLI execution error: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Core(#[from] roster_import_common::Error),
}

impl From<rust_xlsxwriter::XlsxError> for RosterImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        RosterImportError::ExcelGeneration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RosterImportError>;
