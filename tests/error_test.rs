//! Error display and conversion tests

use roster_import::error::RosterImportError;
use roster_import_common::Error;

/// Every variant renders a non-empty message
#[test]
fn test_error_display() {
    let errors = vec![
        RosterImportError::Config("bad key".to_string()),
        RosterImportError::FileNotFound("roster.xlsx".to_string()),
        RosterImportError::Workbook {
            path: "roster.xlsx".to_string(),
            message: "corrupt".to_string(),
        },
        RosterImportError::EmptyWorkbook("roster.xlsx".to_string()),
        RosterImportError::ExcelGeneration("write failed".to_string()),
        RosterImportError::ExportNotAllowed("full results access is required".to_string()),
        RosterImportError::CliExecution("prompt closed".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "empty message for {:?}", err);
    }
}

/// Core errors pass through with their own message
#[test]
fn test_core_error_transparent() {
    let err: RosterImportError = Error::NoHeaderFound.into();
    assert_eq!(err.to_string(), Error::NoHeaderFound.to_string());
    assert!(err.to_string().contains("No header row found"));
}

/// io and serde_json conversions
#[test]
fn test_from_conversions() {
    let io: RosterImportError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, RosterImportError::Io(_)));

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let json: RosterImportError = json_err.into();
    assert!(matches!(json, RosterImportError::JsonParse(_)));
}
