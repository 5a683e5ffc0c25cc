//! Error types for feedback generation.
//!
//! A single `RetroactionError` covers the whole pipeline. Configuration and
//! data-shape problems abort the run; only `Encoding` is recoverable and is
//! downgraded to a skipped document by the layout engine.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the retroaction library.
#[derive(Debug, Error)]
pub enum RetroactionError {
    /// One or more pre-flight checks failed.
    #[error("Invalid parameters:\n  - {}", .0.join("\n  - "))]
    InvalidParameters(Vec<String>),

    /// The score denominator is not a positive integer.
    #[error("Denominator must be greater than zero (got {0})")]
    InvalidDenominator(i64),

    /// A required criterion label is absent from the first column.
    #[error("Criterion '{0}' not found in the first column of the sheet")]
    MissingCriterion(String),

    /// The requested sheet does not exist in the workbook.
    #[error("Sheet '{0}' does not exist in the workbook")]
    SheetNotFound(String),

    /// The input file could not be read as a spreadsheet.
    #[error("Failed to read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// The configured logo cannot be embedded.
    #[error("Unsupported logo image {}: only baseline JPEG files can be embedded", .0.display())]
    UnsupportedLogo(PathBuf),

    /// The YAML settings file is malformed.
    #[error("Invalid settings file: {0}")]
    ConfigFile(#[from] serde_yaml_ng::Error),

    /// An interactive answer did not match any proposed choice.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// A subject's score cell is not an integer.
    #[error("Invalid score in column {column}, row {row}: '{value}' is not an integer")]
    InvalidScore {
        column: usize,
        row: usize,
        value: String,
    },

    /// A subject's identifier cell is empty.
    #[error("Missing identifier in column {column}, row {row}")]
    MissingIdentifier { column: usize, row: usize },

    /// Text of a document cannot be represented in the document's fonts.
    #[error("Cannot encode character {character:?} while writing {}", .path.display())]
    Encoding { path: PathBuf, character: char },

    /// PDF serialization failed.
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Writing the zip archive failed.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Writing the summary workbook failed.
    #[error("Summary workbook error: {0}")]
    Summary(#[from] rust_xlsxwriter::XlsxError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RetroactionError {
    /// Whether the batch may continue with the next subject after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}

/// Result type alias for retroaction operations.
pub type Result<T> = std::result::Result<T, RetroactionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters_lists_every_problem() {
        let err = RetroactionError::InvalidParameters(vec![
            "Input file in.xlsx does not exist".to_string(),
            "Denominator must be greater than zero".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid parameters:\n  - Input file in.xlsx does not exist\n  - Denominator must be greater than zero"
        );
    }

    #[test]
    fn test_invalid_score_display() {
        let err = RetroactionError::InvalidScore {
            column: 3,
            row: 5,
            value: "abs".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid score in column 3, row 5: 'abs' is not an integer"
        );
    }

    #[test]
    fn test_only_encoding_is_recoverable() {
        let encoding = RetroactionError::Encoding {
            path: PathBuf::from("out/1234.pdf"),
            character: '\u{4e2d}',
        };
        assert!(encoding.is_recoverable());
        assert!(encoding.to_string().contains("out/1234.pdf"));

        assert!(!RetroactionError::MissingCriterion("DA".to_string()).is_recoverable());
        assert!(!RetroactionError::InvalidDenominator(0).is_recoverable());
    }
}
