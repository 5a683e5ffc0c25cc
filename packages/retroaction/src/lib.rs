//! Retroaction - Turn an evaluation sheet into per-student feedback documents.
//!
//! An evaluation sheet has one row per grading criterion and one column per
//! student. This crate builds one record per student, lays each record out as
//! a paginated PDF, bundles the documents in a zip archive and writes a score
//! summary workbook.
//!
//! # Example
//!
//! ```
//! use retroaction::config::{validate_denominator, Labels};
//! use retroaction::grid::{CellValue, Grid};
//! use retroaction::locator::locate_criteria;
//!
//! let grid = Grid::from_rows(vec![
//!     vec![CellValue::from("Nom"), CellValue::from("Tremblay")],
//!     vec![CellValue::from("DA"), CellValue::from(2045123.0)],
//! ]);
//! let index = locate_criteria(&grid, &Labels::default().recognized());
//! assert_eq!(index.row("DA"), Some(2));
//! assert!(validate_denominator(50).is_ok());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Labels, layout settings and constants
//! - [`error`]: Error types and Result alias
//! - [`grid`]: Spreadsheet loading into a 1-based cell grid
//! - [`locator`]: Row lookup of the fixed labels
//! - [`types`]: Subject records and criterion entries
//! - [`builder`]: One record per student column
//! - [`layout`]: Font metrics, PDF canvas and the document layout engine
//! - [`archive`]: Zip bundle of the documents
//! - [`batch`]: Per-student document generation
//! - [`summary`]: Score summary workbook
//! - [`validation`]: Pre-flight parameter checks
//! - [`feedback`]: Main service tying the components together
//! - [`interactive`]: Terminal prompts when no option is given
//! - [`cli`]: Command-line interface

pub mod archive;
pub mod batch;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod grid;
pub mod interactive;
pub mod layout;
pub mod locator;
pub mod summary;
pub mod types;
pub mod validation;

// Re-export main functions
pub use feedback::{generate_feedback, FeedbackOutcome, FeedbackRequest, FeedbackRun};

// Re-export commonly used items
pub use config::{FeedbackConfig, Labels, PageLayout};
pub use error::{Result, RetroactionError};
pub use types::{CriterionEntry, EntryKind, SubjectRecord};
