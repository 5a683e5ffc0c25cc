//! Batch orchestration: one document per record, collected into an archive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::archive::FeedbackArchive;
use crate::config::{FeedbackConfig, ARCHIVE_NAME, DOCUMENT_EXTENSION};
use crate::error::Result;
use crate::layout::{write_feedback_document, DocumentOutcome, Logo};
use crate::types::SubjectRecord;

/// Characters that cannot appear in a file name on common platforms.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("valid regex"));

/// Derives unique document names from subject identifiers.
///
/// A repeated identifier gets a `-2`, `-3`… suffix so that no document or
/// archive entry overwrites another.
#[derive(Debug, Default)]
pub struct DocumentNamer {
    seen: HashMap<String, usize>,
}

impl DocumentNamer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File name for the next document of `identifier`.
    ///
    /// # Examples
    /// ```
    /// use retroaction::batch::DocumentNamer;
    ///
    /// let mut namer = DocumentNamer::new();
    /// assert_eq!(namer.name_for("2045123"), "2045123.pdf");
    /// assert_eq!(namer.name_for("2045123"), "2045123-2.pdf");
    /// assert_eq!(namer.name_for("a/b"), "a_b.pdf");
    /// ```
    pub fn name_for(&mut self, identifier: &str) -> String {
        let stem = UNSAFE_FILE_CHARS.replace_all(identifier, "_").into_owned();
        let count = self.seen.entry(stem.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            format!("{stem}.{DOCUMENT_EXTENSION}")
        } else {
            tracing::warn!(
                identifier,
                occurrence = *count,
                "Duplicate identifier, adding a suffix to the document name"
            );
            format!("{stem}-{count}.{DOCUMENT_EXTENSION}")
        }
    }
}

/// Where and how documents of a batch are produced.
#[derive(Debug, Clone)]
pub struct BatchOptions<'a> {
    pub output_dir: &'a Path,
    pub title: &'a str,
    pub config: &'a FeedbackConfig,
    pub logo: Option<&'a Logo>,
}

/// What a batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Documents written, in record order.
    pub written: Vec<PathBuf>,
    /// Documents skipped because of an encoding failure, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    pub archive: PathBuf,
}

/// Write one document per record, in order, and bundle them in the archive.
///
/// `on_progress` is called after each subject with the number processed so
/// far. The archive is finalized whether or not a subject fails; the first
/// fatal error is returned after finalization.
pub fn generate_documents(
    records: &[SubjectRecord],
    options: &BatchOptions<'_>,
    mut on_progress: impl FnMut(usize),
) -> Result<BatchReport> {
    let archive_path = options.output_dir.join(ARCHIVE_NAME);
    let mut archive = FeedbackArchive::create(&archive_path)?;
    let mut report = BatchReport::default();

    let outcome = write_all(records, options, &mut archive, &mut report, &mut on_progress);
    let finalized = archive.finish();

    outcome?;
    report.archive = finalized?;
    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "Batch complete"
    );
    Ok(report)
}

fn write_all(
    records: &[SubjectRecord],
    options: &BatchOptions<'_>,
    archive: &mut FeedbackArchive,
    report: &mut BatchReport,
    on_progress: &mut impl FnMut(usize),
) -> Result<()> {
    let mut namer = DocumentNamer::new();

    for (index, record) in records.iter().enumerate() {
        let name = namer.name_for(&record.identifier);
        let path = options.output_dir.join(&name);

        match write_feedback_document(record, options.title, options.config, options.logo, &path)? {
            DocumentOutcome::Written(path) => {
                archive.add_document(&path, &name)?;
                report.written.push(path);
            }
            DocumentOutcome::Skipped { path, reason } => report.skipped.push((path, reason)),
        }
        on_progress(index + 1);
    }
    Ok(())
}
