//! Feedback service tying the components together.
//!
//! Locator → record builder → {documents + archive, summary}.

use std::path::PathBuf;

use crate::batch::{generate_documents, BatchOptions, BatchReport};
use crate::builder::{build_records, InclusionFilter};
use crate::config::{FeedbackConfig, SUMMARY_EXTENSION};
use crate::error::Result;
use crate::layout::Logo;
use crate::summary::build_summary;
use crate::types::SubjectRecord;
use crate::validation::validate_parameters;

/// Parameters of one run, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub sheet: String,
    pub denominator: i64,
    /// Only process subjects whose selection cell holds the inclusion marker.
    pub partial: bool,
    /// Document title; the sheet name when absent.
    pub title: Option<String>,
}

impl FeedbackRequest {
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.sheet)
    }

    /// Path of the summary workbook, named after the sheet.
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{SUMMARY_EXTENSION}", self.sheet))
    }
}

/// Files produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackOutcome {
    pub batch: BatchReport,
    pub summary: PathBuf,
}

/// A validated run whose records are built, ready to write its outputs.
#[derive(Debug)]
pub struct FeedbackRun {
    request: FeedbackRequest,
    records: Vec<SubjectRecord>,
    denominator: u32,
    logo: Option<Logo>,
}

impl FeedbackRun {
    /// Validate the request and build every record. Nothing is written.
    pub fn prepare(request: FeedbackRequest, config: &FeedbackConfig) -> Result<Self> {
        let labels = &config.labels;
        let sheet = validate_parameters(
            &request.input,
            &request.output_dir,
            &request.sheet,
            request.denominator,
            request.partial,
            labels,
        )?;

        let logo = config.logo.as_deref().map(Logo::from_file).transpose()?;

        let filter = if request.partial {
            Some(InclusionFilter::from_index(&sheet.index, labels)?)
        } else {
            None
        };
        let records = build_records(
            &sheet.grid,
            &sheet.index,
            labels,
            sheet.denominator,
            filter.as_ref(),
        )?;

        Ok(Self {
            request,
            records,
            denominator: sheet.denominator,
            logo,
        })
    }

    #[must_use]
    pub fn records(&self) -> &[SubjectRecord] {
        &self.records
    }

    #[must_use]
    pub fn request(&self) -> &FeedbackRequest {
        &self.request
    }

    /// Write documents, archive and summary.
    ///
    /// The summary is written only after every subject has been attempted.
    pub fn execute(
        &self,
        config: &FeedbackConfig,
        on_progress: impl FnMut(usize),
    ) -> Result<FeedbackOutcome> {
        let options = BatchOptions {
            output_dir: &self.request.output_dir,
            title: self.request.title(),
            config,
            logo: self.logo.as_ref(),
        };
        let batch = generate_documents(&self.records, &options, on_progress)?;

        let summary = self.request.summary_path();
        build_summary(&self.records, self.denominator, &config.labels).save(&summary)?;

        Ok(FeedbackOutcome { batch, summary })
    }
}

/// Run the whole pipeline for `request`.
pub fn generate_feedback(request: FeedbackRequest, config: &FeedbackConfig) -> Result<FeedbackOutcome> {
    let run = FeedbackRun::prepare(request, config)?;
    tracing::info!(subjects = run.records().len(), "Generating feedback");
    run.execute(config, |_| {})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: Option<&str>) -> FeedbackRequest {
        FeedbackRequest {
            input: PathBuf::from("eval.xlsx"),
            output_dir: PathBuf::from("out"),
            sheet: "TP1".to_string(),
            denominator: 50,
            partial: false,
            title: title.map(String::from),
        }
    }

    #[test]
    fn test_title_defaults_to_sheet_name() {
        assert_eq!(request(None).title(), "TP1");
        assert_eq!(request(Some("Travail 1")).title(), "Travail 1");
    }

    #[test]
    fn test_summary_named_after_sheet() {
        assert_eq!(request(None).summary_path(), PathBuf::from("out/TP1.xlsx"));
    }

    #[test]
    fn test_invalid_request_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(None);
        req.output_dir = dir.path().to_path_buf();

        assert!(FeedbackRun::prepare(req, &FeedbackConfig::default()).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
