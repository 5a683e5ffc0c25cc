//! Configuration constants and the immutable settings passed to each component.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, RetroactionError};

/// File name of the archive bundling every generated document.
pub const ARCHIVE_NAME: &str = "travaux.zip";

/// Extension of generated feedback documents.
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Extension of the summary workbook.
pub const SUMMARY_EXTENSION: &str = "xlsx";

/// Cell value marking a subject as selected for a partial run.
pub const INCLUSION_MARKER: &str = "X";

/// Value rendered as a checkmark instead of literal text (case-insensitive).
pub const CHECKMARK_TOKEN: &str = "x";

/// Radical sign in the Symbol font's built-in encoding.
pub const CHECKMARK_GLYPH: char = '\u{d6}';

/// Placeholder substituted for a missing criterion label (no-break space).
pub const BLANK_LABEL: &str = "\u{a0}";

/// Placeholder substituted for a missing criterion value.
pub const BLANK_VALUE: &str = " ";

/// Token replaced by the total page count when a document is flushed.
pub const PAGE_COUNT_ALIAS: &str = "{nb}";

/// Ratio below which a subject fails.
pub const PASS_THRESHOLD: f64 = 0.6;

/// Marker in a criterion label requesting a full-width paragraph block.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub static FREE_TEXT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*texte\s*\}").expect("valid regex"));

/// Fixed labels looked up in the first column of the evaluation sheet.
///
/// These are build-time constants: the tool only understands one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub surname: String,
    pub given_name: String,
    pub identifier: String,
    pub score: String,
    pub comments: String,
    pub selection: String,
    /// Prefix of the raw score column header, followed by the denominator.
    pub score_out_of: String,
    pub score_out_of_100: String,
    pub failing: String,
    /// Value written in the fail column for a failing subject.
    pub failing_flag: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            surname: "Nom".to_string(),
            given_name: "Prénom".to_string(),
            identifier: "DA".to_string(),
            score: "Notes".to_string(),
            comments: "Commentaires".to_string(),
            selection: "Générer".to_string(),
            score_out_of: "Note sur".to_string(),
            score_out_of_100: "Note sur 100".to_string(),
            failing: "Échec".to_string(),
            failing_flag: "Echec".to_string(),
        }
    }
}

impl Labels {
    /// Every label the locator searches for, in lookup order.
    #[must_use]
    pub fn recognized(&self) -> [&str; 6] {
        [
            &self.surname,
            &self.given_name,
            &self.identifier,
            &self.score,
            &self.selection,
            &self.comments,
        ]
    }

    /// Labels that must resolve before records can be built.
    ///
    /// The selection row is only needed when an inclusion filter is active.
    /// The comments row is always optional.
    #[must_use]
    pub fn required(&self, partial: bool) -> Vec<&str> {
        let mut labels = vec![
            self.surname.as_str(),
            self.given_name.as_str(),
            self.identifier.as_str(),
            self.score.as_str(),
        ];
        if partial {
            labels.push(self.selection.as_str());
        }
        labels
    }

    /// Header of the raw score column in the summary workbook.
    #[must_use]
    pub fn score_header(&self, denominator: u32) -> String {
        format!("{} {denominator}", self.score_out_of)
    }
}

/// Page geometry and typography of feedback documents, in inches and points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    /// Distance from the page bottom at which content stops.
    pub margin_bottom: f64,
    /// Horizontal padding inside a cell.
    pub cell_padding: f64,
    pub line_height: f64,
    pub title_width: f64,
    pub value_width: f64,
    pub body_font_size: f64,
    pub checkmark_font_size: f64,
    pub header_font_size: f64,
    pub header_height: f64,
    pub header_indent: f64,
    pub header_title_width: f64,
    pub logo_width: f64,
    pub footer_font_size: f64,
    /// Distance of the footer line from the page bottom.
    pub footer_offset: f64,
    pub border_width: f64,
    /// Minimum advance of the cursor after each row.
    pub row_nudge: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 8.5,
            page_height: 11.0,
            margin_left: 0.3937,
            margin_top: 0.3937,
            margin_bottom: 0.7874,
            cell_padding: 0.03937,
            line_height: 0.3,
            title_width: 6.0,
            value_width: 2.0,
            body_font_size: 12.0,
            checkmark_font_size: 14.0,
            header_font_size: 16.0,
            header_height: 0.8,
            header_indent: 0.3,
            header_title_width: 7.0,
            logo_width: 2.0,
            footer_font_size: 11.0,
            footer_offset: 0.6,
            border_width: 0.00787,
            row_nudge: 0.001,
        }
    }
}

impl PageLayout {
    /// Width of a full-width block (title and value cells side by side).
    #[must_use]
    pub fn content_width(&self) -> f64 {
        self.title_width + self.value_width
    }

    /// Vertical position past which nothing may be placed.
    #[must_use]
    pub fn page_break_trigger(&self) -> f64 {
        self.page_height - self.margin_bottom
    }

    /// Height available for rows below the page header.
    #[must_use]
    pub fn usable_height(&self) -> f64 {
        self.page_break_trigger() - self.margin_top - self.header_height
    }
}

/// Settings shared by every component of a run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackConfig {
    #[serde(skip)]
    pub labels: Labels,
    pub layout: PageLayout,
    /// JPEG drawn at the top-left corner of every page.
    pub logo: Option<PathBuf>,
}

impl FeedbackConfig {
    /// Parse settings from YAML. Missing keys keep their defaults.
    ///
    /// # Examples
    /// ```
    /// use retroaction::config::FeedbackConfig;
    ///
    /// let config = FeedbackConfig::from_yaml_str("layout:\n  line_height: 0.25\n").unwrap();
    /// assert_eq!(config.layout.line_height, 0.25);
    /// assert_eq!(config.layout.title_width, 6.0);
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load settings from a YAML file.
    ///
    /// A relative logo path is resolved against the settings file's directory.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;
        if let (Some(logo), Some(base)) = (config.logo.as_ref(), path.parent()) {
            if logo.is_relative() {
                config.logo = Some(base.join(logo));
            }
        }
        Ok(config)
    }
}

/// Validate the score denominator.
///
/// # Examples
/// ```
/// use retroaction::config::validate_denominator;
///
/// assert_eq!(validate_denominator(50).unwrap(), 50);
/// assert!(validate_denominator(0).is_err());
/// ```
pub fn validate_denominator(denominator: i64) -> Result<u32> {
    u32::try_from(denominator)
        .ok()
        .filter(|d| *d >= 1)
        .ok_or(RetroactionError::InvalidDenominator(denominator))
}
