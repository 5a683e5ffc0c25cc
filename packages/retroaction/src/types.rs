//! Core data types: one record per evaluated subject.

use crate::config::{
    BLANK_LABEL, BLANK_VALUE, CHECKMARK_TOKEN, DOCUMENT_EXTENSION, FREE_TEXT_MARKER,
    PASS_THRESHOLD,
};

/// How a criterion is laid out in a feedback document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Title cell and value cell side by side.
    FixedValue,
    /// Bordered title block above a full-width paragraph.
    FreeText,
}

/// One (label, value) pair of a subject's criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionEntry {
    /// Rendered title, with any free-text marker removed.
    pub label: String,
    pub value: String,
    pub kind: EntryKind,
}

impl CriterionEntry {
    /// Classify a raw (label, value) pair read from the sheet.
    ///
    /// Missing labels and values are replaced by their blank placeholders.
    ///
    /// # Examples
    /// ```
    /// use retroaction::types::{CriterionEntry, EntryKind};
    ///
    /// let entry = CriterionEntry::new(Some("Remarques{texte}"), Some("Bon travail"));
    /// assert_eq!(entry.kind, EntryKind::FreeText);
    /// assert_eq!(entry.label, "Remarques");
    ///
    /// let entry = CriterionEntry::new(Some("Critère A"), None);
    /// assert_eq!(entry.kind, EntryKind::FixedValue);
    /// assert_eq!(entry.value, " ");
    /// ```
    #[must_use]
    pub fn new(label: Option<&str>, value: Option<&str>) -> Self {
        let value = value.unwrap_or(BLANK_VALUE).to_string();
        match label {
            Some(label) if FREE_TEXT_MARKER.is_match(label) => Self {
                label: FREE_TEXT_MARKER.replace_all(label, "").trim().to_string(),
                value,
                kind: EntryKind::FreeText,
            },
            Some(label) => Self {
                label: label.to_string(),
                value,
                kind: EntryKind::FixedValue,
            },
            None => Self {
                label: BLANK_LABEL.to_string(),
                value,
                kind: EntryKind::FixedValue,
            },
        }
    }

    /// A fixed-value entry with the given label and value.
    #[must_use]
    pub fn fixed(label: &str, value: &str) -> Self {
        Self::new(Some(label), Some(value))
    }

    /// Whether the label is the blank placeholder; such rows are drawn without borders.
    #[must_use]
    pub fn is_spacer(&self) -> bool {
        self.label == BLANK_LABEL
    }

    /// Whether the value is rendered as a checkmark glyph.
    #[must_use]
    pub fn is_checkmark(&self) -> bool {
        self.value.eq_ignore_ascii_case(CHECKMARK_TOKEN)
    }
}

/// Everything the documents and the summary need about one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRecord {
    /// Admission number, used to name the subject's document.
    pub identifier: String,
    pub surname: String,
    pub given_name: String,
    pub raw_score: i64,
    pub score_denominator: u32,
    /// Free-text comments; may be empty.
    pub comments: String,
    /// Remaining rows of the sheet, in row order.
    pub criteria: Vec<CriterionEntry>,
}

impl SubjectRecord {
    fn ratio(&self) -> f64 {
        self.raw_score as f64 / f64::from(self.score_denominator)
    }

    /// Score out of 100, rounded half to even.
    ///
    /// # Examples
    /// ```
    /// use retroaction::types::SubjectRecord;
    ///
    /// let record = SubjectRecord {
    ///     identifier: "2045123".into(),
    ///     surname: "Tremblay".into(),
    ///     given_name: "Léa".into(),
    ///     raw_score: 45,
    ///     score_denominator: 50,
    ///     comments: String::new(),
    ///     criteria: vec![],
    /// };
    /// assert_eq!(record.percentage(), 90);
    /// assert!(!record.is_failing());
    /// ```
    #[must_use]
    pub fn percentage(&self) -> i64 {
        (self.ratio() * 100.0).round_ties_even() as i64
    }

    /// A score strictly below 60 % fails.
    #[must_use]
    pub fn is_failing(&self) -> bool {
        self.ratio() < PASS_THRESHOLD
    }

    /// Score as shown in a document, e.g. `45 / 50 (90 %)`.
    #[must_use]
    pub fn score_display(&self) -> String {
        format!(
            "{} / {} ({} %)",
            self.raw_score,
            self.score_denominator,
            self.percentage()
        )
    }

    /// File name of the subject's document.
    #[must_use]
    pub fn document_name(&self) -> String {
        format!("{}.{DOCUMENT_EXTENSION}", self.identifier)
    }
}
