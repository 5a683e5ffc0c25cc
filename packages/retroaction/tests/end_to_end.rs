//! End-to-end tests for the feedback pipeline.
//!
//! Builds an evaluation workbook with rust_xlsxwriter, runs the whole
//! pipeline and reads every output back: PDFs with lopdf, the archive with
//! zip and the summary with calamine.

use std::fs::File;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use tempfile::{tempdir, TempDir};
use zip::ZipArchive;

use retroaction::{generate_feedback, FeedbackConfig, FeedbackRequest, RetroactionError};

/// Write the evaluation sheet `TP1`: labels in column A, one student per column.
fn write_evaluation(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("TP1").unwrap();

    let rows: [(&str, [&str; 3]); 9] = [
        ("Générer", ["X", "", "X"]),
        ("Nom", ["Tremblay", "Roy", "Gagnon"]),
        ("Prénom", ["Léa", "Noah", "Émile"]),
        ("DA", ["2045123", "2045124", "2045125"]),
        ("Notes", ["45", "29", "30"]),
        ("Commentaires", ["Très bon travail", "", "Bien"]),
        ("Critère A", ["x", "X", "3"]),
        ("Critère **B**{texte}", ["Analyse complète", "Analyse à revoir", ""]),
        ("", ["1", "2", "3"]),
    ];

    for (row, (label, values)) in (0u32..).zip(rows) {
        if !label.is_empty() {
            sheet.write_string(row, 0, label).unwrap();
        }
        for (col, value) in (1u16..).zip(values) {
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>() {
                Ok(number) if label == "DA" || label == "Notes" => {
                    sheet.write_number(row, col, number).unwrap();
                }
                _ => {
                    sheet.write_string(row, col, value).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let input = dir.path().join("evaluation.xlsx");
    write_evaluation(&input);
    let output = dir.path().join("out");
    std::fs::create_dir(&output).unwrap();
    (dir, input, output)
}

fn request(input: &Path, output: &Path, partial: bool) -> FeedbackRequest {
    FeedbackRequest {
        input: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        sheet: "TP1".to_string(),
        denominator: 50,
        partial,
        title: Some("Travail pratique 1".to_string()),
    }
}

fn archive_entries(path: &Path) -> Vec<String> {
    let zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(String::from).collect();
    names.sort();
    names
}

fn summary_rows(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let sheet = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&sheet).unwrap();
    range.rows().map(<[Data]>::to_vec).collect()
}

#[test]
fn test_complete_run_produces_documents_archive_and_summary() {
    let (_dir, input, output) = setup();

    let outcome = generate_feedback(request(&input, &output, false), &FeedbackConfig::default())
        .unwrap();

    assert_eq!(outcome.batch.written.len(), 3);
    assert!(outcome.batch.skipped.is_empty());
    for id in ["2045123", "2045124", "2045125"] {
        let pdf = output.join(format!("{id}.pdf"));
        let doc = lopdf::Document::load(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1, "{id}.pdf");
    }

    assert_eq!(outcome.batch.archive, output.join("travaux.zip"));
    assert_eq!(
        archive_entries(&outcome.batch.archive),
        vec!["2045123.pdf", "2045124.pdf", "2045125.pdf"]
    );

    assert_eq!(outcome.summary, output.join("TP1.xlsx"));
    let rows = summary_rows(&outcome.summary);
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows[0],
        ["Nom", "Prénom", "DA", "Note sur 50", "Note sur 100", "Échec"]
            .map(|h| Data::String(h.to_string()))
            .to_vec()
    );
    assert_eq!(rows[1][2], Data::String("2045123".to_string()));
    assert_eq!(rows[1][4], Data::Float(90.0));
    assert_eq!(rows[2][4], Data::Float(58.0));
    assert_eq!(rows[2][5], Data::String("Echec".to_string()));
    assert_eq!(rows[3][4], Data::Float(60.0));
    assert_ne!(rows[3][5], Data::String("Echec".to_string()));
}

#[test]
fn test_partial_run_only_processes_selected_students() {
    let (_dir, input, output) = setup();

    let outcome =
        generate_feedback(request(&input, &output, true), &FeedbackConfig::default()).unwrap();

    assert_eq!(
        archive_entries(&outcome.batch.archive),
        vec!["2045123.pdf", "2045125.pdf"]
    );
    assert!(!output.join("2045124.pdf").exists());
    assert_eq!(summary_rows(&outcome.summary).len(), 3);
}

#[test]
fn test_document_contains_header_fields_and_footer() {
    let (_dir, input, output) = setup();
    generate_feedback(request(&input, &output, false), &FeedbackConfig::default()).unwrap();

    let doc = lopdf::Document::load(output.join("2045123.pdf")).unwrap();
    let page_id = doc.get_pages()[&1];
    let content = lopdf::content::Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    let shown: Vec<Vec<u8>> = content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(lopdf::Object::String(bytes, _)) => Some(bytes.clone()),
            _ => None,
        })
        .collect();

    let contains = |text: &[u8]| shown.iter().any(|s| s.as_slice() == text);
    assert!(contains(b"Travail pratique 1"));
    assert!(contains(b"2045123"));
    assert!(contains(b"45 / 50 (90 %)"));
    assert!(contains(b"Page 1 / 1"));
    // "Prénom" in WinAnsi
    assert!(contains(b"Pr\xe9nom"));
    // Checkmark glyph in the Symbol font
    assert!(contains(&[0xD6]));
}

#[test]
fn test_missing_output_directory_writes_nothing() {
    let (dir, input, _output) = setup();
    let missing = dir.path().join("absent");

    let err = generate_feedback(request(&input, &missing, false), &FeedbackConfig::default())
        .unwrap_err();

    assert!(matches!(err, RetroactionError::InvalidParameters(_)));
    assert!(!missing.exists());
}

#[test]
fn test_sheet_without_comments_row_produces_every_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("evaluation.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("TP1").unwrap();
    let rows: [(&str, [&str; 2]); 6] = [
        ("Nom", ["Tremblay", "Roy"]),
        ("Prénom", ["Léa", "Noah"]),
        ("DA", ["2045123", "2045124"]),
        ("Notes", ["45", "29"]),
        ("Critère A", ["x", "3"]),
        ("Critère B{texte}", ["Analyse complète", "Analyse à revoir"]),
    ];
    for (row, (label, values)) in (0u32..).zip(rows) {
        sheet.write_string(row, 0, label).unwrap();
        for (col, value) in (1u16..).zip(values) {
            sheet.write_string(row, col, value).unwrap();
        }
    }
    workbook.save(&input).unwrap();

    let outcome =
        generate_feedback(request(&input, dir.path(), false), &FeedbackConfig::default()).unwrap();

    assert_eq!(outcome.batch.written.len(), 2);
    assert_eq!(
        archive_entries(&outcome.batch.archive),
        vec!["2045123.pdf", "2045124.pdf"]
    );
    let rows = summary_rows(&outcome.summary);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][4], Data::Float(90.0));
    assert_ne!(rows[1][5], Data::String("Echec".to_string()));
    assert_eq!(rows[2][4], Data::Float(58.0));
    assert_eq!(rows[2][5], Data::String("Echec".to_string()));
}

#[test]
fn test_non_numeric_score_aborts_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("evaluation.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("TP1").unwrap();
    for (row, (label, value)) in (0u32..).zip([
        ("Nom", "Tremblay"),
        ("Prénom", "Léa"),
        ("DA", "2045123"),
        ("Notes", "absent"),
        ("Commentaires", ""),
    ]) {
        sheet.write_string(row, 0, label).unwrap();
        sheet.write_string(row, 1, value).unwrap();
    }
    workbook.save(&input).unwrap();

    let err = generate_feedback(request(&input, dir.path(), false), &FeedbackConfig::default())
        .unwrap_err();

    assert!(matches!(err, RetroactionError::InvalidScore { row: 4, column: 2, .. }));
    assert!(!dir.path().join("travaux.zip").exists());
}
