//! Command-line tests for the retroaction binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

#[test]
fn test_help_lists_options() {
    cargo_bin_cmd!("retroaction")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--denominator"))
        .stdout(predicate::str::contains("--partial"));
}

#[test]
fn test_invalid_parameters_are_reported_together() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("retroaction")
        .current_dir(dir.path())
        .args(["-i", "absent.xlsx", "-o", "out", "-s", "TP1", "-d", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Input file absent.xlsx does not exist"))
        .stderr(predicate::str::contains("Output directory out does not exist"))
        .stderr(predicate::str::contains("Denominator must be greater than zero"));
}

#[test]
fn test_non_numeric_denominator_is_rejected() {
    cargo_bin_cmd!("retroaction")
        .args(["-d", "cinquante"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_generates_outputs() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("evaluation.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("TP1").unwrap();
    let rows = [
        ("Nom", "Tremblay"),
        ("Prénom", "Léa"),
        ("DA", "2045123"),
        ("Notes", "45"),
        ("Commentaires", "Très bien"),
        ("Critère A", "x"),
    ];
    for (row, (label, value)) in (0u32..).zip(rows) {
        sheet.write_string(row, 0, label).unwrap();
        sheet.write_string(row, 1, value).unwrap();
    }
    workbook.save(&input).unwrap();
    std::fs::create_dir(dir.path().join("out")).unwrap();

    cargo_bin_cmd!("retroaction")
        .current_dir(dir.path())
        .args(["-i", "evaluation.xlsx", "-o", "out", "-s", "TP1", "-d", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("travaux.zip"));

    assert!(dir.path().join("out/2045123.pdf").is_file());
    assert!(dir.path().join("out/travaux.zip").is_file());
    assert!(dir.path().join("out/TP1.xlsx").is_file());
}
