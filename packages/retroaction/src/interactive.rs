//! Interactive mode: prompt for the run parameters on the terminal.

use std::fs;
use std::path::{Path, PathBuf};

use console::{style, Term};

use crate::error::{Result, RetroactionError};
use crate::feedback::FeedbackRequest;
use crate::grid::sheet_names;

/// Spreadsheet extensions offered in interactive mode.
const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Spreadsheets directly inside `dir`, sorted by name.
pub fn spreadsheets_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    SPREADSHEET_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parse a menu answer into an index below `len`.
///
/// # Examples
/// ```
/// use retroaction::interactive::parse_choice;
///
/// assert_eq!(parse_choice(" 1 ", 3).unwrap(), 1);
/// assert!(parse_choice("3", 3).is_err());
/// assert!(parse_choice("deux", 3).is_err());
/// ```
pub fn parse_choice(answer: &str, len: usize) -> Result<usize> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|choice| *choice < len)
        .ok_or_else(|| RetroactionError::InvalidSelection(answer.trim().to_string()))
}

/// Parse the denominator answer; range checks happen during validation.
pub fn parse_denominator(answer: &str) -> Result<i64> {
    answer
        .trim()
        .parse::<i64>()
        .map_err(|_| RetroactionError::InvalidSelection(answer.trim().to_string()))
}

fn ask(term: &Term, question: &str) -> Result<String> {
    term.write_line(&format!("{}", style(question).bold()))?;
    term.write_str("? ")?;
    Ok(term.read_line()?)
}

fn menu<T: AsRef<str>>(term: &Term, question: &str, items: &[T]) -> Result<usize> {
    term.write_line(&format!("{}", style(question).bold()))?;
    term.write_line("")?;
    for (index, item) in items.iter().enumerate() {
        term.write_line(&format!("{index} - {}", item.as_ref()))?;
    }
    term.write_str("? ")?;
    parse_choice(&term.read_line()?, items.len())
}

/// Ask for a spreadsheet in `dir`, a sheet, an output directory and the
/// denominator. The resulting request processes every subject.
pub fn prompt_request(term: &Term, dir: &Path) -> Result<FeedbackRequest> {
    let files = spreadsheets_in(dir)?;
    if files.is_empty() {
        return Err(RetroactionError::InvalidSelection(format!(
            "no spreadsheet found in {}",
            dir.display()
        )));
    }

    let names: Vec<String> = files
        .iter()
        .map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();
    let input = files[menu(term, "Feedback from which file?", &names)?].clone();
    term.write_line(&format!("File: {}", style(input.display()).cyan()))?;

    let sheets = sheet_names(&input)?;
    let sheet = sheets[menu(term, "Feedback from which sheet?", &sheets)?].clone();
    term.write_line(&format!("Sheet: {}", style(&sheet).cyan()))?;

    let output_dir = dir.join(ask(term, "Output directory?")?.trim());
    let denominator = parse_denominator(&ask(term, "Denominator?")?)?;

    Ok(FeedbackRequest {
        input,
        output_dir,
        sheet,
        denominator,
        partial: false,
        title: None,
    })
}
