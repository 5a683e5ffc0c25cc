//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::FeedbackConfig;
use crate::error::Result;
use crate::feedback::{FeedbackRequest, FeedbackRun};
use crate::interactive::prompt_request;

/// Retroaction - Generate one feedback PDF per student from an evaluation sheet.
///
/// Without any option, the tool runs interactively.
#[derive(Parser, Debug)]
#[command(name = "retroaction")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Evaluation workbook (xlsx, xlsm, xls, ods)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Existing directory receiving the documents, archive and summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Name of the sheet to process
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Maximum possible score
    #[arg(short, long, allow_negative_numbers = true)]
    pub denominator: Option<i64>,

    /// Only process students marked with X in the "Générer" row
    #[arg(short, long)]
    pub partial: bool,

    /// Document title (default: sheet name)
    #[arg(short, long)]
    pub title: Option<String>,

    /// YAML settings file overriding the page layout and logo
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Whether no run option was given; `--config` alone still prompts.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.input.is_none()
            && self.output.is_none()
            && self.sheet.is_none()
            && self.denominator.is_none()
            && !self.partial
            && self.title.is_none()
    }

    /// Request built from the options. Missing values are left empty so that
    /// validation reports every one of them.
    #[must_use]
    pub fn request(&self) -> FeedbackRequest {
        FeedbackRequest {
            input: self.input.clone().unwrap_or_default(),
            output_dir: self.output.clone().unwrap_or_default(),
            sheet: self.sheet.clone().unwrap_or_default(),
            denominator: self.denominator.unwrap_or(0),
            partial: self.partial,
            title: self.title.clone(),
        }
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FeedbackConfig::from_yaml_file(path)?,
        None => FeedbackConfig::default(),
    };

    let request = if cli.is_interactive() {
        prompt_request(&Term::stdout(), &std::env::current_dir()?)?
    } else {
        cli.request()
    };

    generate_command(request, &config)
}

/// Validate, build records and write every output.
fn generate_command(request: FeedbackRequest, config: &FeedbackConfig) -> Result<()> {
    let run = FeedbackRun::prepare(request, config)?;
    let request = run.request();

    println!("{} {}", style("Input:").bold(), request.input.display());
    println!("{} {}", style("Output:").bold(), request.output_dir.display());
    println!("{} {}", style("Sheet:").bold(), style(&request.sheet).cyan());
    println!(
        "{} {}",
        style("Mode:").bold(),
        if request.partial { "partial" } else { "complete" }
    );
    println!("{} {}", style("Denominator:").bold(), request.denominator);
    println!();
    println!(
        "Generating feedback for {} student(s)",
        style(run.records().len()).green()
    );

    let pb = ProgressBar::new(run.records().len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let outcome = match run.execute(config, |done| pb.set_position(done as u64)) {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    for (path, reason) in &outcome.batch.skipped {
        println!(
            "  {} {} ({reason})",
            style("Skipped:").yellow().bold(),
            path.display()
        );
    }

    println!();
    println!(
        "{} {} document(s)",
        style("Written:").green().bold(),
        outcome.batch.written.len()
    );
    println!(
        "{} {}",
        style("Archive:").green().bold(),
        outcome.batch.archive.display()
    );
    println!(
        "{} {}",
        style("Summary:").green().bold(),
        outcome.summary.display()
    );

    Ok(())
}
