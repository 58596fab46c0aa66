// colcmp - compare two spreadsheet columns from the command line

mod exit_codes;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::json;

use colcompare_config::{CompareProfile, OutputKind, Settings};
use colcompare_engine::compare::{ComparisonResult, Side};
use colcompare_engine::{CompareError, LoadOutcome, Session, SessionError};
use colcompare_io::ExportFormat;

use exit_codes::{EXIT_COMPARE, EXIT_DIFFERENCES, EXIT_LOAD, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "colcmp")]
#[command(about = "Find values that appear in only one of two spreadsheet columns")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook with their column counts
    #[command(after_help = "\
Examples:
  colcmp sheets customers.xlsx
  colcmp sheets legacy.xls --json")]
    Sheets {
        /// Workbook (.xlsx, .xlsm, .xlsb, .xls, .ods)
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the selectable column letters of one sheet
    #[command(after_help = "\
Examples:
  colcmp columns customers.xlsx --sheet CRM
  colcmp columns customers.xlsx --sheet Billing --json")]
    Columns {
        /// Workbook (.xlsx, .xlsm, .xlsb, .xls, .ods)
        file: PathBuf,

        /// Sheet name (exact match)
        #[arg(long)]
        sheet: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two columns and list the values unique to each
    #[command(after_help = "\
Values are compared as trimmed text; duplicates and order within a column \
don't matter. Exit code 0 means the comparison ran, even if the columns differ. \
With --strict, exit code 1 means the columns differ.

Examples:
  colcmp compare book.xlsx --first-sheet CRM --first-column A --second-sheet Billing --second-column C
  colcmp compare book.xlsx --first-sheet S1 --first-column A --second-sheet S1 --second-column B --out json
  colcmp compare --profile ids.toml --output missing.csv
  colcmp compare --profile ids.toml --second-column D --strict")]
    Compare {
        /// Workbook (optional when the profile names one)
        file: Option<PathBuf>,

        /// Comparison profile (TOML); flags override its fields
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Sheet holding the first column
        #[arg(long)]
        first_sheet: Option<String>,

        /// First column letters (A, B, ..., AA, ...)
        #[arg(long)]
        first_column: Option<String>,

        /// Sheet holding the second column
        #[arg(long)]
        second_sheet: Option<String>,

        /// Second column letters (A, B, ..., AA, ...)
        #[arg(long)]
        second_column: Option<String>,

        /// Output format (default: from profile, --output extension, or settings)
        #[arg(long, alias = "format")]
        out: Option<OutFormat>,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress the status line on stderr
        #[arg(long, short = 'q')]
        quiet: bool,

        /// Exit 1 when the columns differ
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutFormat {
    Text,
    Json,
    Csv,
    Tsv,
    Xlsx,
}

impl From<OutputKind> for OutFormat {
    fn from(kind: OutputKind) -> Self {
        match kind {
            OutputKind::Text => Self::Text,
            OutputKind::Json => Self::Json,
            OutputKind::Csv => Self::Csv,
            OutputKind::Tsv => Self::Tsv,
            OutputKind::Xlsx => Self::Xlsx,
        }
    }
}

impl From<ExportFormat> for OutFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => Self::Csv,
            ExportFormat::Tsv => Self::Tsv,
            ExportFormat::Json => Self::Json,
            ExportFormat::Xlsx => Self::Xlsx,
        }
    }
}

impl OutFormat {
    fn export_format(self) -> Option<ExportFormat> {
        match self {
            Self::Text => None,
            Self::Json => Some(ExportFormat::Json),
            Self::Csv => Some(ExportFormat::Csv),
            Self::Tsv => Some(ExportFormat::Tsv),
            Self::Xlsx => Some(ExportFormat::Xlsx),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sheets { file, json } => cmd_sheets(file, json),
        Commands::Columns { file, sheet, json } => cmd_columns(file, sheet, json),
        Commands::Compare {
            file,
            profile,
            first_sheet,
            first_column,
            second_sheet,
            second_column,
            out,
            output,
            quiet,
            strict,
        } => cmd_compare(CompareArgs {
            file,
            profile,
            first_sheet,
            first_column,
            second_sheet,
            second_column,
            out,
            output,
            quiet,
            strict,
        }),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Self { code: EXIT_LOAD, message: msg.into(), hint: None }
    }

    pub fn compare(msg: impl Into<String>) -> Self {
        Self { code: EXIT_COMPARE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Map a failed `Session::compare`, using the session's status line as
    /// the message.
    fn session(err: &SessionError, session: &Session) -> Self {
        let message = session.status().to_string();
        match err {
            SessionError::NoWorkbook => Self::load(message),
            SessionError::IncompleteSelection => Self::usage(message),
            SessionError::Compare(CompareError::SheetNotFound { .. }) => Self::compare(message)
                .with_hint(format!("available sheets: {}", session.sheet_options().join(", "))),
            SessionError::Compare(CompareError::InvalidColumn { .. }) => Self::compare(message)
                .with_hint("columns are letters: A, B, ..., Z, AA, AB, ..."),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load `file` into a fresh session, failing with the session's status line.
fn open_session(file: &Path) -> Result<Session, CliError> {
    let mut session = Session::new();
    let ticket = session.begin_load();
    let loaded = colcompare_io::load_path(file).map(|(workbook, report)| {
        log::info!(
            "{}: {} sheet(s), {} cell(s) in {} ms",
            file.display(),
            report.sheets_imported(),
            report.cells_imported,
            report.load_duration_ms
        );
        workbook
    });

    match session.finish_load(ticket, loaded) {
        LoadOutcome::Installed { .. } => Ok(session),
        LoadOutcome::Failed | LoadOutcome::Stale => Err(CliError::load(session.status())
            .with_hint("supported workbooks: .xlsx, .xlsm, .xlsb, .xls, .ods")),
    }
}

// ============================================================================
// sheets / columns
// ============================================================================

fn cmd_sheets(file: PathBuf, json: bool) -> Result<(), CliError> {
    let session = open_session(&file)?;
    let summaries = session.workbook().map(|wb| wb.summaries()).unwrap_or_default();

    let mut out = String::new();
    if json {
        let sheets: Vec<_> = summaries
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "columns": s.columns,
                    "cells": s.cells,
                    "letters": colcompare_engine::column::column_options(s.columns),
                })
            })
            .collect();
        out.push_str(&to_json_line(&sheets)?);
    } else {
        let width = summaries.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
        for s in &summaries {
            out.push_str(&format!("{:<width$}  {}\n", s.name, describe_columns(s.columns)));
        }
    }

    write_stdout(out.as_bytes())
}

fn cmd_columns(file: PathBuf, sheet: String, json: bool) -> Result<(), CliError> {
    let mut session = open_session(&file)?;

    if !session.sheet_options().contains(&sheet) {
        return Err(CliError::compare(format!("no sheet named '{}'", sheet))
            .with_hint(format!("available sheets: {}", session.sheet_options().join(", "))));
    }

    session.select_sheet(Side::First, sheet);
    let letters = session.column_options(Side::First);

    let out = if json {
        to_json_line(&letters)?
    } else {
        letters.iter().map(|l| format!("{l}\n")).collect()
    };
    write_stdout(out.as_bytes())
}

fn describe_columns(count: u32) -> String {
    match count {
        0 => "0 columns".to_string(),
        1 => "1 column (A)".to_string(),
        n => format!(
            "{} columns (A-{})",
            n,
            colcompare_engine::column::index_to_letters(n)
        ),
    }
}

// ============================================================================
// compare
// ============================================================================

struct CompareArgs {
    file: Option<PathBuf>,
    profile: Option<PathBuf>,
    first_sheet: Option<String>,
    first_column: Option<String>,
    second_sheet: Option<String>,
    second_column: Option<String>,
    out: Option<OutFormat>,
    output: Option<PathBuf>,
    quiet: bool,
    strict: bool,
}

/// A comparison with every field resolved from flags, profile and settings.
#[derive(Debug, PartialEq)]
struct CompareRequest {
    file: PathBuf,
    first: (String, String),
    second: (String, String),
    format: OutFormat,
    output: Option<PathBuf>,
}

/// Merge flags over the profile over the settings. Missing pieces are usage
/// errors naming the flag to pass.
fn resolve_request(
    args: &CompareArgs,
    profile: &CompareProfile,
    settings: &Settings,
) -> Result<CompareRequest, CliError> {
    let mut missing = Vec::new();

    let file = args.file.clone().or_else(|| profile.file.clone());
    if file.is_none() {
        missing.push("<FILE>");
    }

    let mut pick = |flag: &Option<String>, from_profile: &Option<String>, name: &'static str| {
        let value = flag.clone().or_else(|| from_profile.clone());
        if value.is_none() {
            missing.push(name);
        }
        value.unwrap_or_default()
    };
    let first = (
        pick(&args.first_sheet, &profile.first.sheet, "--first-sheet"),
        pick(&args.first_column, &profile.first.column, "--first-column"),
    );
    let second = (
        pick(&args.second_sheet, &profile.second.sheet, "--second-sheet"),
        pick(&args.second_column, &profile.second.column, "--second-column"),
    );

    if !missing.is_empty() {
        return Err(CliError::usage(format!("missing {}", missing.join(", ")))
            .with_hint("pass the flags or set them in a --profile file"));
    }

    let output = args.output.clone().or_else(|| profile.output.path.clone());
    let format = args
        .out
        .or_else(|| profile.output.format.map(OutFormat::from))
        .or_else(|| {
            output
                .as_ref()
                .and_then(|p| p.extension())
                .and_then(|ext| ExportFormat::from_extension(&ext.to_string_lossy()))
                .map(OutFormat::from)
        })
        .unwrap_or_else(|| settings.output_format.into());

    let binary = format.export_format().is_some_and(|f| f.is_binary());
    if binary && output.is_none() {
        return Err(CliError::usage("xlsx output can't be written to stdout")
            .with_hint("add --output result.xlsx"));
    }

    Ok(CompareRequest {
        file: file.unwrap_or_default(),
        first,
        second,
        format,
        output,
    })
}

fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let settings = Settings::load();
    let profile = match &args.profile {
        Some(path) => CompareProfile::load(path).map_err(|e| CliError::usage(e.to_string()))?,
        None => CompareProfile::default(),
    };
    if let Some(name) = &profile.name {
        log::info!("using profile '{}'", name);
    }

    let request = resolve_request(&args, &profile, &settings)?;
    let mut session = open_session(&request.file)?;

    session.select_sheet(Side::First, request.first.0.as_str());
    session.select_column(Side::First, request.first.1.as_str());
    session.select_sheet(Side::Second, request.second.0.as_str());
    session.select_column(Side::Second, request.second.1.as_str());

    let compared = session.compare().cloned();
    let result = match compared {
        Ok(result) => result,
        Err(e) => return Err(CliError::session(&e, &session)),
    };

    let bytes = match request.format.export_format() {
        None => render_text(&result, settings.max_listed).into_bytes(),
        Some(format) => {
            let mut buf = Vec::new();
            colcompare_io::export_result(&result, format, &mut buf)
                .map_err(|e| CliError::output(e.to_string()))?;
            buf
        }
    };

    match &request.output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .map_err(|e| CliError::output(format!("{}: {}", path.display(), e)))?;
            log::info!("wrote {}", path.display());
        }
        None => write_stdout(&bytes)?,
    }

    if !args.quiet && settings.show_status {
        eprintln!("{}", session.status());
    }

    if (args.strict || settings.strict_exit) && !result.is_identical() {
        return Err(CliError { code: EXIT_DIFFERENCES, message: String::new(), hint: None });
    }

    Ok(())
}

// ============================================================================
// Output
// ============================================================================

/// Two headed lists. `max_listed` caps each list; the rest is summarized.
fn render_text(result: &ComparisonResult, max_listed: Option<usize>) -> String {
    let mut out = String::new();

    for side in [Side::First, Side::Second] {
        let values = result.only_in(side);
        out.push_str(&format!(
            "Only in {} ({}):\n",
            result.selection(side),
            values.len()
        ));

        let shown = max_listed.unwrap_or(values.len()).min(values.len());
        for value in &values[..shown] {
            if value.is_empty() {
                out.push_str("  (empty)\n");
            } else {
                out.push_str(&format!("  {}\n", value));
            }
        }
        if shown < values.len() {
            out.push_str(&format!("  ... and {} more\n", values.len() - shown));
        }
    }

    out
}

fn to_json_line<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| CliError::output(e.to_string()))?;
    json.push('\n');
    Ok(json)
}

fn write_stdout(bytes: &[u8]) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|_| stdout.flush())
        .map_err(|e| CliError::output(e.to_string()))
}
