//! CLI for xlmerge - inspect, filter and merge spreadsheet files
//!
//! Usage:
//!   xlmerge_cli inspect data.xlsx
//!   xlmerge_cli filter data.xlsx --column name=ali --from 2024-01-01 --to 2024-01-31
//!   xlmerge_cli merge main.xlsx new.xlsx -o merged_excel.xlsx
//!
//! Set `RUST_LOG=debug` for codec and filter diagnostics on stderr.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use xlmerge::filter::{filter_records, ResultSummary};
use xlmerge::merge::merge_and_export;
use xlmerge::parser::parse_upload;
use xlmerge::{DateRange, ExportOptions, FilterOptions, FilterState, RecordBatch, RowRecord};

#[derive(Parser)]
#[command(
    name = "xlmerge_cli",
    version,
    about = "Filter and merge the first sheet of XLSX/XLS/CSV/TSV files."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the header row and record count.
    Inspect {
        /// Workbook or delimited text file.
        file: PathBuf,
    },
    /// Print the records that pass the given filters.
    Filter {
        file: PathBuf,

        /// Case-insensitive substring filter, `HEADER=NEEDLE` (repeatable).
        #[arg(long = "column", value_name = "HEADER=NEEDLE", value_parser = parse_column_filter)]
        columns: Vec<(String, String)>,

        /// Earliest date to keep (YYYY-MM-DD, inclusive).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest date to keep (YYYY-MM-DD, inclusive).
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Turn the date filter on; requires `--from` or `--to`.
        #[arg(long)]
        by_date: bool,

        /// Header keyword marking a date column (repeatable). Replaces the
        /// defaults (`date`, `tarih`).
        #[arg(long = "date-keyword", value_name = "WORD")]
        date_keywords: Vec<String>,

        /// Emit JSON instead of tab-separated text.
        #[arg(long)]
        json: bool,
    },
    /// Append the incoming file's records to the main file's and write XLSX.
    Merge {
        main: PathBuf,
        incoming: PathBuf,

        /// Output path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name of the merged sheet.
        #[arg(long)]
        sheet_name: Option<String>,
    },
}

fn parse_column_filter(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((header, needle)) if !header.is_empty() => {
            Ok((header.to_string(), needle.to_string()))
        }
        _ => Err(format!("expected HEADER=NEEDLE, got '{raw}'")),
    }
}

fn init_logging() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn load(path: &Path) -> Result<RecordBatch> {
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let name = path.to_string_lossy();
    parse_upload(&name, &data).with_context(|| format!("parse {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Inspect { file } => inspect(&mut out, &file),
        Command::Filter {
            file,
            columns,
            from,
            to,
            by_date,
            date_keywords,
            json,
        } => {
            let mut state = FilterState::new();
            for (header, needle) in columns {
                state.set_column_filter(header, needle);
            }
            state.set_date_range(DateRange::new(from, to));
            if by_date || from.is_some() || to.is_some() {
                state.apply_date_filter()?;
            }
            let mut options = FilterOptions::default();
            if !date_keywords.is_empty() {
                options.date_header_keywords = date_keywords;
            }
            run_filter(&mut out, &file, &state, &options, json)
        }
        Command::Merge {
            main,
            incoming,
            output,
            sheet_name,
        } => run_merge(&mut out, &main, &incoming, output, sheet_name),
    }
}

fn inspect(out: &mut impl Write, file: &Path) -> Result<()> {
    let batch = load(file)?;
    writeln!(out, "{}", file.display())?;
    writeln!(out, "  records: {}", batch.len())?;
    writeln!(out, "  headers: {}", batch.headers.len())?;
    for header in &batch.headers {
        writeln!(out, "    {header}")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct FilterOutput<'a> {
    rows: Vec<&'a RowRecord>,
    summary: ResultSummary,
}

fn run_filter(
    out: &mut impl Write,
    file: &Path,
    state: &FilterState,
    options: &FilterOptions,
    json: bool,
) -> Result<()> {
    let batch = load(file)?;
    let view = filter_records(&batch.records, state, options);
    let summary = view.summary(batch.len());

    if json {
        let payload = FilterOutput {
            rows: view.records().to_vec(),
            summary,
        };
        serde_json::to_writer_pretty(&mut *out, &payload)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", batch.headers.join("\t"))?;
    for record in view.iter() {
        let cells: Vec<String> = batch.headers.iter().map(|h| record.text(h)).collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    if summary.no_results {
        writeln!(out, "no matching records ({} total)", summary.total)?;
    } else {
        writeln!(out, "{}/{} records", summary.shown, summary.total)?;
    }
    Ok(())
}

fn run_merge(
    out: &mut impl Write,
    main: &Path,
    incoming: &Path,
    output: Option<PathBuf>,
    sheet_name: Option<String>,
) -> Result<()> {
    let mut main_records = load(main)?.records;
    let incoming_records = load(incoming)?.records;
    if incoming_records.is_empty() {
        bail!("{} has no records to merge", incoming.display());
    }

    let mut options = ExportOptions::default();
    if let Some(name) = sheet_name {
        options.sheet_name = name;
    }
    let output = output.unwrap_or_else(|| PathBuf::from(&options.file_name));

    let artifact = merge_and_export(&mut main_records, &incoming_records, &options)?;
    fs::write(&output, &artifact.bytes)
        .with_context(|| format!("write {}", output.display()))?;

    writeln!(
        out,
        "Written: {} ({} records)",
        output.display(),
        main_records.len()
    )?;
    Ok(())
}
