//! Sheetdata CLI - inspect the cell data of XLSX, XLSB and XLS workbooks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sheetdata::prelude::*;
use sheetdata::{StoredCell, VerbatimFormulaParser};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetdata")]
#[command(author, version, about = "Worksheet cell data inspection tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input workbook (xlsx, xlsb, xls)
        input: PathBuf,
    },

    /// Print the decoded rows and cells
    Dump {
        /// Input workbook (xlsx, xlsb, xls)
        input: PathBuf,

        /// Sheet to dump, by 0-based index or name (default: all)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Write JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print every call the decoder makes, in order
    Trace {
        /// Input workbook (xlsx, xlsb, xls)
        input: PathBuf,

        /// Sheet to trace, by 0-based index or name (default: all)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Write one JSON object per call
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Dump { input, sheet, json } => dump(&input, sheet.as_deref(), json),
        Commands::Trace { input, sheet, json } => trace(&input, sheet.as_deref(), json),
    }
}

fn open(input: &Path) -> Result<Workbook> {
    let workbook = Workbook::open_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    tracing::debug!("{} is a {} workbook", input.display(), workbook.format());
    Ok(workbook)
}

/// Sheet selection from a `--sheet` value: an index if it parses as one,
/// otherwise a name
fn import_options(sheet: Option<&str>) -> ImportOptions {
    match sheet {
        None => ImportOptions::new(),
        Some(s) => match s.parse::<usize>() {
            Ok(index) => ImportOptions::new().sheet_index(index),
            Err(_) => ImportOptions::new().sheet_name(s),
        },
    }
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook = open(input)?;
    for sheet in workbook.sheets() {
        println!("{}\t{}", sheet.index, sheet.name);
    }
    Ok(())
}

/// JSON shape of one dumped worksheet
#[derive(Serialize)]
struct SheetDump<'a> {
    index: usize,
    name: &'a str,
    used_area: Option<String>,
    rows: Vec<&'a RowModel>,
    cells: Vec<CellDump<'a>>,
    array_formulas: Vec<String>,
    table_operations: Vec<String>,
    shared_formulas: usize,
}

#[derive(Serialize)]
struct CellDump<'a> {
    address: String,
    #[serde(flatten)]
    cell: &'a StoredCell,
}

impl<'a> SheetDump<'a> {
    fn new(info: &'a SheetInfo, sheet: &'a MemorySheet) -> Self {
        Self {
            index: info.index,
            name: &info.name,
            used_area: sheet.used_area().map(|r| r.to_a1_string()),
            rows: sheet.rows().collect(),
            cells: sheet
                .cells()
                .map(|(addr, cell)| CellDump {
                    address: addr.to_a1_string(),
                    cell,
                })
                .collect(),
            array_formulas: sheet
                .array_formulas()
                .iter()
                .map(|(range, _)| range.to_a1_string())
                .collect(),
            table_operations: sheet
                .table_operations()
                .iter()
                .map(|(range, _)| range.to_a1_string())
                .collect(),
            shared_formulas: sheet.shared_formulas().len(),
        }
    }
}

fn dump(input: &Path, sheet: Option<&str>, json: bool) -> Result<()> {
    let mut workbook = open(input)?;
    let sheets = workbook
        .read_with(&import_options(sheet))
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    if let Some(sheet) = sheet.filter(|_| sheets.is_empty()) {
        anyhow::bail!("No sheet matches '{}'", sheet);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let dumps: Vec<_> = sheets
            .iter()
            .map(|s| SheetDump::new(&s.info, &s.data))
            .collect();
        serde_json::to_writer_pretty(&mut out, &dumps).context("Failed to write JSON")?;
        writeln!(out)?;
        return Ok(());
    }

    for imported in &sheets {
        let data = &imported.data;
        writeln!(out, "Sheet {}: \"{}\"", imported.info.index, imported.info.name)?;
        match data.used_area() {
            Some(range) => writeln!(out, "  Used area: {}", range)?,
            None => writeln!(out, "  Used area: empty")?,
        }
        for row in data.rows() {
            writeln!(out, "  {}", describe_row(row))?;
        }
        for (addr, cell) in data.cells() {
            let xf = cell.xf_id.map(|xf| format!(" [xf {}]", xf)).unwrap_or_default();
            writeln!(out, "  {}\t{}{}", addr, describe_content(&cell.content), xf)?;
        }
        for (range, _) in data.array_formulas() {
            writeln!(out, "  array formula {}", range)?;
        }
        for (range, table) in data.table_operations() {
            writeln!(out, "  table operation {} ({} {})", range, table.ref1, table.ref2)?;
        }
    }
    Ok(())
}

fn trace(input: &Path, sheet: Option<&str>, json: bool) -> Result<()> {
    let mut workbook = open(input)?;
    let sheets = workbook
        .read_sheets(&import_options(sheet), &VerbatimFormulaParser, |_, _| {
            RecordingSink::new()
        })
        .with_context(|| format!("Failed to read '{}'", input.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for imported in &sheets {
        if !json {
            writeln!(out, "# {}", imported.info.name)?;
        }
        for call in &imported.data.calls {
            if json {
                serde_json::to_writer(&mut out, call).context("Failed to write JSON")?;
                writeln!(out)?;
            } else {
                writeln!(out, "{:?}", call)?;
            }
        }
    }
    Ok(())
}

fn describe_row(row: &RowModel) -> String {
    let mut text = format!("row {}", row.row);
    if row.height >= 0.0 {
        text.push_str(&format!(" height {}", row.height));
    }
    if let Some(xf) = row.xf_id {
        text.push_str(&format!(" xf {}", xf));
    }
    if row.hidden {
        text.push_str(" hidden");
    }
    if !row.col_spans().is_empty() {
        let spans: Vec<_> = row
            .col_spans()
            .iter()
            .map(|span| format!("{}-{}", span.first, span.last))
            .collect();
        text.push_str(&format!(" spans {}", spans.join(",")));
    }
    text
}

fn describe_content(content: &CellContent) -> String {
    match content {
        CellContent::Blank => "blank".to_string(),
        CellContent::Number(n) => format!("number {}", n),
        CellContent::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        CellContent::Error(e) => e.to_string(),
        CellContent::ErrorText(text) => format!("error {:?}", text),
        CellContent::Text(s) => format!("{:?}", s.as_str()),
        CellContent::RichText(rich) => format!("rich {:?} ({} runs)", rich.text(), rich.runs().len()),
        CellContent::DateTime(dt) => format!("date {}", dt),
        CellContent::Formula(tokens) => match tokens.expression() {
            Some(expr) => format!("={}", expr),
            None => format!("formula ({} tokens)", tokens.tokens.len()),
        },
        CellContent::SharedFormula(id) => format!("shared formula {}", id),
    }
}
