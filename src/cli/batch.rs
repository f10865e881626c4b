use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::resolve::results_table;
use crate::resolve::batch::{parallel_map, BatchSummary};
use crate::resolve::{MatchResult, MatchType, Resolver};

const RESULT_COLUMNS: [&str; 5] = [
    "canonical_model",
    "match_type",
    "confidence",
    "match_notes",
    "unknown_reason",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Pick from the file extension (.csv, .jsonl/.ndjson, anything else is lines)
    Auto,
    Csv,
    Jsonl,
    /// One title per line
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Same shape as the input (lines input prints a table)
    Auto,
    Csv,
    Jsonl,
    Table,
}

#[derive(Debug, Clone)]
pub struct BatchArgs {
    /// Input file, or `-` for stdin
    pub input: PathBuf,
    pub format: InputFormat,
    pub title_column: String,
    pub output: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub jobs: usize,
}

/// Parsed input rows, kept whole so output can carry every original field.
enum Records {
    Csv {
        headers: csv::StringRecord,
        rows: Vec<csv::StringRecord>,
        title_index: usize,
    },
    Jsonl(Vec<Map<String, Value>>),
    Lines(Vec<String>),
}

pub fn run(resolver: &Resolver, args: &BatchArgs) -> Result<()> {
    let format = detect_format(&args.input, args.format);
    let reader = open_input(&args.input)?;
    let records = read_records(reader, format, &args.title_column)?;

    let results = resolve_records(resolver, &records, &args.title_column, args.jobs);

    let output_format = match (args.output_format, &records) {
        (OutputFormat::Auto, Records::Csv { .. }) => OutputFormat::Csv,
        (OutputFormat::Auto, Records::Jsonl(_)) => OutputFormat::Jsonl,
        (OutputFormat::Auto, Records::Lines(_)) => OutputFormat::Table,
        (explicit, _) => explicit,
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create output: {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    write_results(&mut out, &records, &results, output_format, &args.title_column)?;
    out.flush()?;

    let summary = BatchSummary::from_results(&results);
    info!(
        threshold = resolver.threshold().score(),
        total = summary.total,
        exact = summary.count(MatchType::Exact),
        regex = summary.count(MatchType::Regex),
        fuzzy = summary.count(MatchType::Fuzzy),
        none = summary.count(MatchType::None),
        "batch complete"
    );
    eprintln!("{}", summary_line(&summary));

    Ok(())
}

fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "Resolved {} of {} titles (exact {}, regex {}, fuzzy {}, none {})",
        summary.resolved(),
        summary.total,
        summary.count(MatchType::Exact),
        summary.count(MatchType::Regex),
        summary.count(MatchType::Fuzzy),
        summary.count(MatchType::None),
    )
}

fn detect_format(path: &Path, requested: InputFormat) -> InputFormat {
    if requested != InputFormat::Auto {
        return requested;
    }
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("csv") => InputFormat::Csv,
        Some("jsonl") | Some("ndjson") => InputFormat::Jsonl,
        _ => InputFormat::Lines,
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open input: {}", path.display()))?;
    Ok(Box::new(file))
}

fn read_records<R: Read>(reader: R, format: InputFormat, title_column: &str) -> Result<Records> {
    match format {
        InputFormat::Csv => {
            let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
            let headers = csv_reader
                .headers()
                .context("Failed to read CSV header")?
                .clone();
            let Some(title_index) = headers.iter().position(|h| h.trim() == title_column) else {
                bail!("Column '{}' not found in CSV header", title_column);
            };
            let rows = csv_reader
                .records()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read CSV rows")?;
            Ok(Records::Csv {
                headers,
                rows,
                title_index,
            })
        }
        InputFormat::Jsonl => {
            let mut rows = Vec::new();
            for (n, line) in BufReader::new(reader).lines().enumerate() {
                let line = line.context("Failed to read input")?;
                if line.trim().is_empty() {
                    continue;
                }
                let value: Value = serde_json::from_str(&line)
                    .with_context(|| format!("Line {} is not valid JSON", n + 1))?;
                let Value::Object(object) = value else {
                    bail!("Line {} is not a JSON object", n + 1);
                };
                rows.push(object);
            }
            Ok(Records::Jsonl(rows))
        }
        InputFormat::Lines | InputFormat::Auto => {
            let mut titles = Vec::new();
            for line in BufReader::new(reader).lines() {
                let line = line.context("Failed to read input")?;
                if !line.trim().is_empty() {
                    titles.push(line);
                }
            }
            Ok(Records::Lines(titles))
        }
    }
}

fn resolve_records(
    resolver: &Resolver,
    records: &Records,
    title_column: &str,
    jobs: usize,
) -> Vec<MatchResult> {
    match records {
        Records::Csv {
            rows, title_index, ..
        } => parallel_map(rows, jobs, |row| {
            resolver.resolve(row.get(*title_index).unwrap_or_default())
        }),
        // non-string and missing titles become "invalid input" rows, not errors
        Records::Jsonl(rows) => parallel_map(rows, jobs, |row| {
            resolver.resolve_field(row.get(title_column))
        }),
        Records::Lines(titles) => parallel_map(titles, jobs, |t| resolver.resolve(t)),
    }
}

fn write_results(
    out: &mut dyn Write,
    records: &Records,
    results: &[MatchResult],
    format: OutputFormat,
    title_column: &str,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let titles = record_titles(records, title_column);
            writeln!(out, "{}", results_table(&titles, results))?;
        }
        OutputFormat::Jsonl => {
            for (object, result) in record_objects(records, title_column).into_iter().zip(results) {
                let mut object = object;
                if let Value::Object(fields) = serde_json::to_value(result)? {
                    object.extend(fields);
                }
                writeln!(out, "{}", Value::Object(object))?;
            }
        }
        OutputFormat::Csv | OutputFormat::Auto => {
            let mut writer = csv::Writer::from_writer(out);
            let (headers, rows) = record_rows(records, title_column);
            let mut header: Vec<String> = headers;
            header.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));
            writer.write_record(&header)?;
            for (mut row, result) in rows.into_iter().zip(results) {
                row.extend(result_cells(result));
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn result_cells(result: &MatchResult) -> [String; 5] {
    [
        result.canonical_model.clone().unwrap_or_default(),
        result.match_type.to_string(),
        result.confidence.to_string(),
        result.match_notes.clone(),
        result.unknown_reason.clone().unwrap_or_default(),
    ]
}

fn record_titles(records: &Records, title_column: &str) -> Vec<String> {
    match records {
        Records::Csv {
            rows, title_index, ..
        } => rows
            .iter()
            .map(|r| r.get(*title_index).unwrap_or_default().to_string())
            .collect(),
        Records::Jsonl(rows) => rows
            .iter()
            .map(|r| match r.get(title_column) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            })
            .collect(),
        Records::Lines(titles) => titles.clone(),
    }
}

fn record_objects(records: &Records, title_column: &str) -> Vec<Map<String, Value>> {
    match records {
        Records::Csv { headers, rows, .. } => rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .zip(row.iter())
                    .map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
                    .collect()
            })
            .collect(),
        Records::Jsonl(rows) => rows.clone(),
        Records::Lines(titles) => titles
            .iter()
            .map(|t| {
                let mut object = Map::new();
                object.insert(title_column.to_string(), Value::String(t.clone()));
                object
            })
            .collect(),
    }
}

fn record_rows(records: &Records, title_column: &str) -> (Vec<String>, Vec<Vec<String>>) {
    match records {
        Records::Csv { headers, rows, .. } => {
            let width = headers.len();
            let rows = rows
                .iter()
                .map(|row| {
                    let mut cells: Vec<String> = row.iter().map(str::to_string).collect();
                    cells.resize(width, String::new());
                    cells
                })
                .collect();
            (headers.iter().map(str::to_string).collect(), rows)
        }
        Records::Jsonl(_) | Records::Lines(_) => {
            let rows = record_titles(records, title_column)
                .into_iter()
                .map(|t| vec![t])
                .collect();
            (vec![title_column.to_string()], rows)
        }
    }
}
