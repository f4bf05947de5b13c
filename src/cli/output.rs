/// Output formatting: tab-aligned and bordered tables, JSON modes, id mode.
use std::io::{self, Write};

use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use serde::Serialize;

use super::args::OutputFormat;
use crate::errors::RackError;
use crate::extract::Tabular;
use crate::types::{ErrorOutput, MessageOutput};

/// Tab stop width of the aligned table mode.
const TAB_WIDTH: usize = 8;

/// Resolve the effective output format: `--json`, then `--output`, then the
/// configured default.
#[must_use]
pub fn resolve_format(
    output: Option<OutputFormat>,
    json_flag: bool,
    default: OutputFormat,
) -> OutputFormat {
    if json_flag {
        return OutputFormat::Json;
    }
    output.unwrap_or(default)
}

/// Output context passed to all formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCtx {
    pub format: OutputFormat,
    pub fields: Option<Vec<String>>,
    pub no_header: bool,
}

impl OutputCtx {
    /// Construct from the resolved format and the `--fields`/`--no-header` flags.
    #[must_use]
    pub fn new(format: OutputFormat, fields: Option<&str>, no_header: bool) -> Self {
        let fields = fields.map(|f| {
            f.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect()
        });
        Self {
            format,
            fields,
            no_header,
        }
    }

    /// Columns of `all` selected by `--fields`, in their original order.
    /// A selection that matches no column is an argument error.
    fn columns(&self, all: &'static [&'static str]) -> Result<Vec<&'static str>, RackError> {
        let Some(fields) = &self.fields else {
            return Ok(all.to_vec());
        };
        let selected: Vec<&'static str> = all
            .iter()
            .copied()
            .filter(|col| fields.iter().any(|f| f.eq_ignore_ascii_case(col)))
            .collect();
        if selected.is_empty() {
            return Err(RackError::InvalidArgs(format!(
                "--fields '{}' matches no column; available: {}",
                fields.join(","),
                all.join(", ")
            )));
        }
        Ok(selected)
    }
}

// --- Record lists ---

/// Write a sequence of records.
///
/// # Errors
///
/// Returns `RackError::InvalidArgs` if `--fields` selects no column, or the
/// underlying I/O error if writing fails.
pub fn write_records<T: Tabular + Serialize>(
    out: &mut dyn Write,
    records: &[T],
    ctx: &OutputCtx,
) -> Result<(), RackError> {
    let written = match ctx.format {
        OutputFormat::Json => write_json(out, records),
        OutputFormat::Compact => write_compact_json(out, records),
        OutputFormat::Ndjson => write_ndjson(out, records),
        OutputFormat::Id => {
            let columns = ctx.columns(T::COLUMNS)?;
            let Some(first) = columns.first() else {
                return Ok(());
            };
            let mut buf = String::new();
            for record in records {
                buf.push_str(record.display_row().get(first));
                buf.push('\n');
            }
            out.write_all(buf.as_bytes())
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            let columns = ctx.columns(T::COLUMNS)?;
            let header = columns.iter().map(|c| (*c).to_owned()).collect();
            let rows = records.iter().map(|record| {
                let row = record.display_row();
                columns
                    .iter()
                    .map(|c| row.get(c).to_owned())
                    .collect::<Vec<_>>()
            });
            write_table(out, ctx, header, rows.collect())
        }
    };
    written.map_err(RackError::from)
}

// --- Single record ---

/// Write one record. Tables show it as `PROPERTY`/`VALUE` lines.
///
/// # Errors
///
/// Returns `RackError::InvalidArgs` if `--fields` selects no column, or the
/// underlying I/O error if writing fails.
pub fn write_record<T: Tabular + Serialize>(
    out: &mut dyn Write,
    record: &T,
    ctx: &OutputCtx,
) -> Result<(), RackError> {
    let written = match ctx.format {
        OutputFormat::Json => write_json(out, record),
        OutputFormat::Compact | OutputFormat::Ndjson => write_compact_json(out, record),
        OutputFormat::Id => {
            match ctx.columns(T::COLUMNS)?.first() {
                Some(first) => writeln!(out, "{}", record.display_row().get(first)),
                None => Ok(()),
            }
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            let row = record.display_row();
            let rows = ctx
                .columns(T::COLUMNS)?
                .into_iter()
                .map(|col| vec![col.to_owned(), row.get(col).to_owned()])
                .collect();
            let header = vec!["PROPERTY".to_owned(), "VALUE".to_owned()];
            write_table(out, ctx, header, rows)
        }
    };
    written.map_err(RackError::from)
}

// --- Messages ---

/// Write the outcome of a mutating command.
///
/// # Errors
///
/// Returns the underlying I/O error if writing fails.
pub fn write_message(out: &mut dyn Write, message: &str, ctx: &OutputCtx) -> io::Result<()> {
    let output = MessageOutput {
        ok: true,
        message: message.to_owned(),
    };
    match ctx.format {
        OutputFormat::Json => write_json(out, &output),
        OutputFormat::Compact | OutputFormat::Ndjson => write_compact_json(out, &output),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Id => {
            writeln!(out, "{}", output.message)
        }
    }
}

// --- Error output ---

/// Write a structured error to stderr.
pub fn write_error(err: &ErrorOutput, format: OutputFormat) {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    if format.is_json() {
        let s = serde_json::to_string_pretty(err).unwrap_or_default();
        let _ = writeln!(out, "{s}");
    } else {
        let _ = writeln!(out, "{}", err.error.message);
    }
}

// --- Tables ---

fn write_table(
    out: &mut dyn Write,
    ctx: &OutputCtx,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
) -> io::Result<()> {
    if ctx.format == OutputFormat::Pretty {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        if !ctx.no_header {
            table.set_header(header);
        }
        for row in rows {
            table.add_row(row);
        }
        return writeln!(out, "{table}");
    }

    let lines: Vec<Vec<String>> = if ctx.no_header {
        rows
    } else {
        std::iter::once(header).chain(rows).collect()
    };
    out.write_all(align_tabs(&lines).as_bytes())
}

/// Join cells with tabs so that every column starts on the same tab stop.
///
/// Each column is as wide as its widest cell plus at least one tab, rounded
/// up to a tab stop. The last cell of a line is not padded.
fn align_tabs(lines: &[Vec<String>]) -> String {
    let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            lines
                .iter()
                .filter_map(|line| line.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut buf = String::new();
    for line in lines {
        let last = line.len().saturating_sub(1);
        for (col, cell) in line.iter().enumerate() {
            buf.push_str(cell);
            if col < last {
                let cell_width = (widths[col] + 1).div_ceil(TAB_WIDTH) * TAB_WIDTH;
                let tabs = (cell_width - cell.chars().count()).div_ceil(TAB_WIDTH);
                buf.extend(std::iter::repeat_n('\t', tabs));
            }
        }
        buf.push('\n');
    }
    buf
}

// --- Generic JSON helpers ---

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn write_compact_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

fn write_ndjson<T: Serialize>(out: &mut dyn Write, values: &[T]) -> io::Result<()> {
    for v in values {
        write_compact_json(out, v)?;
    }
    Ok(())
}
