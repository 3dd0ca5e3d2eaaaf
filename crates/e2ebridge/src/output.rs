//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Typed listings use
//! `tabled` derives; untyped Bridge payloads go through [`render_value`],
//! which builds a table from whatever object or array shape comes back.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Report a completed action on stderr, unless `--quiet`.
pub fn success(global: &GlobalOpts, message: &str) {
    if global.quiet {
        return;
    }
    if should_color(&global.color()) {
        eprintln!("{} {message}", "✓".green());
    } else {
        eprintln!("✓ {message}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render an arbitrary JSON payload.
///
/// Tables: an array of objects becomes one row per element, an object
/// wrapping a single array (`{"service": [...]}`) is unwrapped first, any
/// other object becomes a key/value table. Plain mode prints each element's
/// name or id, one per line.
pub fn render_value(format: &OutputFormat, data: &Value) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(value_table(unwrap_listing(data))),
        OutputFormat::Plain => Ok(plain_value(unwrap_listing(data))),
        structured => render_structured(structured, data),
    }
}

/// Print raw text (notes, plain bodies) unless quiet.
pub fn print_text(text: &str, quiet: bool) {
    print_output(text.trim_end(), quiet);
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_structured<T: serde::Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    match format {
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        _ => Ok(serde_json::to_string_pretty(data)?),
    }
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn unwrap_listing(data: &Value) -> &Value {
    match data {
        Value::Object(map) if map.len() == 1 => match map.values().next() {
            Some(inner @ Value::Array(_)) => inner,
            _ => data,
        },
        _ => data,
    }
}

fn value_table(data: &Value) -> String {
    match data {
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            let mut columns: Vec<&str> = Vec::new();
            for item in items.iter().filter_map(Value::as_object) {
                for key in item.keys() {
                    if !columns.contains(&key.as_str()) {
                        columns.push(key);
                    }
                }
            }
            let mut builder = Builder::default();
            builder.push_record(columns.iter().map(|c| (*c).to_owned()));
            for item in items {
                builder.push_record(columns.iter().map(|c| cell(item.get(*c))));
            }
            builder.build().with(Style::rounded()).to_string()
        }
        Value::Array(items) => items
            .iter()
            .map(|v| cell(Some(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Key".to_owned(), "Value".to_owned()]);
            for (key, value) in map {
                builder.push_record([key.clone(), cell(Some(value))]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        other => cell(Some(other)),
    }
}

fn plain_value(data: &Value) -> String {
    match data {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => map
                    .get("name")
                    .or_else(|| map.get("id"))
                    .map_or_else(|| item.to_string(), |v| cell(Some(v))),
                other => cell(Some(other)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => cell(Some(other)),
    }
}

/// A table cell: strings unquoted, missing and null blank, nested values as
/// compact JSON.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
