//! Output formatters for CLI commands.
//!
//! Every command builds a serializable result and hands it to
//! [`format_output`], so all three formats carry the same information.

use anyhow::Result;
use colored::Colorize;
use netbridge_core::cli::OutputFormat;
use serde::Serialize;
use serde_json::Value;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Examples
///
/// ```
/// use netbridge_cli::formatters::format_output;
/// use netbridge_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     exports: usize,
/// }
///
/// let output = format_output(&Summary { exports: 2 }, OutputFormat::Text)?;
/// assert_eq!(output, "exports: 2");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Plain text output formatting.
///
/// One `path: value` line per scalar, with dotted keys and array indices,
/// so output can be filtered with `grep` and `cut`.
pub mod text {
    use super::{Result, Serialize, Value};

    /// Format data as flattened `key: value` lines.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut lines = Vec::new();
        flatten(&value, "", &mut lines);
        Ok(lines.join("\n"))
    }

    fn flatten(value: &Value, prefix: &str, lines: &mut Vec<String>) {
        let key = |name: &str| {
            if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            }
        };

        match value {
            Value::Object(map) if !map.is_empty() => {
                for (name, child) in map {
                    flatten(child, &key(name), lines);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (i, child) in items.iter().enumerate() {
                    flatten(child, &key(&i.to_string()), lines);
                }
            }
            Value::String(s) => lines.push(format!("{prefix}: {s}")),
            other => lines.push(format!("{prefix}: {other}")),
        }
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize, Value};
    use std::fmt::Write as _;

    /// Format data as a colorized, indented outline.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        write_value(&mut out, &value, 0);
        Ok(out.trim_end().to_string())
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::Null => "-".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => s.green().to_string(),
            Value::Array(a) if a.is_empty() => "[]".dimmed().to_string(),
            Value::Object(_) | Value::Array(_) => "{}".dimmed().to_string(),
        }
    }

    fn is_nested(value: &Value) -> bool {
        match value {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        }
    }

    fn write_value(out: &mut String, value: &Value, indent: usize) {
        let pad = "  ".repeat(indent);
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    if is_nested(child) {
                        let _ = writeln!(out, "{pad}{}:", key.blue().bold());
                        write_value(out, child, indent + 1);
                    } else {
                        let _ = writeln!(out, "{pad}{}: {}", key.blue().bold(), scalar(child));
                    }
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for child in items {
                    if is_nested(child) {
                        let _ = writeln!(out, "{pad}-");
                        write_value(out, child, indent + 1);
                    } else {
                        let _ = writeln!(out, "{pad}- {}", scalar(child));
                    }
                }
            }
            other => {
                let _ = writeln!(out, "{pad}{}", scalar(other));
            }
        }
    }
}
