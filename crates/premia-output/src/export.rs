//! CSV and JSON export of premia and elimination reports.

use crate::report::{EliminationReport, RiskPremiaReport};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output was not valid UTF-8.
    #[error("Invalid UTF-8 in CSV output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting reports in various formats.
pub trait Exporter {
    /// Export to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write JSON to `path`, indented when `pretty` is set.
    fn export_json(&self, path: &Path, pretty: bool) -> Result<(), ExportError> {
        let format = if pretty {
            ExportFormat::PrettyJson
        } else {
            ExportFormat::Json
        };
        self.export_to_file(path, format)
    }

    /// Write CSV to `path`.
    fn export_csv(&self, path: &Path) -> Result<(), ExportError> {
        self.export_to_file(path, ExportFormat::Csv)
    }
}

fn csv_string<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn json_string<T: Serialize>(value: &T, pretty: bool) -> Result<String, ExportError> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

impl Exporter for RiskPremiaReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(&self.rows),
            ExportFormat::Json => json_string(self, false),
            ExportFormat::PrettyJson => json_string(self, true),
        }
    }
}

/// One line of the elimination CSV: either a removal or a survivor.
#[derive(Debug, Serialize)]
struct EliminationRecord<'a> {
    factor: &'a str,
    outcome: &'static str,
    step: Option<usize>,
    t_statistic: f64,
}

impl Exporter for EliminationReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let removed = self.removed.iter().map(|r| EliminationRecord {
                    factor: &r.factor,
                    outcome: "removed",
                    step: Some(r.step),
                    t_statistic: r.t_statistic,
                });
                let retained = self.retained.iter().map(|r| EliminationRecord {
                    factor: &r.factor,
                    outcome: "retained",
                    step: None,
                    t_statistic: r.t_statistic,
                });
                csv_string(removed.chain(retained))
            }
            ExportFormat::Json => json_string(self, false),
            ExportFormat::PrettyJson => json_string(self, true),
        }
    }
}
