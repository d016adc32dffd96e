use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Result of one command: machine-readable data plus a short human summary.
#[derive(Debug, Serialize)]
pub struct Report {
    pub command: &'static str,
    pub data: Value,
    #[serde(skip)]
    pub summary: Vec<String>,
}

impl Report {
    pub fn new(command: &'static str, data: Value) -> Self {
        Self {
            command,
            data,
            summary: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.summary.push(line.into());
        self
    }
}

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    println!("{}", format_report(report, format, pretty)?);
    Ok(())
}

fn format_report(report: &Report, format: OutputFormat, pretty: bool) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(report)?,
        OutputFormat::Json => serde_json::to_string(report)?,
        OutputFormat::Text if report.summary.is_empty() => serde_json::to_string_pretty(&report.data)?,
        OutputFormat::Text => report.summary.join("\n"),
    };
    Ok(rendered)
}
