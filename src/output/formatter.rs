//! Output formatters for test results
//!
//! Renders the registry report file (text, JSON or CSV) and the console
//! summary printed after a run.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::executor::TestRegistry;
use crate::models::{CollectionSummary, TestState, UnitSummary};

/// Report file format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
    Csv,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render the full report for every collection of the registry
    ///
    /// Pending collections are run first.
    pub async fn render(&self, registry: &mut TestRegistry) -> Result<String> {
        match self.format {
            OutputFormat::Text => registry
                .generate_report()
                .await
                .context("Failed to generate report"),
            OutputFormat::Json => {
                let summaries = registry.summaries().await?;
                serde_json::to_string(&summaries).context("Failed to serialize report")
            }
            OutputFormat::JsonPretty => {
                let summaries = registry.summaries().await?;
                serde_json::to_string_pretty(&summaries).context("Failed to serialize report")
            }
            OutputFormat::Csv => {
                let summaries = registry.summaries().await?;
                format_csv(&summaries)
            }
        }
    }

    /// One console line per unit plus a stats line
    pub fn format_summary(&self, summary: &CollectionSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{:━^60}\n", format!(" {} ", summary.collection)));
        for unit in &summary.units {
            output.push_str(&format!("  {}\n", self.format_unit(unit)));
        }
        output.push_str(&format!("{:━<60}\n", ""));

        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };
        output.push_str(&format!(
            "  Total: {} | Pass: {} | Fail: {} | Pass Rate: {:.1}% | Duration: {}ms\n",
            summary.total,
            summary.passed,
            fail_str,
            summary.pass_rate(),
            summary.total_duration_ms
        ));

        output
    }

    fn format_unit(&self, unit: &UnitSummary) -> String {
        let status_str = if self.colorize {
            match unit.state {
                TestState::Passed => "\x1b[32m✓ PASS\x1b[0m",
                TestState::Failed => "\x1b[31m✗ FAIL\x1b[0m",
                TestState::FailedWithException => "\x1b[31m! ERROR\x1b[0m",
                TestState::NotRun | TestState::InProgress => "\x1b[33m○ PENDING\x1b[0m",
            }
        } else {
            match unit.state {
                TestState::Passed => "✓ PASS",
                TestState::Failed => "✗ FAIL",
                TestState::FailedWithException => "! ERROR",
                TestState::NotRun | TestState::InProgress => "○ PENDING",
            }
        };

        format!("{:30} {} [{:>6}ms]", unit.name, status_str, unit.duration_ms)
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    collection: &'a str,
    test: &'a str,
    state: TestState,
    duration_ms: u64,
    failures: usize,
    first_failure: String,
}

fn format_csv(summaries: &[CollectionSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for summary in summaries {
        for unit in &summary.units {
            let first_failure = unit
                .failures
                .first()
                .map(|f| {
                    let location = f.location.as_ref().map(|l| l.to_string());
                    [location, f.detail.clone(), f.error.clone()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .unwrap_or_default();

            writer.serialize(CsvRow {
                collection: &summary.collection,
                test: &unit.name,
                state: unit.state,
                duration_ms: unit.duration_ms,
                failures: unit.failures.len(),
                first_failure,
            })?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush CSV report")?;
    String::from_utf8(bytes).context("CSV report is not valid UTF-8")
}

/// Write a rendered report to a file
pub fn write_report(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .context("Failed to write report")?;

    Ok(())
}
