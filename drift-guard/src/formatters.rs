//! Rendering drift reports.
//!
//! Formatters turn a [`DriftReport`] into JSON for log pipelines, plain text
//! for consoles, or Markdown for pull requests and dashboards.
//!
//! # Examples
//!
//! ```rust
//! use drift_guard::formatters::{HumanFormatter, ReportFormatter};
//! use drift_guard::prelude::*;
//!
//! let reference = FeatureTable::builder().column("x", [0.0, 1.0]).build().unwrap();
//! let mut monitor = DataMonitor::new();
//! monitor.fit(&reference, &FeatureKinds::infer()).unwrap();
//!
//! let runtime = FeatureTable::builder().column("x", [2.0]).build().unwrap();
//! let report = monitor.validate_report(&runtime).unwrap();
//! let text = HumanFormatter::new().format(&report).unwrap();
//! assert!(text.contains("DRIFT DETECTED"));
//! ```

use std::fmt::{self, Write};

use serde::Serialize;

use crate::error::{DriftError, Result};
use crate::finding::{Finding, FindingKind};
use crate::report::DriftReport;

/// Configuration options for formatting drift reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the unknown category values of each finding
    pub include_values: bool,
    /// Maximum number of findings to display (`None` for all)
    pub max_findings: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include timestamps in output
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_values: true,
            max_findings: None,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            include_values: false,
            max_findings: Some(0),
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Creates a configuration suitable for CI/CD environments.
    pub fn ci() -> Self {
        Self {
            include_values: true,
            max_findings: Some(50),
            use_colors: false,
            include_timestamps: true,
        }
    }

    /// Sets whether to include unknown category values.
    pub fn with_values(mut self, include: bool) -> Self {
        self.include_values = include;
        self
    }

    /// Sets the maximum number of findings to display.
    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = Some(max);
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Sets whether to include timestamps.
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }

    fn shown<'a>(&self, report: &'a DriftReport) -> &'a [Finding] {
        let limit = self
            .max_findings
            .unwrap_or(report.findings.len())
            .min(report.findings.len());
        &report.findings[..limit]
    }
}

/// Trait for formatting drift reports into different output formats.
pub trait ReportFormatter {
    /// Formats a report with the formatter's own configuration.
    fn format(&self, report: &DriftReport) -> Result<String>;

    /// Formats a report with a custom configuration.
    fn format_with_config(
        &self,
        report: &DriftReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }
}

fn render_error(err: fmt::Error) -> DriftError {
    DriftError::Serialization(format!("Failed to render report: {err}"))
}

/// Formats reports as structured JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    monitor: &'a str,
    schema_fingerprint: &'a str,
    rows_checked: usize,
    features_checked: usize,
    drift_detected: bool,
    total_findings: usize,
    findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &DriftReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &DriftReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let findings = config
            .shown(report)
            .iter()
            .cloned()
            .map(|mut finding| {
                if !config.include_values {
                    finding.distinct_unknown_values.clear();
                }
                finding
            })
            .collect();

        let json = JsonReport {
            monitor: &report.monitor,
            schema_fingerprint: &report.schema_fingerprint,
            rows_checked: report.rows_checked,
            features_checked: report.features_checked,
            drift_detected: report.has_drift(),
            total_findings: report.findings.len(),
            findings,
            timestamp: config
                .include_timestamps
                .then(|| report.timestamp.to_rfc3339()),
        };

        let output = if self.pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        };
        output.map_err(|e| DriftError::Serialization(format!("Failed to serialize report: {e}")))
    }
}

/// Formats reports for console output.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render(
        report: &DriftReport,
        config: &FormatterConfig,
    ) -> std::result::Result<String, fmt::Error> {
        let mut output = String::new();

        let headline = if report.has_drift() {
            ("DRIFT DETECTED", "\x1b[33m")
        } else {
            ("NO DRIFT", "\x1b[32m")
        };
        if config.use_colors {
            writeln!(output, "{}{}\x1b[0m", headline.1, headline.0)?;
        } else {
            writeln!(output, "{}", headline.0)?;
        }

        writeln!(output, "Monitor: {}", report.monitor)?;
        writeln!(output, "Schema: {}", short_fingerprint(&report.schema_fingerprint))?;
        if config.include_timestamps {
            writeln!(output, "Timestamp: {}", report.timestamp.to_rfc3339())?;
        }
        writeln!(
            output,
            "Checked {} row(s) across {} feature(s): {} finding(s)",
            report.rows_checked,
            report.features_checked,
            report.findings.len()
        )?;

        let shown = config.shown(report);
        if !shown.is_empty() {
            writeln!(output)?;
        }
        for finding in shown {
            write!(
                output,
                "  - [{}] {}: {} row(s)",
                finding.kind, finding.feature, finding.count
            )?;
            if config.include_values && finding.kind == FindingKind::UnknownCategory {
                write!(output, " [{}]", finding.distinct_unknown_values.join(", "))?;
            }
            writeln!(output)?;
        }
        let hidden = report.findings.len() - shown.len();
        if hidden > 0 {
            writeln!(output, "  ... and {hidden} more finding(s)")?;
        }

        Ok(output)
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &DriftReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &DriftReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        Self::render(report, config).map_err(render_error)
    }
}

/// Formats reports as a Markdown table.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config: config.with_colors(false),
            heading_level: 2,
        }
    }

    /// Sets the heading level (1-6) of the report title.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    fn render(
        &self,
        report: &DriftReport,
        config: &FormatterConfig,
    ) -> std::result::Result<String, fmt::Error> {
        let mut output = String::new();
        let hashes = "#".repeat(self.heading_level as usize);

        writeln!(output, "{hashes} Drift report: {}", report.monitor)?;
        writeln!(output)?;
        writeln!(
            output,
            "**Status:** {}  ",
            if report.has_drift() {
                "drift detected"
            } else {
                "no drift"
            }
        )?;
        writeln!(
            output,
            "**Schema:** `{}`  ",
            short_fingerprint(&report.schema_fingerprint)
        )?;
        writeln!(
            output,
            "**Rows checked:** {} | **Features checked:** {}",
            report.rows_checked, report.features_checked
        )?;
        if config.include_timestamps {
            writeln!(output, "**Timestamp:** {}", report.timestamp.to_rfc3339())?;
        }

        let shown = config.shown(report);
        if shown.is_empty() {
            return Ok(output);
        }

        writeln!(output)?;
        if config.include_values {
            writeln!(output, "| Kind | Feature | Count | Unknown values |")?;
            writeln!(output, "|------|---------|-------|----------------|")?;
        } else {
            writeln!(output, "| Kind | Feature | Count |")?;
            writeln!(output, "|------|---------|-------|")?;
        }
        for finding in shown {
            let feature = escape_markdown(&finding.feature);
            if config.include_values {
                let values = finding
                    .distinct_unknown_values
                    .iter()
                    .map(|v| format!("`{}`", escape_markdown(v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(
                    output,
                    "| {} | {} | {} | {} |",
                    finding.kind, feature, finding.count, values
                )?;
            } else {
                writeln!(
                    output,
                    "| {} | {} | {} |",
                    finding.kind, feature, finding.count
                )?;
            }
        }
        let hidden = report.findings.len() - shown.len();
        if hidden > 0 {
            writeln!(output)?;
            writeln!(output, "_{hidden} more finding(s) not shown._")?;
        }

        Ok(output)
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &DriftReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &DriftReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        self.render(report, config).map_err(render_error)
    }
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(findings: Vec<Finding>) -> DriftReport {
        DriftReport {
            monitor: "churn".to_string(),
            schema_fingerprint: "0123456789abcdef0123".to_string(),
            rows_checked: 4,
            features_checked: 2,
            findings,
            timestamp: Utc::now(),
        }
    }

    fn drifted() -> DriftReport {
        report(vec![
            Finding::above_max("age", 2),
            Finding::unknown_category("plan", 1, vec!["gold|plus".to_string()]),
        ])
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter::new().with_pretty(false).format(&drifted()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["monitor"], "churn");
        assert_eq!(json["drift_detected"], true);
        assert_eq!(json["total_findings"], 2);
        assert_eq!(json["findings"][0]["kind"], "above_max");
        assert_eq!(
            json["findings"][1]["distinct_unknown_values"][0],
            "gold|plus"
        );
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_json_formatter_minimal() {
        let output = JsonFormatter::with_config(FormatterConfig::minimal())
            .format(&drifted())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["total_findings"], 2);
        assert_eq!(json["findings"].as_array().unwrap().len(), 0);
        assert!(json.get("timestamp").is_none());
    }

    #[test]
    fn test_human_formatter() {
        let formatter = HumanFormatter::with_config(FormatterConfig::default().with_colors(false));
        let output = formatter.format(&drifted()).unwrap();

        assert!(output.starts_with("DRIFT DETECTED\n"));
        assert!(output.contains("Schema: 0123456789ab\n"));
        assert!(output.contains("  - [above_max] age: 2 row(s)\n"));
        assert!(output.contains("  - [unknown_category] plan: 1 row(s) [gold|plus]\n"));
    }

    #[test]
    fn test_human_formatter_truncates() {
        let config = FormatterConfig::default()
            .with_colors(false)
            .with_max_findings(1);
        let output = HumanFormatter::with_config(config).format(&drifted()).unwrap();
        assert!(output.contains("... and 1 more finding(s)"));
        assert!(!output.contains("plan"));
    }

    #[test]
    fn test_human_formatter_no_drift() {
        let formatter = HumanFormatter::with_config(FormatterConfig::minimal());
        let output = formatter.format(&report(Vec::new())).unwrap();
        assert!(output.starts_with("NO DRIFT\n"));
        assert!(!output.contains("Timestamp"));
    }

    #[test]
    fn test_markdown_formatter() {
        let output = MarkdownFormatter::new()
            .with_heading_level(3)
            .format(&drifted())
            .unwrap();

        assert!(output.starts_with("### Drift report: churn\n"));
        assert!(output.contains("| above_max | age | 2 |  |\n"));
        assert!(output.contains("| unknown_category | plan | 1 | `gold\\|plus` |\n"));
    }
}
