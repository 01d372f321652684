//! Output formatting for validation reports.

use atty;

use crate::cli::OutputFormat;
use crate::engine::Report;
use crate::finding::{Finding, Severity};

/// Formatter for validation reports, colorized when stdout is a terminal.
pub struct Output {
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    #[cfg(test)]
    fn plain(format: OutputFormat) -> Self {
        Self {
            format,
            show_colors: false,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_report(&self, report: &Report) -> String {
        match self.format {
            OutputFormat::Pretty => self.format_pretty(report),
            OutputFormat::Json => format_json(report),
            OutputFormat::Count => format!("{}\n", report.nits.len()),
        }
    }

    fn format_pretty(&self, report: &Report) -> String {
        let mut output = String::new();

        let verdict = if report.passed() {
            self.colorize("✓ PASS", "32")
        } else {
            self.colorize("✗ FAIL", "31")
        };
        output.push_str(&format!(
            "{}  {} ({} bytes) - {} nit{}\n",
            verdict,
            report.file.path,
            report.file.size,
            report.nits.len(),
            if report.nits.len() == 1 { "" } else { "s" }
        ));

        for nit in &report.nits {
            output.push_str(&self.format_nit(nit));
            output.push('\n');
        }

        output
    }

    fn format_nit(&self, nit: &Finding) -> String {
        let tag = match nit.severity {
            Severity::Error => self.colorize("✗ ERROR  ", "31"),
            Severity::Warning => self.colorize("⚠ WARNING", "33"),
            Severity::Comment => self.colorize("- COMMENT", "36"),
        };
        let mut line = format!("  {}  {}: {}", tag, nit.code, nit.message);
        if let Some(refs) = &nit.lines
            && let Some(first) = refs.first()
        {
            line.push_str(&format!(" (line {})", first.line));
        }
        if let Some(url) = &nit.ref_url {
            line.push_str(&format!(" [{}]", url));
        }
        line
    }
}

fn format_json(report: &Report) -> String {
    let nits: Vec<serde_json::Value> = report
        .nits
        .iter()
        .map(|nit| {
            let mut object = serde_json::json!({
                "code": nit.code,
                "desc": nit.message,
            });
            if let Some(url) = &nit.ref_url {
                object["ref"] = serde_json::Value::from(url.as_str());
            }
            if let Some(refs) = &nit.lines
                && let Some(first) = refs.first()
            {
                object["line"] = serde_json::Value::from(first.line);
            }
            object
        })
        .collect();

    let value = serde_json::json!({
        "result": if report.passed() { "pass" } else { "fail" },
        "file": {
            "path": report.file.path,
            "size": report.file.size,
        },
        "nits": nits,
    });
    format!("{}\n", serde_json::to_string_pretty(&value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FileInfo;

    fn sample_report() -> Report {
        Report {
            file: FileInfo {
                path: "draft.txt".to_string(),
                size: 1234,
            },
            nits: vec![
                Finding::new(
                    Severity::Error,
                    "MISSING_SECURITY_SECTION",
                    "No Security Considerations section found".to_string(),
                ),
                Finding::new(
                    Severity::Warning,
                    "LINE_TOO_LONG",
                    "Line is 80 characters long, exceeding the limit of 72".to_string(),
                )
                .with_line(17),
            ],
        }
    }

    #[test]
    fn test_pretty_output_without_colors() {
        let formatted = Output::plain(OutputFormat::Pretty).format_report(&sample_report());
        assert!(formatted.starts_with("✗ FAIL  draft.txt (1234 bytes) - 2 nits"));
        assert!(formatted.contains("✗ ERROR    MISSING_SECURITY_SECTION:"));
        assert!(formatted.contains("(line 17)"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_json_shape() {
        let formatted = Output::plain(OutputFormat::Json).format_report(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();
        assert_eq!(value["result"], "fail");
        assert_eq!(value["file"]["path"], "draft.txt");
        assert_eq!(value["file"]["size"], 1234);
        assert_eq!(value["nits"].as_array().unwrap().len(), 2);
        assert_eq!(value["nits"][0]["code"], "MISSING_SECURITY_SECTION");
        assert!(value["nits"][0].get("line").is_none());
        assert_eq!(value["nits"][1]["line"], 17);
    }

    #[test]
    fn test_count_output() {
        let formatted = Output::plain(OutputFormat::Count).format_report(&sample_report());
        assert_eq!(formatted, "2\n");
    }

    #[test]
    fn test_passing_report() {
        let report = Report {
            file: FileInfo {
                path: "rfc.xml".to_string(),
                size: 10,
            },
            nits: Vec::new(),
        };
        let formatted = Output::plain(OutputFormat::Pretty).format_report(&report);
        assert!(formatted.starts_with("✓ PASS"));
        let json = Output::plain(OutputFormat::Json).format_report(&report);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"], "pass");
    }
}
