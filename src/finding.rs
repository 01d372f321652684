//! Findings and the severity-by-mode policy.
//!
//! A finding's code is fixed per rule; its severity depends only on the rule
//! and the validation mode. The mode branch recurs across every rule module,
//! so it is factored into one [`SeverityPolicy`] table instead of duplicated
//! match arms.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Severity of a single finding. Only `Error` affects pass/fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Comment,
    Warning,
    Error,
}

/// Validation strictness profile controlling severity escalation and
/// suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Normal,
    ForgiveChecklist,
    Submission,
}

/// Per-rule severity table mapping each mode to a severity, `None` meaning
/// the finding is suppressed in that mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityPolicy {
    pub normal: Option<Severity>,
    pub forgive_checklist: Option<Severity>,
    pub submission: Option<Severity>,
}

impl SeverityPolicy {
    /// Default escalation for mode-sensitive rules: Error under Normal,
    /// Warning under ForgiveChecklist, suppressed under Submission.
    pub const STANDARD: SeverityPolicy = SeverityPolicy {
        normal: Some(Severity::Error),
        forgive_checklist: Some(Severity::Warning),
        submission: None,
    };

    /// Mode-invariant severity, emitted identically in every mode.
    pub const fn invariant(severity: Severity) -> SeverityPolicy {
        SeverityPolicy {
            normal: Some(severity),
            forgive_checklist: Some(severity),
            submission: Some(severity),
        }
    }

    /// Fixed severity in the two interactive modes, suppressed at submission
    /// time.
    pub const fn non_submission(severity: Severity) -> SeverityPolicy {
        SeverityPolicy {
            normal: Some(severity),
            forgive_checklist: Some(severity),
            submission: None,
        }
    }

    /// Resolve the severity for a mode; `None` means suppressed.
    pub fn resolve(&self, mode: Mode) -> Option<Severity> {
        match mode {
            Mode::Normal => self.normal,
            Mode::ForgiveChecklist => self.forgive_checklist,
            Mode::Submission => self.submission,
        }
    }
}

/// A position within the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRef {
    pub line: usize,
    pub col: usize,
}

/// One nit. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    /// Stable identifier, fixed per rule.
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<LineRef>>,
}

impl Finding {
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            ref_url: None,
            lines: None,
        }
    }

    pub fn with_ref_url(mut self, url: impl Into<String>) -> Self {
        self.ref_url = Some(url.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.lines = Some(vec![LineRef { line, col: 0 }]);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Emit a finding under the given policy and mode, or nothing when the policy
/// suppresses it.
pub fn emit(
    findings: &mut Vec<Finding>,
    policy: SeverityPolicy,
    mode: Mode,
    code: &'static str,
    message: impl Into<String>,
) {
    if let Some(severity) = policy.resolve(mode) {
        findings.push(Finding::new(severity, code, message));
    }
}
