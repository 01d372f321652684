//! Validation Rule Modules
//!
//! Independent async checkers with a uniform contract:
//! `check(document, options, remote) -> Vec<Finding>`. Each branches on the
//! document discriminant; TXT branches are a strict subset of XML branches,
//! and some TXT branches do nothing at all. None of them mutate the document
//! or raise for document-content problems.

pub mod downref;
pub mod drafts;
pub mod format;
pub mod metadata;
pub mod references;
pub mod sections;
pub mod status;

use chrono::{NaiveDate, Utc};

use crate::document::XmlElement;
use crate::finding::Mode;

/// Options shared by every rule module for one validation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub mode: Mode,
    /// Expected document year for date checks, when the caller knows it.
    pub expected_year: Option<i32>,
    /// Reference date for the date-sanity window; injectable for tests.
    pub today: NaiveDate,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            expected_year: None,
            today: Utc::now().date_naive(),
        }
    }
}

impl RunOptions {
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Normalize a reference label for registry and status lookups: strip
/// surrounding brackets and a trailing `-NN` version suffix, lowercase.
/// RFC-shaped labels come back as `rfc{n}` with leading zeros stripped, so
/// `[RFC0952]` and `RFC 952` produce the same registry key.
pub(crate) fn normalize_reference_label(raw: &str) -> String {
    let label = raw.trim().trim_start_matches('[').trim_end_matches(']');
    if let Some(number) = rfc_number_from_label(label) {
        return format!("rfc{number}");
    }
    let label = label.to_lowercase();
    strip_version_suffix(&label).to_string()
}

/// Strip a trailing `-NN` draft version suffix.
pub(crate) fn strip_version_suffix(label: &str) -> &str {
    if let Some(pos) = label.rfind('-') {
        let suffix = &label[pos + 1..];
        if suffix.len() == 2 && suffix.chars().all(|c| c.is_ascii_digit()) {
            return &label[..pos];
        }
    }
    label
}

/// RFC number from a label like `RFC2119` or `rfc 2119`, with leading zeros
/// stripped.
pub(crate) fn rfc_number_from_label(label: &str) -> Option<String> {
    let rest = label
        .strip_prefix("RFC")
        .or_else(|| label.strip_prefix("rfc"))?;
    let digits = rest.trim_start_matches([' ', '-']);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}

/// All `<references>` sections of an XML document, whether or not they are
/// nested in a wrapping list section under `<back>`.
pub(crate) fn xml_references_sections(root: &XmlElement) -> Vec<&XmlElement> {
    match root.child("back") {
        Some(back) => {
            let mut sections = Vec::new();
            collect_references(back, &mut sections);
            sections
        }
        None => Vec::new(),
    }
}

fn collect_references<'a>(element: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in element.child_elements() {
        if child.name == "references" {
            // A wrapping <references> that only holds further <references>
            // children is a list container; recurse into it either way.
            out.push(child);
        }
        collect_references(child, out);
    }
}

/// Title of a references section from its `<name>` child.
pub(crate) fn references_section_title(section: &XmlElement) -> Option<String> {
    section.child("name").map(|name| name.text().trim().to_string())
}
