//! Plain-text formatting checks: line length, spacing, stray comment
//! tokens, and RFC 2119 keyword hygiene. XML documents carry none of these
//! concerns and pass through untouched.

use crate::document::Document;
use crate::finding::{Finding, Severity, SeverityPolicy, emit};
use crate::remote::MetadataSource;
use crate::rules::RunOptions;
use crate::txt::MAX_LINE_LENGTH;

/// Overlong lines block a normal run but are tolerable warnings otherwise,
/// including at submission time where the tooling reflows anyway.
const LINE_TOO_LONG_POLICY: SeverityPolicy = SeverityPolicy {
    normal: Some(Severity::Error),
    forgive_checklist: Some(Severity::Warning),
    submission: Some(Severity::Warning),
};

pub async fn check(
    document: &Document,
    options: &RunOptions,
    _remote: &dyn MetadataSource,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let doc = match document {
        Document::Txt(doc) => doc,
        Document::Xml(_) => return findings,
    };

    for long in &doc.possible_issues.long_lines {
        let severity = LINE_TOO_LONG_POLICY.resolve(options.mode);
        if let Some(severity) = severity {
            findings.push(
                Finding::new(
                    severity,
                    "LINE_TOO_LONG",
                    format!(
                        "Line is {} characters long, exceeding the limit of {}",
                        long.length, MAX_LINE_LENGTH
                    ),
                )
                .with_line(long.line),
            );
        }
    }

    for &line in &doc.possible_issues.lines_with_spaces {
        if let Some(severity) =
            SeverityPolicy::non_submission(Severity::Comment).resolve(options.mode)
        {
            findings.push(
                Finding::new(
                    severity,
                    "UNUSUAL_SPACING",
                    "Unusual spacing within a line, possibly a formatting artifact".to_string(),
                )
                .with_line(line),
            );
        }
    }

    for &line in &doc.possible_issues.inline_code {
        if let Some(severity) =
            SeverityPolicy::non_submission(Severity::Comment).resolve(options.mode)
        {
            findings.push(
                Finding::new(
                    severity,
                    "COMMENT_OUTSIDE_CODE_BLOCK",
                    "Comment token found outside a marked code block".to_string(),
                )
                .with_line(line),
            );
        }
    }

    for occurrence in &doc.possible_issues.misspelled_keywords {
        if let Some(severity) =
            SeverityPolicy::non_submission(Severity::Warning).resolve(options.mode)
        {
            findings.push(
                Finding::new(
                    severity,
                    "MISSPELLED_KEYWORD",
                    format!("Invalid RFC 2119 keyword combination \"{}\"", occurrence.keyword),
                )
                .with_line(occurrence.line),
            );
        }
    }

    let boilerplate = doc.boilerplate;
    if !doc.elements.keywords_2119.is_empty() && !boilerplate.rfc2119 && !boilerplate.rfc8174 {
        emit(
            &mut findings,
            SeverityPolicy::non_submission(Severity::Warning),
            options.mode,
            "MISSING_2119_BOILERPLATE",
            "RFC 2119 keywords are used but the requirements language \
             boilerplate is missing"
                .to_string(),
        );
    }
    if boilerplate.similar_boilerplate {
        emit(
            &mut findings,
            SeverityPolicy::non_submission(Severity::Comment),
            options.mode,
            "SIMILAR_BOILERPLATE",
            "Text resembling the requirements language boilerplate found, \
             but it does not match any known form"
                .to_string(),
        );
    }

    findings
}
