//! Lifecycle checks for referenced Internet-Drafts. A draft that cannot be
//! found in the tracker, or one that has already been published as an RFC,
//! should not be cited as a draft. Submission runs skip this check entirely,
//! since the tracker state can lag behind a fresh submission.

use crate::document::Document;
use crate::finding::{Finding, Severity, SeverityPolicy, emit};
use crate::remote::MetadataSource;
use crate::rules::{RunOptions, strip_version_suffix, xml_references_sections};
use crate::finding::Mode;

pub async fn check(
    document: &Document,
    options: &RunOptions,
    remote: &dyn MetadataSource,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    if options.mode == Mode::Submission {
        return findings;
    }

    for name in referenced_draft_names(document) {
        match remote.draft_info(&name).await {
            None => emit(
                &mut findings,
                SeverityPolicy::non_submission(Severity::Warning),
                options.mode,
                "UNDEFINED_STATE",
                format!("State of referenced draft {name} could not be determined"),
            ),
            Some(info) => {
                if info.state.as_deref() == Some("RFC") {
                    emit(
                        &mut findings,
                        SeverityPolicy::non_submission(Severity::Warning),
                        options.mode,
                        "INVALID_STATE_FOR_DRAFT",
                        format!("Referenced draft {name} has been published as an RFC"),
                    );
                }
            }
        }
    }

    findings
}

/// Draft names cited from the reference section, version suffix stripped,
/// in first-seen order without duplicates.
fn referenced_draft_names(document: &Document) -> Vec<String> {
    let mut names = Vec::new();
    let mut push = |raw: &str| {
        let name = strip_version_suffix(&raw.to_lowercase()).to_string();
        if name.starts_with("draft-") && !names.contains(&name) {
            names.push(name);
        }
    };

    match document {
        Document::Txt(doc) => {
            for token in &doc.elements.reference_section_draft_references {
                push(&token.value);
            }
        }
        Document::Xml(doc) => {
            for section in xml_references_sections(&doc.root) {
                for reference in section.descendants("reference") {
                    for series in reference.descendants("seriesInfo") {
                        if series.attr("name") == Some("Internet-Draft")
                            && let Some(value) = series.attr("value")
                        {
                            push(value);
                        }
                    }
                    if let Some(anchor) = reference.attr("anchor") {
                        push(anchor);
                    }
                }
            }
        }
    }

    names
}
