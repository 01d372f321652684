//! Reference-section title checks. XML only; the TXT parser's alias table
//! already constrains which headings it recognizes, so the TXT branch does
//! nothing.

use crate::document::Document;
use crate::finding::{Finding, SeverityPolicy, emit};
use crate::remote::MetadataSource;
use crate::rules::{RunOptions, references_section_title, xml_references_sections};

const VALID_TITLES: &[&str] = &["References", "Normative References", "Informative References"];

pub async fn check(
    document: &Document,
    options: &RunOptions,
    _remote: &dyn MetadataSource,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let Document::Xml(doc) = document else {
        return findings;
    };

    for section in xml_references_sections(&doc.root) {
        // A wrapping list section whose children are themselves
        // <references> is evaluated through those children.
        let is_list = section
            .child_elements()
            .any(|child| child.name == "references");
        if is_list {
            continue;
        }

        match references_section_title(section) {
            Some(title) if !title.is_empty() => {
                if !VALID_TITLES.contains(&title.as_str()) {
                    emit(
                        &mut findings,
                        SeverityPolicy::STANDARD,
                        options.mode,
                        "INVALID_REFERENCES_TITLE",
                        format!(
                            "References section title \"{title}\" must be exactly one of: {}",
                            VALID_TITLES.join(", ")
                        ),
                    );
                }
            }
            _ => emit(
                &mut findings,
                SeverityPolicy::STANDARD,
                options.mode,
                "MISSING_REFERENCES_TITLE",
                "References section has no title",
            ),
        }
    }

    findings
}
