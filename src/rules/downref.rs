//! Downref checks: normative references that appear in the downref registry.
//!
//! Reference labels are collected from the reference section (TXT: extracted
//! elements; XML: anchor attributes of `<reference>` under normative
//! sections), normalized by stripping brackets and `-NN` version suffixes,
//! then checked against the registry in one lookup.

use crate::document::{Document, RefSubsection};
use crate::finding::{Finding, SeverityPolicy, emit};
use crate::remote::MetadataSource;
use crate::rules::{
    RunOptions, normalize_reference_label, references_section_title, xml_references_sections,
};

pub async fn check(
    document: &Document,
    options: &RunOptions,
    remote: &dyn MetadataSource,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let labels = match document {
        Document::Txt(doc) => {
            let mut labels: Vec<String> = doc
                .elements
                .reference_section_rfc
                .iter()
                .filter(|r| r.subsection == RefSubsection::Normative)
                .map(|r| normalize_reference_label(&format!("RFC{}", r.value)))
                .collect();
            labels.extend(
                doc.elements
                    .reference_section_draft_references
                    .iter()
                    .filter(|r| r.subsection == RefSubsection::Normative)
                    .map(|r| normalize_reference_label(&r.value)),
            );
            labels
        }
        Document::Xml(doc) => xml_references_sections(&doc.root)
            .into_iter()
            .filter(|section| {
                references_section_title(section)
                    .is_some_and(|title| title.to_lowercase().contains("normative"))
            })
            .flat_map(|section| {
                section
                    .descendants("reference")
                    .into_iter()
                    .filter_map(|r| r.attr("anchor"))
                    .map(normalize_reference_label)
                    .collect::<Vec<_>>()
            })
            .collect(),
    };

    if labels.is_empty() {
        return findings;
    }

    for listed in remote.downrefs(&labels).await {
        let code = if listed.starts_with("draft-") {
            "DOWNREF_DRAFT"
        } else {
            "DOWNREF"
        };
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            options.mode,
            code,
            format!("Normative reference to {listed} is listed in the downref registry"),
        );
    }

    findings
}
