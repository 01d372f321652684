//! Per-reference status checks: every RFC cited from the reference section
//! (normative, informative, or unclassified) is looked up remotely; unknown
//! or unranked statuses are comments, an obsoleted reference is a real nit.

use crate::document::Document;
use crate::finding::{Finding, Severity, SeverityPolicy, emit};
use crate::remote::MetadataSource;
use crate::rules::{RunOptions, rfc_number_from_label, xml_references_sections};

/// The fixed status hierarchy, highest maturity first. Anything outside it is
/// reported as unknown.
const STATUS_HIERARCHY: &[&str] = &[
    "internet standard",
    "draft standard",
    "proposed standard",
    "best current practice",
    "informational",
    "experimental",
    "historic",
];

pub async fn check(
    document: &Document,
    options: &RunOptions,
    remote: &dyn MetadataSource,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let numbers: Vec<String> = match document {
        Document::Txt(doc) => {
            let mut numbers = Vec::new();
            for r in &doc.elements.reference_section_rfc {
                let trimmed = r.value.trim_start_matches('0');
                let number = if trimmed.is_empty() { "0" } else { trimmed }.to_string();
                if !numbers.contains(&number) {
                    numbers.push(number);
                }
            }
            numbers
        }
        Document::Xml(doc) => {
            let mut numbers = Vec::new();
            for section in xml_references_sections(&doc.root) {
                for reference in section.descendants("reference") {
                    if let Some(number) = rfc_number_of(reference)
                        && !numbers.contains(&number)
                    {
                        numbers.push(number);
                    }
                }
            }
            numbers
        }
    };

    for number in numbers {
        match remote.rfc_info(&number).await {
            None => emit(
                &mut findings,
                SeverityPolicy::invariant(Severity::Comment),
                options.mode,
                "UNDEFINED_STATUS",
                format!("Status of referenced RFC {number} could not be determined"),
            ),
            Some(info) => match info.status.as_deref() {
                None => emit(
                    &mut findings,
                    SeverityPolicy::invariant(Severity::Comment),
                    options.mode,
                    "UNDEFINED_STATUS",
                    format!("Status of referenced RFC {number} could not be determined"),
                ),
                Some(status) => {
                    if !STATUS_HIERARCHY.contains(&status.to_lowercase().as_str()) {
                        emit(
                            &mut findings,
                            SeverityPolicy::invariant(Severity::Comment),
                            options.mode,
                            "UNKNOWN_STATUS",
                            format!("Referenced RFC {number} has unrecognized status \"{status}\""),
                        );
                    }
                    if !info.obsoleted_by.is_empty() {
                        emit(
                            &mut findings,
                            SeverityPolicy::STANDARD,
                            options.mode,
                            "OBSOLETE_DOCUMENT",
                            format!(
                                "Referenced RFC {number} is obsolete, replaced by: {}",
                                info.obsoleted_by.join(", ")
                            ),
                        );
                    }
                }
            },
        }
    }

    findings
}

/// RFC number of a `<reference>`: `<seriesInfo name="RFC" value="..."/>`
/// preferred, anchor of the form `RFCnnnn` as fallback.
fn rfc_number_of(reference: &crate::document::XmlElement) -> Option<String> {
    for series in reference.descendants("seriesInfo") {
        if series.attr("name") == Some("RFC")
            && let Some(value) = series.attr("value")
        {
            let trimmed = value.trim_start_matches('0');
            return Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string());
        }
    }
    reference.attr("anchor").and_then(rfc_number_from_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Mode;
    use crate::remote::{OfflineMetadataSource, RfcInfo, StaticMetadataSource};
    use crate::xml;

    fn txt_with_reference() -> Document {
        let input = "Internet-Draft                          J. Doe\n\n\
                     Title\nslug\n\n\
                     7.  References\n\n\
                     7.1.  Normative References\n\n\
                     [RFC0793]  Postel, J., \"TCP\".\n";
        Document::Txt(crate::txt::parse(input, "d.txt").unwrap())
    }

    #[tokio::test]
    async fn test_unfetchable_status_is_a_comment_in_every_mode() {
        let doc = txt_with_reference();
        for mode in [Mode::Normal, Mode::ForgiveChecklist, Mode::Submission] {
            let findings = check(&doc, &RunOptions::with_mode(mode), &OfflineMetadataSource).await;
            assert_eq!(findings.len(), 1, "mode {mode:?}");
            assert_eq!(findings[0].code, "UNDEFINED_STATUS");
            assert_eq!(findings[0].severity, Severity::Comment);
        }
    }

    #[tokio::test]
    async fn test_zero_padded_and_plain_citations_are_one_lookup() {
        let input = "Internet-Draft                          J. Doe\n\n\
                     Title\nslug\n\n\
                     7.  References\n\n\
                     7.1.  Normative References\n\n\
                     [RFC0793]  Postel, J., \"TCP\".\n\
                     See also RFC 793 for the original text.\n";
        let doc = Document::Txt(crate::txt::parse(input, "d.txt").unwrap());
        let findings = check(&doc, &RunOptions::default(), &OfflineMetadataSource).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "UNDEFINED_STATUS");
    }

    #[tokio::test]
    async fn test_unranked_status_is_unknown() {
        let doc = txt_with_reference();
        let mut source = StaticMetadataSource::default();
        source.rfcs.insert(
            "793".to_string(),
            RfcInfo {
                status: Some("Legacy".to_string()),
                obsoleted_by: Vec::new(),
                updated_by: Vec::new(),
            },
        );
        let findings = check(&doc, &RunOptions::default(), &source).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "UNKNOWN_STATUS");
        assert_eq!(findings[0].severity, Severity::Comment);
    }

    #[tokio::test]
    async fn test_obsoleted_reference_names_replacements() {
        let doc = txt_with_reference();
        let mut source = StaticMetadataSource::default();
        source.rfcs.insert(
            "793".to_string(),
            RfcInfo {
                status: Some("Internet Standard".to_string()),
                obsoleted_by: vec!["9000".to_string()],
                updated_by: Vec::new(),
            },
        );

        let normal = check(&doc, &RunOptions::default(), &source).await;
        assert_eq!(normal.len(), 1);
        assert_eq!(normal[0].code, "OBSOLETE_DOCUMENT");
        assert_eq!(normal[0].severity, Severity::Error);
        assert!(normal[0].message.contains("replaced by: 9000"));

        let forgive = check(&doc, &RunOptions::with_mode(Mode::ForgiveChecklist), &source).await;
        assert_eq!(forgive[0].severity, Severity::Warning);

        let submission = check(&doc, &RunOptions::with_mode(Mode::Submission), &source).await;
        assert!(submission.is_empty());
    }

    #[tokio::test]
    async fn test_xml_series_info_and_anchor_fallback() {
        let doc = Document::Xml(
            xml::parse(
                br#"<rfc><back>
                      <references><name>Normative References</name>
                        <reference anchor="TCP"><seriesInfo name="RFC" value="0793"/></reference>
                        <reference anchor="RFC2119"/>
                        <reference anchor="EXTERNAL"/>
                      </references>
                    </back></rfc>"#,
                "d.xml",
            )
            .unwrap(),
        );
        let findings = check(&doc, &RunOptions::default(), &OfflineMetadataSource).await;
        // Two RFC references resolve to lookups; the non-RFC anchor is not
        // a status check's business.
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("RFC 793"));
        assert!(findings[1].message.contains("RFC 2119"));
    }
}
