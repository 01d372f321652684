//! Section presence and shape checks: Abstract, Introduction, Security
//! Considerations, Author information, References, IANA Considerations.

use crate::document::{Document, TxtDocument, XmlDocument, XmlElement};
use crate::finding::{Finding, Severity, SeverityPolicy, emit};
use crate::remote::MetadataSource;
use crate::rules::{RunOptions, xml_references_sections};

/// Direct children allowed inside `<abstract>`. An inline `xref` is tolerated
/// by the shape check but reported separately as a reference-in-abstract.
const ABSTRACT_ALLOWED_CHILDREN: &[&str] = &["t", "xref"];

const MAX_AUTHORS: usize = 5;

pub async fn check(
    document: &Document,
    options: &RunOptions,
    _remote: &dyn MetadataSource,
) -> Vec<Finding> {
    match document {
        Document::Txt(txt) => check_txt(txt, options),
        Document::Xml(xml) => check_xml(xml, options),
    }
}

fn check_txt(doc: &TxtDocument, options: &RunOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mode = options.mode;
    let published = doc.header.rfc_number.is_some();

    // "Genuinely found" means content accumulated before closure; a marker
    // set by a ToC sighting alone does not count.
    if !doc.has_section("introduction") {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_INTRODUCTION_SECTION",
            "Document has no Introduction section",
        );
    }
    if !doc.has_section("security_considerations") {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_SECURITY_SECTION",
            "Document has no Security Considerations section",
        );
    }
    if !doc.has_section("references") {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_REFERENCES_SECTION",
            "Document has no References section",
        );
    }
    if !doc.has_section("author_address") {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_AUTHOR_SECTION",
            "Document has no Author's Address section",
        );
    }
    if !doc.has_section("iana_considerations") {
        emit_missing_iana(&mut findings, mode, published);
    }

    if doc.header.authors.len() > MAX_AUTHORS {
        emit_too_many_authors(&mut findings, mode, doc.header.authors.len());
    }

    findings
}

fn check_xml(doc: &XmlDocument, options: &RunOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mode = options.mode;
    let published = doc.root.attr("number").is_some();

    let front = doc.root.child("front");

    match front.and_then(|f| f.child("abstract")) {
        Some(abstract_el) => check_abstract(&mut findings, mode, abstract_el),
        None => emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_ABSTRACT_SECTION",
            "Document has no Abstract",
        ),
    }

    let section_names: Vec<String> = doc
        .root
        .child("middle")
        .map(|middle| {
            middle
                .descendants("section")
                .iter()
                .filter_map(|s| s.child("name").map(|n| n.text().trim().to_lowercase()))
                .collect()
        })
        .unwrap_or_default();

    if !section_names
        .iter()
        .any(|n| matches!(n.as_str(), "introduction" | "overview" | "background"))
    {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_INTRODUCTION_SECTION",
            "Document has no Introduction section",
        );
    }
    if !section_names.iter().any(|n| n == "security considerations") {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_SECURITY_SECTION",
            "Document has no Security Considerations section",
        );
    }
    if !section_names.iter().any(|n| n == "iana considerations") {
        emit_missing_iana(&mut findings, mode, published);
    }

    if xml_references_sections(&doc.root).is_empty() {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_REFERENCES_SECTION",
            "Document has no References section",
        );
    }

    let authors: Vec<&XmlElement> = front
        .map(|f| f.child_elements().filter(|e| e.name == "author").collect())
        .unwrap_or_default();

    if authors.is_empty() {
        emit(
            &mut findings,
            SeverityPolicy::STANDARD,
            mode,
            "MISSING_AUTHOR_SECTION",
            "Document has no author information",
        );
    } else {
        if authors.len() > MAX_AUTHORS {
            emit_too_many_authors(&mut findings, mode, authors.len());
        }
        for (index, author) in authors.iter().enumerate() {
            check_author(&mut findings, mode, index, author);
        }
    }

    findings
}

fn check_abstract(findings: &mut Vec<Finding>, mode: crate::finding::Mode, abstract_el: &XmlElement) {
    for child in abstract_el.child_elements() {
        if !ABSTRACT_ALLOWED_CHILDREN.contains(&child.name.as_str()) {
            emit(
                findings,
                SeverityPolicy::STANDARD,
                mode,
                "ABSTRACT_SECTION_CHILD",
                format!("Abstract contains disallowed element <{}>", child.name),
            );
        }
    }

    if !abstract_el.descendants("xref").is_empty() {
        if let Some(severity) = SeverityPolicy::STANDARD.resolve(mode) {
            findings.push(
                Finding::new(
                    severity,
                    "REF_IN_ABSTRACT",
                    "Abstract contains a cross-reference; abstracts must be self-contained",
                )
                .with_ref_url("https://authors.ietf.org/en/required-content#abstract"),
            );
        }
    }
}

fn check_author(
    findings: &mut Vec<Finding>,
    mode: crate::finding::Mode,
    index: usize,
    author: &XmlElement,
) {
    let position = index + 1;

    let has_fullname = author
        .attr("fullname")
        .or_else(|| author.attr("asciiFullname"))
        .is_some_and(|v| !v.trim().is_empty());
    if !has_fullname {
        emit(
            findings,
            SeverityPolicy::non_submission(Severity::Warning),
            mode,
            "MISSING_AUTHOR_FULLNAME",
            format!("Author {position} has no fullname (or asciiFullname)"),
        );
    }

    let has_organization = author
        .child("organization")
        .map(|org| !org.text().trim().is_empty() || org.attr("ascii").is_some())
        .unwrap_or(false);
    if !has_organization {
        emit(
            findings,
            SeverityPolicy::non_submission(Severity::Warning),
            mode,
            "MISSING_AUTHOR_ORGANIZATION",
            format!("Author {position} has no organization"),
        );
    }

    if let Some(role) = author.attr("role")
        && role != "editor"
    {
        emit(
            findings,
            SeverityPolicy::non_submission(Severity::Warning),
            mode,
            "INVALID_AUTHOR_ROLE",
            format!("Author {position} has invalid role \"{role}\" (only \"editor\" is allowed)"),
        );
    }
}

fn emit_missing_iana(findings: &mut Vec<Finding>, mode: crate::finding::Mode, published: bool) {
    // The section becomes optional once the RFC is published, so an absent
    // one on a published RFC is only worth a comment.
    let policy = if published {
        SeverityPolicy::non_submission(Severity::Comment)
    } else {
        SeverityPolicy::STANDARD
    };
    emit(
        findings,
        policy,
        mode,
        "MISSING_IANA_SECTION",
        "Document has no IANA Considerations section",
    );
}

fn emit_too_many_authors(findings: &mut Vec<Finding>, mode: crate::finding::Mode, count: usize) {
    emit(
        findings,
        SeverityPolicy::non_submission(Severity::Comment),
        mode,
        "TOO_MANY_AUTHORS",
        format!("Document lists {count} authors; more than {MAX_AUTHORS} needs justification"),
    );
}
