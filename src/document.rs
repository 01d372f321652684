//! Unified Document Model
//!
//! Tagged-union representation of a parsed Internet-Draft / RFC consumed by
//! all rule modules. Built once per run, immutable post-parse.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A parsed document: plain text or XML. Every rule module pattern-matches on
/// the discriminant; TXT rule branches are a strict subset of XML branches by
/// design.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Txt(TxtDocument),
    Xml(XmlDocument),
}

/// Kind of document recovered from the TXT header left column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocKind {
    Draft,
    Rfc,
    #[default]
    Unknown,
}

/// Classification of the reference subsection currently in scope, set by
/// subsection headings inside the references section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefSubsection {
    Normative,
    Informative,
    #[default]
    Unclassified,
}

/// One document author recovered from the header right column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// None while the header is still open; an empty string means the header
    /// closed without an affiliation line ("no affiliation").
    pub org: Option<String>,
}

/// Header fields from the first-page left/right column block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TxtHeader {
    pub source: String,
    pub authors: Vec<Author>,
    pub date: Option<NaiveDate>,
    pub expires: Option<NaiveDate>,
    pub intended_status: Option<String>,
    pub category: Option<String>,
    pub issn: Option<String>,
    pub obsoletes: Vec<u32>,
    /// RFC number when the left column carried "Request for Comments:".
    pub rfc_number: Option<u32>,
}

/// Parser-internal record of a section's line range and closure state.
/// Lines are 1-based; start == 0 means unset. Once closed, end >= start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Marker {
    pub start: usize,
    pub end: usize,
    pub closed: bool,
}

impl Marker {
    /// Whether the marker was ever opened.
    pub fn is_set(&self) -> bool {
        self.start != 0
    }
}

/// An RFC 2119 keyword occurrence with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordOccurrence {
    pub keyword: String,
    pub line: usize,
}

/// A reference token found inside the references section, tagged with the
/// subsection classification active when it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionedReference {
    pub value: String,
    pub subsection: RefSubsection,
}

/// Lexical elements extracted per line, independent of section state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedElements {
    pub fqdn_domains: Vec<String>,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub keywords_2119: Vec<KeywordOccurrence>,
    pub boilerplate_2119_keywords: Vec<String>,
    pub obsoletes_rfc: Vec<u32>,
    pub updates_rfc: Vec<u32>,
    pub reference_section_rfc: Vec<SectionedReference>,
    pub non_reference_section_rfc: Vec<String>,
    pub reference_section_draft_references: Vec<SectionedReference>,
    pub non_reference_section_draft_references: Vec<String>,
}

/// A line flagged with its 1-based number and, where useful, its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedLine {
    pub line: usize,
    pub length: usize,
}

/// Things that are probably wrong but need rule-level judgment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PossibleIssues {
    pub lines_with_spaces: Vec<usize>,
    pub inline_code: Vec<usize>,
    pub misspelled_keywords: Vec<KeywordOccurrence>,
    pub long_lines: Vec<FlaggedLine>,
}

/// Whole-text boilerplate matching results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoilerplateFlags {
    pub rfc2119: bool,
    pub rfc8174: bool,
    pub similar_boilerplate: bool,
}

/// Document-level content flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainsFlags {
    pub code_blocks: bool,
    pub revised_bsd_license: bool,
}

/// Structured model recovered from a plain-text document by the single-pass
/// parser.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TxtDocument {
    pub filename: String,
    pub header: TxtHeader,
    pub title: String,
    pub slug: String,
    /// Trimmed non-empty lines accumulated per open section, in order.
    pub content: HashMap<String, Vec<String>>,
    pub markers: HashMap<String, Marker>,
    pub elements: ExtractedElements,
    pub possible_issues: PossibleIssues,
    pub boilerplate: BoilerplateFlags,
    pub contains: ContainsFlags,
    pub page_count: usize,
    pub doc_kind: DocKind,
}

impl TxtDocument {
    /// A section counts as genuinely found only if content was accumulated
    /// before closure, not merely if the marker was set. Headings inside a
    /// table-of-contents block set markers without content.
    pub fn has_section(&self, name: &str) -> bool {
        self.markers.get(name).is_some_and(|m| m.is_set())
            && self.content.get(name).is_some_and(|c| !c.is_empty())
    }
}

/// Node in the normalized XML tree: an element or a text run. Children and
/// attributes keep document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Normalized XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|el| el.name == name)
    }

    /// All descendants with the given name, depth-first document order.
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        for el in self.child_elements() {
            if el.name == name {
                found.push(el);
            }
            found.extend(el.descendants(name));
        }
        found
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => out.push_str(&el.text()),
            }
        }
        out
    }
}

/// External DTD entity extracted before XML parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEntity {
    pub name: String,
    pub entity_type: String,
    pub url: String,
}

/// Normalized XML document: the element tree plus pre-extracted external
/// entities (network entity resolution is out of scope).
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub filename: String,
    pub root: XmlElement,
    pub external_entities: Vec<ExternalEntity>,
}
