//! TXT Structural Parser
//!
//! Recovers document structure from a loosely formatted plain-text
//! Internet-Draft or RFC in a single forward pass: header fields, title,
//! slug, section/subsection boundaries, and per-line lexical elements.
//!
//! The pass is strictly synchronous and keeps all intermediate state local to
//! one parse call. Section boundaries are tracked as small explicit
//! [`Marker`] records; a section closes on the next recognized heading or at
//! end of input.

use std::collections::HashSet;

use crate::document::{
    Author, DocKind, FlaggedLine, KeywordOccurrence, Marker, RefSubsection, SectionedReference,
    TxtDocument,
};
use crate::error::{NitsError, Result};
use crate::patterns;

/// Maximum compliant line length in characters.
pub const MAX_LINE_LENGTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Header,
    Slug,
    Body,
}

/// Per-parse scanner state. Never outlives a single [`parse`] call.
struct Scanner {
    doc: TxtDocument,
    phase: Phase,
    header_started: bool,
    last_header_line: usize,
    open_section: Option<String>,
    subsection: RefSubsection,
    in_code_block: bool,
    seen_reference_rfc: HashSet<String>,
    seen_reference_drafts: HashSet<String>,
}

/// Parse raw text into a [`TxtDocument`].
///
/// Fails with [`NitsError::TxtParsingFailed`] carrying the 1-based line index
/// of the failure point. Document-content problems never fail the parse; they
/// surface later as findings.
pub fn parse(text: &str, filename: &str) -> Result<TxtDocument> {
    let mut scanner = Scanner {
        doc: TxtDocument {
            filename: filename.to_string(),
            page_count: 1,
            ..TxtDocument::default()
        },
        phase: Phase::Header,
        header_started: false,
        last_header_line: 0,
        open_section: None,
        subsection: RefSubsection::Unclassified,
        in_code_block: false,
        seen_reference_rfc: HashSet::new(),
        seen_reference_drafts: HashSet::new(),
    };

    let mut line_count = 0;
    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        line_count = line_no;
        let line = raw_line.trim_end_matches('\r');

        scanner.doc.page_count += line.matches('\u{000C}').count();
        let line = line.trim_matches('\u{000C}');

        match scanner.phase {
            Phase::Header => scanner.scan_header_line(line, line_no),
            Phase::Slug => {
                if !line.trim().is_empty() {
                    scanner.doc.slug = line.trim().to_string();
                    scanner.phase = Phase::Body;
                }
                scanner.extract_lexical(line, line_no);
            }
            Phase::Body => {
                scanner.scan_body_line(line, line_no);
                scanner.extract_lexical(line, line_no);
            }
        }
    }

    if !scanner.header_started {
        return Err(NitsError::TxtParsingFailed {
            line: 1,
            details: "no header line found".to_string(),
        });
    }
    if scanner.phase == Phase::Header {
        return Err(NitsError::TxtParsingFailed {
            line: line_count,
            details: "document ended inside the first-page header".to_string(),
        });
    }

    scanner.close_open_section(line_count);
    scanner.close_organization_assignment();
    scanner.match_boilerplate(text);

    Ok(scanner.doc)
}

impl Scanner {
    /// Header capture. The first non-empty line splits into left = source,
    /// right = first author. Subsequent lines continue the header while they
    /// are adjacent (gap <= 1) or indented two-column continuations; the
    /// first other line after a gap > 1 closes the header and is taken as
    /// the title.
    fn scan_header_line(&mut self, line: &str, line_no: usize) {
        if line.trim().is_empty() {
            return;
        }

        if !self.header_started {
            let (left, right) = split_columns(line.trim());
            self.doc.header.source = left.to_string();
            if !right.is_empty() {
                self.doc.header.authors.push(Author {
                    name: right.to_string(),
                    org: None,
                });
            }
            self.scan_header_left(left);
            self.header_started = true;
            self.last_header_line = line_no;
            return;
        }

        let gap = line_no - self.last_header_line;
        let indented = line.starts_with(' ') || line.starts_with('\t');
        let two_column = patterns::header_split_regex().is_match(line.trim());

        if gap > 1 {
            // Authors without an affiliation line by now get none at all.
            self.close_organization_assignment();

            // Only an indented two-column line keeps the header open across
            // a gap; anything else closes it and is taken as the title.
            if !(indented && two_column) {
                self.doc.title = line.trim().to_string();
                self.phase = Phase::Slug;
                self.extract_lexical(line, line_no);
                return;
            }
        }

        let (left, right) = split_columns(line.trim());
        self.scan_header_left(left);
        self.scan_header_right(right);
        self.last_header_line = line_no;
    }

    /// Header field lexicon for the left column.
    fn scan_header_left(&mut self, left: &str) {
        if left == "Internet-Draft" {
            self.doc.doc_kind = DocKind::Draft;
        } else if let Some(rest) = left.strip_prefix("Request for Comments:") {
            self.doc.doc_kind = DocKind::Rfc;
            self.doc.header.rfc_number = first_number(rest);
        } else if let Some(rest) = left.strip_prefix("Intended status:") {
            self.doc.header.intended_status = Some(rest.trim().to_string());
        } else if let Some(rest) = left.strip_prefix("Obsoletes:") {
            for piece in rest.split(',') {
                if let Some(n) = first_number(piece) {
                    self.doc.header.obsoletes.push(n);
                    self.doc.elements.obsoletes_rfc.push(n);
                }
            }
        } else if let Some(rest) = left.strip_prefix("Category:") {
            self.doc.header.category = Some(rest.trim().to_string());
        } else if let Some(rest) = left.strip_prefix("ISSN:") {
            self.doc.header.issn = Some(rest.trim().to_string());
        } else if let Some(rest) = left.strip_prefix("Expires:") {
            self.doc.header.expires = patterns::parse_loose_date(rest);
        }
    }

    /// Right-column logic: an initials+surname match starts a new author; a
    /// parseable date is the document date; any other text is the
    /// organization of the most recent author still lacking one.
    fn scan_header_right(&mut self, right: &str) {
        if right.is_empty() {
            return;
        }
        if patterns::author_name_regex().is_match(right) {
            self.doc.header.authors.push(Author {
                name: right.to_string(),
                org: None,
            });
        } else if let Some(date) = patterns::parse_loose_date(right) {
            if self.doc.header.date.is_none() {
                self.doc.header.date = Some(date);
            }
        } else if let Some(author) = self
            .doc
            .header
            .authors
            .iter_mut()
            .rev()
            .find(|a| a.org.is_none())
        {
            author.org = Some(right.to_string());
        }
    }

    fn close_organization_assignment(&mut self) {
        for author in &mut self.doc.header.authors {
            if author.org.is_none() {
                author.org = Some(String::new());
            }
        }
    }

    /// Section and subsection boundary tracking plus content accumulation.
    fn scan_body_line(&mut self, line: &str, line_no: usize) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(name) = recognize_section(trimmed) {
            self.close_open_section(line_no.saturating_sub(1));
            // Re-opening overwrites the marker (a ToC sighting may have set
            // it first); accumulated content is kept.
            self.doc.markers.insert(
                name.to_string(),
                Marker {
                    start: line_no,
                    end: 0,
                    closed: false,
                },
            );
            self.open_section = Some(name.to_string());
            if name == "references" {
                self.subsection = RefSubsection::Unclassified;
            }
            return;
        }

        // Subsection headings classify the active reference subsection.
        // Dotted-leader ToC lines are excluded here (but deliberately not for
        // top-level headings above).
        if patterns::subsection_heading_regex().is_match(trimmed)
            && !patterns::toc_dotted_leader_regex().is_match(trimmed)
        {
            let lowered = trimmed.to_lowercase();
            if lowered.contains("normative references") {
                self.subsection = RefSubsection::Normative;
            } else if lowered.contains("informative references") {
                self.subsection = RefSubsection::Informative;
            } else if self.open_section.as_deref() == Some("references") {
                self.subsection = RefSubsection::Unclassified;
            }
        }

        if let Some(section) = &self.open_section {
            self.doc
                .content
                .entry(section.clone())
                .or_default()
                .push(trimmed.to_string());
        }
    }

    fn close_open_section(&mut self, at_line: usize) {
        if let Some(section) = self.open_section.take()
            && let Some(marker) = self.doc.markers.get_mut(&section)
        {
            marker.end = at_line.max(marker.start);
            marker.closed = true;
        }
    }

    /// Per-line lexical extraction, independent of section open/closed state.
    fn extract_lexical(&mut self, line: &str, line_no: usize) {
        let in_references = self.open_section.as_deref() == Some("references");

        for caps in patterns::rfc_reference_regex().captures_iter(line) {
            let number = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            if in_references {
                if self.seen_reference_rfc.insert(number.clone()) {
                    self.doc
                        .elements
                        .reference_section_rfc
                        .push(SectionedReference {
                            value: number,
                            subsection: self.subsection,
                        });
                }
            } else {
                self.doc.elements.non_reference_section_rfc.push(number);
            }
        }

        for caps in patterns::bracket_token_regex().captures_iter(line) {
            let token = caps[1].to_string();
            if is_rfc_token(&token) {
                continue;
            }
            if in_references {
                if self.seen_reference_drafts.insert(token.clone()) {
                    self.doc
                        .elements
                        .reference_section_draft_references
                        .push(SectionedReference {
                            value: token,
                            subsection: self.subsection,
                        });
                }
            } else {
                self.doc
                    .elements
                    .non_reference_section_draft_references
                    .push(token);
            }
        }

        for m in patterns::ipv4_regex().find_iter(line) {
            self.doc.elements.ipv4.push(m.as_str().to_string());
        }
        for m in patterns::ipv6_regex().find_iter(line) {
            self.doc.elements.ipv6.push(m.as_str().to_string());
        }
        for m in patterns::fqdn_regex().find_iter(line) {
            if !patterns::ipv4_regex().is_match(m.as_str()) {
                self.doc.elements.fqdn_domains.push(m.as_str().to_string());
            }
        }

        for m in patterns::keyword_2119_regex().find_iter(line) {
            self.doc.elements.keywords_2119.push(KeywordOccurrence {
                keyword: m.as_str().to_string(),
                line: line_no,
            });
        }
        for combo in patterns::INVALID_2119_COMBINATIONS {
            if line.contains(combo) {
                self.doc
                    .possible_issues
                    .misspelled_keywords
                    .push(KeywordOccurrence {
                        keyword: (*combo).to_string(),
                        line: line_no,
                    });
            }
        }

        for caps in patterns::relation_mention_regex().captures_iter(line) {
            if let Ok(n) = caps[2].parse::<u32>() {
                if caps[1].eq_ignore_ascii_case("obsoletes") {
                    self.doc.elements.obsoletes_rfc.push(n);
                } else {
                    self.doc.elements.updates_rfc.push(n);
                }
            }
        }

        let trimmed = line.trim();
        if patterns::ragged_spacing_regex().is_match(trimmed)
            && !trimmed.contains("Internet-Draft")
            && !trimmed.contains("INTERNET-DRAFT")
        {
            self.doc.possible_issues.lines_with_spaces.push(line_no);
        }

        let length = line.chars().count();
        if length > MAX_LINE_LENGTH {
            self.doc
                .possible_issues
                .long_lines
                .push(FlaggedLine {
                    line: line_no,
                    length,
                });
        }

        if line.contains(patterns::CODE_BEGINS) {
            self.in_code_block = true;
            self.doc.contains.code_blocks = true;
        } else if line.contains(patterns::CODE_ENDS) {
            self.in_code_block = false;
        } else if !self.in_code_block && patterns::comment_token_regex().is_match(line) {
            self.doc.possible_issues.inline_code.push(line_no);
        }

        if line.contains(patterns::REVISED_BSD_LICENSE_TEXT) {
            self.doc.contains.revised_bsd_license = true;
        }
    }

    /// Boilerplate paragraphs are matched once against the whole
    /// whitespace-normalized text. A fuzzy flag is set when an ordered prefix
    /// subset of the component phrases matches without any full paragraph
    /// matching.
    fn match_boilerplate(&mut self, text: &str) {
        let normalized = patterns::normalize_whitespace(text);

        self.doc.boilerplate.rfc2119 = normalized
            .contains(&patterns::normalize_whitespace(patterns::BOILERPLATE_2119_V1))
            || normalized.contains(&patterns::normalize_whitespace(patterns::BOILERPLATE_2119_V2));
        self.doc.boilerplate.rfc8174 =
            normalized.contains(&patterns::normalize_whitespace(patterns::BOILERPLATE_8174));

        if !self.doc.boilerplate.rfc2119 && !self.doc.boilerplate.rfc8174 {
            let mut position = 0;
            let mut matched = 0;
            for phrase in patterns::BOILERPLATE_COMPONENT_PHRASES {
                match normalized[position..].find(phrase) {
                    Some(offset) => {
                        position += offset + phrase.len();
                        matched += 1;
                    }
                    None => break,
                }
            }
            self.doc.boilerplate.similar_boilerplate = matched >= 2;
        }

        // Keywords quoted in the boilerplate sentence itself, whichever
        // variant (or near-variant) is present.
        if let Some(start) = normalized.find("The key words") {
            let sentence_end = normalized[start..]
                .find(". ")
                .map(|o| start + o)
                .unwrap_or(normalized.len());
            let sentence = &normalized[start..sentence_end];
            let mut seen = HashSet::new();
            for m in patterns::keyword_2119_regex().find_iter(sentence) {
                if seen.insert(m.as_str()) {
                    self.doc
                        .elements
                        .boilerplate_2119_keywords
                        .push(m.as_str().to_string());
                }
            }
        }
    }
}

/// Split a header line into (left, right) on the first run of two or more
/// spaces; a line without one is all left column.
fn split_columns(line: &str) -> (&str, &str) {
    match patterns::header_split_regex().find(line) {
        Some(m) => (line[..m.start()].trim(), line[m.end()..].trim()),
        None => (line.trim(), ""),
    }
}

/// Recognize a top-level section heading against the fixed alias table, or
/// an author-address heading. ToC dotted-leader lines are NOT excluded here;
/// rule modules compensate via the content-accumulated test.
fn recognize_section(trimmed: &str) -> Option<&'static str> {
    if patterns::author_address_heading_regex().is_match(trimmed) {
        return Some(patterns::AUTHOR_ADDRESS_SECTION);
    }

    let caps = patterns::section_heading_regex().captures(trimmed)?;
    let heading = caps[2].trim().to_lowercase();
    for (canonical, aliases) in patterns::SECTION_ALIASES {
        for alias in *aliases {
            if heading == *alias
                || (heading.starts_with(alias)
                    && heading[alias.len()..]
                        .chars()
                        .next()
                        .is_some_and(|c| !c.is_alphanumeric()))
            {
                return Some(canonical);
            }
        }
    }
    None
}

fn is_rfc_token(token: &str) -> bool {
    token
        .strip_prefix("RFC")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

fn first_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
