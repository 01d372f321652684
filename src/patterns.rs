//! Lexical Pattern Library
//!
//! Shared regexes and fixed lexicons used by the TXT structural parser and the
//! rule modules: section headings, reference tokens, addresses, RFC 2119
//! keywords, and boilerplate paragraphs.
//!
//! Regexes are compiled once on first use via `OnceLock` and reused for all
//! subsequent operations.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

static SECTION_HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
static SUBSECTION_HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
static TOC_DOTTED_LEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static AUTHOR_ADDRESS_HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
static AUTHOR_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static RFC_REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
static BRACKET_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static IPV4_REGEX: OnceLock<Regex> = OnceLock::new();
static IPV6_REGEX: OnceLock<Regex> = OnceLock::new();
static FQDN_REGEX: OnceLock<Regex> = OnceLock::new();
static KEYWORD_2119_REGEX: OnceLock<Regex> = OnceLock::new();
static RAGGED_SPACING_REGEX: OnceLock<Regex> = OnceLock::new();
static HEADER_SPLIT_REGEX: OnceLock<Regex> = OnceLock::new();
static COMMENT_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static EXTERNAL_ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static RELATION_MENTION_REGEX: OnceLock<Regex> = OnceLock::new();

/// Numbered top-level section heading, e.g. `3.  Security Considerations`.
pub fn section_heading_regex() -> &'static Regex {
    SECTION_HEADING_REGEX
        .get_or_init(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("Failed to compile section regex"))
}

/// Numbered subsection heading, e.g. `7.1.  Normative References`.
pub fn subsection_heading_regex() -> &'static Regex {
    SUBSECTION_HEADING_REGEX.get_or_init(|| {
        Regex::new(r"^(\d+)\.(\d+)\.\s+(.+)$").expect("Failed to compile subsection regex")
    })
}

/// Dotted-leader table-of-contents line, e.g. `7.1.  References . . . . 12`.
pub fn toc_dotted_leader_regex() -> &'static Regex {
    TOC_DOTTED_LEADER_REGEX.get_or_init(|| {
        Regex::new(r"(?:\.\s){3,}\.?\s*\d+\s*$|\.{3,}\s*\d+\s*$")
            .expect("Failed to compile ToC regex")
    })
}

/// Author-address heading family: `Author's Address`, `Authors' Addresses`,
/// with or without a leading section number.
pub fn author_address_heading_regex() -> &'static Regex {
    AUTHOR_ADDRESS_HEADING_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^(?:\d+\.\s+)?authors?'?s?\s+address(?:es)?\s*$")
            .expect("Failed to compile author address regex")
    })
}

/// Initials-plus-surname author pattern in the header right column,
/// e.g. `J. Doe`, `J. P. Doe, Ed.`.
pub fn author_name_regex() -> &'static Regex {
    AUTHOR_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[A-Z]\.\s?)+[A-Z][A-Za-z'\-]+(?:,\s*(?:Ed\.|Editor))?$")
            .expect("Failed to compile author name regex")
    })
}

/// RFC cross-reference in running text or bracketed form: `RFC 2119`,
/// `RFC2119`, `[RFC2119]`. Capture group 1 or 2 holds the number.
pub fn rfc_reference_regex() -> &'static Regex {
    RFC_REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"\[RFC\s?(\d+)\]|\bRFC\s?(\d+)\b")
            .expect("Failed to compile RFC reference regex")
    })
}

/// Bracketed citation token that is not an RFC reference, e.g. `[ISO10646]`
/// or `[I-D.ietf-foo-bar]`.
pub fn bracket_token_regex() -> &'static Regex {
    BRACKET_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"\[([A-Za-z][A-Za-z0-9._\-]*)\]").expect("Failed to compile bracket regex")
    })
}

/// IPv4 literal.
pub fn ipv4_regex() -> &'static Regex {
    IPV4_REGEX.get_or_init(|| {
        Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("Failed to compile IPv4 regex")
    })
}

/// Loosely matched IPv6 literal. Intentionally permissive: two or more
/// colon-separated hex groups, optionally compressed.
pub fn ipv6_regex() -> &'static Regex {
    IPV6_REGEX.get_or_init(|| {
        Regex::new(r"\b(?:[0-9A-Fa-f]{1,4}:){2,}(?:[0-9A-Fa-f]{1,4}|:)")
            .expect("Failed to compile IPv6 regex")
    })
}

/// Fully-qualified domain name.
pub fn fqdn_regex() -> &'static Regex {
    FQDN_REGEX.get_or_init(|| {
        Regex::new(r"\b(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}\b")
            .expect("Failed to compile FQDN regex")
    })
}

/// RFC 2119 requirement keywords, longest alternatives first so `MUST NOT`
/// wins over `MUST`.
pub fn keyword_2119_regex() -> &'static Regex {
    KEYWORD_2119_REGEX.get_or_init(|| {
        Regex::new(
            r"\b(MUST NOT|MUST|REQUIRED|SHALL NOT|SHALL|SHOULD NOT|SHOULD|NOT RECOMMENDED|RECOMMENDED|MAY|OPTIONAL)\b",
        )
        .expect("Failed to compile RFC 2119 keyword regex")
    })
}

/// Two or more consecutive inner spaces between non-space runs.
pub fn ragged_spacing_regex() -> &'static Regex {
    RAGGED_SPACING_REGEX.get_or_init(|| {
        Regex::new(r"\S {2,}\S").expect("Failed to compile ragged spacing regex")
    })
}

/// Header column split: two or more consecutive spaces.
pub fn header_split_regex() -> &'static Regex {
    HEADER_SPLIT_REGEX
        .get_or_init(|| Regex::new(r" {2,}").expect("Failed to compile header split regex"))
}

/// Comment-like tokens outside code blocks: C-style delimiters or a leading
/// hash.
pub fn comment_token_regex() -> &'static Regex {
    COMMENT_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"/\*|\*/|^\s*#").expect("Failed to compile comment token regex")
    })
}

/// External DTD entity declaration: `<!ENTITY name SYSTEM "url">` or
/// `<!ENTITY name PUBLIC "pubid" "url">`.
pub fn external_entity_regex() -> &'static Regex {
    EXTERNAL_ENTITY_REGEX.get_or_init(|| {
        Regex::new(r#"<!ENTITY\s+(\S+)\s+(SYSTEM|PUBLIC)\s+(?:"[^"]*"\s+)?"([^"]*)"\s*>"#)
            .expect("Failed to compile external entity regex")
    })
}

/// Free-text `obsoletes RFC n` / `updates RFC n` mention. Group 1 is the
/// verb, group 2 the number.
pub fn relation_mention_regex() -> &'static Regex {
    RELATION_MENTION_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(obsoletes|updates)\s+RFC\s?(\d+)")
            .expect("Failed to compile relation mention regex")
    })
}

/// Fixed invalid RFC 2119 keyword combinations logged as possible
/// misspellings.
pub const INVALID_2119_COMBINATIONS: &[&str] = &[
    "MUST not",
    "SHALL not",
    "SHOULD not",
    "MAY NOT",
    "RECOMMENDED NOT",
    "OPTIONAL NOT",
];

/// Section names recognized by the TXT parser, keyed by canonical name.
pub const SECTION_ALIASES: &[(&str, &[&str])] = &[
    ("introduction", &["introduction", "overview", "background"]),
    ("security_considerations", &["security considerations"]),
    (
        "references",
        &["references", "normative references", "informative references"],
    ),
    ("iana_considerations", &["iana considerations"]),
];

/// Canonical name of the author-address section.
pub const AUTHOR_ADDRESS_SECTION: &str = "author_address";

/// RFC 2119 boilerplate paragraph, RFC-number spelling.
pub const BOILERPLATE_2119_V1: &str = "The key words \"MUST\", \"MUST NOT\", \"REQUIRED\", \"SHALL\", \"SHALL NOT\", \"SHOULD\", \"SHOULD NOT\", \"RECOMMENDED\", \"MAY\", and \"OPTIONAL\" in this document are to be interpreted as described in RFC 2119.";

/// RFC 2119 boilerplate paragraph, bracketed-citation spelling.
pub const BOILERPLATE_2119_V2: &str = "The key words \"MUST\", \"MUST NOT\", \"REQUIRED\", \"SHALL\", \"SHALL NOT\", \"SHOULD\", \"SHOULD NOT\", \"RECOMMENDED\", \"MAY\", and \"OPTIONAL\" in this document are to be interpreted as described in [RFC2119].";

/// RFC 8174 boilerplate paragraph.
pub const BOILERPLATE_8174: &str = "The key words \"MUST\", \"MUST NOT\", \"REQUIRED\", \"SHALL\", \"SHALL NOT\", \"SHOULD\", \"SHOULD NOT\", \"RECOMMENDED\", \"NOT RECOMMENDED\", \"MAY\", and \"OPTIONAL\" in this document are to be interpreted as described in BCP 14 [RFC2119] [RFC8174] when, and only when, they appear in all capitals, as shown here.";

/// Ordered component phrases of the 2119/8174 boilerplate used for fuzzy
/// matching. An ordered prefix subset of these matching without the full
/// paragraph matching flags "similar boilerplate".
pub const BOILERPLATE_COMPONENT_PHRASES: &[&str] = &[
    "The key words",
    "in this document",
    "are to be interpreted as described in",
];

/// Marker text of the Revised BSD Code Components license.
pub const REVISED_BSD_LICENSE_TEXT: &str = "Revised BSD License";

/// Code block fences from RFC 8879.
pub const CODE_BEGINS: &str = "<CODE BEGINS>";
pub const CODE_ENDS: &str = "<CODE ENDS>";

/// Collapse runs of whitespace to single spaces for whole-text boilerplate
/// matching.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a loosely formatted document date such as `2 January 2026`,
/// `January 2, 2026`, or `January 2026` (missing day defaults to 1).
pub fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    let cleaned = normalize_whitespace(text.trim());
    if cleaned.is_empty() {
        return None;
    }

    for format in ["%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date);
        }
    }

    // Month-year only: default the day to 1. Tried before the comma-less
    // `%B %d %Y` form, which would otherwise consume `January 2026` as
    // day 20 of year 26.
    for format in ["%B %Y", "%b %Y"] {
        let with_day = format!("1 {}", cleaned);
        if let Ok(date) = NaiveDate::parse_from_str(&with_day, &format!("%d {}", format)) {
            return Some(date);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%B %d %Y") {
        return Some(date);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_heading_matches() {
        assert!(section_heading_regex().is_match("1.  Introduction"));
        assert!(section_heading_regex().is_match("12. IANA Considerations"));
        assert!(!section_heading_regex().is_match("1.1.  Terminology"));
        assert!(!section_heading_regex().is_match("Introduction"));
    }

    #[test]
    fn test_subsection_heading_matches() {
        assert!(subsection_heading_regex().is_match("7.1.  Normative References"));
        assert!(!subsection_heading_regex().is_match("7.  References"));
    }

    #[test]
    fn test_toc_dotted_leader() {
        assert!(toc_dotted_leader_regex().is_match("3.  Security Considerations . . . . . 12"));
        assert!(toc_dotted_leader_regex().is_match("3.  Security Considerations ......... 12"));
        assert!(!toc_dotted_leader_regex().is_match("3.  Security Considerations"));
    }

    #[test]
    fn test_author_address_heading_family() {
        for heading in [
            "Author's Address",
            "Authors' Addresses",
            "9.  Authors' Addresses",
            "AUTHORS' ADDRESSES",
        ] {
            assert!(
                author_address_heading_regex().is_match(heading),
                "should match: {heading}"
            );
        }
        assert!(!author_address_heading_regex().is_match("Acknowledgements"));
    }

    #[test]
    fn test_author_name_pattern() {
        assert!(author_name_regex().is_match("J. Doe"));
        assert!(author_name_regex().is_match("J. P. Doe"));
        assert!(author_name_regex().is_match("A. Smith, Ed."));
        assert!(!author_name_regex().is_match("Example Organization"));
        assert!(!author_name_regex().is_match("March 2026"));
    }

    #[test]
    fn test_rfc_reference_capture() {
        let caps = rfc_reference_regex().captures("[RFC2119]").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "2119");

        let caps = rfc_reference_regex().captures("see RFC 793 for").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "793");
    }

    #[test]
    fn test_bracket_token_excludes_leading_digit() {
        assert!(bracket_token_regex().is_match("[ISO10646]"));
        assert!(bracket_token_regex().is_match("[I-D.ietf-foo-bar]"));
        assert!(!bracket_token_regex().is_match("[42]"));
    }

    #[test]
    fn test_address_literals() {
        assert!(ipv4_regex().is_match("192.0.2.1"));
        assert!(ipv6_regex().is_match("2001:db8::1"));
        assert!(fqdn_regex().is_match("example.com"));
        assert!(!ipv4_regex().is_match("1.2"));
    }

    #[test]
    fn test_keyword_2119_longest_match() {
        let m = keyword_2119_regex()
            .find("Senders MUST NOT retry")
            .unwrap();
        assert_eq!(m.as_str(), "MUST NOT");
    }

    #[test]
    fn test_external_entity_forms() {
        let caps = external_entity_regex()
            .captures(r#"<!ENTITY rfc2119 SYSTEM "https://example.org/rfc2119.xml">"#)
            .unwrap();
        assert_eq!(&caps[1], "rfc2119");
        assert_eq!(&caps[2], "SYSTEM");
        assert_eq!(&caps[3], "https://example.org/rfc2119.xml");

        let caps = external_entity_regex()
            .captures(r#"<!ENTITY x PUBLIC "pubid" "https://example.org/x.xml">"#)
            .unwrap();
        assert_eq!(&caps[2], "PUBLIC");
        assert_eq!(&caps[3], "https://example.org/x.xml");
    }

    #[test]
    fn test_relation_mention_capture() {
        let caps = relation_mention_regex()
            .captures("This document obsoletes RFC 1234 and updates RFC 0005.")
            .unwrap();
        assert_eq!(&caps[1], "obsoletes");
        assert_eq!(&caps[2], "1234");
    }

    #[test]
    fn test_parse_loose_date_formats() {
        use chrono::NaiveDate;

        assert_eq!(
            parse_loose_date("2 January 2026"),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );
        assert_eq!(
            parse_loose_date("January 2, 2026"),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );
        // Missing day defaults to 1, never a day-20-of-year-26 misparse.
        assert_eq!(
            parse_loose_date("January 2026"),
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
        assert_eq!(
            parse_loose_date("Mar 2026"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        // Comma-less day form still parses.
        assert_eq!(
            parse_loose_date("January 20 2026"),
            NaiveDate::from_ymd_opt(2026, 1, 20)
        );
        assert_eq!(parse_loose_date("not a date"), None);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("The  key\n   words"),
            "The key words"
        );
    }
}
