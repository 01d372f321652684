//! Metadata sanity: document date, category, and obsoletes/updates
//! consistency between header metadata and the abstract, with optional
//! remote verification of the targets.

use chrono::Datelike;

use crate::document::{Document, TxtDocument, XmlDocument};
use crate::finding::{Finding, Mode, Severity, SeverityPolicy, emit};
use crate::remote::MetadataSource;
use crate::rules::RunOptions;

/// Allowed values of the `<rfc category>` attribute for published RFCs.
const VALID_CATEGORIES: &[&str] = &["std", "bcp", "info", "exp", "historic"];

/// Date-sanity window in days.
const MAX_DATE_SKEW_DAYS: i64 = 3;

pub async fn check(
    document: &Document,
    options: &RunOptions,
    remote: &dyn MetadataSource,
) -> Vec<Finding> {
    match document {
        Document::Txt(doc) => check_txt(doc, options, remote).await,
        Document::Xml(doc) => check_xml(doc, options, remote).await,
    }
}

async fn check_txt(
    doc: &TxtDocument,
    options: &RunOptions,
    remote: &dyn MetadataSource,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    check_date(&mut findings, options, doc.header.date);

    let obsoletes: Vec<String> = doc.header.obsoletes.iter().map(|n| n.to_string()).collect();
    verify_relation_targets(&mut findings, options, remote, &obsoletes, true).await;

    findings
}

async fn check_xml(
    doc: &XmlDocument,
    options: &RunOptions,
    remote: &dyn MetadataSource,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let date = doc
        .root
        .child("front")
        .and_then(|front| front.child("date"))
        .and_then(|date| {
            let year: i32 = date.attr("year")?.parse().ok()?;
            let month = date
                .attr("month")
                .and_then(parse_month)
                .unwrap_or(1);
            let day: u32 = date
                .attr("day")
                .and_then(|d| d.parse().ok())
                .unwrap_or(1);
            chrono::NaiveDate::from_ymd_opt(year, month, day)
        });
    check_date(&mut findings, options, date);

    // Drafts are exempt from the category requirement.
    let published = doc.root.attr("number").is_some();
    if published {
        let category = doc.root.attr("category").unwrap_or("");
        if !VALID_CATEGORIES.contains(&category) {
            emit(
                &mut findings,
                SeverityPolicy::STANDARD,
                options.mode,
                "INVALID_CATEGORY",
                format!(
                    "RFC category \"{category}\" must be one of: {}",
                    VALID_CATEGORIES.join(", ")
                ),
            );
        }
    }

    let abstract_text = doc
        .root
        .child("front")
        .and_then(|front| front.child("abstract"))
        .map(|a| a.text())
        .unwrap_or_default();

    let obsoletes = attr_number_list(doc, "obsoletes");
    let updates = attr_number_list(doc, "updates");
    cross_check_relation(
        &mut findings,
        options.mode,
        &obsoletes,
        &abstract_text,
        "obsoletes",
        "OBSOLETES_NOT_IN_ABSTRACT",
        "ABSTRACT_OBSOLETES_NOT_IN_HEADER",
    );
    cross_check_relation(
        &mut findings,
        options.mode,
        &updates,
        &abstract_text,
        "updates",
        "UPDATES_NOT_IN_ABSTRACT",
        "ABSTRACT_UPDATES_NOT_IN_HEADER",
    );

    verify_relation_targets(&mut findings, options, remote, &obsoletes, true).await;
    verify_relation_targets(&mut findings, options, remote, &updates, false).await;

    findings
}

fn check_date(
    findings: &mut Vec<Finding>,
    options: &RunOptions,
    date: Option<chrono::NaiveDate>,
) {
    let policy = SeverityPolicy::invariant(Severity::Warning);
    match date {
        None => emit(
            findings,
            policy,
            options.mode,
            "MISSING_DATE",
            "Document has no date",
        ),
        Some(date) => {
            let skew = (date - options.today).num_days();
            if skew.abs() > MAX_DATE_SKEW_DAYS {
                let direction = if skew < 0 { "past" } else { "future" };
                emit(
                    findings,
                    policy,
                    options.mode,
                    "BAD_DATE",
                    format!(
                        "Document date {date} is {} days in the {direction} (more than {MAX_DATE_SKEW_DAYS} allowed)",
                        skew.abs()
                    ),
                );
            } else if let Some(expected) = options.expected_year
                && date.year() != expected
            {
                emit(
                    findings,
                    policy,
                    options.mode,
                    "BAD_DATE",
                    format!("Document date {date} is not in the expected year {expected}"),
                );
            }
        }
    }
}

/// Each direction of the header/abstract mismatch gets its own code.
fn cross_check_relation(
    findings: &mut Vec<Finding>,
    mode: Mode,
    header_numbers: &[String],
    abstract_text: &str,
    verb: &str,
    missing_in_abstract: &'static str,
    missing_in_header: &'static str,
) {
    let mentioned = mentioned_numbers(abstract_text, verb);

    for number in header_numbers {
        if !mentioned.contains(number) {
            emit(
                findings,
                SeverityPolicy::invariant(Severity::Warning),
                mode,
                missing_in_abstract,
                format!("Header says this document {verb} RFC {number}, but the abstract does not mention it"),
            );
        }
    }
    for number in &mentioned {
        if !header_numbers.contains(number) {
            emit(
                findings,
                SeverityPolicy::invariant(Severity::Warning),
                mode,
                missing_in_header,
                format!("Abstract says this document {verb} RFC {number}, but the header does not"),
            );
        }
    }
}

fn mentioned_numbers(abstract_text: &str, verb: &str) -> Vec<String> {
    crate::patterns::relation_mention_regex()
        .captures_iter(abstract_text)
        .filter(|caps| caps[1].eq_ignore_ascii_case(verb))
        .map(|caps| caps[2].trim_start_matches('0').to_string())
        .collect()
}

/// Remote verification that an obsoleted/updated target is not itself
/// already replaced. Skipped in Submission mode; absent remote answers skip
/// silently (offline).
async fn verify_relation_targets(
    findings: &mut Vec<Finding>,
    options: &RunOptions,
    remote: &dyn MetadataSource,
    numbers: &[String],
    obsoleting: bool,
) {
    if options.mode == Mode::Submission {
        return;
    }

    for number in numbers {
        let Some(info) = remote.rfc_info(number).await else {
            continue;
        };
        if !info.obsoleted_by.is_empty() {
            let (code, verb) = if obsoleting {
                ("OBSOLETES_OBSOLETE_RFC", "obsoletes")
            } else {
                ("UPDATES_OBSOLETE_RFC", "updates")
            };
            emit(
                findings,
                SeverityPolicy::invariant(Severity::Warning),
                options.mode,
                code,
                format!(
                    "This document {verb} RFC {number}, which is already obsoleted by: {}",
                    info.obsoleted_by.join(", ")
                ),
            );
        }
    }
}

fn attr_number_list(doc: &XmlDocument, attr: &str) -> Vec<String> {
    doc.root
        .attr(attr)
        .map(|value| {
            value
                .split(',')
                .map(|piece| piece.trim().trim_start_matches('0').to_string())
                .filter(|piece| !piece.is_empty() && piece.chars().all(|c| c.is_ascii_digit()))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_month(name: &str) -> Option<u32> {
    if let Ok(n) = name.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let months = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    months
        .iter()
        .position(|m| name.eq_ignore_ascii_case(m))
        .map(|i| i as u32 + 1)
}
