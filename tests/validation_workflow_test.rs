//! End-to-end validation runs over plain-text documents: parse, rule fanout,
//! report assembly, and output rendering.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;

use rfcnits::cli::OutputFormat;
use rfcnits::finding::{Mode, Severity};
use rfcnits::remote::{RfcInfo, StaticMetadataSource};
use rfcnits::rules::RunOptions;
use rfcnits::{Output, ValidationEngine};

/// A draft with every required section genuinely present and no formatting
/// problems.
const CLEAN_DRAFT: &str = "\
Network Working Group                                             J. Doe
Internet-Draft                                               Example Org
Intended status: Informational                            26 August 2026
Expires: 27 February 2027

                          The Example Protocol
                      draft-doe-example-protocol-00

1.  Introduction

   This document describes the Example Protocol.

2.  Security Considerations

   This document raises no new security concerns.

3.  IANA Considerations

   This document has no IANA actions.

4.  References

4.1.  Normative References

   [RFC2119]  Bradner, S., \"Key words for use in RFCs\".

Authors' Addresses

   J. Doe
   Example Org
";

fn fixture_options(mode: Mode) -> RunOptions {
    RunOptions {
        mode,
        expected_year: None,
        today: NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(),
    }
}

fn metadata_with_rfc2119() -> StaticMetadataSource {
    let mut rfcs = HashMap::new();
    rfcs.insert(
        "2119".to_string(),
        RfcInfo {
            status: Some("Best Current Practice".to_string()),
            obsoleted_by: Vec::new(),
            updated_by: Vec::new(),
        },
    );
    StaticMetadataSource {
        rfcs,
        drafts: HashMap::new(),
        downref_registry: HashSet::new(),
    }
}

fn write_draft(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("draft.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

async fn run(contents: &str, mode: Mode, remote: StaticMetadataSource) -> rfcnits::Report {
    let dir = tempfile::tempdir().unwrap();
    let path = write_draft(&dir, contents);
    ValidationEngine::new(Arc::new(remote), fixture_options(mode))
        .validate_file(&path)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_clean_draft_passes() {
    let report = run(CLEAN_DRAFT, Mode::Normal, metadata_with_rfc2119()).await;
    let errors: Vec<_> = report
        .nits
        .iter()
        .filter(|n| n.severity == Severity::Error)
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert!(report.passed());
}

#[tokio::test]
async fn test_missing_sections_fail_in_normal_mode() {
    let bare = "Internet-Draft                          J. Doe\n\n\
                Title\nslug\n\nSome body text here.\n";
    let report = run(bare, Mode::Normal, metadata_with_rfc2119()).await;
    assert!(!report.passed());

    let codes: Vec<_> = report.nits.iter().map(|n| n.code).collect();
    for expected in [
        "MISSING_INTRODUCTION_SECTION",
        "MISSING_SECURITY_SECTION",
        "MISSING_REFERENCES_SECTION",
        "MISSING_AUTHOR_SECTION",
    ] {
        assert!(codes.contains(&expected), "missing {expected} in {codes:?}");
    }
}

#[tokio::test]
async fn test_mode_monotonicity() {
    let bare = "Internet-Draft                          J. Doe\n\n\
                Title\nslug\n\nSome body text here.\n";

    let normal = run(bare, Mode::Normal, metadata_with_rfc2119()).await;
    let forgive = run(bare, Mode::ForgiveChecklist, metadata_with_rfc2119()).await;
    let submission = run(bare, Mode::Submission, metadata_with_rfc2119()).await;

    // Same codes in Normal and ForgiveChecklist, severity only drops.
    let normal_codes: HashSet<_> = normal.nits.iter().map(|n| n.code).collect();
    let forgive_codes: HashSet<_> = forgive.nits.iter().map(|n| n.code).collect();
    assert_eq!(normal_codes, forgive_codes);
    assert!(forgive.nits.iter().all(|n| n.severity < Severity::Error));

    // Submission reports a subset of Normal's codes.
    let submission_codes: HashSet<_> = submission.nits.iter().map(|n| n.code).collect();
    assert!(submission_codes.is_subset(&normal_codes));
}

#[tokio::test]
async fn test_downref_draft_property() {
    let with_draft_ref = "\
Internet-Draft                                                    J. Doe

                                 Title
                      draft-doe-example-protocol-00

1.  Introduction

   Content.

2.  Security Considerations

   Content.

3.  References

3.1.  Normative References

   [draft-doe-weak-00]  Doe, J., \"A weak dependency\".

Authors' Addresses

   J. Doe
";
    let mut remote = metadata_with_rfc2119();
    remote.downref_registry.insert("draft-doe-weak".to_string());

    let normal = run(with_draft_ref, Mode::Normal, remote.clone()).await;
    let hits: Vec<_> = normal
        .nits
        .iter()
        .filter(|n| n.code == "DOWNREF_DRAFT")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].severity, Severity::Error);

    let forgive = run(with_draft_ref, Mode::ForgiveChecklist, remote.clone()).await;
    assert!(
        forgive
            .nits
            .iter()
            .any(|n| n.code == "DOWNREF_DRAFT" && n.severity == Severity::Warning)
    );

    let submission = run(with_draft_ref, Mode::Submission, remote).await;
    assert!(!submission.nits.iter().any(|n| n.code == "DOWNREF_DRAFT"));
}

#[tokio::test]
async fn test_obsolete_reference_names_replacement() {
    let mut remote = metadata_with_rfc2119();
    remote.rfcs.insert(
        "2119".to_string(),
        RfcInfo {
            status: Some("Best Current Practice".to_string()),
            obsoleted_by: vec!["9000".to_string()],
            updated_by: Vec::new(),
        },
    );

    let report = run(CLEAN_DRAFT, Mode::Normal, remote).await;
    let finding = report
        .nits
        .iter()
        .find(|n| n.code == "OBSOLETE_DOCUMENT")
        .expect("obsolete reference should be reported");
    assert!(finding.message.contains("replaced by: 9000"));
    assert!(!report.passed());
}

#[tokio::test]
async fn test_line_too_long_stays_visible_at_submission() {
    let contents = format!("{CLEAN_DRAFT}\n   {}\n", "x".repeat(75));

    let normal = run(&contents, Mode::Normal, metadata_with_rfc2119()).await;
    assert!(
        normal
            .nits
            .iter()
            .any(|n| n.code == "LINE_TOO_LONG" && n.severity == Severity::Error)
    );

    let submission = run(&contents, Mode::Submission, metadata_with_rfc2119()).await;
    assert!(
        submission
            .nits
            .iter()
            .any(|n| n.code == "LINE_TOO_LONG" && n.severity == Severity::Warning)
    );
}

#[tokio::test]
async fn test_json_output_shape() {
    let bare = "Internet-Draft                          J. Doe\n\n\
                Title\nslug\n\nSome body text here.\n";
    let report = run(bare, Mode::Normal, metadata_with_rfc2119()).await;
    let rendered = Output::new(OutputFormat::Json).format_report(&report);

    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["result"], "fail");
    assert!(value["file"]["path"].as_str().unwrap().ends_with("draft.txt"));
    assert!(value["file"]["size"].as_u64().unwrap() > 0);
    let nits = value["nits"].as_array().unwrap();
    assert!(!nits.is_empty());
    for nit in nits {
        assert!(nit["code"].is_string());
        assert!(nit["desc"].is_string());
    }
}
