//! # rfcnits Library
//!
//! An async Rust library for checking IETF Internet-Drafts and RFCs for
//! structural and editorial nits, with remote metadata lookups against the
//! datatracker and per-run memoization.

pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod finding;
pub mod output;
pub mod patterns;
pub mod remote;
pub mod rules;
pub mod txt;
pub mod xml;

pub use cli::{Cli, OutputFormat};
pub use document::{Document, TxtDocument, XmlDocument};
pub use engine::{FileInfo, Report, ValidationEngine};
pub use error::{NitsError, Result};
pub use finding::{Finding, Mode, Severity, SeverityPolicy};
pub use output::Output;
pub use remote::{
    DraftInfo, HttpMetadataSource, MetadataSource, OfflineMetadataSource, RemoteConfig, RfcInfo,
    StaticMetadataSource,
};
pub use rules::RunOptions;
