//! Workbook edition ingest
//!
//! Fetches edition and weekly program pages, parses them into week programs
//! and stores them per issue. Issues are processed one after another with a
//! pause in between.

mod fetcher;
mod service;
mod types;

pub use fetcher::{HttpFetcher, SourceFetcher};
pub use service::IngestService;
pub use types::{IngestError, IngestQuery, IngestSummary, IssueReport, PullMode};
