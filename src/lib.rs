//! Search a directory tree for lines matching a pattern and aggregate the
//! hits per file, per directory, and rolled up over every ancestor directory.
//!
//! ```no_run
//! use repo_inspector::{run_search, ExtensionSet, SearchOptions, SearchRequest};
//!
//! let request = SearchRequest::new("site", r"\{\{>\s*header", ExtensionSet::defaults());
//! let outcome = run_search(&request, &SearchOptions::default())?;
//! println!("{} matches", outcome.summary.total);
//! # Ok::<(), repo_inspector::error::InspectorError>(())
//! ```
pub mod aggregate;
pub mod app;
pub mod blame;
pub mod browse;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod interactive;
pub mod output_formats;
pub mod processor;
pub mod progress;
pub mod search;
pub mod walker;

pub use crate::error::Result;
pub use aggregate::{summarize, Summary};
pub use classifier::{is_candidate, ExtensionSet};
pub use clap::Parser;
pub use cli::{Cli, Commands};
pub use history::{HistoryEntry, JsonHistoryStore, SearchHistory};
pub use output_formats::{ReportFormat, ReportFormatter, ReportWriter};
pub use processor::{scan_file, LineMatches};
pub use search::{
    run_search, run_search_with_observer, Diagnostic, DiagnosticKind, MatchRecord, SearchMode,
    SearchOptions, SearchOutcome, SearchRequest,
};
pub use walker::{ScanObserver, TreeWalker};
