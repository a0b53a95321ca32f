//! Pipeline entry point: request validation, pattern compilation, walking and
//! aggregation.
use crate::aggregate::{summarize, Summary};
use crate::classifier::ExtensionSet;
use crate::error::{InspectorError, Result};
use crate::walker::{ScanObserver, TreeWalker};
use clap::ValueEnum;
use log::info;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Regex,
    Text,
    Word,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Regex => write!(f, "regex"),
            SearchMode::Text => write!(f, "text"),
            SearchMode::Word => write!(f, "word"),
        }
    }
}

/// One search: where to look, what to look for, and which files qualify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    root: PathBuf,
    pattern: String,
    extensions: ExtensionSet,
    mode: SearchMode,
    ignore_case: bool,
}

impl SearchRequest {
    pub fn new(
        root: impl Into<PathBuf>,
        pattern: impl Into<String>,
        extensions: ExtensionSet,
    ) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
            extensions,
            mode: SearchMode::default(),
            ignore_case: false,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Compiles the pattern according to the request's mode.
    pub fn compile(&self) -> Result<Regex> {
        if self.pattern.trim().is_empty() {
            return Err(InspectorError::Configuration(
                "search pattern must not be empty".to_string(),
            ));
        }
        let source = match self.mode {
            SearchMode::Regex => self.pattern.clone(),
            SearchMode::Text => regex::escape(&self.pattern),
            SearchMode::Word => format!(r"\b{}\b", regex::escape(&self.pattern)),
        };
        RegexBuilder::new(&source)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|source| InspectorError::Pattern {
                pattern: self.pattern.clone(),
                source,
            })
    }
}

/// Traversal and scanning knobs, passed explicitly into every search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub follow_links: bool,
    pub skip_binary: bool,
    /// Files larger than this many bytes are skipped.
    pub max_file_size: Option<u64>,
    /// Directory names that are never descended into.
    pub exclude_dirs: Vec<String>,
    pub threads: Option<usize>,
    pub cancel: Option<Arc<AtomicBool>>,
}

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Parent directory relative to the search root; empty for files directly under it.
    pub folder: String,
    pub file: String,
    /// 1-based.
    pub line: usize,
    #[serde(alias = "match")]
    pub text: String,
}

impl MatchRecord {
    /// `folder/file`, or just `file` at the root.
    pub fn location(&self) -> PathBuf {
        Path::new(&self.folder).join(&self.file)
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} → {}", self.location().display(), self.line, self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Read,
    Walk,
    Cycle,
}

/// A recoverable problem met during a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::Read => "read error",
            DiagnosticKind::Walk => "walk error",
            DiagnosticKind::Cycle => "cycle skipped",
        };
        write!(f, "{kind}: {}: {}", self.path.display(), self.message)
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub root: PathBuf,
    pub matches: Vec<MatchRecord>,
    pub summary: Summary,
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
}

pub fn run_search(request: &SearchRequest, options: &SearchOptions) -> Result<SearchOutcome> {
    run_search_with_observer(request, options, &())
}

pub fn run_search_with_observer(
    request: &SearchRequest,
    options: &SearchOptions,
    observer: &dyn ScanObserver,
) -> Result<SearchOutcome> {
    let started = Instant::now();
    let pattern = request.compile()?;
    let walker = TreeWalker::new(&request.root, request.extensions.clone(), options.clone())?;
    info!(
        "Searching {} for '{}' ({} mode) in [{}]",
        walker.root().display(),
        request.pattern,
        request.mode,
        request.extensions.iter().collect::<Vec<_>>().join(" ")
    );

    let output = walker.walk(&pattern, observer)?;
    let summary = summarize(&output.matches);
    info!(
        "Found {} matches in {} files ({} diagnostics) in {:.2?}",
        summary.total,
        output.files_scanned,
        output.diagnostics.len(),
        started.elapsed()
    );

    Ok(SearchOutcome {
        root: walker.root().to_path_buf(),
        matches: output.matches,
        summary,
        diagnostics: output.diagnostics,
        files_scanned: output.files_scanned,
    })
}
