use crate::classifier::ExtensionSet;
use crate::error::{InspectorError, Result};
use crate::processor::{is_binary, search_file};
use crate::search::{Diagnostic, DiagnosticKind, MatchRecord, SearchOptions};
use log::{debug, warn};
use rayon::prelude::*;
use regex::Regex;
use std::cmp::Ordering as CmpOrdering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use walkdir::{DirEntry, WalkDir};

/// Receives progress notifications while a tree is scanned.
pub trait ScanObserver: Sync {
    fn on_candidates(&self, _total: usize) {}
    fn on_file_scanned(&self, _path: &Path, _matches: usize) {}
}

impl ScanObserver for () {}

/// A file selected for scanning, with its location relative to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub folder: String,
    pub file: String,
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub candidates: Vec<Candidate>,
    pub diagnostics: Vec<Diagnostic>,
    /// Enumeration stopped early because the search was cancelled.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
pub struct WalkOutput {
    pub matches: Vec<MatchRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
}

enum FileScan {
    Matched(Vec<MatchRecord>),
    Skipped,
    Failed(Diagnostic),
    Cancelled,
}

pub struct TreeWalker {
    root: PathBuf,
    extensions: ExtensionSet,
    options: SearchOptions,
}

impl TreeWalker {
    /// Validates and canonicalizes `root`. Fails before anything is scanned.
    pub fn new(root: &Path, extensions: ExtensionSet, options: SearchOptions) -> Result<Self> {
        let canonical = fs::canonicalize(root).map_err(|e| {
            InspectorError::Configuration(format!(
                "search root '{}' is not accessible: {e}",
                root.display()
            ))
        })?;
        if !canonical.is_dir() {
            return Err(InspectorError::Configuration(format!(
                "search root '{}' is not a directory",
                root.display()
            )));
        }
        fs::read_dir(&canonical).map_err(|e| {
            InspectorError::Configuration(format!(
                "search root '{}' cannot be listed: {e}",
                root.display()
            ))
        })?;

        Ok(Self {
            root: canonical,
            extensions,
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerates candidate files depth-first: within each directory, files
    /// come before subdirectories and both are ordered by name.
    pub fn candidates(&self) -> WalkReport {
        let mut report = WalkReport::default();
        let exclude = &self.options.exclude_dirs;

        let walker = WalkDir::new(&self.root)
            .follow_links(self.options.follow_links)
            .sort_by(files_first_by_name)
            .into_iter()
            .filter_entry(|entry| {
                !(entry.depth() > 0
                    && entry.file_type().is_dir()
                    && exclude
                        .iter()
                        .any(|name| entry.file_name().to_string_lossy() == name.as_str()))
            });

        for entry in walker {
            if self.is_cancelled() {
                debug!("Enumeration cancelled under {}", self.root.display());
                report.cancelled = true;
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report.diagnostics.push(walk_diagnostic(&self.root, &e));
                    continue;
                }
            };

            if !is_regular_file(&entry) {
                continue;
            }

            let file = entry.file_name().to_string_lossy().into_owned();
            if !self.extensions.is_candidate(&file) {
                continue;
            }

            report.candidates.push(Candidate {
                folder: self.relative_folder(entry.path()),
                path: entry.into_path(),
                file,
            });
        }

        report
    }

    /// Walks the tree and scans every candidate with `pattern`.
    ///
    /// Files may be scanned in parallel; results are merged back in traversal
    /// order so repeated runs over an unchanged tree produce the same list.
    pub fn walk(&self, pattern: &Regex, observer: &dyn ScanObserver) -> Result<WalkOutput> {
        let WalkReport {
            candidates,
            mut diagnostics,
            cancelled,
        } = self.candidates();
        if cancelled {
            return Err(InspectorError::Cancelled);
        }
        observer.on_candidates(candidates.len());
        debug!(
            "{} candidate files under {}",
            candidates.len(),
            self.root.display()
        );

        let workers = self.options.threads.unwrap_or_else(num_cpus::get).max(1);
        let chunk_size = (candidates.len() / workers).max(1);
        let scan_all = || -> Vec<FileScan> {
            candidates
                .par_iter()
                .with_min_len(chunk_size)
                .map(|candidate| {
                    let scan = self.scan_candidate(candidate, pattern);
                    match &scan {
                        FileScan::Matched(records) => {
                            observer.on_file_scanned(&candidate.path, records.len())
                        }
                        FileScan::Skipped | FileScan::Failed(_) => {
                            observer.on_file_scanned(&candidate.path, 0)
                        }
                        FileScan::Cancelled => {}
                    }
                    scan
                })
                .collect()
        };

        let scans = match self.options.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .build()
                .map_err(|e| InspectorError::Other(format!("failed to build thread pool: {e}")))?
                .install(scan_all),
            None => scan_all(),
        };

        let mut output = WalkOutput::default();
        for scan in scans {
            match scan {
                FileScan::Matched(records) => {
                    output.files_scanned += 1;
                    output.matches.extend(records);
                }
                FileScan::Skipped => {}
                FileScan::Failed(diagnostic) => diagnostics.push(diagnostic),
                FileScan::Cancelled => return Err(InspectorError::Cancelled),
            }
        }
        output.diagnostics = diagnostics;
        Ok(output)
    }

    fn is_cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .is_some_and(|cancel| cancel.load(Ordering::Relaxed))
    }

    fn scan_candidate(&self, candidate: &Candidate, pattern: &Regex) -> FileScan {
        if self.is_cancelled() {
            return FileScan::Cancelled;
        }

        let path = &candidate.path;
        if let Some(max) = self.options.max_file_size {
            if let Ok(metadata) = path.metadata() {
                if metadata.len() > max {
                    warn!(
                        "Skipping large file ({} bytes): {}",
                        metadata.len(),
                        path.display()
                    );
                    return FileScan::Skipped;
                }
            }
        }

        if self.options.skip_binary && is_binary(path) {
            warn!("Skipping binary file: {}", path.display());
            return FileScan::Skipped;
        }

        let records: Vec<MatchRecord> = match search_file(path, pattern) {
            Ok(lines) => lines
                .into_iter()
                .map(|(line, text)| MatchRecord {
                    folder: candidate.folder.clone(),
                    file: candidate.file.clone(),
                    line,
                    text,
                })
                .collect(),
            Err(e) => return FileScan::Failed(read_failure(path, &e)),
        };
        debug!("{}: {} matches", path.display(), records.len());
        FileScan::Matched(records)
    }

    fn relative_folder(&self, path: &Path) -> String {
        path.parent()
            .and_then(|parent| parent.strip_prefix(&self.root).ok())
            .map(|rel| rel.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn files_first_by_name(a: &DirEntry, b: &DirEntry) -> CmpOrdering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn read_failure(path: &Path, e: &InspectorError) -> Diagnostic {
    warn!("{e}");
    Diagnostic {
        path: path.to_path_buf(),
        kind: DiagnosticKind::Read,
        message: match e {
            InspectorError::FileRead { source, .. } => source.to_string(),
            other => other.to_string(),
        },
    }
}

fn walk_diagnostic(root: &Path, e: &walkdir::Error) -> Diagnostic {
    let path = e.path().unwrap_or(root).to_path_buf();
    if let Some(ancestor) = e.loop_ancestor() {
        warn!(
            "Skipping symlink cycle: {} points back to {}",
            path.display(),
            ancestor.display()
        );
        Diagnostic {
            path,
            kind: DiagnosticKind::Cycle,
            message: format!("symlink cycle back to {}", ancestor.display()),
        }
    } else {
        warn!("Failed to walk {}: {e}", path.display());
        Diagnostic {
            path,
            kind: DiagnosticKind::Walk,
            message: e.to_string(),
        }
    }
}
