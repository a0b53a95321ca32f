//! Line authorship from `git blame`, used to annotate reports.
use crate::search::MatchRecord;
use log::debug;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const UNKNOWN_AUTHOR: &str = "Unknown";

pub trait AuthorLookup: Sync {
    /// Last author of `line` (1-based) in `file`, if it can be determined.
    fn author(&self, file: &Path, line: usize) -> Option<String>;
}

/// Asks the `git` executable, run from inside the repository.
pub struct GitBlame {
    repo: PathBuf,
}

impl GitBlame {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }
}

impl AuthorLookup for GitBlame {
    fn author(&self, file: &Path, line: usize) -> Option<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(["blame", "--porcelain", "-L"])
            .arg(format!("{line},{line}"))
            .arg("--")
            .arg(file)
            .output();
        match output {
            Ok(output) if output.status.success() => {
                porcelain_author(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                debug!(
                    "git blame {}:{} failed: {}",
                    file.display(),
                    line,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                None
            }
            Err(e) => {
                debug!("Could not run git: {e}");
                None
            }
        }
    }
}

/// Extracts the `author` header from `git blame --porcelain` output.
pub fn porcelain_author(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("author "))
        .map(|author| author.trim().to_string())
        .filter(|author| !author.is_empty())
}

/// One author per match, in match order. Lines that cannot be attributed
/// get [`UNKNOWN_AUTHOR`].
pub fn attribute(root: &Path, matches: &[MatchRecord], lookup: &dyn AuthorLookup) -> Vec<String> {
    matches
        .par_iter()
        .map(|m| {
            lookup
                .author(&root.join(m.location()), m.line)
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
        })
        .collect()
}
