//! Previously run searches, most recent first.
use crate::error::{InspectorError, Result};
use crate::search::SearchMode;
use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTORY_PATH: &str = "reports/history.json";
pub const DEFAULT_MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub repo: PathBuf,
    pub pattern: String,
    pub extensions: Vec<String>,
    /// Absent in entries written before modes were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchMode>,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Local>>,
}

impl HistoryEntry {
    pub fn new(
        repo: impl Into<PathBuf>,
        pattern: impl Into<String>,
        extensions: Vec<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            pattern: pattern.into(),
            extensions,
            mode: None,
            ignore_case: false,
            timestamp: Some(Local::now()),
        }
    }

    pub fn with_matching(mut self, mode: SearchMode, ignore_case: bool) -> Self {
        self.mode = Some(mode);
        self.ignore_case = ignore_case;
        self
    }

    /// Two entries describe the same search when repo, pattern and
    /// extensions are equal; mode, case and timestamps are ignored.
    pub fn same_search(&self, other: &HistoryEntry) -> bool {
        self.repo == other.repo
            && self.pattern == other.pattern
            && self.extensions == other.extensions
    }

    /// Short one-line label for menus.
    pub fn label(&self) -> String {
        let when = self
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut flags = self.mode.map(|m| m.to_string()).unwrap_or_default();
        if self.ignore_case {
            flags.push_str(if flags.is_empty() { "-i" } else { " -i" });
        }
        if !flags.is_empty() {
            flags = format!(" <{flags}>");
        }
        format!(
            "{}{} ({}) [{}] {}",
            self.pattern,
            flags,
            self.repo.display(),
            self.extensions.join(" "),
            when
        )
    }
}

pub trait SearchHistory {
    fn load(&self) -> Result<Vec<HistoryEntry>>;
    /// Upserts `entry` at the front, dropping older entries for the same search.
    fn record(&self, entry: HistoryEntry) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// History persisted as a pretty-printed JSON array.
pub struct JsonHistoryStore {
    path: PathBuf,
    max_entries: usize,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let io_error = |source| InspectorError::HistoryIo {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| InspectorError::History(e.to_string()))?;
        fs::write(&self.path, content).map_err(io_error)
    }
}

impl SearchHistory for JsonHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|source| InspectorError::HistoryIo {
                path: self.path.clone(),
                source,
            })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            InspectorError::History(format!("{} is not valid history: {e}", self.path.display()))
        })
    }

    fn record(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.load()?;
        entries.retain(|existing| !existing.same_search(&entry));
        entries.insert(0, entry);
        entries.truncate(self.max_entries);
        debug!(
            "Saving {} history entries to {}",
            entries.len(),
            self.path.display()
        );
        self.save(&entries)
    }

    fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("none/history.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn record_moves_duplicate_to_front() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("reports/history.json"));
        store
            .record(HistoryEntry::new("/repo", "foo", exts(&[".html"])))
            .unwrap();
        store
            .record(HistoryEntry::new("/repo", "bar", exts(&[".html"])))
            .unwrap();
        store
            .record(HistoryEntry::new("/repo", "foo", exts(&[".html"])))
            .unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pattern, "foo");
        assert_eq!(entries[1].pattern, "bar");
    }

    #[test]
    fn different_extensions_are_distinct() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        store
            .record(HistoryEntry::new("/repo", "foo", exts(&[".html"])))
            .unwrap();
        store
            .record(HistoryEntry::new("/repo", "foo", exts(&[".html", ".hbs"])))
            .unwrap();
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn truncates_to_max_entries() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json")).with_max_entries(2);
        for pattern in ["a", "b", "c"] {
            store
                .record(HistoryEntry::new("/repo", pattern, exts(&[".hbs"])))
                .unwrap();
        }
        let patterns: Vec<_> = store
            .load()
            .unwrap()
            .into_iter()
            .map(|e| e.pattern)
            .collect();
        assert_eq!(patterns, vec!["c", "b"]);
    }

    #[test]
    fn reads_entries_without_timestamp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"[{"repo": "/r", "pattern": "foo", "extensions": [".html", ".hbs"]}]"#,
        )
        .unwrap();
        let entries = JsonHistoryStore::new(&path).load().unwrap();
        assert_eq!(entries[0].timestamp, None);
        assert_eq!(entries[0].mode, None);
        assert!(!entries[0].ignore_case);
        assert!(entries[0].label().ends_with(" -"));
    }

    #[test]
    fn mode_and_case_survive_reload() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        store
            .record(
                HistoryEntry::new("/repo", "a.b(", exts(&[".html"]))
                    .with_matching(SearchMode::Text, true),
            )
            .unwrap();
        let entry = &store.load().unwrap()[0];
        assert_eq!(entry.mode, Some(SearchMode::Text));
        assert!(entry.ignore_case);
        assert!(entry.label().starts_with("a.b( <text -i> (/repo)"));
    }

    #[test]
    fn mode_change_replaces_same_search() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        store
            .record(HistoryEntry::new("/repo", "foo", exts(&[".html"])))
            .unwrap();
        store
            .record(
                HistoryEntry::new("/repo", "foo", exts(&[".html"]))
                    .with_matching(SearchMode::Word, false),
            )
            .unwrap();
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mode, Some(SearchMode::Word));
    }

    #[test]
    fn corrupt_file_is_history_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonHistoryStore::new(&path).load(),
            Err(InspectorError::History(_))
        ));
    }

    #[test]
    fn clear_empties_history() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        store
            .record(HistoryEntry::new("/repo", "foo", exts(&[".html"])))
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
