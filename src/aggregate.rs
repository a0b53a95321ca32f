//! Match counts by file, by immediate directory, and rolled up over every
//! ancestor directory.
use crate::search::MatchRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, MAIN_SEPARATOR_STR};

/// Key used for matches that sit directly under the search root.
pub const ROOT_FOLDER: &str = ".";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    /// Keyed by base file name only: `a/index.html` and `b/index.html` share a key.
    pub per_file: BTreeMap<String, usize>,
    pub per_directory: BTreeMap<String, usize>,
    /// Every ancestor directory with the number of matches at or below it.
    pub full_directory: BTreeMap<String, usize>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Share of `total` as a percentage, 0 when there are no matches.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// Entries of `counts` ordered by descending count, then key.
    pub fn ranked(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
        let mut ranked: Vec<_> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

pub fn summarize(matches: &[MatchRecord]) -> Summary {
    let mut summary = Summary {
        total: matches.len(),
        ..Summary::default()
    };

    for m in matches {
        *summary.per_file.entry(m.file.clone()).or_insert(0) += 1;

        let segments = folder_segments(&m.folder);
        if segments.is_empty() {
            *summary
                .per_directory
                .entry(ROOT_FOLDER.to_string())
                .or_insert(0) += 1;
            *summary
                .full_directory
                .entry(ROOT_FOLDER.to_string())
                .or_insert(0) += 1;
            continue;
        }

        *summary
            .per_directory
            .entry(segments.join(MAIN_SEPARATOR_STR))
            .or_insert(0) += 1;
        for depth in 1..=segments.len() {
            *summary
                .full_directory
                .entry(segments[..depth].join(MAIN_SEPARATOR_STR))
                .or_insert(0) += 1;
        }
    }

    summary
}

fn folder_segments(folder: &str) -> Vec<String> {
    Path::new(folder)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(folder: &str, file: &str, line: usize) -> MatchRecord {
        MatchRecord {
            folder: folder.to_string(),
            file: file.to_string(),
            line,
            text: "foo".to_string(),
        }
    }

    fn key(parts: &[&str]) -> String {
        parts.join(MAIN_SEPARATOR_STR)
    }

    #[test]
    fn empty_input_has_no_keys() {
        let summary = summarize(&[]);
        assert_eq!(summary, Summary::default());
        assert!(summary.is_empty());
    }

    #[test]
    fn deep_match_credits_every_ancestor_once() {
        let folder = key(&["a", "b", "c"]);
        let summary = summarize(&[record(&folder, "x.html", 1)]);
        assert_eq!(summary.full_directory.len(), 3);
        assert_eq!(summary.full_directory["a"], 1);
        assert_eq!(summary.full_directory[&key(&["a", "b"])], 1);
        assert_eq!(summary.full_directory[&folder], 1);
        assert_eq!(summary.per_directory[&folder], 1);
    }

    #[test]
    fn parent_equals_union_of_children() {
        let summary = summarize(&[
            record(&key(&["src", "ui"]), "a.hbs", 1),
            record(&key(&["src", "ui"]), "a.hbs", 2),
            record(&key(&["src", "api"]), "b.html", 1),
            record("src", "c.html", 9),
        ]);
        assert_eq!(summary.full_directory["src"], 4);
        assert_eq!(summary.full_directory[&key(&["src", "ui"])], 2);
        assert_eq!(summary.full_directory[&key(&["src", "api"])], 1);
        assert_eq!(summary.per_directory["src"], 1);
    }

    #[test]
    fn root_level_matches_use_dot() {
        let summary = summarize(&[record("", "index.html", 1), record("a", "x.html", 1)]);
        assert_eq!(summary.per_directory[ROOT_FOLDER], 1);
        assert_eq!(summary.full_directory[ROOT_FOLDER], 1);
        assert_eq!(summary.full_directory["a"], 1);
    }

    #[test]
    fn same_file_name_in_different_directories_shares_key() {
        let summary = summarize(&[record("a", "index.html", 1), record("b", "index.html", 1)]);
        assert_eq!(summary.per_file.len(), 1);
        assert_eq!(summary.per_file["index.html"], 2);
        assert_eq!(summary.per_directory.len(), 2);
    }

    #[test]
    fn ranked_orders_by_count() {
        let summary = summarize(&[
            record("a", "x.html", 1),
            record("b", "y.html", 1),
            record("b", "y.html", 2),
        ]);
        assert_eq!(
            Summary::ranked(&summary.per_directory),
            vec![("b", 2), ("a", 1)]
        );
        assert!((summary.percentage(2) - 66.666).abs() < 0.01);
    }
}
