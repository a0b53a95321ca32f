//! Extension filter deciding which files take part in a search.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default suffixes used when the caller supplies none.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".html", ".hbs"];

/// Ordered, deduplicated set of file-name suffixes.
///
/// Suffixes are compared exactly as given: `".hbs"` and `"hbs"` are different
/// entries and no case folding takes place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            extensions
                .into_iter()
                .map(Into::into)
                .filter(|e: &String| !e.is_empty())
                .collect(),
        )
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub fn is_candidate(&self, file_name: &str) -> bool {
        is_candidate(file_name, self)
    }
}

impl<S: Into<String>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Returns true iff `file_name` ends with one of `extensions`.
///
/// An empty set matches nothing.
pub fn is_candidate(file_name: &str, extensions: &ExtensionSet) -> bool {
    extensions.iter().any(|ext| file_name.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_match() {
        let exts = ExtensionSet::new([".hbs"]);
        assert!(is_candidate("a.hbs", &exts));
        assert!(!is_candidate("a.hbs.bak", &exts));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let exts = ExtensionSet::default();
        assert!(!is_candidate("a.html", &exts));
        assert!(!is_candidate("", &exts));
    }

    #[test]
    fn no_normalization() {
        let exts = ExtensionSet::new([".html"]);
        assert!(!exts.is_candidate("INDEX.HTML"));

        // Without a leading dot the suffix is matched literally.
        let bare = ExtensionSet::new(["html"]);
        assert!(bare.is_candidate("index.html"));
        assert!(bare.is_candidate("xhtml"));
    }

    #[test]
    fn empty_strings_are_dropped() {
        let exts = ExtensionSet::new(["", ".hbs", ".hbs"]);
        assert_eq!(exts.len(), 1);
        assert!(!exts.is_candidate("README"));
    }
}
