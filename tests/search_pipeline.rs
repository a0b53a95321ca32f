use repo_inspector::{
    run_search, run_search_with_observer, DiagnosticKind, ExtensionSet, MatchRecord,
    ScanObserver, SearchOptions, SearchRequest,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn record(folder: &str, file: &str, line: usize, text: &str) -> MatchRecord {
    MatchRecord {
        folder: folder.to_string(),
        file: file.to_string(),
        line,
        text: text.to_string(),
    }
}

fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn html_hbs() -> ExtensionSet {
    ExtensionSet::new([".html", ".hbs"])
}

#[test]
fn two_directory_scenario() {
    let dir = TempDir::new().unwrap();
    let repo = dir.path().join("repo");
    write(&repo, "a/x.html", "foo\nbar foo\n");
    write(&repo, "b/y.hbs", "foo\n");

    let request = SearchRequest::new(&repo, "foo", html_hbs());
    let outcome = run_search(&request, &SearchOptions::default()).unwrap();

    assert_eq!(
        outcome.matches,
        vec![
            record("a", "x.html", 1, "foo"),
            record("a", "x.html", 2, "bar foo"),
            record("b", "y.hbs", 1, "foo"),
        ]
    );
    assert_eq!(outcome.summary.total, 3);
    assert_eq!(outcome.summary.per_file, counts(&[("x.html", 2), ("y.hbs", 1)]));
    assert_eq!(outcome.summary.per_directory, counts(&[("a", 2), ("b", 1)]));
    assert_eq!(outcome.summary.full_directory, counts(&[("a", 2), ("b", 1)]));
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.files_scanned, 2);
}

#[test]
fn no_matches_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/x.html", "foo\n");

    let request = SearchRequest::new(dir.path(), "zzz", html_hbs());
    let outcome = run_search(&request, &SearchOptions::default()).unwrap();

    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.summary.total, 0);
    assert!(outcome.summary.per_file.is_empty());
    assert!(outcome.summary.per_directory.is_empty());
    assert!(outcome.summary.full_directory.is_empty());
}

#[test]
fn empty_extension_set_scans_nothing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "x.html", "foo\n");

    let request = SearchRequest::new(dir.path(), "foo", ExtensionSet::default());
    let outcome = run_search(&request, &SearchOptions::default()).unwrap();
    assert_eq!(outcome.summary.total, 0);
    assert_eq!(outcome.files_scanned, 0);
}

#[test]
fn nested_matches_roll_up() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "index.html", "foo\n");
    write(dir.path(), "src/ui/deep/a.hbs", "foo\nfoo\n");
    write(dir.path(), "src/ui/b.hbs", "foo\n");
    write(dir.path(), "src/c.html", "no\n");

    let request = SearchRequest::new(dir.path(), "foo", html_hbs());
    let summary = run_search(&request, &SearchOptions::default())
        .unwrap()
        .summary;

    let sep = std::path::MAIN_SEPARATOR.to_string();
    let ui = ["src", "ui"].join(&sep);
    let deep = ["src", "ui", "deep"].join(&sep);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.full_directory["src"], 3);
    assert_eq!(summary.full_directory[&ui], 3);
    assert_eq!(summary.full_directory[&deep], 2);
    assert_eq!(summary.full_directory["."], 1);
    assert_eq!(summary.per_directory[&ui], 1);
    assert!(!summary.per_directory.contains_key("src"));
}

#[test]
fn repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    for i in 0..20 {
        write(
            dir.path(),
            &format!("d{}/sub{}/f{i}.html", i % 3, i % 4),
            &format!("foo {i}\nbar\nfoo again\n"),
        );
    }
    let request = SearchRequest::new(dir.path(), "foo", html_hbs());

    let parallel = SearchOptions::default();
    let single = SearchOptions {
        threads: Some(1),
        ..SearchOptions::default()
    };
    let first = run_search(&request, &parallel).unwrap();
    let second = run_search(&request, &parallel).unwrap();
    let sequential = run_search(&request, &single).unwrap();

    assert_eq!(first.matches.len(), 40);
    assert_eq!(first.matches, second.matches);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.matches, sequential.matches);
}

#[test]
fn relative_and_absolute_roots_agree() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/x.html", "foo\n");

    let plain = SearchRequest::new(dir.path(), "foo", html_hbs());
    let dotted = SearchRequest::new(dir.path().join("a").join(".."), "foo", html_hbs());
    let a = run_search(&plain, &SearchOptions::default()).unwrap();
    let b = run_search(&dotted, &SearchOptions::default()).unwrap();
    assert_eq!(a.matches, b.matches);
    assert_eq!(a.root, b.root);
}

#[test]
fn invalid_pattern_fails_before_scanning() {
    let dir = TempDir::new().unwrap();
    let request = SearchRequest::new(dir.path(), "(unclosed", html_hbs());
    let err = run_search(&request, &SearchOptions::default()).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("(unclosed"));
}

#[test]
fn missing_root_fails() {
    let dir = TempDir::new().unwrap();
    let request = SearchRequest::new(dir.path().join("nope"), "foo", html_hbs());
    let err = run_search(&request, &SearchOptions::default()).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn binary_files_can_be_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("blob.html"), b"foo\x00\x00\x00\x00\x00\x00\x00").unwrap();
    write(dir.path(), "page.html", "foo\n");

    let request = SearchRequest::new(dir.path(), "foo", html_hbs());
    let all = run_search(&request, &SearchOptions::default()).unwrap();
    let skipped = run_search(
        &request,
        &SearchOptions {
            skip_binary: true,
            ..SearchOptions::default()
        },
    )
    .unwrap();
    assert_eq!(all.summary.total, 2);
    assert_eq!(skipped.summary.total, 1);
    assert!(skipped.diagnostics.is_empty());
}

#[cfg(unix)]
#[test]
fn unreadable_file_is_diagnosed_and_others_still_match() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    for i in 0..10 {
        write(dir.path(), &format!("pages/p{i}.html"), "foo\n");
    }
    let locked = dir.path().join("pages/p3.html");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&locked).is_ok() {
        // Privileged users can read regardless of mode bits.
        return;
    }

    let request = SearchRequest::new(dir.path(), "foo", html_hbs());
    let outcome = run_search(&request, &SearchOptions::default()).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(outcome.summary.total, 9);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Read);
    assert!(outcome.diagnostics[0].path.ends_with("p3.html"));
}

/// Swaps a listed file for a directory of the same name once enumeration is
/// done, so opening it succeeds but reading fails.
struct ReplaceWithDirectory {
    target: PathBuf,
}

impl ScanObserver for ReplaceWithDirectory {
    fn on_candidates(&self, _total: usize) {
        fs::remove_file(&self.target).unwrap();
        fs::create_dir(&self.target).unwrap();
    }
}

#[test]
fn file_replaced_after_listing_is_diagnosed_and_others_still_match() {
    let dir = TempDir::new().unwrap();
    for i in 0..10 {
        write(dir.path(), &format!("pages/p{i}.html"), "foo\n");
    }
    let observer = ReplaceWithDirectory {
        target: dir.path().join("pages/p3.html"),
    };

    let request = SearchRequest::new(dir.path(), "foo", html_hbs());
    let outcome =
        run_search_with_observer(&request, &SearchOptions::default(), &observer).unwrap();

    assert_eq!(outcome.summary.total, 9);
    assert_eq!(outcome.files_scanned, 9);
    assert!(!outcome.matches.iter().any(|m| m.file == "p3.html"));
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Read);
    assert!(outcome.diagnostics[0].path.ends_with("p3.html"));
}
