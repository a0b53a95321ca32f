use criterion::{criterion_group, criterion_main, Criterion};
use repo_inspector::{run_search, summarize, ExtensionSet, SearchOptions, SearchRequest};
use std::fs;
use std::hint::black_box;
use tempfile::TempDir;

fn build_tree() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for d in 0..8 {
        for s in 0..4 {
            let dir = temp_dir.path().join(format!("pages{d}/partials{s}"));
            fs::create_dir_all(&dir).expect("Failed to create test dir");
            for f in 0..10 {
                let body = (0..200)
                    .map(|i| {
                        if i % 17 == 0 {
                            format!("<div>{{{{> header title=\"{i}\"}}}}</div>\n")
                        } else {
                            format!("<p>line {i}</p>\n")
                        }
                    })
                    .collect::<String>();
                fs::write(dir.join(format!("view{f}.hbs")), body).expect("Failed to write test file");
            }
        }
    }
    temp_dir
}

fn criterion_benchmark(c: &mut Criterion) {
    let tree = build_tree();
    let request = SearchRequest::new(tree.path(), r"\{\{>\s*header", ExtensionSet::defaults());

    c.bench_function("search_tree", |b| {
        b.iter(|| run_search(black_box(&request), &SearchOptions::default()))
    });

    let single = SearchOptions {
        threads: Some(1),
        ..SearchOptions::default()
    };
    c.bench_function("search_tree_single_thread", |b| {
        b.iter(|| run_search(black_box(&request), &single))
    });

    let matches = run_search(&request, &SearchOptions::default())
        .expect("search failed")
        .matches;
    c.bench_function("summarize", |b| b.iter(|| summarize(black_box(&matches))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
