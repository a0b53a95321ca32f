//! Command dispatch shared by the binary's subcommands.
use crate::blame::{attribute, GitBlame};
use crate::browse::DialoguerPicker;
use crate::classifier::ExtensionSet;
use crate::cli::{Cli, Commands};
use crate::config::{megabytes, Config};
use crate::error::{InspectorError, Result};
use crate::history::{HistoryEntry, JsonHistoryStore, SearchHistory};
use crate::interactive::InteractiveSession;
use crate::output_formats::{ReportFormat, ReportWriter};
use crate::progress::{ProgressReporter, ProgressStats};
use crate::search::{run_search_with_observer, SearchOptions, SearchOutcome, SearchRequest};
use clap::CommandFactory;
use colored::*;
use is_terminal::IsTerminal;
use log::warn;
use regex::Regex;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Everything needed to run one search and hand its results on.
pub struct SearchJob {
    pub request: SearchRequest,
    pub options: SearchOptions,
    pub formats: Vec<ReportFormat>,
    pub output_dir: PathBuf,
    pub write_reports: bool,
    /// Attribute matches with `git blame` in the reports.
    pub blame: bool,
    pub record_history: bool,
    pub preview_limit: usize,
}

pub struct InspectorApp {
    config: Config,
    cancel: Arc<AtomicBool>,
}

impl InspectorApp {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raising this flag stops a running search between file visits.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn history_store(&self) -> JsonHistoryStore {
        JsonHistoryStore::new(&self.config.history.path)
            .with_max_entries(self.config.history.max_entries)
    }

    fn base_job(&self, request: SearchRequest) -> SearchJob {
        let mut options = self.config.search.to_options();
        options.cancel = Some(self.cancel.clone());
        SearchJob {
            request,
            options,
            formats: self.config.report.formats.clone(),
            output_dir: self.config.report.output_dir.clone(),
            write_reports: true,
            blame: self.config.report.blame,
            record_history: true,
            preview_limit: self.config.report.preview_limit,
        }
    }

    pub fn run(&self, cli: &Cli) -> Result<()> {
        match &cli.command {
            Commands::Search {
                pattern,
                path,
                mode,
                ignore_case,
                extensions,
                format,
                output_dir,
                no_report,
                no_history,
                blame,
                follow_links,
                skip_binary,
                max_size,
                threads,
                limit,
            } => {
                let extensions = extensions
                    .clone()
                    .unwrap_or_else(|| self.config.search.default_extensions.clone());
                let request = SearchRequest::new(path, pattern, ExtensionSet::new(extensions))
                    .with_mode(mode.unwrap_or(self.config.search.default_mode))
                    .with_ignore_case(*ignore_case);

                let mut job = self.base_job(request);
                job.options.follow_links |= *follow_links;
                job.options.skip_binary |= *skip_binary;
                if let Some(mb) = max_size {
                    job.options.max_file_size = Some(megabytes(*mb));
                }
                if threads.is_some() {
                    job.options.threads = *threads;
                }
                if let Some(formats) = format {
                    job.formats = formats.clone();
                }
                if let Some(dir) = output_dir {
                    job.output_dir = dir.clone();
                }
                if let Some(limit) = limit {
                    job.preview_limit = *limit;
                }
                job.write_reports = !*no_report;
                job.record_history = !*no_history;
                job.blame |= *blame;
                self.handle_search(job).map(|_| ())
            }
            Commands::History { clear } => self.handle_history(*clear),
            Commands::Replay { index, no_report } => self.handle_replay(*index, *no_report),
            Commands::Interactive => self.handle_interactive(),
            Commands::Completions { shell } => {
                let mut cmd = Cli::command();
                clap_complete::generate(*shell, &mut cmd, "repo-inspector", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    /// Runs the search, prints a preview, then writes reports and history.
    /// Report and history failures are printed and do not fail the search.
    pub fn handle_search(&self, job: SearchJob) -> Result<SearchOutcome> {
        let highlighter = job.request.compile()?;
        let progress = if std::io::stderr().is_terminal() {
            ProgressReporter::new()
        } else {
            ProgressReporter::hidden()
        };
        println!("{}", "Searching...".yellow());
        let outcome = run_search_with_observer(&job.request, &job.options, &progress);
        let stats = progress.finish();
        let outcome = outcome?;

        print_outcome(&outcome, &stats, &highlighter, job.preview_limit);

        if job.write_reports {
            let mut writer = ReportWriter::new(&job.output_dir);
            if job.blame {
                println!("{}", "Looking up authors...".yellow());
                let lookup = GitBlame::new(&outcome.root);
                let authors = attribute(&outcome.root, &outcome.matches, &lookup);
                writer = writer.with_authors(authors);
            }
            match writer.write_all(&job.formats, &outcome.matches, &outcome.summary) {
                Ok(paths) if !paths.is_empty() => println!(
                    "\n{} {}",
                    "Reports written to".green(),
                    writer.output_dir().display()
                ),
                Ok(_) => {}
                Err(e) => {
                    warn!("{e}");
                    eprintln!("{}", format!("Warning: {e}").yellow());
                }
            }
        }

        if job.record_history {
            let entry = HistoryEntry::new(
                outcome.root.clone(),
                job.request.pattern(),
                job.request.extensions().to_vec(),
            )
            .with_matching(job.request.mode(), job.request.ignore_case());
            if let Err(e) = self.history_store().record(entry) {
                warn!("{e}");
                eprintln!("{}", format!("Warning: {e}").yellow());
            }
        }

        Ok(outcome)
    }

    fn handle_history(&self, clear: bool) -> Result<()> {
        let store = self.history_store();
        if clear {
            store.clear()?;
            println!("{}", "History cleared".green());
            return Ok(());
        }

        let entries = store.load()?;
        if entries.is_empty() {
            println!("{}", "No previous searches".yellow());
        }
        for (i, entry) in entries.iter().enumerate() {
            println!("{}. {}", i + 1, entry.label());
        }
        Ok(())
    }

    fn handle_replay(&self, index: usize, no_report: bool) -> Result<()> {
        let entries = self.history_store().load()?;
        let entry = index
            .checked_sub(1)
            .and_then(|i| entries.get(i))
            .ok_or_else(|| {
                InspectorError::Configuration(format!(
                    "no history entry {index} ({} available)",
                    entries.len()
                ))
            })?;

        let request = SearchRequest::new(
            &entry.repo,
            &entry.pattern,
            ExtensionSet::new(entry.extensions.iter().cloned()),
        )
        .with_mode(entry.mode.unwrap_or(self.config.search.default_mode))
        .with_ignore_case(entry.ignore_case);
        let mut job = self.base_job(request);
        job.write_reports = !no_report;
        self.handle_search(job).map(|_| ())
    }

    fn handle_interactive(&self) -> Result<()> {
        let store = self.history_store();
        let session = InteractiveSession::new(
            &store,
            &DialoguerPicker,
            self.config.search.default_extensions.clone(),
        );
        let prompted = session.prompt()?;
        let request = SearchRequest::new(
            prompted.repo,
            prompted.pattern,
            ExtensionSet::new(prompted.extensions),
        )
        .with_mode(prompted.mode.unwrap_or(self.config.search.default_mode))
        .with_ignore_case(prompted.ignore_case);
        self.handle_search(self.base_job(request)).map(|_| ())
    }
}

fn print_outcome(
    outcome: &SearchOutcome,
    stats: &ProgressStats,
    highlighter: &Regex,
    limit: usize,
) {
    if outcome.matches.is_empty() {
        println!("{}", "No matches found".yellow());
    } else {
        println!(
            "\n{} {} {}",
            "Found".green(),
            outcome.summary.total.to_string().bold(),
            "matches:".green()
        );
        for m in outcome.matches.iter().take(limit) {
            println!(
                "{}:{} → {}",
                m.location().display().to_string().green(),
                m.line,
                highlight(&m.text, highlighter)
            );
        }
        if outcome.matches.len() > limit {
            println!(
                "{}",
                format!("... and {} more", outcome.matches.len() - limit).dimmed()
            );
        }
    }
    println!(
        "{}",
        format!(
            "{} of {} files matched in {:.2?}",
            stats.files_with_matches,
            outcome.files_scanned,
            stats.elapsed()
        )
        .dimmed()
    );

    if !outcome.diagnostics.is_empty() {
        eprintln!("\n{}", "Errors encountered during processing:".red().bold());
        for diagnostic in &outcome.diagnostics {
            eprintln!("{}", diagnostic.to_string().red());
        }
    }
}

/// Colors every pattern hit in `text`.
fn highlight(text: &str, pattern: &Regex) -> String {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for m in pattern.find_iter(text) {
        output.push_str(&text[last..m.start()]);
        output.push_str(&m.as_str().red().bold().to_string());
        last = m.end();
    }
    output.push_str(&text[last..]);
    output
}
