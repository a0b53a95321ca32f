use crate::aggregate::Summary;
use crate::error::{InspectorError, Result};
use crate::search::MatchRecord;
use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format types
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
    Csv,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }

    pub fn formatter(&self) -> Box<dyn ReportFormatter> {
        match self {
            ReportFormat::Text => Box::new(TextFormatter),
            ReportFormat::Json => Box::new(JsonFormatter),
            ReportFormat::Markdown => Box::new(MarkdownFormatter),
            ReportFormat::Csv => Box::new(CsvFormatter),
            ReportFormat::Html => Box::new(HtmlFormatter),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Html => write!(f, "html"),
        }
    }
}

/// Trait for output formatters
pub trait ReportFormatter: Send + Sync {
    fn format_matches(&self, matches: &[MatchRecord]) -> Result<String>;
    fn format_summary(&self, summary: &Summary) -> Result<String>;
    fn name(&self) -> &str;

    /// Match listing with one author per match. Formats without an author
    /// column ignore `authors`.
    fn format_matches_with_authors(
        &self,
        matches: &[MatchRecord],
        _authors: &[String],
    ) -> Result<String> {
        self.format_matches(matches)
    }
}

/// `folder/file:line → text`, one match per line.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format_matches(&self, matches: &[MatchRecord]) -> Result<String> {
        let mut output = String::new();
        for m in matches {
            output.push_str(&format!("{m}\n"));
        }
        Ok(output)
    }

    fn format_summary(&self, summary: &Summary) -> Result<String> {
        let mut output = format!("Total matches: {}\n", summary.total);
        let sections = [
            ("Matches by file", &summary.per_file),
            ("Matches by directory", &summary.per_directory),
            ("Directory roll-up", &summary.full_directory),
        ];
        for (title, counts) in sections {
            output.push_str(&format!("\n{title}:\n"));
            for (key, count) in Summary::ranked(counts) {
                output.push_str(&format!("  {key}: {count}\n"));
            }
        }
        Ok(output)
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// JSON formatter
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_matches(&self, matches: &[MatchRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(matches)?)
    }

    fn format_summary(&self, summary: &Summary) -> Result<String> {
        Ok(serde_json::to_string_pretty(summary)?)
    }

    fn name(&self) -> &str {
        "json"
    }
}

pub struct MarkdownFormatter;

impl MarkdownFormatter {
    fn count_table(
        output: &mut String,
        title: &str,
        column: &str,
        summary: &Summary,
        counts: &BTreeMap<String, usize>,
    ) {
        output.push_str(&format!("## {title}\n\n"));
        output.push_str(&format!("| {column} | Count | Percentage |\n"));
        output.push_str("|------|-------|------------|\n");
        for (key, count) in Summary::ranked(counts) {
            output.push_str(&format!(
                "| `{}` | {} | {:.2}% |\n",
                escape_markdown_cell(key),
                count,
                summary.percentage(count)
            ));
        }
        output.push('\n');
    }
}

impl MarkdownFormatter {
    fn match_table(matches: &[MatchRecord], authors: Option<&[String]>) -> String {
        let mut output = String::from("| Folder | File | Line | Match |");
        if authors.is_some() {
            output.push_str(" Author |");
        }
        output.push_str("\n|--------|------|------|-------|");
        if authors.is_some() {
            output.push_str("--------|");
        }
        output.push('\n');
        for (i, m) in matches.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {} | `{}` |",
                escape_markdown_cell(&m.folder),
                escape_markdown_cell(&m.file),
                m.line,
                escape_markdown_cell(&m.text)
            ));
            if let Some(authors) = authors {
                let author = authors.get(i).map(String::as_str).unwrap_or_default();
                output.push_str(&format!(" {} |", escape_markdown_cell(author)));
            }
            output.push('\n');
        }
        output
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format_matches(&self, matches: &[MatchRecord]) -> Result<String> {
        Ok(Self::match_table(matches, None))
    }

    fn format_matches_with_authors(
        &self,
        matches: &[MatchRecord],
        authors: &[String],
    ) -> Result<String> {
        Ok(Self::match_table(matches, Some(authors)))
    }

    fn format_summary(&self, summary: &Summary) -> Result<String> {
        let mut output = String::from("# Search Summary\n\n");
        output.push_str(&format!("**Total Matches:** {}\n\n", summary.total));
        Self::count_table(&mut output, "Matches by File", "File", summary, &summary.per_file);
        Self::count_table(
            &mut output,
            "Matches by Directory",
            "Directory",
            summary,
            &summary.per_directory,
        );
        Self::count_table(
            &mut output,
            "Directory Roll-up",
            "Directory",
            summary,
            &summary.full_directory,
        );
        Ok(output)
    }

    fn name(&self) -> &str {
        "markdown"
    }
}

pub struct CsvFormatter;

impl ReportFormatter for CsvFormatter {
    fn format_matches(&self, matches: &[MatchRecord]) -> Result<String> {
        let mut output = String::from("folder,file,line,text\n");
        for m in matches {
            output.push_str(&format!(
                "{},{},{},{}\n",
                escape_csv(&m.folder),
                escape_csv(&m.file),
                m.line,
                escape_csv(&m.text)
            ));
        }
        Ok(output)
    }

    fn format_summary(&self, summary: &Summary) -> Result<String> {
        let mut output = String::from("scope,key,count\n");
        let scopes = [
            ("file", &summary.per_file),
            ("directory", &summary.per_directory),
            ("rollup", &summary.full_directory),
        ];
        for (scope, counts) in scopes {
            for (key, count) in counts {
                output.push_str(&format!("{scope},{},{count}\n", escape_csv(key)));
            }
        }
        Ok(output)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Standalone HTML pages with the same tables as the Markdown reports.
pub struct HtmlFormatter;

impl HtmlFormatter {
    fn page(title: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
        )
    }

    fn row(cells: &[String], tag: &str) -> String {
        let cells: String = cells
            .iter()
            .map(|cell| format!("<{tag}>{cell}</{tag}>"))
            .collect();
        format!("<tr>{cells}</tr>\n")
    }

    fn match_table(matches: &[MatchRecord], authors: Option<&[String]>) -> String {
        let mut header: Vec<String> = ["Folder", "File", "Line", "Match"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        if authors.is_some() {
            header.push("Author".to_string());
        }
        let mut body = String::from("<h1>Search Report</h1>\n<table>\n");
        body.push_str(&Self::row(&header, "th"));
        for (i, m) in matches.iter().enumerate() {
            let mut cells = vec![
                escape_html(&m.folder),
                escape_html(&m.file),
                m.line.to_string(),
                format!("<code>{}</code>", escape_html(&m.text)),
            ];
            if let Some(authors) = authors {
                cells.push(escape_html(authors.get(i).map(String::as_str).unwrap_or_default()));
            }
            body.push_str(&Self::row(&cells, "td"));
        }
        body.push_str("</table>\n");
        Self::page("Search Report", &body)
    }

    fn count_table(
        body: &mut String,
        title: &str,
        column: &str,
        summary: &Summary,
        counts: &BTreeMap<String, usize>,
    ) {
        body.push_str(&format!("<h2>{title}</h2>\n<table>\n"));
        let header = [column.to_string(), "Count".into(), "Percentage".into()];
        body.push_str(&Self::row(&header, "th"));
        for (key, count) in Summary::ranked(counts) {
            let cells = [
                format!("<code>{}</code>", escape_html(key)),
                count.to_string(),
                format!("{:.2}%", summary.percentage(count)),
            ];
            body.push_str(&Self::row(&cells, "td"));
        }
        body.push_str("</table>\n");
    }
}

impl ReportFormatter for HtmlFormatter {
    fn format_matches(&self, matches: &[MatchRecord]) -> Result<String> {
        Ok(Self::match_table(matches, None))
    }

    fn format_matches_with_authors(
        &self,
        matches: &[MatchRecord],
        authors: &[String],
    ) -> Result<String> {
        Ok(Self::match_table(matches, Some(authors)))
    }

    fn format_summary(&self, summary: &Summary) -> Result<String> {
        let mut body = String::from("<h1>Search Summary</h1>\n");
        body.push_str(&format!(
            "<p><strong>Total Matches:</strong> {}</p>\n",
            summary.total
        ));
        Self::count_table(&mut body, "Matches by File", "File", summary, &summary.per_file);
        Self::count_table(
            &mut body,
            "Matches by Directory",
            "Directory",
            summary,
            &summary.per_directory,
        );
        Self::count_table(
            &mut body,
            "Directory Roll-up",
            "Directory",
            summary,
            &summary.full_directory,
        );
        Ok(Self::page("Search Summary", &body))
    }

    fn name(&self) -> &str {
        "html"
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape the table delimiter so a cell never splits a row.
fn escape_markdown_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Writes match and summary reports into an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
    authors: Option<Vec<String>>,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            authors: None,
        }
    }

    /// Adds an author column, one entry per match, where the format has one.
    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = Some(authors);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `search_report.<ext>` and `search_summary.<ext>` for each
    /// format and returns the written paths.
    pub fn write_all(
        &self,
        formats: &[ReportFormat],
        matches: &[MatchRecord],
        summary: &Summary,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for format in formats {
            let formatter = format.formatter();
            debug!("Writing {} reports", formatter.name());
            let listing = match &self.authors {
                Some(authors) => formatter.format_matches_with_authors(matches, authors)?,
                None => formatter.format_matches(matches)?,
            };
            let report = self
                .output_dir
                .join(format!("search_report.{}", format.extension()));
            write_file(&report, &listing)?;
            written.push(report);

            let summary_path = self
                .output_dir
                .join(format!("search_summary.{}", format.extension()));
            write_file(&summary_path, &formatter.format_summary(summary)?)?;
            written.push(summary_path);
        }
        info!(
            "Wrote {} report files to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let emitter_error = |source| InspectorError::Emitter {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(emitter_error)?;
    }
    fs::write(path, content).map_err(emitter_error)
}
