//! Prompt-driven front end: replay a previous search or enter a new one.
use crate::browse::{browse, DirectoryPicker};
use crate::error::{InspectorError, Result};
use crate::history::{HistoryEntry, SearchHistory};
use crate::search::SearchMode;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::info;
use std::path::PathBuf;

/// Parameters gathered from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptedSearch {
    pub repo: PathBuf,
    pub pattern: String,
    pub extensions: Vec<String>,
    /// `None` means the configured default mode.
    pub mode: Option<SearchMode>,
    pub ignore_case: bool,
}

impl From<HistoryEntry> for PromptedSearch {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            repo: entry.repo,
            pattern: entry.pattern,
            extensions: entry.extensions,
            mode: entry.mode,
            ignore_case: entry.ignore_case,
        }
    }
}

/// Splits whitespace- or comma-separated suffixes, falling back to `defaults`.
pub fn parse_extensions(input: &str, defaults: &[String]) -> Vec<String> {
    let parsed: Vec<String> = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        defaults.to_vec()
    } else {
        parsed
    }
}

pub struct InteractiveSession<'a> {
    history: &'a dyn SearchHistory,
    picker: &'a dyn DirectoryPicker,
    default_extensions: Vec<String>,
    theme: ColorfulTheme,
}

impl<'a> InteractiveSession<'a> {
    pub fn new(
        history: &'a dyn SearchHistory,
        picker: &'a dyn DirectoryPicker,
        default_extensions: Vec<String>,
    ) -> Self {
        Self {
            history,
            picker,
            default_extensions,
            theme: ColorfulTheme::default(),
        }
    }

    pub fn prompt(&self) -> Result<PromptedSearch> {
        println!("{}", "Repository Inspector".green().bold());
        println!("{}", "-".repeat(24).dimmed());

        let entries = match self.history.load() {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("{}", format!("Ignoring unreadable history: {e}").yellow());
                Vec::new()
            }
        };

        if !entries.is_empty() {
            if let Some(entry) = self.pick_from_history(entries)? {
                info!("Replaying '{}' in {}", entry.pattern, entry.repo.display());
                return Ok(entry.into());
            }
        }

        self.prompt_new()
    }

    fn pick_from_history(&self, mut entries: Vec<HistoryEntry>) -> Result<Option<HistoryEntry>> {
        println!("\n{}", "Search history:".cyan());
        let reuse = Confirm::with_theme(&self.theme)
            .with_prompt("Use a previous search?")
            .default(false)
            .interact()
            .map_err(prompt_error)?;
        if !reuse {
            return Ok(None);
        }

        let labels: Vec<String> = entries.iter().map(HistoryEntry::label).collect();
        let index = Select::with_theme(&self.theme)
            .with_prompt("Previous searches")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(Some(entries.swap_remove(index)))
    }

    fn prompt_new(&self) -> Result<PromptedSearch> {
        let start: String = Input::with_theme(&self.theme)
            .with_prompt("Path to repo")
            .default(".".to_string())
            .interact_text()
            .map_err(prompt_error)?;
        let repo = browse(&PathBuf::from(start.trim()), self.picker)?;

        let pattern: String = Input::with_theme(&self.theme)
            .with_prompt("Search pattern (regex)")
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                if input.trim().is_empty() {
                    Err("pattern must not be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map_err(prompt_error)?;

        let ext_input: String = Input::with_theme(&self.theme)
            .with_prompt(format!(
                "File extensions (default: {})",
                self.default_extensions.join(" ")
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;

        Ok(PromptedSearch {
            repo,
            pattern: pattern.trim().to_string(),
            extensions: parse_extensions(&ext_input, &self.default_extensions),
            mode: None,
            ignore_case: false,
        })
    }
}

fn prompt_error(e: dialoguer::Error) -> InspectorError {
    InspectorError::Other(format!("prompt failed: {e}"))
}
