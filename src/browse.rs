//! Directory browsing for choosing a search root interactively.
use crate::error::{InspectorError, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use std::fs;
use std::path::{Path, PathBuf};

/// What the user chose while browsing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    /// Use the directory currently shown.
    UseCurrent,
    /// Descend into the subdirectory at this index.
    Enter(usize),
    /// Go to the parent directory.
    Up,
}

/// Capability to present subdirectories and get a choice back.
pub trait DirectoryPicker {
    fn pick(&self, current: &Path, subdirectories: &[PathBuf]) -> Result<Pick>;
}

/// Immediate subdirectories of `path`, sorted by name.
pub fn list_subdirectories(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Lets `picker` walk the tree starting at `start` until it settles on a directory.
pub fn browse(start: &Path, picker: &dyn DirectoryPicker) -> Result<PathBuf> {
    let mut current = fs::canonicalize(start).map_err(|e| {
        InspectorError::Configuration(format!("cannot browse '{}': {e}", start.display()))
    })?;
    loop {
        let subdirectories = list_subdirectories(&current)?;
        match picker.pick(&current, &subdirectories)? {
            Pick::UseCurrent => return Ok(current),
            Pick::Enter(index) => match subdirectories.get(index) {
                Some(next) => current = next.clone(),
                None => log::warn!("Invalid choice {index}, staying in {}", current.display()),
            },
            Pick::Up => {
                if let Some(parent) = current.parent() {
                    current = parent.to_path_buf();
                }
            }
        }
    }
}

/// Terminal picker backed by a dialoguer menu.
pub struct DialoguerPicker;

impl DirectoryPicker for DialoguerPicker {
    fn pick(&self, current: &Path, subdirectories: &[PathBuf]) -> Result<Pick> {
        let mut items = vec!["[use this folder]".to_string(), "[..]".to_string()];
        items.extend(subdirectories.iter().map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        }));

        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Browsing {}", current.display()))
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| InspectorError::Other(format!("prompt failed: {e}")))?;

        Ok(match choice {
            0 => Pick::UseCurrent,
            1 => Pick::Up,
            n => Pick::Enter(n - 2),
        })
    }
}
