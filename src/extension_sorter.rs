//! One-shot sorting of a downloads-style folder into category directories
//! by file extension.
//!
//! Short or marked audio files are split off from the audio category as
//! sound effects, and subdirectories of the folder are gathered into a
//! folders category.

use crate::batch::{SortReport, sort_into_categories};
use crate::config::{CompiledFilters, DownloadSettings, SorterConfig};
use crate::error::Result;
use crate::events::RouterObserver;
use crate::file_category::FileMapper;
use crate::relocator::{Relocator, same_dir};
use crate::router::{list_files, list_subdirs};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Moves the entries directly inside a directory into `<dest>/<category>/`.
#[derive(Debug)]
pub struct ExtensionSorter {
    mapper: FileMapper,
    downloads: DownloadSettings,
    filters: CompiledFilters,
    relocator: Relocator,
}

impl ExtensionSorter {
    pub fn new(config: &SorterConfig, dry_run: bool) -> Result<Self> {
        Ok(Self {
            mapper: FileMapper::from_table(&config.extensions),
            downloads: config.downloads.clone(),
            filters: config.compile_filters()?,
            relocator: Relocator::new(dry_run),
        })
    }

    /// Category directory for a file.
    pub fn category_for(&self, path: &Path) -> String {
        let category = self.mapper.categorize(path);
        if category == self.downloads.audio_category && self.is_sound_effect(path) {
            return self.downloads.sfx_category.clone();
        }
        category.to_string()
    }

    fn is_sound_effect(&self, path: &Path) -> bool {
        let settings = &self.downloads;
        if settings.sfx_category.is_empty() {
            return false;
        }
        let marked = !settings.sfx_name_marker.is_empty()
            && path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(&settings.sfx_name_marker));
        marked || fs::metadata(path).is_ok_and(|meta| meta.len() < settings.sfx_max_bytes)
    }

    /// Names of the directories this sorter fills.
    fn output_dirs(&self) -> BTreeSet<&str> {
        let mut names = self.mapper.categories();
        for extra in [&self.downloads.sfx_category, &self.downloads.folders_category] {
            if !extra.is_empty() {
                names.insert(extra.as_str());
            }
        }
        names
    }

    /// Subdirectories of `dir` to gather into the folders category. Output
    /// directories and any directory holding `dest` stay put.
    fn movable_subdirs(
        &self,
        dir: &Path,
        dest: &Path,
        observer: &mut dyn RouterObserver,
    ) -> Result<Vec<PathBuf>> {
        if self.downloads.folders_category.is_empty() {
            return Ok(Vec::new());
        }

        let in_place = same_dir(dir, dest);
        let outputs = self.output_dirs();
        let dest = fs::canonicalize(dest).unwrap_or_else(|_| dest.to_path_buf());

        Ok(list_subdirs(dir, &self.filters, observer)?
            .into_iter()
            .filter(|sub| {
                let is_output = in_place
                    && sub
                        .file_name()
                        .is_some_and(|name| outputs.contains(&*name.to_string_lossy()));
                let holds_dest = fs::canonicalize(sub).is_ok_and(|sub| dest.starts_with(sub));
                !is_output && !holds_dest
            })
            .collect())
    }

    /// Sorts `dir`. Category directories go under `dest`, or under `dir`
    /// itself when `dest` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::Access` if `dir` cannot be listed.
    pub fn run(
        &self,
        dir: &Path,
        dest: Option<&Path>,
        observer: &mut dyn RouterObserver,
    ) -> Result<SortReport> {
        let dest = dest.unwrap_or(dir);
        let mut entries = list_files(dir, &self.filters, observer)?;
        entries.extend(self.movable_subdirs(dir, dest, observer)?);

        sort_into_categories(dir, dest, entries, self.relocator, observer, |path| {
            if path.is_dir() {
                Some(self.downloads.folders_category.clone())
            } else {
                Some(self.category_for(path))
            }
        })
    }
}
