//! Sorting by filename prefix: `A01.pdf` into `ubung/`, `Math3.pdf` into
//! `vorlesung/`, and so on.

use crate::batch::{SortReport, sort_into_categories};
use crate::config::{CompiledFilters, PrefixRule, SorterConfig};
use crate::error::Result;
use crate::events::RouterObserver;
use crate::relocator::Relocator;
use crate::router::list_files;
use std::path::Path;

#[derive(Debug)]
pub struct PrefixSorter {
    rules: Vec<PrefixRule>,
    filters: CompiledFilters,
    relocator: Relocator,
}

impl PrefixSorter {
    /// Uses the configured rules followed by `extra_rules`.
    pub fn new(config: &SorterConfig, extra_rules: &[PrefixRule], dry_run: bool) -> Result<Self> {
        let rules = config
            .prefix
            .rules
            .iter()
            .chain(extra_rules)
            .cloned()
            .collect();
        Ok(Self {
            rules,
            filters: config.compile_filters()?,
            relocator: Relocator::new(dry_run),
        })
    }

    /// Folder of the first rule whose prefix starts `file_name` (case-sensitive).
    pub fn folder_for(&self, file_name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| file_name.starts_with(&rule.prefix))
            .map(|rule| rule.folder.as_str())
    }

    /// Moves matching files directly inside `dir` into `dir/<folder>/`.
    /// Files no rule matches stay where they are.
    pub fn run(&self, dir: &Path, observer: &mut dyn RouterObserver) -> Result<SortReport> {
        let files = list_files(dir, &self.filters, observer)?;
        sort_into_categories(dir, dir, files, self.relocator, observer, |path| {
            let name = path.file_name()?.to_string_lossy();
            self.folder_for(&name).map(str::to_string)
        })
    }
}
