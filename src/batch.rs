//! Shared loop for the category sorters: classify each file, move it into
//! `<dest>/<category>/`, and record what happened.

use crate::error::Result;
use crate::events::{RouterEvent, RouterObserver};
use crate::relocator::{Relocation, Relocator, ensure_directory};
use crate::router::relocation_event;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Moved { to: PathBuf },
    Planned { to: PathBuf },
    AlreadyInPlace,
    /// No category applies; the file stays.
    Unmatched,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub category: Option<String>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Result of one extension or prefix sorting pass.
#[derive(Debug, Clone, Serialize)]
pub struct SortReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub dir: PathBuf,
    pub files: Vec<FileRecord>,
    /// Files moved (or planned) per category.
    pub category_counts: BTreeMap<String, usize>,
    pub unmatched: usize,
    pub failed: usize,
}

impl SortReport {
    pub fn sorted(&self) -> usize {
        self.category_counts.values().sum()
    }
}

/// Moves each of `files` into the category directory `classify` names
/// for it, creating that directory under `dest` when needed.
pub(crate) fn sort_into_categories<F>(
    dir: &Path,
    dest: &Path,
    files: Vec<PathBuf>,
    relocator: Relocator,
    observer: &mut dyn RouterObserver,
    mut classify: F,
) -> Result<SortReport>
where
    F: FnMut(&Path) -> Option<String>,
{
    let started_at = Utc::now();
    observer.on_event(&RouterEvent::FilesFound {
        dir: dir.to_path_buf(),
        count: files.len(),
    });

    let mut report = SortReport {
        started_at,
        dry_run: relocator.is_dry_run(),
        dir: dir.to_path_buf(),
        files: Vec::with_capacity(files.len()),
        category_counts: BTreeMap::new(),
        unmatched: 0,
        failed: 0,
    };

    for path in files {
        let Some(category) = classify(&path) else {
            report.unmatched += 1;
            report.files.push(FileRecord {
                path,
                category: None,
                outcome: FileOutcome::Unmatched,
            });
            continue;
        };
        observer.on_event(&RouterEvent::Categorized {
            file: path.clone(),
            category: category.clone(),
        });

        let outcome = move_into(&path, &dest.join(&category), relocator, observer);
        match outcome {
            FileOutcome::Moved { .. } | FileOutcome::Planned { .. } => {
                *report.category_counts.entry(category.clone()).or_insert(0) += 1;
            }
            FileOutcome::Failed { .. } => report.failed += 1,
            FileOutcome::AlreadyInPlace | FileOutcome::Unmatched => {}
        }
        report.files.push(FileRecord {
            path,
            category: Some(category),
            outcome,
        });
    }

    Ok(report)
}

fn move_into(
    path: &Path,
    category_dir: &Path,
    relocator: Relocator,
    observer: &mut dyn RouterObserver,
) -> FileOutcome {
    if !relocator.is_dry_run()
        && let Err(err) = ensure_directory(category_dir)
    {
        let error = err.to_string();
        observer.on_event(&RouterEvent::MoveFailed {
            file: path.to_path_buf(),
            error: error.clone(),
        });
        return FileOutcome::Failed { error };
    }

    match relocator.relocate(path, category_dir) {
        Ok(relocation) => {
            observer.on_event(&relocation_event(&relocation));
            match relocation {
                Relocation::Moved { to, .. } => FileOutcome::Moved { to },
                Relocation::Planned { to, .. } => FileOutcome::Planned { to },
                Relocation::AlreadyInPlace { .. } => FileOutcome::AlreadyInPlace,
            }
        }
        Err(err) => {
            let error = err.to_string();
            observer.on_event(&RouterEvent::MoveFailed {
                file: path.to_path_buf(),
                error: error.clone(),
            });
            FileOutcome::Failed { error }
        }
    }
}
