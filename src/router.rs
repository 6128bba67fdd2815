//! Routes notes from a source directory into the folder tree by their tags.
//!
//! For each note: extract tags, drop date tags, pick the deepest folder one
//! of the remaining tags names, and move the note there. A note that cannot
//! be read or moved is recorded and skipped; only an unreadable source or
//! root directory stops the run.

use crate::config::{CompiledFilters, SorterConfig};
use crate::error::{ExtractionError, Result, RouterError};
use crate::events::{RouterEvent, RouterObserver};
use crate::folder_index::FolderIndex;
use crate::relocator::{Relocation, Relocator};
use crate::selector::select_best;
use crate::tags::{DateTagFilter, extract_tags};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Moved { to: PathBuf, tag: String },
    Planned { to: PathBuf, tag: String },
    AlreadyInPlace { tag: String },
    NoTags,
    /// Every tag looked like a date.
    OnlyDateTags { ignored: Vec<String> },
    Unreadable { error: String },
    NoMatch { tags: Vec<String> },
    Failed { to: PathBuf, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
}

/// Per-run counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub moved: usize,
    pub planned: usize,
    pub already_in_place: usize,
    /// No usable tags: none found, only dates, or the file could not be read.
    pub skipped_no_tags: usize,
    pub skipped_no_match: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &DocumentOutcome) {
        match outcome {
            DocumentOutcome::Moved { .. } => self.moved += 1,
            DocumentOutcome::Planned { .. } => self.planned += 1,
            DocumentOutcome::AlreadyInPlace { .. } => self.already_in_place += 1,
            DocumentOutcome::NoTags
            | DocumentOutcome::OnlyDateTags { .. }
            | DocumentOutcome::Unreadable { .. } => self.skipped_no_tags += 1,
            DocumentOutcome::NoMatch { .. } => self.skipped_no_match += 1,
            DocumentOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.moved
            + self.planned
            + self.already_in_place
            + self.skipped_no_tags
            + self.skipped_no_match
            + self.failed
    }
}

/// Result of one routing run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub source: PathBuf,
    pub root: PathBuf,
    pub folders_indexed: usize,
    pub documents: Vec<DocumentRecord>,
    pub summary: RunSummary,
}

/// Sorts notes into existing folders by tag.
#[derive(Debug)]
pub struct TagRouter {
    config: SorterConfig,
    filters: CompiledFilters,
    dates: DateTagFilter,
    relocator: Relocator,
}

impl TagRouter {
    /// Compiles the configured filters and date patterns.
    pub fn new(config: SorterConfig, dry_run: bool) -> Result<Self> {
        let filters = config.compile_filters()?;
        let dates = config.compile_date_filter()?;
        Ok(Self {
            config,
            filters,
            dates,
            relocator: Relocator::new(dry_run),
        })
    }

    /// Routes every document directly inside `source` into the folder tree
    /// under `root`.
    ///
    /// The document list is taken once up front; files appearing during the
    /// run are not picked up.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::Access` if `source` or `root` cannot be read.
    pub fn run(
        &self,
        source: &Path,
        root: &Path,
        observer: &mut dyn RouterObserver,
    ) -> Result<RunReport> {
        let started_at = Utc::now();

        let index = FolderIndex::build(root, &self.config.index.skip_dirs, Some(source))?;
        for skipped in index.skipped() {
            observer.on_event(&RouterEvent::DirectorySkipped {
                path: skipped.path.clone(),
                reason: skipped.reason.clone(),
            });
        }
        observer.on_event(&RouterEvent::IndexBuilt {
            root: index.root().to_path_buf(),
            folders: index.len(),
        });

        let documents: Vec<PathBuf> = list_files(source, &self.filters, observer)?
            .into_iter()
            .filter(|path| self.config.is_document(path))
            .collect();
        observer.on_event(&RouterEvent::FilesFound {
            dir: source.to_path_buf(),
            count: documents.len(),
        });

        let mut summary = RunSummary::default();
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let outcome = self.route(&document, &index, observer);
            summary.record(&outcome);
            records.push(DocumentRecord {
                path: document,
                outcome,
            });
        }

        Ok(RunReport {
            started_at,
            dry_run: self.relocator.is_dry_run(),
            source: source.to_path_buf(),
            root: index.root().to_path_buf(),
            folders_indexed: index.len(),
            documents: records,
            summary,
        })
    }

    /// Routes a single document. Never fails: every problem becomes an outcome.
    pub fn route(
        &self,
        document: &Path,
        index: &FolderIndex,
        observer: &mut dyn RouterObserver,
    ) -> DocumentOutcome {
        let content = match read_document(document) {
            Ok(content) => content,
            Err(err) => {
                let error = err.source.to_string();
                observer.on_event(&RouterEvent::ReadFailed {
                    document: document.to_path_buf(),
                    error: error.clone(),
                });
                return DocumentOutcome::Unreadable { error };
            }
        };

        let Some(extracted) = extract_tags(&content) else {
            observer.on_event(&RouterEvent::NoTags {
                document: document.to_path_buf(),
            });
            return DocumentOutcome::NoTags;
        };
        observer.on_event(&RouterEvent::TagsExtracted {
            document: document.to_path_buf(),
            tags: extracted.tags.clone(),
            source: extracted.source,
        });

        let (tags, ignored) = self.dates.partition(&extracted.tags);
        if !ignored.is_empty() {
            observer.on_event(&RouterEvent::DateTagsIgnored {
                document: document.to_path_buf(),
                ignored: ignored.clone(),
            });
        }
        if tags.is_empty() {
            return DocumentOutcome::OnlyDateTags { ignored };
        }

        let Some(best) = select_best(&tags, index) else {
            observer.on_event(&RouterEvent::NoMatch {
                document: document.to_path_buf(),
                tags: tags.clone(),
            });
            return DocumentOutcome::NoMatch { tags };
        };
        observer.on_event(&RouterEvent::MatchChosen {
            document: document.to_path_buf(),
            tag: best.tag.clone(),
            folder: best.folder.path.clone(),
            depth: best.folder.depth,
            kind: best.kind,
        });

        let tag = best.tag;
        match self.relocator.relocate(document, &best.folder.path) {
            Ok(relocation) => {
                observer.on_event(&relocation_event(&relocation));
                match relocation {
                    Relocation::Moved { to, .. } => DocumentOutcome::Moved { to, tag },
                    Relocation::Planned { to, .. } => DocumentOutcome::Planned { to, tag },
                    Relocation::AlreadyInPlace { .. } => DocumentOutcome::AlreadyInPlace { tag },
                }
            }
            Err(err) => {
                observer.on_event(&RouterEvent::MoveFailed {
                    file: document.to_path_buf(),
                    error: err.to_string(),
                });
                DocumentOutcome::Failed {
                    to: err.to,
                    error: err.source.to_string(),
                }
            }
        }
    }
}

fn read_document(path: &Path) -> std::result::Result<String, ExtractionError> {
    fs::read_to_string(path).map_err(|source| ExtractionError {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn relocation_event(relocation: &Relocation) -> RouterEvent {
    match relocation {
        Relocation::Moved { from, to } => RouterEvent::Moved {
            from: from.clone(),
            to: to.clone(),
        },
        Relocation::Planned { from, to } => RouterEvent::Planned {
            from: from.clone(),
            to: to.clone(),
        },
        Relocation::AlreadyInPlace { path } => RouterEvent::AlreadyInPlace { path: path.clone() },
    }
}

/// Regular files directly inside `dir` that pass `filters`, sorted by name.
///
/// Entries that cannot be inspected are reported as
/// [`RouterEvent::EntrySkipped`] and left out.
///
/// # Errors
///
/// Returns `RouterError::Access` if `dir` cannot be listed.
pub fn list_files(
    dir: &Path,
    filters: &CompiledFilters,
    observer: &mut dyn RouterObserver,
) -> Result<Vec<PathBuf>> {
    list_entries(dir, filters, observer, |t| t.is_file())
}

/// Subdirectories directly inside `dir` that pass `filters`, sorted by name.
pub fn list_subdirs(
    dir: &Path,
    filters: &CompiledFilters,
    observer: &mut dyn RouterObserver,
) -> Result<Vec<PathBuf>> {
    list_entries(dir, filters, observer, |t| t.is_dir())
}

fn list_entries(
    dir: &Path,
    filters: &CompiledFilters,
    observer: &mut dyn RouterObserver,
    wanted: fn(&fs::FileType) -> bool,
) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| RouterError::access(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let (path, err) = match entry {
            Ok(entry) => match entry.file_type() {
                Ok(file_type) => {
                    let path = entry.path();
                    if wanted(&file_type) && filters.should_include(&path) {
                        paths.push(path);
                    }
                    continue;
                }
                Err(err) => (entry.path(), err),
            },
            Err(err) => (dir.to_path_buf(), err),
        };
        observer.on_event(&RouterEvent::EntrySkipped {
            path,
            reason: err.to_string(),
        });
    }
    paths.sort();
    Ok(paths)
}
