//! Progress events emitted while sorting.
//!
//! Core code never prints. It reports what it is doing through a
//! [`RouterObserver`], and the caller decides what to show.

use crate::selector::MatchKind;
use crate::tags::TagSource;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterEvent {
    /// The folder index is ready.
    IndexBuilt { root: PathBuf, folders: usize },
    /// A directory under the root could not be read and was left out.
    DirectorySkipped { path: PathBuf, reason: String },
    /// An entry of a listed directory could not be inspected and was left out.
    EntrySkipped { path: PathBuf, reason: String },
    /// The batch of files to process is fixed.
    FilesFound { dir: PathBuf, count: usize },
    TagsExtracted {
        document: PathBuf,
        tags: Vec<String>,
        source: TagSource,
    },
    DateTagsIgnored {
        document: PathBuf,
        ignored: Vec<String>,
    },
    NoTags { document: PathBuf },
    ReadFailed { document: PathBuf, error: String },
    MatchChosen {
        document: PathBuf,
        tag: String,
        folder: PathBuf,
        depth: usize,
        kind: MatchKind,
    },
    NoMatch { document: PathBuf, tags: Vec<String> },
    /// A file was routed into a category by extension or name prefix.
    Categorized { file: PathBuf, category: String },
    Moved { from: PathBuf, to: PathBuf },
    Planned { from: PathBuf, to: PathBuf },
    AlreadyInPlace { path: PathBuf },
    MoveFailed { file: PathBuf, error: String },
}

/// Receives [`RouterEvent`]s as they happen.
pub trait RouterObserver {
    fn on_event(&mut self, event: &RouterEvent);
}

impl<F: FnMut(&RouterEvent)> RouterObserver for F {
    fn on_event(&mut self, event: &RouterEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RouterObserver for NullObserver {
    fn on_event(&mut self, _event: &RouterEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer_collects_events() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &RouterEvent| seen.push(event.clone());
            observer.on_event(&RouterEvent::NoTags {
                document: PathBuf::from("a.md"),
            });
        }
        assert_eq!(
            seen,
            vec![RouterEvent::NoTags {
                document: PathBuf::from("a.md")
            }]
        );
    }
}
