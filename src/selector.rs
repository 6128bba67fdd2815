//! Picks the destination folder for a set of tags.
//!
//! A tag matches a folder only when the two are equal ignoring case. Partial
//! matches are never considered: a tag `os` must not land a note in
//! `costume`. Among all matches the deepest folder wins, being the most
//! specific category; equally deep folders are ordered by path so the choice
//! does not depend on hash order.

use crate::folder_index::{FolderEntry, FolderIndex};
use serde::Serialize;
use std::cmp::Ordering;

/// How a tag matched a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Case-insensitive full-string equality.
    Exact,
}

/// A folder that one of the tags matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate<'a> {
    pub folder: &'a FolderEntry,
    pub tag: String,
    pub kind: MatchKind,
}

impl MatchCandidate<'_> {
    /// Deeper first, then lexically smaller path.
    fn rank(&self, other: &Self) -> Ordering {
        self.folder
            .depth
            .cmp(&other.folder.depth)
            .then_with(|| other.folder.path.cmp(&self.folder.path))
    }
}

/// Every folder matched by any of `tags`, in tag order.
pub fn find_candidates<'a>(tags: &[String], index: &'a FolderIndex) -> Vec<MatchCandidate<'a>> {
    tags.iter()
        .filter_map(|tag| {
            index.get(tag).map(|folder| MatchCandidate {
                folder,
                tag: tag.clone(),
                kind: MatchKind::Exact,
            })
        })
        .collect()
}

/// The best folder for `tags`, or `None` when no tag names a folder.
///
/// On a full tie (the same folder matched twice) the first-seen tag is kept.
pub fn select_best<'a>(tags: &[String], index: &'a FolderIndex) -> Option<MatchCandidate<'a>> {
    find_candidates(tags, index)
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.rank(&best) == Ordering::Greater {
                candidate
            } else {
                best
            }
        })
}
