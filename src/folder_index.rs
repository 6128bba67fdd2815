//! Catalog of the destination folders available under a root directory.

use crate::error::{Result, RouterError};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One directory in the target tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub path: PathBuf,
    /// Path segments between the indexed root and this folder; direct
    /// children of the root have depth 1.
    pub depth: usize,
}

/// A directory left out of the index because it could not be read.
#[derive(Debug, Clone)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub reason: String,
}

/// Lower-cased folder name to folder.
///
/// Two folders with the same lower-cased name cannot both be present: the
/// one indexed last replaces the other. The walk is depth-first with siblings
/// in file-name order, so which one survives is stable between runs.
#[derive(Debug, Clone)]
pub struct FolderIndex {
    root: PathBuf,
    folders: HashMap<String, FolderEntry>,
    skipped: Vec<SkippedDir>,
}

impl FolderIndex {
    /// An empty index for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            folders: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Walk `root` and index every directory below it.
    ///
    /// Directories named in `skip_dirs` are pruned along with everything under
    /// them, as is `exclude` (the directory being sorted) when it lies inside
    /// the root. Subdirectories that cannot be read are recorded in
    /// [`skipped`](Self::skipped) and left out.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::Access` if the root itself cannot be read.
    pub fn build(root: &Path, skip_dirs: &[String], exclude: Option<&Path>) -> Result<Self> {
        let root = fs::canonicalize(root).map_err(|e| RouterError::access(root, e))?;
        fs::read_dir(&root).map_err(|e| RouterError::access(&root, e))?;
        let exclude = exclude.and_then(|p| fs::canonicalize(p).ok());

        let mut index = Self::new(root.clone());
        let walker = WalkDir::new(&root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return false;
                }
                let name = entry.file_name().to_string_lossy();
                if skip_dirs.iter().any(|skip| skip.as_str() == name) {
                    return false;
                }
                exclude.as_deref() != Some(entry.path())
            });

        // Unreadable directories are still yielded before their read error,
        // so nothing is inserted until the walk is over.
        let mut found = Vec::new();
        let mut unreadable = HashSet::new();
        for entry in walker {
            match entry {
                Ok(entry) => found.push((entry.path().to_path_buf(), entry.depth())),
                Err(err) => {
                    let path = err.path().unwrap_or(root.as_path()).to_path_buf();
                    unreadable.insert(path.clone());
                    index.skipped.push(SkippedDir {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        for (path, depth) in found {
            if !unreadable.contains(&path) {
                index.insert(path, depth);
            }
        }

        Ok(index)
    }

    /// Index a folder under its lower-cased name, replacing any earlier
    /// folder with the same name.
    pub fn insert(&mut self, path: PathBuf, depth: usize) {
        let Some(name) = path.file_name() else {
            return;
        };
        let key = name.to_string_lossy().to_lowercase();
        self.folders.insert(key, FolderEntry { path, depth });
    }

    /// Case-insensitive lookup by folder name.
    pub fn get(&self, name: &str) -> Option<&FolderEntry> {
        self.folders.get(&name.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FolderEntry)> {
        self.folders.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn skipped(&self) -> &[SkippedDir] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
