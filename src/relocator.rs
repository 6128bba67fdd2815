//! Moves files into destination folders.
//!
//! A file whose name is already taken at the destination gets a numeric
//! suffix before its extension: `note.md`, `note_1.md`, `note_2.md`, ...
//! Every move is a single rename; across filesystems it degrades to copy
//! followed by removal of the original.

use crate::error::{MoveError, Result, RouterError};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// What happened to a file handed to the [`Relocator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// The file was moved.
    Moved { from: PathBuf, to: PathBuf },
    /// Dry run: the file would have been moved here.
    Planned { from: PathBuf, to: PathBuf },
    /// The file already lives in the destination folder.
    AlreadyInPlace { path: PathBuf },
}

/// Moves files, or only plans the moves when `dry_run` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relocator {
    dry_run: bool,
}

impl Relocator {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Moves `file` into `dest_dir`.
    ///
    /// Does nothing when the file's parent already is `dest_dir`. On failure
    /// the file is left untouched at its original location.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tagsort::relocator::{Relocation, Relocator};
    /// use std::path::Path;
    ///
    /// let result = Relocator::new(false).relocate(
    ///     Path::new("/notes/inbox/tcp.md"),
    ///     Path::new("/notes/cs/networking"),
    /// );
    ///
    /// match result {
    ///     Ok(Relocation::Moved { to, .. }) => println!("Moved to {}", to.display()),
    ///     Ok(_) => {}
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn relocate(
        &self,
        file: &Path,
        dest_dir: &Path,
    ) -> std::result::Result<Relocation, MoveError> {
        if file.parent().is_some_and(|parent| same_dir(parent, dest_dir)) {
            return Ok(Relocation::AlreadyInPlace {
                path: file.to_path_buf(),
            });
        }

        let file_name = file.file_name().ok_or_else(|| MoveError {
            from: file.to_path_buf(),
            to: dest_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "file has no name component"),
        })?;
        let destination = unique_destination(dest_dir, file_name);

        if self.dry_run {
            return Ok(Relocation::Planned {
                from: file.to_path_buf(),
                to: destination,
            });
        }

        move_file(file, &destination).map_err(|source| MoveError {
            from: file.to_path_buf(),
            to: destination.clone(),
            source,
        })?;

        Ok(Relocation::Moved {
            from: file.to_path_buf(),
            to: destination,
        })
    }
}

/// First free path for `file_name` inside `dest_dir`.
pub fn unique_destination(dest_dir: &Path, file_name: &OsStr) -> PathBuf {
    let destination = dest_dir.join(file_name);
    if !destination.exists() {
        return destination;
    }

    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name);
    let extension = name.extension();

    (1..)
        .map(|n| {
            let mut candidate = OsString::from(stem);
            candidate.push(format!("_{n}"));
            if let Some(ext) = extension {
                candidate.push(".");
                candidate.push(ext);
            }
            dest_dir.join(candidate)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(destination)
}

/// Creates `dir` if it is missing.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| RouterError::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        other => other,
    }
}

/// Whether `a` and `b` name the same directory.
pub(crate) fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => normalize(a) == normalize(b),
    }
}

/// Lexical normalization: drops `.` and folds `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
