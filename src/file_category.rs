//! Maps files to category directories by extension.
//!
//! The table comes from configuration (`[extensions]`), one category
//! directory name per list of extensions. Files without a known extension are
//! sniffed by content so that e.g. an extensionless PNG still lands in the
//! image category.
//!
//! # Examples
//!
//! ```
//! use tagsort::file_category::FileMapper;
//!
//! let mapper = FileMapper::default();
//! assert_eq!(mapper.extension_to_category("png"), Some("image"));
//! assert_eq!(mapper.extension_to_category("MP3"), Some("music"));
//! assert_eq!(mapper.extension_to_category("xyz"), None);
//! ```

use crate::config::default_extension_table;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// Category for files nothing else claims.
pub const OTHER_CATEGORY: &str = "other";

#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<String, String>,
}

impl FileMapper {
    /// Builds a mapper from a category table. When an extension is listed
    /// under several categories, the alphabetically first category keeps it.
    pub fn from_table(table: &BTreeMap<String, Vec<String>>) -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        for (category, extensions) in table {
            for ext in extensions {
                mapper
                    .extension_map
                    .entry(normalize_extension(ext))
                    .or_insert_with(|| category.clone());
            }
        }
        mapper
    }

    /// Maps a file extension (with or without the dot, any case) to a category.
    pub fn extension_to_category(&self, ext: &str) -> Option<&str> {
        self.extension_map
            .get(&normalize_extension(ext))
            .map(String::as_str)
    }

    /// Guesses an extension from the file's leading bytes.
    pub fn detect_extension(path: &Path) -> Option<&'static str> {
        infer::get_from_path(path)
            .ok()
            .flatten()
            .map(|kind| kind.extension())
    }

    /// Determines the category directory for a file.
    ///
    /// 1. The file's own extension, if the table knows it
    /// 2. An extension detected from the file content
    /// 3. [`OTHER_CATEGORY`]
    pub fn categorize(&self, path: &Path) -> &str {
        if let Some(ext) = path.extension()
            && let Some(category) = self.extension_to_category(&ext.to_string_lossy())
        {
            return category;
        }

        if let Some(ext) = Self::detect_extension(path)
            && let Some(category) = self.extension_to_category(ext)
        {
            return category;
        }

        OTHER_CATEGORY
    }

    /// All category directory names, including [`OTHER_CATEGORY`].
    pub fn categories(&self) -> BTreeSet<&str> {
        self.extension_map
            .values()
            .map(String::as_str)
            .chain(std::iter::once(OTHER_CATEGORY))
            .collect()
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::from_table(&default_extension_table())
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
