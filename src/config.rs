//! Configuration loading and filter compilation.
//!
//! Every component takes its settings from a [`SorterConfig`], loaded from a
//! TOML file or built from defaults. The file format is:
//!
//! ```toml
//! root = "/home/me/notes"
//! source = "/home/me/notes/inbox"
//!
//! [tags]
//! date_patterns = ['^\d{4}-\d{2}-\d{2}$']
//! document_extensions = ["md"]
//!
//! [index]
//! skip_dirs = [".git"]
//!
//! [extensions]
//! image = ["jpg", "png"]
//! archives = ["zip", "7z"]
//!
//! [downloads]
//! sfx_category = "sfx"
//! sfx_max_bytes = 10000000
//! sfx_name_marker = "SFX"
//! folders_category = "folders"
//!
//! [[prefix.rules]]
//! prefix = "Math"
//! folder = "vorlesung"
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.tmp"]
//! extensions = ["bak"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::error::ConfigError;
use crate::tags::DateTagFilter;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".tagsortrc.toml";

/// Date shapes that are never folder names: YYYY-MM-DD, YYYY-MM, DD-MM-YYYY, DD-MM-YY.
pub const DEFAULT_DATE_PATTERNS: [&str; 4] = [
    r"^\d{4}-\d{2}-\d{2}$",
    r"^\d{4}-\d{2}$",
    r"^\d{2}-\d{2}-\d{4}$",
    r"^\d{2}-\d{2}-\d{2}$",
];

/// Top-level configuration shared by all sorters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SorterConfig {
    /// Root of the folder tree that tags are matched against.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Directory holding the documents to sort.
    #[serde(default)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub tags: TagSettings,

    #[serde(default)]
    pub index: IndexSettings,

    /// Category directory name to the extensions it collects.
    #[serde(default = "default_extension_table")]
    pub extensions: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub downloads: DownloadSettings,

    #[serde(default)]
    pub prefix: PrefixSettings,

    #[serde(default)]
    pub filters: FilterRules,
}

/// Settings for tag extraction and document selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSettings {
    /// Regexes for tags that look like dates and must be ignored.
    #[serde(default = "default_date_patterns")]
    pub date_patterns: Vec<String>,

    /// Extensions (without dot) of files treated as documents.
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            date_patterns: default_date_patterns(),
            document_extensions: default_document_extensions(),
        }
    }
}

/// Settings for building the folder index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Directory names whose whole subtree is left out of the index.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            skip_dirs: default_skip_dirs(),
        }
    }
}

/// Rules of the extension sorter that go beyond the extension table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Category whose short or marked files are split off as sound effects.
    #[serde(default = "default_audio_category")]
    pub audio_category: String,

    /// Where split-off audio goes. Empty disables the split.
    #[serde(default = "default_sfx_category")]
    pub sfx_category: String,

    /// Audio files smaller than this many bytes are sound effects.
    #[serde(default = "default_sfx_max_bytes")]
    pub sfx_max_bytes: u64,

    /// Audio files whose name contains this text are sound effects.
    /// Empty disables the name check.
    #[serde(default = "default_sfx_name_marker")]
    pub sfx_name_marker: String,

    /// Category that subdirectories of the sorted folder are moved into.
    /// Empty leaves subdirectories alone.
    #[serde(default = "default_folders_category")]
    pub folders_category: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            audio_category: default_audio_category(),
            sfx_category: default_sfx_category(),
            sfx_max_bytes: default_sfx_max_bytes(),
            sfx_name_marker: default_sfx_name_marker(),
            folders_category: default_folders_category(),
        }
    }
}

/// Ordered filename prefix rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefixSettings {
    #[serde(default)]
    pub rules: Vec<PrefixRule>,
}

/// Files whose name starts with `prefix` go into `folder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub folder: String,
}

impl std::str::FromStr for PrefixRule {
    type Err = ConfigError;

    /// Parses `PREFIX=FOLDER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((prefix, folder)) if !prefix.is_empty() && !folder.is_empty() => Ok(Self {
                prefix: prefix.to_string(),
                folder: folder.to_string(),
            }),
            _ => Err(ConfigError::InvalidPrefixRule(s.to_string())),
        }
    }
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to include hidden files (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding files from sorting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., ".DS_Store", "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "bak", "tmp", "log").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

fn default_date_patterns() -> Vec<String> {
    DEFAULT_DATE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_document_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_skip_dirs() -> Vec<String> {
    vec![".git".to_string()]
}

fn default_audio_category() -> String {
    "music".to_string()
}

fn default_sfx_category() -> String {
    "sfx".to_string()
}

fn default_sfx_max_bytes() -> u64 {
    10_000_000
}

fn default_sfx_name_marker() -> String {
    "SFX".to_string()
}

fn default_folders_category() -> String {
    "folders".to_string()
}

/// Category table used by the extension sorter when none is configured.
pub fn default_extension_table() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 11] = [
        (
            "image",
            &[
                "jpg", "jpeg", "jpe", "jif", "jfif", "jfi", "png", "gif", "webp", "tiff", "tif",
                "psd", "raw", "arw", "cr2", "nrw", "k25", "bmp", "dib", "heif", "heic", "ind",
                "indd", "indt", "jp2", "j2k", "jpf", "jpx", "jpm", "mj2", "svg", "svgz", "ai",
                "eps", "ico",
            ],
        ),
        (
            "video",
            &[
                "webm", "mpg", "mp2", "mpeg", "mpe", "mpv", "ogg", "mp4", "mp4v", "m4v", "avi",
                "wmv", "mov", "qt", "flv", "swf", "avchd",
            ],
        ),
        ("music", &["m4a", "flac", "mp3", "wav", "wma", "aac"]),
        (
            "documents",
            &["doc", "docx", "odt", "pdf", "xls", "xlsx", "ppt", "pptx"],
        ),
        ("markdown", &["md", "markdown"]),
        ("apps", &["app", "dmg", "pkg", "exe"]),
        ("rust", &["rs"]),
        ("python", &["py", "ipynb"]),
        ("books", &["epub", "mobi"]),
        ("archives", &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"]),
        (
            "web",
            &["html", "htm", "css", "js", "php", "asp", "jsx", "tsx"],
        ),
    ];

    table
        .iter()
        .map(|(category, exts)| {
            (
                category.to_string(),
                exts.iter().map(|e| e.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            root: None,
            source: None,
            tags: TagSettings::default(),
            index: IndexSettings::default(),
            extensions: default_extension_table(),
            downloads: DownloadSettings::default(),
            prefix: PrefixSettings::default(),
            filters: FilterRules::default(),
        }
    }
}

impl SorterConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.tagsortrc.toml` in the current directory
    /// 3. Look for `~/.config/tagsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("tagsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Compile the filter rules into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }

    /// Compile the date patterns into a tag filter.
    pub fn compile_date_filter(&self) -> Result<DateTagFilter, ConfigError> {
        DateTagFilter::new(&self.tags.date_patterns)
    }

    /// Whether `path` has one of the configured document extensions.
    pub fn is_document(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy();
        self.tags
            .document_extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }
}

/// Compiled filter structures for file matching.
///
/// Glob and regex patterns are parsed once here rather than on every file.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(String::as_str)
            .map(compile_regex)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Check if a file should take part in sorting.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter - if hidden and disabled, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. File extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path) || pattern.matches(&file_name))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path) || pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

pub(crate) fn compile_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters_with(rules: FilterRules) -> CompiledFilters {
        SorterConfig {
            filters: rules,
            ..SorterConfig::default()
        }
        .compile_filters()
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = SorterConfig::default();
        assert!(!config.filters.enable_hidden_files);
        assert_eq!(config.tags.date_patterns.len(), 4);
        assert_eq!(config.tags.document_extensions, vec!["md"]);
        assert_eq!(config.index.skip_dirs, vec![".git"]);
        assert!(config.extensions.contains_key("image"));
        assert!(config.prefix.rules.is_empty());
        assert_eq!(config.downloads.sfx_category, "sfx");
        assert_eq!(config.downloads.sfx_max_bytes, 10_000_000);
        assert_eq!(config.downloads.folders_category, "folders");
    }

    #[test]
    fn test_partial_downloads_section() {
        let config = SorterConfig::from_toml(
            r#"
            [downloads]
            sfx_max_bytes = 500
            folders_category = ""
            "#,
        )
        .unwrap();

        assert_eq!(config.downloads.sfx_max_bytes, 500);
        assert!(config.downloads.folders_category.is_empty());
        assert_eq!(config.downloads.audio_category, "music");
        assert_eq!(config.downloads.sfx_name_marker, "SFX");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SorterConfig::from_toml("").unwrap();
        assert_eq!(config.tags.date_patterns.len(), 4);
        assert_eq!(config.extensions, default_extension_table());
        assert!(config.root.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = SorterConfig::from_toml(
            r#"
            root = "/notes"
            source = "/notes/inbox"

            [tags]
            document_extensions = ["md", "txt"]

            [extensions]
            pictures = ["png"]

            [[prefix.rules]]
            prefix = "Math"
            folder = "vorlesung"

            [filters.exclude]
            filenames = ["README.md"]
            "#,
        )
        .unwrap();

        assert_eq!(config.root, Some(PathBuf::from("/notes")));
        assert_eq!(config.source, Some(PathBuf::from("/notes/inbox")));
        assert_eq!(config.tags.document_extensions, vec!["md", "txt"]);
        assert_eq!(config.tags.date_patterns.len(), 4);
        assert_eq!(config.extensions.len(), 1);
        assert_eq!(
            config.prefix.rules,
            vec![PrefixRule {
                prefix: "Math".to_string(),
                folder: "vorlesung".to_string()
            }]
        );
        assert_eq!(config.filters.exclude.filenames, vec!["README.md"]);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = SorterConfig::from_toml("root = [");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = SorterConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_is_document_case_insensitive() {
        let config = SorterConfig::default();
        assert!(config.is_document(Path::new("note.md")));
        assert!(config.is_document(Path::new("NOTE.MD")));
        assert!(!config.is_document(Path::new("note.txt")));
        assert!(!config.is_document(Path::new("md")));
    }

    #[test]
    fn test_prefix_rule_from_str() {
        let rule: PrefixRule = "A=ubung".parse().unwrap();
        assert_eq!(rule.prefix, "A");
        assert_eq!(rule.folder, "ubung");

        assert!("nofolder".parse::<PrefixRule>().is_err());
        assert!("=folder".parse::<PrefixRule>().is_err());
    }

    #[test]
    fn test_hidden_file_excluded_by_default() {
        let compiled = filters_with(FilterRules::default());
        assert!(!compiled.should_include(Path::new(".DS_Store")));
        assert!(compiled.should_include(Path::new("note.md")));
    }

    #[test]
    fn test_exclude_rules() {
        let compiled = filters_with(FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                patterns: vec!["*.tmp".to_string()],
                extensions: vec!["bak".to_string()],
                regex: vec![r"^draft_.*\.md$".to_string()],
            },
            include: IncludeRules::default(),
        });

        assert!(!compiled.should_include(Path::new("Thumbs.db")));
        assert!(!compiled.should_include(Path::new("/inbox/file.tmp")));
        assert!(!compiled.should_include(Path::new("file.BAK")));
        assert!(!compiled.should_include(Path::new("draft_ideas.md")));
        assert!(compiled.should_include(Path::new("ideas.md")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let compiled = filters_with(FilterRules {
            enable_hidden_files: false,
            exclude: ExcludeRules::default(),
            include: IncludeRules {
                patterns: vec![".important".to_string()],
            },
        });

        assert!(compiled.should_include(Path::new(".important")));
        assert!(!compiled.should_include(Path::new(".other")));
    }

    #[test]
    fn test_invalid_patterns_return_error() {
        let bad_regex = SorterConfig {
            filters: FilterRules {
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..SorterConfig::default()
        };
        assert!(bad_regex.compile_filters().is_err());

        let bad_glob = SorterConfig {
            filters: FilterRules {
                exclude: ExcludeRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..SorterConfig::default()
        };
        assert!(bad_glob.compile_filters().is_err());
    }
}
