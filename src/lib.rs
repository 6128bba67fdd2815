//! tagsort - sort notes into folders by their tags
//!
//! The core routes markdown notes from a source folder into an existing
//! folder tree: tags are read from a `***Tags:**` line (or inline `[[...]]`
//! links), date-like tags are dropped, and each note moves into the deepest
//! folder whose name matches one of its tags. Two smaller sorters file a
//! directory's loose files by extension or by filename prefix.
//!
//! All three share the same configuration file, collision-safe relocation,
//! dry-run mode and event stream.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod extension_sorter;
pub mod file_category;
pub mod folder_index;
pub mod output;
pub mod prefix_sorter;
pub mod relocator;
pub mod router;
pub mod selector;
pub mod tags;

pub use config::{CompiledFilters, DownloadSettings, PrefixRule, SorterConfig};
pub use error::{ConfigError, ExtractionError, MoveError, Result, RouterError};
pub use events::{NullObserver, RouterEvent, RouterObserver};
pub use extension_sorter::ExtensionSorter;
pub use file_category::FileMapper;
pub use folder_index::FolderIndex;
pub use prefix_sorter::PrefixSorter;
pub use relocator::{Relocation, Relocator};
pub use router::{DocumentOutcome, RunReport, TagRouter};
pub use tags::{DateTagFilter, extract_tags};
