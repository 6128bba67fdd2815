//! Command-line interface for tagsort.
//!
//! Parses arguments with `clap`, loads the configuration, runs one of the
//! three sorters and prints either the console summary or a JSON report.

use crate::config::{PrefixRule, SorterConfig};
use crate::error::{ConfigError, Result};
use crate::events::{NullObserver, RouterObserver};
use crate::extension_sorter::ExtensionSorter;
use crate::output::{ConsoleObserver, OutputFormatter, Verbosity};
use crate::prefix_sorter::PrefixSorter;
use crate::router::TagRouter;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tagsort")]
#[command(about = "Sort notes into folders by their tags", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ./.tagsortrc.toml, then ~/.config/tagsort/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every decision, not just moves
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print failures
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move tagged notes from a source folder into matching folders under a root
    Tags {
        /// Folder holding the notes to sort (default: `source` from the config)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Root of the folder tree to sort into (default: `root` from the config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Show what would move without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Sort a folder's files into category folders by extension
    Extensions {
        /// Folder to sort
        dir: PathBuf,

        /// Where the category folders go (default: DIR itself)
        #[arg(short, long)]
        dest: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Sort a folder's files into subfolders by filename prefix
    Prefix {
        /// Folder to sort
        dir: PathBuf,

        /// Extra PREFIX=FOLDER rule, applied after the configured ones
        #[arg(long = "rule", value_name = "PREFIX=FOLDER")]
        rules: Vec<PrefixRule>,

        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

/// Runs the command described by `cli`.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use tagsort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["tagsort", "tags", "--source", "inbox", "--root", "notes"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<()> {
    let config = SorterConfig::load(cli.config.as_deref())?;
    let mut console = ConsoleObserver::new(cli.verbosity());
    let mut null = NullObserver;
    let observer: &mut dyn RouterObserver = if cli.json { &mut null } else { &mut console };

    match &cli.command {
        Commands::Tags {
            source,
            root,
            dry_run,
        } => {
            let source = source
                .clone()
                .or_else(|| config.source.clone())
                .ok_or(ConfigError::MissingDirectory("source"))?;
            let root = root
                .clone()
                .or_else(|| config.root.clone())
                .ok_or(ConfigError::MissingDirectory("root"))?;

            announce_dry_run(cli, *dry_run);
            let router = TagRouter::new(config, *dry_run)?;
            let report = router.run(&source, &root, observer)?;
            console.finish();

            if cli.json {
                print_json(&report)?;
            } else if cli.verbosity() > Verbosity::Quiet {
                OutputFormatter::run_summary(&report);
            }
        }
        Commands::Extensions { dir, dest, dry_run } => {
            announce_dry_run(cli, *dry_run);
            let sorter = ExtensionSorter::new(&config, *dry_run)?;
            let report = sorter.run(dir, dest.as_deref(), observer)?;
            console.finish();

            if cli.json {
                print_json(&report)?;
            } else if cli.verbosity() > Verbosity::Quiet {
                OutputFormatter::sort_summary(&report);
            }
        }
        Commands::Prefix {
            dir,
            rules,
            dry_run,
        } => {
            announce_dry_run(cli, *dry_run);
            let sorter = PrefixSorter::new(&config, rules, *dry_run)?;
            let report = sorter.run(dir, observer)?;
            console.finish();

            if cli.json {
                print_json(&report)?;
            } else if cli.verbosity() > Verbosity::Quiet {
                OutputFormatter::sort_summary(&report);
            }
        }
    }

    Ok(())
}

fn announce_dry_run(cli: &Cli, dry_run: bool) {
    if dry_run && !cli.json && cli.verbosity() > Verbosity::Quiet {
        OutputFormatter::dry_run_notice("No files will be moved");
    }
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_tags_command() {
        let cli = Cli::try_parse_from([
            "tagsort", "-v", "tags", "--source", "inbox", "--root", "notes", "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbosity(), Verbosity::Verbose);
        match cli.command {
            Commands::Tags {
                source,
                root,
                dry_run,
            } => {
                assert_eq!(source, Some(PathBuf::from("inbox")));
                assert_eq!(root, Some(PathBuf::from("notes")));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_prefix_rules() {
        let cli = Cli::try_parse_from([
            "tagsort", "prefix", "lectures", "--rule", "A=ubung", "--rule", "Math=vorlesung",
        ])
        .unwrap();

        let Commands::Prefix { rules, .. } = cli.command else {
            panic!("expected prefix command");
        };
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].prefix, "Math");
        assert_eq!(rules[1].folder, "vorlesung");
    }

    #[test]
    fn test_bad_prefix_rule_rejected() {
        assert!(Cli::try_parse_from(["tagsort", "prefix", "dir", "--rule", "nofolder"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["tagsort", "-q", "-v", "extensions", "dir"]).is_err());
    }

    #[test]
    fn test_missing_source_is_config_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        let cli = Cli::try_parse_from([
            "tagsort",
            "--config",
            config_path.to_str().unwrap(),
            "-q",
            "tags",
            "--root",
            temp_dir.path().to_str().unwrap(),
        ])
        .unwrap();

        let err = run_cli(&cli).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RouterError::Config(ConfigError::MissingDirectory("source"))
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_directories_from_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("notes");
        let inbox = root.join("inbox");
        fs::create_dir_all(root.join("rust")).unwrap();
        fs::create_dir_all(&inbox).unwrap();
        fs::write(inbox.join("borrowck.md"), "[[rust]]").unwrap();

        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            format!(
                "root = {:?}\nsource = {:?}\n",
                root.to_str().unwrap(),
                inbox.to_str().unwrap()
            ),
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "tagsort",
            "--config",
            config_path.to_str().unwrap(),
            "-q",
            "tags",
        ])
        .unwrap();
        run_cli(&cli).unwrap();

        assert!(root.join("rust/borrowck.md").exists());
        assert!(!inbox.join("borrowck.md").exists());
    }
}
