use clap::Parser;
use tagsort::cli::{Cli, run_cli};
use tagsort::output::OutputFormatter;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_cli(&cli) {
        OutputFormatter::error(&format!("Error: {}", e));
        std::process::exit(e.exit_code());
    }
}
