use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "icss")]
#[command(about = "ICSS to CSS compiler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a stylesheet to CSS.
    Build {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON file with predefined variables.
        #[arg(long)]
        prelude: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Parse and check a stylesheet without emitting CSS.
    Check {
        input: PathBuf,
        #[arg(long)]
        prelude: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

/// How diagnostics are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}
