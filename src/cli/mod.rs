use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Check every entry of a prototype file, reporting lines that do not parse.
    #[command(alias = "c")]
    Check {
        /// The prototype file to check.
        #[arg(required = true)]
        file: PathBuf,

        /// Print each parsed entry as a JSON object on its own line.
        #[arg(long)]
        json: bool,
    },

    /// Generate prototype entries for the given files and directories.
    #[command(alias = "g")]
    Gen {
        /// One or more files or directories to describe.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Recurse into directories.
        #[arg(short, long)]
        recursive: bool,

        /// Install class recorded on every generated entry.
        #[arg(long, default_value = crate::meta::DEFAULT_INSTALL_CLASS)]
        class: String,

        /// Part label prepended to every generated entry.
        #[arg(long)]
        part: Option<String>,
    },
}

/// Parses command-line arguments using `clap` and returns the command to execute.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
