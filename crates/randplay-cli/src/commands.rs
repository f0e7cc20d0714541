use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "randplay")]
#[command(about = "Index files across granted directories and play one at random", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Grant durable read access to a directory
    Grant { path: PathBuf },
    /// Revoke a directory grant
    Revoke { path: PathBuf },
    /// List granted directories and their resolution status
    Dirs,
    /// Add a file extension to the index filter
    AddExt { name: String },
    /// Remove a file extension from the index filter
    RemoveExt { name: String },
    /// List the extension filter set
    ListExt,
    /// Rebuild the file index and report the match count
    Index,
    /// Pick an indexed file at random and open it with the handler program
    Play {
        /// Handler program to open the file with (overrides configuration)
        #[arg(long)]
        handler: Option<PathBuf>,
        /// Offer to delete the played file afterwards
        #[arg(long)]
        delete: bool,
    },
    /// Print configuration values
    PrintConfig,
}
