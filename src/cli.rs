use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "altwatch")]
#[command(about = "Online presence tracker and alt-character correlation scanner")]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON); missing file means defaults
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database path, overrides settings and ALTWATCH_DB_PATH
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the online list and record sessions until Ctrl-C / SIGTERM
    Watch,

    /// Rank likely alts of a character from recorded sessions
    Scan {
        /// Character to scan for
        #[arg(value_name = "NAME")]
        name: String,

        /// Max seconds between one logging off and the other logging on
        #[arg(long, value_name = "SECS")]
        window_secs: Option<u64>,

        /// Max number of candidates to consider
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
