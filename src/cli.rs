use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vplyer")]
#[command(author, version, about = "Headless playback client for the vPlyer streaming backend")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a video and simulate playback, printing state transitions
    Watch {
        /// Video id to open
        #[arg(required = true)]
        video_id: i64,

        /// Seconds of simulated playback
        #[arg(long, default_value = "30")]
        seconds: u64,
    },

    /// Fetch a video record and print its normalized source catalog
    Sources {
        /// Video id to inspect
        #[arg(required = true)]
        video_id: i64,

        /// Output the raw record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
