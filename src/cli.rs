use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use tidycache::RegionLayout;

#[derive(Parser)]
#[command(
    name = "tidycache",
    about = "Report and clear web application cache regions",
    version
)]
pub struct Cli {
    /// Application root the cache regions live under (defaults to the current directory)
    #[arg(long, env = "TIDYCACHE_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Framework page cache directory, relative to the root
    #[arg(long, env = "TIDYCACHE_PAGE_CACHE_DIR", global = true)]
    pub page_cache_dir: Option<PathBuf>,

    /// Upload staging directory, relative to the root
    #[arg(long, env = "TIDYCACHE_TEMP_DIR", global = true)]
    pub temp_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the size of each cache region
    Stats,

    /// Delete cache artifacts
    Clear {
        /// Only clear one region: system, framework or temp
        #[arg(long)]
        region: Option<String>,

        /// Only remove temp entries older than this many hours
        #[arg(long)]
        older_than_hours: Option<u64>,
    },

    /// Show disk and memory usage of the host
    Host,
}

impl Cli {
    pub fn layout(&self) -> RegionLayout {
        let mut layout = RegionLayout::default();
        if let Some(dir) = &self.page_cache_dir {
            layout = layout.with_page_cache_dir(dir);
        }
        if let Some(dir) = &self.temp_dir {
            layout = layout.with_temp_dir(dir);
        }
        layout
    }
}
