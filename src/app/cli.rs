use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse, search and favorite photos from Unsplash
#[derive(Parser, Debug)]
#[command(name = "photoreel", version)]
pub struct Args {
    /// Log paging decisions and HTTP requests
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the editorial feed, served from the local cache when possible
    Feed {
        /// Drop the cached feed and fetch it again
        #[arg(short, long)]
        refresh: bool,
        /// Number of pages to show
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
        /// Also load the page before the first cached one
        #[arg(long)]
        previous: bool,
        /// Position the refresh should keep in view
        #[arg(long, requires = "refresh")]
        anchor: Option<usize>,
    },
    /// Search photos, results are not cached
    Search {
        query: String,
        /// Number of pages to show
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
        /// Reload the results starting from the page holding this position
        #[arg(long)]
        anchor: Option<usize>,
    },
    /// List favorite photos
    Favorites {
        /// Page of the favorites list
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Add or remove photos from favorites, toggling by default
    Favorite {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Add the photos even if they are already favorites
        #[arg(long, conflicts_with = "remove")]
        add: bool,
        /// Remove the photos if they are favorites
        #[arg(long)]
        remove: bool,
    },
    /// Show details of a photo
    Show { id: String },
    /// Download the full size photo
    Download {
        id: String,
        /// Target directory, defaults to the configured download directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Open the full size photo in the default viewer
    Open { id: String },
    /// Remove the cached feed, favorites are kept
    ClearCache,
}
