//! tunemap library
//!
//! This library turns an exported Spotify listening history into a table of
//! per-track audio features and clusters those tracks in two dimensions. It
//! includes modules for the OAuth session, history ingestion, track
//! resolution, feature fetching, the clustering pipeline and the CLI glue
//! that ties them together.
//!
//! # Modules
//!
//! - `analysis` - Standardization, PCA, t-SNE and k-means clustering
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Environment configuration and data directory layout
//! - `error` - Typed errors for every pipeline stage
//! - `fetcher` - Audio-feature collection into a feature table
//! - `filters` - Artist allow/deny lists and title overrides
//! - `history` - Streaming-history loading and partitioning
//! - `management` - Token, feature table and report persistence
//! - `resolver` - Title ranking and title to track id resolution
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers and small utilities
//!
//! # Example
//!
//! ```
//! use tunemap::{config, history};
//!
//! #[tokio::main]
//! async fn main() -> tunemap::Res<()> {
//!     config::load_env().await?;
//!     let segments = history::discover_segments("personal_data".as_ref()).await?;
//!     let events = history::load_segments(&segments).await?;
//!     println!("{} events", events.len());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod filters;
pub mod history;
pub mod management;
pub mod resolver;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the top-level glue where errors from several stages meet. Stage
/// functions return the typed errors from [`error`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Loading {} history segments...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Fetched features for {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal conditions such as a failed authentication; the process
/// terminates with exit code 1 right after printing.
///
/// # Example
///
/// ```
/// error!("Failed to load token. Please run tunemap auth");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. a title that could not be resolved or a
/// track whose features could not be fetched.
///
/// # Example
///
/// ```
/// warning!("Something went wrong with {}", title);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
