use std::{path::PathBuf, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use tokio::sync::Mutex;
use tunemap::{
    analysis::{ClusterSettings, DEFAULT_CLUSTERS},
    cli, config,
    resolver::DEFAULT_TITLE_CAP,
    types::PkceToken,
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Summarize an exported listening history
    History(HistoryOptions),

    /// Resolve the most played titles and fetch their audio features
    Fetch(FetchOptions),

    /// Cluster the fetched audio features via PCA and t-SNE
    Cluster(ClusterOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct HistoryOptions {
    /// Directory containing StreamingHistory<N>.json files
    #[clap(long)]
    pub dir: PathBuf,

    /// Number of most played titles to list
    #[clap(long, default_value_t = 20)]
    pub top: usize,

    /// Filter configuration (defaults to filters.json in the data directory)
    #[clap(long)]
    pub filters: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct FetchOptions {
    /// Directory containing StreamingHistory<N>.json files
    #[clap(long)]
    pub dir: PathBuf,

    /// Maximum number of distinct titles to resolve
    #[clap(long, default_value_t = DEFAULT_TITLE_CAP)]
    pub limit: usize,

    /// Where to write the feature table
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Filter configuration (defaults to filters.json in the data directory)
    #[clap(long)]
    pub filters: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClusterOptions {
    /// Feature table to cluster
    #[clap(long)]
    pub input: Option<PathBuf>,

    /// Where to write the projections
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Number of k-means clusters
    #[clap(long, default_value_t = DEFAULT_CLUSTERS)]
    pub clusters: usize,

    /// Seed for k-means initialization and the t-SNE embedding
    #[clap(long, default_value_t = 0)]
    pub seed: u64,

    /// t-SNE perplexity
    #[clap(long, default_value_t = 30.0)]
    pub perplexity: f64,

    /// t-SNE gradient descent iterations
    #[clap(long, default_value_t = 1000)]
    pub iterations: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::History(opt) => cli::history(&opt.dir, opt.top, opt.filters).await,
        Command::Fetch(opt) => cli::fetch(&opt.dir, opt.limit, opt.output, opt.filters).await,
        Command::Cluster(opt) => {
            let settings = ClusterSettings {
                clusters: opt.clusters,
                seed: opt.seed,
                perplexity: opt.perplexity,
                tsne_iterations: opt.iterations,
                ..ClusterSettings::default()
            };
            cli::cluster(opt.input, opt.output, settings).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
