use clap::Parser;
use gowalker::{DocService, MemoryStore, RequestKind, WalkerConfig};
use gowalker_core::{HttpFetcher, RecentProjects, Result};
use gowalker_render::BasicTemplate;
use gowalker_vcs::{Crawler, ServiceRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Fetch, render and store the documentation of a Go package.
#[derive(Parser, Debug)]
#[command(name = "gowalker", version, about, long_about = None)]
struct Cli {
    /// Import path, e.g. github.com/foo/bar, or a presentation file with
    /// --presentation
    path: String,

    /// JSON configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Tag or branch to document instead of the default branch
    #[arg(long, default_value = "")]
    tag: String,

    /// Check the remote even when a current copy is stored
    #[arg(long)]
    refresh: bool,

    /// Print a presentation file such as github.com/foo/talks/intro.slide
    #[arg(long, conflicts_with_all = ["tag", "refresh"])]
    presentation: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => WalkerConfig::load(path)?,
        None => WalkerConfig::default(),
    };

    let http = Arc::new(HttpFetcher::new((&config.http).into())?);
    let registry = Arc::new(ServiceRegistry::standard(
        (&config.github).into(),
        (&config.bitbucket).into(),
    ));
    let crawler = Arc::new(Crawler::new(registry, http));
    if cli.presentation {
        let source = crawler.fetch_presentation(&cli.path).await?;
        print!("{}", source.text());
        return Ok(());
    }

    let recent = Arc::new(RecentProjects::new(config.recent_projects.capacity));
    let service = DocService::new(
        Arc::new(MemoryStore::new()),
        crawler,
        Arc::new(BasicTemplate),
        recent,
        config,
    );

    let kind = if cli.refresh {
        RequestKind::Refresh
    } else {
        RequestKind::Human
    };
    let summary = service.check_package(&cli.path, &cli.tag, kind).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
