use anyhow::Result;
use clap::Parser;
use follow_graph_miner::config::{Config, DEFAULT_NODE_BUDGET};
use follow_graph_miner::report::{log_summary, Summary};
use follow_graph_miner::source::github::DEFAULT_API_URL;
use follow_graph_miner::source::{GithubSource, Relation, SourceAdapter, StaticSource};
use follow_graph_miner::{storage, FailureKind, Pipeline};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(
    name = "follow-graph-miner",
    about = "Crawl a follow graph from a seed user and rank its communities"
)]
struct Cli {
    /// Identity to start crawling from
    seed: String,

    /// Maximum number of users to visit
    #[clap(long, default_value_t = DEFAULT_NODE_BUDGET)]
    budget: usize,

    /// Maximum number of concurrent profile fetches
    #[clap(long, default_value = "1")]
    concurrency: usize,

    /// JSON fixture mapping identities to profiles, used instead of the API
    #[clap(long)]
    fixture: Option<String>,

    /// Base URL of the GitHub REST API
    #[clap(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// API token
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Which user list counts as outbound edges
    #[clap(long, value_enum, default_value = "following")]
    relation: Relation,

    /// Maximum outbound edges taken per user
    #[clap(long, default_value = "10")]
    per_user_limit: usize,

    /// Request timeout in seconds
    #[clap(long, default_value = "10")]
    timeout_secs: u64,

    /// Number of ranked influencers in the report
    #[clap(long, default_value = "5")]
    top: usize,

    /// Output directory for results
    #[clap(long, default_value = "mining_results")]
    output_dir: String,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let source: Arc<dyn SourceAdapter> = match &args.fixture {
        Some(path) => Arc::new(StaticSource::from_path(path)?),
        None => {
            if args.token.is_none() {
                log::warn!("No GITHUB_TOKEN set; unauthenticated requests are heavily rate limited");
            }
            Arc::new(
                GithubSource::new(
                    &args.api_url,
                    args.token.clone(),
                    Duration::from_secs(args.timeout_secs),
                )?
                .with_relation(args.relation)
                .with_per_user_limit(args.per_user_limit),
            )
        }
    };

    let config = Config::new(args.budget)
        .with_max_concurrency(args.concurrency)
        .with_top_n(args.top);
    let pipeline = Pipeline::new(source, config);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; stopping crawl");
            on_interrupt.cancel();
        }
    });

    log::info!("Starting follow graph mining for {}", args.seed);

    let analysis = match pipeline.analyze(&args.seed, &cancel).await {
        Ok(analysis) => analysis,
        Err(e) => {
            log::error!("{}", e);
            let code = match e.kind() {
                FailureKind::NoData => 2,
                FailureKind::Cancelled => 130,
                FailureKind::Internal => 1,
            };
            std::process::exit(code);
        }
    };

    let summary = Summary::from_analysis(&analysis, pipeline.config().top_n);
    log_summary(&summary);

    let result = analysis.to_result(pipeline.config().score_scale);
    storage::save_results(&result, &summary, &args.output_dir)?;

    log::info!("Mining complete. Results saved to {}", args.output_dir);

    Ok(())
}
