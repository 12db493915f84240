use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use user_fetch::{
    timed, ConcurrentRunner, FetchConfig, HttpFetcher, PoolBackend, RawConfig, RunReport,
    SequentialRunner, Strategy,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch user records one by one and over a thread pool")]
struct Args {
    /// TOML file with base_url, count, pool_size, timeout_ms and backend
    #[arg(long)]
    config: Option<PathBuf>,

    /// Endpoint serving `<base-url>/<id>`
    #[arg(long, env = "FETCH_BASE_URL")]
    base_url: Option<String>,

    /// Number of users to fetch (ids 1..=count)
    #[arg(long)]
    count: Option<u32>,

    /// Maximum number of requests in flight
    #[arg(long)]
    pool_size: Option<usize>,

    /// Per-request timeout; unbounded when omitted
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long, value_enum)]
    backend: Option<PoolBackend>,

    /// Only run the thread pool strategy
    #[arg(long)]
    skip_sequential: bool,
}

impl Args {
    fn overrides(&self) -> RawConfig {
        RawConfig {
            base_url: self.base_url.clone(),
            count: self.count,
            pool_size: self.pool_size,
            timeout_ms: self.timeout_ms,
            backend: self.backend,
        }
    }
}

fn print_report(report: &RunReport) {
    println!("{report}");
    let absent = if report.absent() > 0 {
        report.absent().to_string().red()
    } else {
        report.absent().to_string().green()
    };
    println!("  present: {}, absent: {}", report.present.to_string().green(), absent);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => RawConfig::load(path)?,
        None => RawConfig::default(),
    };
    let config = FetchConfig::try_from(file.merge(args.overrides()))?;
    info!(
        base_url = %config.base_url,
        count = config.count,
        pool_size = config.pool_size.get(),
        backend = %config.backend,
        "starting"
    );

    let fetcher = HttpFetcher::from_config(&config)?;

    let baseline = if args.skip_sequential {
        None
    } else {
        println!("{}", format!("{}:", Strategy::Sequential).bold());
        let runner = SequentialRunner::new(&fetcher);
        let (results, elapsed) = timed(|| runner.run(config.count));
        let report = RunReport::from_results(Strategy::Sequential, &results, elapsed);
        print_report(&report);
        println!();
        Some(report)
    };

    println!("{}", format!("{}:", Strategy::Concurrent).bold());
    let runner = ConcurrentRunner::new(&fetcher, config.pool_size).with_backend(config.backend);
    let (results, elapsed) = timed(|| runner.run(config.count));
    let report = RunReport::from_results(Strategy::Concurrent, &results?, elapsed);
    print_report(&report);

    if let Some(speedup) = baseline.and_then(|b| report.speedup_over(&b)) {
        println!("{}", format!("Speedup: {speedup:.1}x").cyan());
    }

    Ok(())
}
