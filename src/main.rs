// webextract: load one page in a headless browser and extract records from it.
//
// Summary goes to stdout, logs and error detail to stderr. The exit code
// identifies the failing stage (see `ExtractError::exit_code`).

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webextract::{
    ConsoleSink, ExtractError, ExtractRequest, ExtractSettings, ExtractionPipeline,
    ReadinessCondition, RetryPolicy, SearchProvider, StrategyName, Target, TargetMode,
    retry_with_backoff,
};

#[derive(Parser, Debug)]
#[command(name = "webextract")]
#[command(about = "Extract structured records from a single web page")]
#[command(version)]
struct Cli {
    /// Page URL, or search terms with --mode query
    target: String,

    /// How to interpret TARGET
    #[arg(long, default_value_t = TargetMode::Url)]
    mode: TargetMode,

    /// Extraction strategy
    #[arg(long, default_value_t = StrategyName::Search)]
    strategy: StrategyName,

    /// Search engine used in query mode
    #[arg(long, default_value_t = SearchProvider::Google)]
    provider: SearchProvider,

    /// Write the result as JSON to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// domcontentloaded, networkidle0, networkidle2 or networkidle:<max>:<ms>
    #[arg(long)]
    readiness: Option<ReadinessCondition>,

    /// Launch and readiness timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Bound on navigation plus extraction in milliseconds
    #[arg(long, value_name = "MS")]
    run_timeout_ms: Option<u64>,

    /// Run the browser without a window
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    headless: Option<bool>,

    /// Retry navigation failures and timeouts this many times
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Print every record to stdout
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<ExtractError>()
                .map_or(1, ExtractError::exit_code);
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let filter = ["chromiumoxide::handler=off", "chromiumoxide::conn=off"]
        .into_iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(filter, |filter, directive| filter.add_directive(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = ExtractSettings::from_env()?;
    if let Some(headless) = cli.headless {
        settings.session.headless = headless;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        anyhow::ensure!(timeout_ms > 0, ExtractError::Config("--timeout-ms must be greater than zero".into()));
        settings.session.timeout_ms = timeout_ms;
    }

    let target = settings.apply_to(Target::parse(&cli.target, cli.mode, cli.provider)?);
    let strategy = cli.strategy.build(cli.provider);

    let mut builder = ExtractRequest::builder()
        .target(target)
        .shared_strategy(strategy);
    if let Some(readiness) = cli.readiness {
        builder = builder.readiness(readiness);
    }
    if let Some(path) = &cli.output {
        builder = builder.output_path(path);
    }
    if let Some(ms) = cli.run_timeout_ms {
        builder = builder.run_timeout(Duration::from_millis(ms));
    }
    if cli.print {
        builder = builder.sink(ConsoleSink::new());
    }
    let request = builder.build()?;

    let pipeline = ExtractionPipeline::chromium(settings.session);
    let result = retry_with_backoff(|| pipeline.run(&request), RetryPolicy::new(cli.retries))
        .await
        .with_context(|| format!("extracting from {}", request.target()))?;

    match &cli.output {
        Some(path) => println!(
            "{} records from {} written to {}",
            result.len(),
            request.target(),
            path.display()
        ),
        None => println!("{} records from {}", result.len(), request.target()),
    }
    Ok(())
}
