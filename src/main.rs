use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod averages;
mod config;
mod error;
mod histogram;
mod loader;
mod models;
mod regression;
mod report;

use config::Config;
use report::{OutputFormat, ReportKind};

#[derive(Parser)]
#[command(name = "study-performance-reports")]
#[command(about = "Summary statistics over student exam scores", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long, env = "STUDY_PERFORMANCE_CSV", default_value = "datasets/study_performance.csv")]
    csv: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
    /// Output file; a directory for `all`. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Average scores per parental education level
    Averages(ReportArgs),
    /// Math score distribution by gender
    Histogram(ReportArgs),
    /// Verbal vs. math trend lines by gender
    Scatter(ReportArgs),
    /// Run all three reports independently
    All(ReportArgs),
    /// Write a default configuration file
    InitConfig {
        #[arg(long, default_value = "reports.toml")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Averages(args) => run_one(ReportKind::Averages, &args).await?,
        Commands::Histogram(args) => run_one(ReportKind::Histogram, &args).await?,
        Commands::Scatter(args) => run_one(ReportKind::Scatter, &args).await?,
        Commands::All(args) => run_all(&args).await?,
        Commands::InitConfig { out } => {
            if out.exists() {
                anyhow::bail!("{} already exists", out.display());
            }
            std::fs::write(&out, Config::default_toml()?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Config written to {}.", out.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run_one(kind: ReportKind, args: &ReportArgs) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let rendered = report::generate(kind, &args.csv, &config, args.format)
        .await
        .with_context(|| format!("{} report failed", kind.name()))?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

async fn run_all(args: &ReportArgs) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let results = report::generate_all(&args.csv, &config, args.format).await;

    let mut failed = 0usize;
    for (kind, result) in results {
        match result {
            Ok(rendered) => emit(kind, &rendered, args)?,
            Err(err) => {
                failed += 1;
                error!(report = kind.name(), "report unavailable: {err:#}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} reports failed", ReportKind::ALL.len());
    }
    info!("all reports generated");
    Ok(())
}

fn emit(kind: ReportKind, rendered: &str, args: &ReportArgs) -> anyhow::Result<()> {
    let Some(dir) = &args.out else {
        println!("{rendered}");
        return Ok(());
    };

    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(file_name(kind, args.format));
    std::fs::write(&path, rendered)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Report written to {}.", path.display());
    Ok(())
}

fn file_name(kind: ReportKind, format: OutputFormat) -> PathBuf {
    let extension = match format {
        OutputFormat::Markdown => "md",
        OutputFormat::Json => "json",
    };
    Path::new(kind.name()).with_extension(extension)
}
