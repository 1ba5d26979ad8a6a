use std::path::PathBuf;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenv::dotenv;
use forex_agents::{
    middleware::cors_middleware,
    models::{supported_currencies, EMERGING_CURRENCIES, MAJOR_CURRENCIES},
    routes, AnalysisPipeline, Config, CurrencyPair, ExchangeRateClient, ProgressEvent, ProgressSink,
    RateFetcher, Stage, StageStatus,
};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Forex currency pair analysis: live rate, news and an LLM-written report", long_about = None)]
struct Cli {
    /// Completion model identifier (overrides COMPLETION_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Per-request timeout in seconds (overrides HTTP_TIMEOUT_SECS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full analysis and save a Markdown report
    Analyze {
        #[arg(long, default_value = "USD")]
        base: String,
        #[arg(long, default_value = "INR")]
        target: String,
        /// Directory the report is written to
        #[arg(long, default_value = "reports")]
        out: PathBuf,
        /// Print the report without writing a file
        #[arg(long)]
        no_save: bool,
    },
    /// Convert an amount at the current rate
    Convert {
        #[arg(long, default_value_t = 100.0)]
        amount: f64,
        #[arg(long, default_value = "USD")]
        base: String,
        #[arg(long, default_value = "INR")]
        target: String,
    },
    /// List supported currency codes
    Currencies,
    /// Serve the analysis API over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

/// Prints numbered steps as the pipeline advances.
struct TerminalProgress;

impl ProgressSink for TerminalProgress {
    fn on_event(&self, event: &ProgressEvent) {
        let ProgressEvent::Stage { stage, status } = event else {
            return;
        };
        let step = Stage::ALL.iter().position(|s| s == stage).unwrap_or(0) + 1;
        let prefix = format!("Step {}/{}:", step, Stage::ALL.len());
        match status {
            StageStatus::Started => println!("{} {}...", prefix.bold(), stage.label()),
            StageStatus::Completed => println!("{} {} {}", prefix.bold(), stage.label(), "done".green()),
            StageStatus::Failed => println!("{} {} {}", prefix.bold(), stage.label(), "failed".red()),
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(model) = &cli.model {
        config.completion_model = model.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

async fn analyze(config: &Config, pair: CurrencyPair, out: PathBuf, no_save: bool) -> Result<()> {
    config.ensure_credentials()?;
    let pipeline = AnalysisPipeline::from_config(config)?;

    println!("{}", format!("📊 Analyzing {}", pair).bold().cyan());
    let report = match pipeline.run_with_progress(&pair, &TerminalProgress).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", "An error occurred:".red().bold(), e);
            return Err(e.into());
        }
    };

    println!("\n{}\n", "Analysis complete!".green().bold());
    println!("{}", report.to_markdown());

    if !no_save {
        let path = report.save_markdown(&out).await?;
        println!("{} {}", "📥 Report saved to".green(), path.display());
    }
    Ok(())
}

async fn convert(config: &Config, pair: CurrencyPair, amount: f64) -> Result<()> {
    if config.exchange_rate_api_key.is_empty() {
        bail!("EXCHANGE_RATE_API_KEY must be set");
    }
    let client = ExchangeRateClient::new(config)?;
    let rate = client.fetch_rate(&pair).await.context("Could not fetch exchange rate")?;

    println!(
        "{}",
        format!("{:.2} {} = {:.2} {}", amount, pair.base, rate.convert(amount), pair.target).bold()
    );
    println!("Rate: 1 {} = {} {}", pair.base, rate.rate, pair.target);
    println!("Last updated: {}", rate.last_updated.as_deref().unwrap_or("Unknown"));
    Ok(())
}

fn list_currencies() {
    println!("{} {}", "Major:".bold(), MAJOR_CURRENCIES.join(", "));
    println!("{} {}", "Emerging:".bold(), EMERGING_CURRENCIES.join(", "));
    println!("{} {}", "All:".bold(), supported_currencies().join(", "));
}

async fn serve(config: &Config, host: String, port: u16) -> Result<()> {
    let missing = config.missing_keys();
    if !missing.is_empty() {
        tracing::warn!("Missing API keys: {}", missing.join(", "));
    }

    let pipeline = web::Data::new(AnalysisPipeline::from_config(config)?);
    info!(%host, port, "starting HTTP server");

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(pipeline.clone())
            .configure(routes::config)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run()
    .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Analyze { base, target, out, no_save } => {
            let pair = CurrencyPair::new(&base, &target)?;
            analyze(&config, pair, out, no_save).await
        }
        Command::Convert { amount, base, target } => {
            let pair = CurrencyPair::new(&base, &target)?;
            convert(&config, pair, amount).await
        }
        Command::Currencies => {
            list_currencies();
            Ok(())
        }
        Command::Serve { host, port } => serve(&config, host, port).await,
    }
}
