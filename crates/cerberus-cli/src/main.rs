mod merge;
mod normalize;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::normalize::PlatformArg;

#[derive(Debug, Parser)]
#[command(name = "cerberus")]
#[command(about = "Ad-to-lead attribution merge")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge ad batches with CRM leads and print the unified rows as JSON
    Merge {
        /// Meta ad records (JSON array)
        #[arg(long)]
        meta: Option<PathBuf>,

        /// Google Ads records (JSON array)
        #[arg(long)]
        google: Option<PathBuf>,

        /// CRM lead records (JSON array)
        #[arg(long)]
        leads: Option<PathBuf>,

        /// Print the full report (skips, drift, summary) instead of just the rows
        #[arg(long)]
        report: bool,

        #[arg(long)]
        pretty: bool,
    },
    /// Normalize a raw platform API response into merge-ready records
    Normalize {
        #[arg(long, value_enum)]
        platform: PlatformArg,

        /// Response body saved from the platform API
        #[arg(long)]
        input: PathBuf,

        /// Google Ads customer id recorded as each row's `account_id`
        #[arg(long, default_value = "")]
        account_id: String,

        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cerberus_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Merge {
            meta,
            google,
            leads,
            report,
            pretty,
        }) => {
            let paths = merge::BatchPaths {
                meta,
                google,
                leads,
            };
            merge::run(&paths, &config.thresholds, report, pretty).await?;
        }
        Some(Commands::Normalize {
            platform,
            input,
            account_id,
            pretty,
        }) => {
            normalize::run(platform, &input, &account_id, &config, pretty).await?;
        }
        Some(Commands::Config) => print_config(&config),
        None => println!("cerberus: run `cerberus --help` for commands"),
    }

    Ok(())
}

fn print_config(config: &cerberus_core::AppConfig) {
    let t = &config.thresholds;
    println!("env: {}", config.env);
    println!("log_level: {}", config.log_level);
    println!("zero_performance_min_spend: {}", t.zero_performance_min_spend);
    println!("funnel_min_ctr: {}", t.funnel_min_ctr);
    println!("funnel_max_conversion_rate: {}", t.funnel_max_conversion_rate);
    println!(
        "top_performer_min_conversions: {}",
        t.top_performer_min_conversions
    );
    println!(
        "top_performer_max_cost_per_lead: {}",
        t.top_performer_max_cost_per_lead
    );
    println!(
        "meta_conversion_actions: {}",
        config.meta_conversion_actions.join(",")
    );
}

/// Serializes `value` to stdout, compact or pretty.
fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
