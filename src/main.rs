use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dive_sailthru_client::config::Config;
use dive_sailthru_client::models::StatsOptions;
use dive_sailthru_client::sailthru_client::SailthruClient;
use dive_sailthru_client::service::CampaignService;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Query Sailthru campaigns with Industry Dive classification.
#[derive(Parser)]
#[command(name = "dive-sailthru", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sent campaigns in [start, end), oldest first.
    Campaigns {
        /// First day, YYYY-MM-DD.
        #[arg(long)]
        start: NaiveDate,
        /// Day after the last one, YYYY-MM-DD.
        #[arg(long)]
        end: NaiveDate,
        /// Only sends to this list.
        #[arg(long)]
        list: Option<String>,
    },
    /// Stats for one blast.
    Stats {
        blast_id: i64,
        #[arg(long)]
        clickmap: bool,
        #[arg(long)]
        subject: bool,
        #[arg(long)]
        click_times: bool,
        #[arg(long)]
        urls: bool,
        #[arg(long)]
        device: bool,
    },
    /// Content and metadata for one blast.
    Blast { blast_id: i64 },
    /// User profile with every expected key present.
    User { id: String },
}

/// Main entry point.
///
/// Initializes tracing (to stderr, so stdout stays valid JSON), loads the
/// Sailthru credentials from the environment, runs one command and prints
/// its result.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dive_sailthru_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let client = SailthruClient::from_config(&config)?;
    tracing::info!("✓ Sailthru client initialized: {}", config.api_url);
    let service = CampaignService::new(client);

    let output: Value = match cli.command {
        Command::Campaigns { start, end, list } => {
            let campaigns = service
                .get_campaigns_in_range(start, end, list.as_deref())
                .await?;
            serde_json::to_value(campaigns)?
        }
        Command::Stats {
            blast_id,
            clickmap,
            subject,
            click_times,
            urls,
            device,
        } => {
            let options = StatsOptions {
                include_clickmap: clickmap,
                include_subject: subject,
                include_click_times: click_times,
                include_urls: urls,
                include_device: device,
            };
            service.get_campaign_stats(blast_id, options).await?
        }
        Command::Blast { blast_id } => service.get_campaign_data(blast_id).await?,
        Command::User { id } => service.get_user(&id, None).await?.into_json(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
