//! Page Inbox Export CLI - main entry point
//!
//! Downloads all private conversations of a Facebook Page and saves them,
//! one file per user. The output is private and confidential; protect it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use page_inbox_export::config::{parse_time_zone, CONFIG_FILE};
use page_inbox_export::export::{self, Locale};
use page_inbox_export::{metrics, ExportConfig, GraphClient};

#[derive(Parser)]
#[command(name = "page_inbox_export")]
#[command(about = "Export Facebook Page conversations to text files", long_about = None)]
#[command(version)]
struct Cli {
    /// Page access token (Graph API explorer, pages_messaging permission)
    #[arg(env = "FB_PAGE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Facebook Page ID whose inbox is exported
    #[arg(long, env = "FB_PAGE_ID")]
    page_id: Option<String>,

    /// Directory for transcript files
    #[arg(short, long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum number of conversations fetched at once
    #[arg(short, long, env = "EXPORT_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Graph API base URL including version
    #[arg(long, env = "GRAPH_API_URL")]
    api_url: Option<String>,

    /// Locale for timestamps: en-US | en-GB | de-DE | ru-RU
    #[arg(long)]
    locale: Option<String>,

    /// IANA time zone for timestamps (e.g., America/Denver)
    #[arg(long)]
    time_zone: Option<String>,

    /// Optional YAML config file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,
}

impl Cli {
    /// config.yml (if any) with command line overrides applied.
    fn export_config(&self) -> page_inbox_export::Result<ExportConfig> {
        let mut config = ExportConfig::load(&self.config)?;
        if let Some(page_id) = &self.page_id {
            config.page_id = page_id.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(locale) = &self.locale {
            config.locale = Locale::parse(locale)?;
        }
        if let Some(tz) = &self.time_zone {
            config.time_zone = parse_time_zone(tz)?;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("page_inbox_export=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let config = cli.export_config()?;
    let client = GraphClient::with_base_url(&cli.access_token, &config.api_url)?;

    let start = Instant::now();
    let result = export::run(&client, &config).await;
    metrics::record_run_result(start.elapsed(), result.is_ok());

    // Failures are reported but do not change the exit status.
    if let Err(err) = result {
        error!("Export failed: {}", err);
        eprintln!("{}", err);
        if let Some(guidance) = export::guidance_for(&err, &config) {
            eprintln!("{}", guidance);
        }
    }

    Ok(())
}
