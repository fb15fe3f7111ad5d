//! abovefold - Above-the-fold critical CSS extraction service.
//!
//! Main entry point for the abovefold CLI and server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use abovefold_api::{ApiConfig, ApiServer};
use abovefold_browser::{ChromeConfig, SessionManager};
use abovefold_core::{ExtractOptions, Extractor};
use abovefold_protocols::{PerformanceProfile, ViewportProfile};

/// abovefold CLI.
#[derive(Parser)]
#[command(name = "abovefold")]
#[command(about = "Above-the-fold critical CSS extraction")]
#[command(version)]
struct Cli {
    /// Chrome DevTools port
    #[arg(long, default_value_t = 9222, global = true)]
    chrome_port: u16,

    /// Chrome/Chromium binary path (auto-detected when omitted)
    #[arg(long, global = true)]
    chrome_binary: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the extraction HTTP server
    Serve {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Extract critical CSS for one URL and print it
    Extract {
        /// Page URL (http or https)
        url: String,

        /// Viewport: mobile, desktop or both
        #[arg(long, default_value = "mobile")]
        viewport: String,

        /// Overall timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Keep box/text shadows in the output
        #[arg(long)]
        include_shadows: bool,

        /// User-agent override
        #[arg(long)]
        user_agent: Option<String>,

        /// Print the full result as JSON instead of bare CSS
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn build_extractor(cli: &Cli) -> Arc<Extractor> {
    let chrome_config = ChromeConfig {
        debug_port: cli.chrome_port,
        binary: cli.chrome_binary.clone(),
        ..ChromeConfig::default()
    };
    let sessions = Arc::new(SessionManager::new(
        chrome_config,
        PerformanceProfile::default(),
    ));
    Arc::new(Extractor::new(sessions))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let extractor = build_extractor(&cli);

    match cli.command {
        Commands::Serve { host, port } => {
            info!("Starting abovefold v{}", env!("CARGO_PKG_VERSION"));
            let server = ApiServer::new(ApiConfig::new(host, port), extractor);
            server.run().await
        }
        Commands::Extract {
            url,
            viewport,
            timeout_ms,
            include_shadows,
            user_agent,
            json,
        } => {
            let result =
                run_extract(&extractor, &url, &viewport, timeout_ms, include_shadows, user_agent, json)
                    .await;
            // The browser process is ours; shut it down before exiting.
            extractor.close().await;
            result
        }
    }
}

/// One-shot extraction for the CLI.
async fn run_extract(
    extractor: &Extractor,
    url: &str,
    viewport: &str,
    timeout_ms: Option<u64>,
    include_shadows: bool,
    user_agent: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = timeout_ms.map(Duration::from_millis);

    if viewport == "both" {
        let options = ExtractOptions {
            viewport: ViewportProfile::mobile(),
            timeout,
            include_shadows,
            user_agent,
        };
        let result = extractor.extract_for_both_viewports(url, &options).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", result.combined.css);
        }
        return Ok(());
    }

    let profile = match viewport {
        "mobile" => ViewportProfile::mobile(),
        "desktop" => ViewportProfile::desktop(),
        other => {
            return Err(format!(
                "unsupported viewport {:?}; expected mobile, desktop or both",
                other
            )
            .into());
        }
    };

    let options = ExtractOptions {
        viewport: profile,
        timeout,
        include_shadows,
        user_agent,
    };
    let result = extractor.extract_critical_css(url, &options).await?;
    let validation = extractor.validate_extraction(&result);
    for warning in &validation.warnings {
        tracing::warn!("{}", warning);
    }

    if json {
        let mut value = serde_json::to_value(&result)?;
        value["validation"] = serde_json::to_value(&validation)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", result.css);
    }
    Ok(())
}
