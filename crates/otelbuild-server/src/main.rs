use anyhow::{Context, Result};
use clap::Parser;
use otelbuild_server::config::ServerConfig;

/// HTTP endpoint accepting OTel Collector configuration submissions
#[derive(Parser)]
#[command(name = "otelbuild")]
#[command(version)]
#[command(
    about = "HTTP endpoint accepting OTel Collector configuration submissions",
    long_about = None
)]
struct Cli {
    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<String>,

    /// OTLP/gRPC endpoint for span export
    #[arg(long, value_name = "URL")]
    otlp_endpoint: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build tokio runtime and run async server
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Environment first, CLI flags on top (highest priority)
    let mut config = ServerConfig::from_env();
    apply_cli_overrides(&mut config, &cli)?;

    otelbuild_server::run(config).await
}

fn apply_cli_overrides(config: &mut ServerConfig, cli: &Cli) -> Result<()> {
    if let Some(listen) = &cli.listen {
        config.listen_addr = listen.clone();
    }

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    if let Some(format) = &cli.log_format {
        config.log_format = format
            .parse()
            .with_context(|| format!("Invalid --log-format '{format}'"))?;
    }

    if let Some(endpoint) = &cli.otlp_endpoint {
        config.otlp_endpoint = Some(endpoint.clone());
    }

    Ok(())
}
