use clap::Parser;
use std::process::ExitCode;
use tickerscope::cli::{Cli, Commands};
use tickerscope::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let loaded = Config::load(&cli.config);
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    // Initialize telemetry
    tickerscope::telemetry::init_telemetry(&config.telemetry)?;

    if let Err(e) = &loaded {
        tracing::warn!(path = %cli.config, error = %e, "Using default configuration");
    }

    match cli.command {
        Commands::Show(args) => {
            tracing::debug!(ticker = %args.ticker, "Showing dashboard");
            return args.execute(&config).await;
        }
        Commands::Session(args) => {
            tracing::debug!("Starting session");
            args.execute(&config).await?;
        }
        Commands::Tickers => {
            for (i, ticker) in config.dashboard.shortlist_tickers().iter().enumerate() {
                println!("{:>2}) {}", i + 1, ticker);
            }
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Market: {} (timeout {}s)",
                config.market.base_url, config.market.timeout_secs
            );
            println!(
                "  News: {} (key from ${}, max {} articles)",
                config.news.base_url, config.news.api_key_env, config.news.max_results
            );
            println!("  News domains: {}", config.news.domains.join(", "));
            println!(
                "  Cache: {}",
                if config.cache.enabled {
                    format!("{}s", config.cache.ttl_secs)
                } else {
                    "disabled".to_string()
                }
            );
            println!(
                "  Defaults: period {}, interval {}",
                config.dashboard.default_period, config.dashboard.default_interval
            );
            println!("  Shortlist: {}", config.dashboard.shortlist.join(", "));
            println!(
                "  Charts: {}x{}",
                config.dashboard.chart_width, config.dashboard.chart_height
            );
            println!(
                "  Logging: {} ({:?})",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
