use clap::Parser;
use lead_relay::utils::{logger, validation::Validate};
use lead_relay::{AppState, CliConfig};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, cli.log_format);

    tracing::info!("Starting lead-relay");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(
                "❌ Configuration validation failed: {} (Category: {:?})",
                e,
                e.category()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Import mode: {}, default role code: {}",
        config.import.mode,
        config.import.default_role_code
    );

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    let state = AppState::from_config(&config)?;
    lead_relay::serve(addr, state).await
}
