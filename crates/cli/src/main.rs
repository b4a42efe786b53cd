use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};
use zeroize::Zeroizing;

use claimer_node::config::{Config, LogConfig};

mod cli;
mod commands;

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = cli::Args::parse();

    // Logging starts at the default level so config loading is traced too
    let filter = init_tracing(&LogConfig::default(), args.verbose)?;

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(Config::DEFAULT_PATH));
    let config = Config::load(&config_path)?;
    filter.reload(log_filter(&config.log, args.verbose))?;
    debug!(?config_path, ?config, "Configuration loaded");

    let ctx = commands::Context {
        config,
        config_path,
        private_key: args.private_key.map(Zeroizing::new),
    };
    args.command.execute(ctx)
}

/// Compact logs to stderr. Returns a handle for swapping in the configured level.
fn init_tracing(
    config: &LogConfig,
    verbose: u8,
) -> Result<reload::Handle<EnvFilter, Registry>> {
    let (filter, handle) = reload::Layer::new(log_filter(config, verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(handle)
}

fn log_filter(config: &LogConfig, verbose: u8) -> EnvFilter {
    EnvFilter::new(filter_directives(
        config,
        verbose,
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
    ))
}

/// `-v` wins over `RUST_LOG`, which wins over the config level
fn filter_directives(config: &LogConfig, verbose: u8, rust_log: Option<String>) -> String {
    match verbose {
        0 => rust_log
            .filter(|directives| !directives.is_empty())
            .unwrap_or_else(|| config.level.clone()),
        1 => "debug".into(),
        _ => "trace".into(),
    }
}
