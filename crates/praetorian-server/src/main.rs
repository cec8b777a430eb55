mod cli;

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::Path,
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use color_eyre::Result;
use praetorian_keystore::{
    root_key::{encode_root_key, generate_root_key},
    KeyRegistry,
};
use praetorian_server::{
    api::{create_router, AppState},
    config, server,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand, ServeArgs};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    match cli.command.unwrap_or_default() {
        Command::Serve(args) => run_server(args).await?,
        Command::Keygen { id } => println!("{}", keygen(&id)?),
        Command::Config(ConfigCommand::Check { config }) => check_config(config.as_deref())?,
        Command::Version => print_version(),
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("praetorian {}", env!("CARGO_PKG_VERSION"));
}

/// Configuration errors abort here, before anything is bound.
async fn run_server(args: ServeArgs) -> Result<()> {
    let config = config::load(args.config.as_deref())?;
    let registry = KeyRegistry::from_config(&config.keys)?;
    info!(keys = ?registry.ids(), active = registry.active_id(), "root keys loaded");

    let state = AppState::new(Arc::new(registry));
    let listener = server::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port))).await?;
    server::serve(
        listener,
        create_router(state),
        server::shutdown_signal(),
        Duration::from_secs(args.grace_period),
    )
    .await?;
    Ok(())
}

fn check_config(path: Option<&Path>) -> Result<()> {
    let config = config::load(path)?;
    let registry = KeyRegistry::from_config(&config.keys)?;
    println!(
        "Config: ok (active key `{}`, keys: {}, port: {})",
        registry.active_id(),
        registry.ids().join(", "),
        config.port
    );
    Ok(())
}

/// A fresh key plus a config document that activates it.
fn keygen(id: &str) -> Result<String> {
    let material = generate_root_key(id);
    let mut root_keys = serde_json::Map::new();
    root_keys.insert(id.to_string(), encode_root_key(&material).into());
    let snippet = serde_json::json!({ "activeKeyId": id, "rootKeys": root_keys });
    Ok(format!(
        "{}\n\n{}='{}'",
        encode_root_key(&material),
        config::CONFIG_ENV,
        serde_json::to_string(&snippet)?
    ))
}
