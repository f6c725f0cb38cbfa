use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stumps_proxy::config::{
    ConfigurationDataAccess, ConfigurationEntity, JsonFileDataAccess, ProxyEntity,
};
use stumps_proxy::{ProxyEnvironment, ProxyServer};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Stumps - HTTP interception proxy that replays recorded responses
#[derive(Parser, Debug)]
#[command(name = "stumps-proxy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON)
    #[arg(short, long, env = "STUMPS_CONFIG", default_value = "stumps.json")]
    config: PathBuf,

    /// Start a single ad-hoc proxy on this port in addition to the configured ones
    /// (0 picks a free port, logged at startup)
    #[arg(short, long, env = "STUMPS_PORT")]
    port: Option<u16>,

    /// External host name for the ad-hoc proxy
    #[arg(long, env = "STUMPS_HOST_NAME", default_value = "localhost")]
    host_name: String,

    /// Start the ad-hoc proxy in record mode
    #[arg(long, env = "STUMPS_RECORD")]
    record: bool,

    /// Emit logs as JSON
    #[arg(long, env = "STUMPS_LOG_JSON")]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_configuration(path: &Path) -> Result<ConfigurationEntity, anyhow::Error> {
    let access = JsonFileDataAccess::new(path);
    if !access.exists() {
        warn!(
            "Configuration file {} not found, starting without configured proxies",
            path.display()
        );
        return Ok(ConfigurationEntity::default());
    }
    access
        .load_configuration()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

async fn start_proxy(
    servers: &mut JoinSet<Result<(), anyhow::Error>>,
    entity: &ProxyEntity,
) -> Result<(), anyhow::Error> {
    if entity.use_ssl {
        warn!(
            "Proxy '{}' requests SSL, which is not supported; serving plain HTTP",
            entity.proxy_id
        );
    }

    let environment = ProxyEnvironment::from_entity(entity)
        .with_context(|| format!("Invalid proxy '{}'", entity.proxy_id))?;
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), entity.port);
    let server = ProxyServer::with_default_pipeline(addr, Arc::new(environment));
    let listener = server
        .bind()
        .await
        .with_context(|| format!("Failed to start proxy '{}'", entity.proxy_id))?;
    let bound = listener
        .local_addr()
        .context("Proxy listener has no local address")?;

    info!(
        "Started proxy '{}' for {} on port {} ({} Stumps, recording: {})",
        entity.proxy_id,
        entity.external_host_name,
        bound.port(),
        server.environment().stumps().len(),
        server.environment().record_traffic()
    );
    servers.spawn(server.serve(listener));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let configuration = load_configuration(&args.config)?;
    let mut proxies: Vec<ProxyEntity> = configuration
        .proxies
        .into_iter()
        .filter(|proxy| proxy.auto_start)
        .collect();

    if let Some(port) = args.port {
        let mut adhoc = ProxyEntity::new(args.host_name.clone(), port);
        adhoc.record_traffic = args.record;
        proxies.push(adhoc);
    }

    if proxies.is_empty() {
        anyhow::bail!(
            "No proxies to start: add an autoStart proxy to {} or pass --port",
            args.config.display()
        );
    }

    let mut servers = JoinSet::new();
    for proxy in &proxies {
        start_proxy(&mut servers, proxy).await?;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping {} proxies", servers.len());
                servers.shutdown().await;
                return Ok(());
            }
            Some(joined) = servers.join_next() => {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!("Proxy stopped: {:#}", e),
                    Err(e) => error!("Proxy task failed: {}", e),
                }
                if servers.is_empty() {
                    anyhow::bail!("All proxies stopped");
                }
            }
        }
    }
}
