use std::path::Path;
use std::time::{Duration, Instant};

use portsync_catalog::auth::{PortAuth, PortCredentials};
use portsync_catalog::client::{build_http_client, PortClient};
use portsync_catalog::sync::{PortSyncEngine, SyncSummary};
use portsync_core::config::PortSyncConfig;
use tracing::info;

/// Run the `sync` command: authenticate, then mirror users and teams into the catalog.
pub async fn run(config_path: &str, dry_run: bool) -> anyhow::Result<()> {
    let path = Path::new(config_path);
    let mut config = PortSyncConfig::load_or_default(path)?;
    if path.exists() {
        info!("Loaded configuration from {}", config_path);
    }
    config.apply_env();

    println!(
        "Starting Port user/team sync against {}...",
        config.port.api_url
    );
    let start = Instant::now();

    let summary = run_with_config(&config, dry_run).await?;

    println!(
        "Sync {} in {:.1}s",
        if dry_run { "preview finished" } else { "completed" },
        start.elapsed().as_secs_f64()
    );
    println!("  Teams upserted:  {}", summary.teams_upserted);
    println!("  Users upserted:  {}", summary.users_upserted);
    println!("  Users skipped:   {}", summary.users_skipped);
    println!("  Failed upserts:  {}", summary.failed);
    if dry_run {
        println!();
        println!("This was a dry run. No entities were written to Port.");
        println!("Run `portsync sync` without --dry-run to apply changes.");
    }

    Ok(())
}

/// Validate `config`, authenticate, and run one sync pass.
pub async fn run_with_config(
    config: &PortSyncConfig,
    dry_run: bool,
) -> anyhow::Result<SyncSummary> {
    config.validate()?;

    let http = build_http_client(Duration::from_secs(config.port.request_timeout_secs))?;
    let credentials = PortCredentials::from_config(&config.port);

    info!(api_url = %config.port.api_url, dry_run, "authenticating with Port");
    let auth = PortAuth::authenticate(&http, &config.port.api_url, &credentials).await?;

    let client = PortClient::new(http, &config.port.api_url, &auth);
    let engine = PortSyncEngine::new(client, config.sync.clone());

    Ok(engine.run_sync(dry_run).await)
}
