use std::path::Path;

use portsync_core::config::{PortSyncConfig, ENV_CLIENT_ID, ENV_CLIENT_SECRET};
use tracing::info;

/// Run the `init` command: write a default configuration file.
pub fn run(path: &str, force: bool) -> anyhow::Result<()> {
    let config_path = Path::new(path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Pass --force to overwrite it.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let config = PortSyncConfig::generate_default();
    let toml_str = toml::to_string_pretty(&config)?;
    std::fs::write(config_path, &toml_str)?;
    info!("Wrote configuration to {}", config_path.display());

    println!("portsync initialized successfully!");
    println!("  Configuration: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Export {ENV_CLIENT_ID} and {ENV_CLIENT_SECRET} (or put them in .env)");
    println!("  2. Run `portsync sync --dry-run` to preview the entities");
    println!("  3. Run `portsync sync` to upsert them into Port");

    Ok(())
}
