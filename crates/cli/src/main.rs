use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "portsync",
    about = "Sync Port users and teams into the Port software catalog",
    version
)]
struct Cli {
    /// Path to configuration file (optional; defaults and environment are used if absent)
    #[arg(long, default_value = "portsync.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch users and teams and upsert them as catalog entities (default)
    Sync {
        /// Build and log entities without upserting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a default configuration file
    Init {
        /// Where to write the configuration
        #[arg(long, default_value = "portsync.toml")]
        path: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Credentials usually come from a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Sync { dry_run: false }) {
        Commands::Sync { dry_run } => {
            commands::sync::run(&cli.config, dry_run).await?;
        }
        Commands::Init { path, force } => {
            commands::init::run(&path, force)?;
        }
    }

    Ok(())
}
