use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "warpsched",
    about = "WarpGrid scheduler — validate profiles and dry-run scheduling cycles",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every plugin in a profile and report its extension points.
    ///
    /// Fails if any plugin's args are malformed or out of range.
    Check {
        /// Path to the scheduling profile (TOML)
        #[arg(short, long)]
        config: String,
    },
    /// Run one scheduling cycle for a pod against a snapshot file.
    Schedule {
        /// Path to the scheduling profile (TOML)
        #[arg(short, long)]
        config: String,
        /// Snapshot of the cluster: {"nodes": [...]} (JSON)
        #[arg(short, long)]
        snapshot: String,
        /// The pod to place (JSON)
        #[arg(short, long)]
        pod: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("warpsched=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => commands::check::check(&config),
        Commands::Schedule {
            config,
            snapshot,
            pod,
            format,
        } => commands::schedule::schedule(&config, &snapshot, &pod, &format),
    }
}
