use assetsync_cli::{commands, SyncSettings};
use assetsync_config::{
    DEFAULT_DISPATCH_COMMAND, DEFAULT_LOCAL_ROOT, DEFAULT_REMOTE_BASE, DEFAULT_STORE_DB,
    DEFAULT_STORE_HOST, DEFAULT_STORE_PORT,
};
use assetsync_infra::StoreTarget;
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Ask the asset store to replicate every file under a local directory.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long)]
    verbose: bool,
    /// Local directory to walk
    #[arg(long, default_value = DEFAULT_LOCAL_ROOT)]
    root: Utf8PathBuf,
    /// Remote prefix the relative paths are appended to
    #[arg(long, default_value = DEFAULT_REMOTE_BASE)]
    remote_base: String,
    #[arg(long, default_value = DEFAULT_STORE_HOST)]
    host: String,
    #[arg(long, default_value_t = DEFAULT_STORE_PORT)]
    port: u16,
    #[arg(long, default_value_t = DEFAULT_STORE_DB)]
    db: i64,
    /// Store command sent for each file
    #[arg(long, default_value = DEFAULT_DISPATCH_COMMAND)]
    command: String,
    /// Print source/destination pairs without contacting the store
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = SyncSettings {
        local_root: cli.root,
        remote_base: cli.remote_base,
        store: StoreTarget {
            host: cli.host,
            port: cli.port,
            db: cli.db,
            command: cli.command,
        },
        dry_run: cli.dry_run,
    };

    commands::cmd_sync(settings)?;

    Ok(())
}
