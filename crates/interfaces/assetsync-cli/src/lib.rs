pub mod commands;

use assetsync_infra::StoreTarget;
use camino::Utf8PathBuf;

/// Everything one replication run needs.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub local_root: Utf8PathBuf,
    pub remote_base: String,
    pub store: StoreTarget,
    pub dry_run: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            local_root: Utf8PathBuf::from(assetsync_config::DEFAULT_LOCAL_ROOT),
            remote_base: assetsync_config::DEFAULT_REMOTE_BASE.to_string(),
            store: StoreTarget {
                host: assetsync_config::DEFAULT_STORE_HOST.to_string(),
                port: assetsync_config::DEFAULT_STORE_PORT,
                db: assetsync_config::DEFAULT_STORE_DB,
                command: assetsync_config::DEFAULT_DISPATCH_COMMAND.to_string(),
            },
            dry_run: false,
        }
    }
}
