//! Compiled-in defaults for where assets are read from and where they are sent.

/// Local directory whose files are replicated.
pub const DEFAULT_LOCAL_ROOT: &str = "/data/cdn/images";

/// Remote prefix every relative path is appended to.
pub const DEFAULT_REMOTE_BASE: &str = "/prd_asset/data/images/shop";

/// Host of the replication store.
pub const DEFAULT_STORE_HOST: &str = "127.0.0.1";

/// Port of the replication store.
pub const DEFAULT_STORE_PORT: u16 = 8399;

/// Database index selected on connect.
pub const DEFAULT_STORE_DB: i64 = 0;

/// Store command that queues an asynchronous upload.
pub const DEFAULT_DISPATCH_COMMAND: &str = "ftpasync";
