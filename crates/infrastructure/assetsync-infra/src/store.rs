use assetsync_core::{DispatchOutcome, ReplicationJob, ReplicationSink, SinkError};
use redis::{Client, Connection, ErrorKind, RedisError, Value};
use tracing::{debug, info};

/// Where the replication commands go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTarget {
    pub host: String,
    pub port: u16,
    pub db: i64,
    /// Custom command the store understands, e.g. `ftpasync`.
    pub command: String,
}

impl StoreTarget {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store target {url}: {source}")]
    InvalidTarget { url: String, source: RedisError },
    #[error("cannot connect to store at {url}: {source}")]
    Connect { url: String, source: RedisError },
    #[error("store at {url} did not answer PING: {source}")]
    Handshake { url: String, source: RedisError },
    #[error("store transport error: {0}")]
    Transport(#[from] RedisError),
}

impl From<StoreError> for SinkError {
    fn from(value: StoreError) -> Self {
        SinkError::Transport(Box::new(value))
    }
}

/// One open connection to the store. Dropped when the client goes out of scope.
pub struct StoreClient {
    conn: Connection,
    command: String,
}

impl StoreClient {
    /// Opens the connection and checks it with a `PING`, so an unreachable
    /// store fails here rather than on the first file.
    pub fn connect(target: &StoreTarget) -> Result<Self, StoreError> {
        let url = target.url();
        let client = Client::open(url.as_str()).map_err(|source| StoreError::InvalidTarget {
            url: url.clone(),
            source,
        })?;
        let mut conn = client
            .get_connection()
            .map_err(|source| StoreError::Connect {
                url: url.clone(),
                source,
            })?;

        let pong: String = redis::cmd("PING")
            .query(&mut conn)
            .map_err(|source| StoreError::Handshake {
                url: url.clone(),
                source,
            })?;
        info!("Connected to store at {} ({})", url, pong);

        Ok(Self {
            conn,
            command: target.command.clone(),
        })
    }

    /// Sends `<command> <source> <destination>` and waits only for the
    /// protocol-level reply.
    pub fn send(&mut self, job: &ReplicationJob) -> Result<DispatchOutcome, StoreError> {
        let reply: Result<Value, RedisError> = redis::cmd(&self.command)
            .arg(job.source.as_str())
            .arg(job.destination.as_str())
            .query(&mut self.conn);

        match reply {
            Ok(_) => Ok(DispatchOutcome::Accepted),
            Err(e) if is_error_reply(&e) => {
                debug!("{} replied with error: {}", self.command, e);
                Ok(DispatchOutcome::Rejected(e.to_string()))
            }
            Err(e) => Err(StoreError::Transport(e)),
        }
    }
}

impl ReplicationSink for StoreClient {
    fn dispatch(&mut self, job: &ReplicationJob) -> Result<DispatchOutcome, SinkError> {
        Ok(self.send(job)?)
    }
}

/// Error replies come back from a live server; everything else means the
/// connection itself is gone or broken.
fn is_error_reply(e: &RedisError) -> bool {
    if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
        return false;
    }
    matches!(e.kind(), ErrorKind::ResponseError | ErrorKind::ExtensionError)
}
