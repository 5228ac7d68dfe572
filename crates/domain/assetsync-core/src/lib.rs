use camino::Utf8PathBuf;

pub mod path_utils;

/// One file's replication request: where it lives locally and where the
/// store should put it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplicationJob {
    pub source: Utf8PathBuf,
    pub destination: String,
}

impl ReplicationJob {
    pub fn new(source: Utf8PathBuf, destination: String) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// How the store answered a dispatch. The reply payload itself is never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The store took the command.
    Accepted,
    /// The store answered with an error reply (bad params, backend down, ...).
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The round-trip to the store failed; the cause keeps the client's error chain.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Anything that accepts replication jobs, one at a time.
pub trait ReplicationSink {
    fn dispatch(&mut self, job: &ReplicationJob) -> Result<DispatchOutcome, SinkError>;
}

impl<S: ReplicationSink + ?Sized> ReplicationSink for &mut S {
    fn dispatch(&mut self, job: &ReplicationJob) -> Result<DispatchOutcome, SinkError> {
        (**self).dispatch(job)
    }
}

impl<S: ReplicationSink + ?Sized> ReplicationSink for Box<S> {
    fn dispatch(&mut self, job: &ReplicationJob) -> Result<DispatchOutcome, SinkError> {
        (**self).dispatch(job)
    }
}

/// Sink that keeps every job in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub jobs: Vec<ReplicationJob>,
}

impl ReplicationSink for RecordingSink {
    fn dispatch(&mut self, job: &ReplicationJob) -> Result<DispatchOutcome, SinkError> {
        self.jobs.push(job.clone());
        Ok(DispatchOutcome::Accepted)
    }
}
