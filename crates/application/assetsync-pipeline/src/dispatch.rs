use assetsync_core::path_utils::{AssetPath, PathError};
use assetsync_core::{DispatchOutcome, ReplicationJob, ReplicationSink, SinkError};
use assetsync_scanner::{Scanner, ScannerError};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub local_root: Utf8PathBuf,
    pub remote_base: String,
    /// Enumerate and map paths without sending anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Jobs handed to the sink (or, on a dry run, jobs that would have been).
    pub dispatched: u64,
    /// Jobs the store answered with an error reply.
    pub rejected: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScannerError),
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    #[error("Refusing to dispatch {source_path}: destination {destination} is not a file path")]
    InvalidDestination {
        source_path: Utf8PathBuf,
        destination: String,
    },
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Map one walked file to its job.
pub fn map_job(
    root: &Utf8Path,
    remote_base: &str,
    source: Utf8PathBuf,
) -> Result<ReplicationJob, PipelineError> {
    let rel = AssetPath::relative(root, &source)?;
    let destination = AssetPath::destination(remote_base, &rel);
    if !AssetPath::verify_destination(&destination) {
        return Err(PipelineError::InvalidDestination {
            source_path: source,
            destination,
        });
    }
    Ok(ReplicationJob::new(source, destination))
}

/// Walks the local root and sends one job per file to the sink.
pub struct Dispatcher<S> {
    request: DispatchRequest,
    sink: S,
}

impl<S: ReplicationSink> Dispatcher<S> {
    pub fn new(request: DispatchRequest, sink: S) -> Self {
        Self { request, sink }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Single sequential pass. Any scan or transport error ends the run;
    /// nothing already sent is remembered.
    pub fn run(&mut self) -> Result<DispatchReport, PipelineError> {
        self.run_with(|_| {})
    }

    /// Like [`Dispatcher::run`], calling `on_job` for every mapped job before
    /// it is sent.
    pub fn run_with<F>(&mut self, mut on_job: F) -> Result<DispatchReport, PipelineError>
    where
        F: FnMut(&ReplicationJob),
    {
        let absolute_root = Scanner::absolute_root(&self.request.local_root)?;
        let root = absolute_root.as_path();
        info!(
            "Dispatching {} -> {}{}",
            root,
            self.request.remote_base,
            if self.request.dry_run { " (dry run)" } else { "" }
        );

        let mut report = DispatchReport::default();

        for entry in Scanner::walk(root)? {
            let job = map_job(root, &self.request.remote_base, entry?)?;
            debug!("{} -> {}", job.source, job.destination);
            on_job(&job);

            if self.request.dry_run {
                report.dispatched += 1;
                continue;
            }

            match self.sink.dispatch(&job)? {
                DispatchOutcome::Accepted => {}
                DispatchOutcome::Rejected(reason) => {
                    warn!("Store rejected {}: {}", job.source, reason);
                    report.rejected += 1;
                }
            }
            report.dispatched += 1;
        }

        info!(
            "Dispatched {} files ({} rejected)",
            report.dispatched, report.rejected
        );
        Ok(report)
    }
}
