use assetsync_core::{DispatchOutcome, RecordingSink, ReplicationJob, ReplicationSink, SinkError};
use assetsync_pipeline::{DispatchRequest, Dispatcher, PipelineError};
use camino::Utf8PathBuf;
use std::collections::BTreeSet;
use std::fs;
use tempfile::tempdir;

const BASE: &str = "/prd_asset/data/images/shop";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn request(root: &Utf8PathBuf) -> DispatchRequest {
    DispatchRequest {
        local_root: root.clone(),
        remote_base: BASE.to_string(),
        dry_run: false,
    }
}

fn fixture() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    fs::create_dir_all(root.join("shop/1")).unwrap();
    fs::write(root.join("shop/1/a.jpg"), b"a").unwrap();
    fs::write(root.join("shop/1/b.jpg"), b"b").unwrap();
    fs::write(root.join("top.png"), b"t").unwrap();
    (dir, root)
}

fn pairs(jobs: &[ReplicationJob]) -> BTreeSet<(String, String)> {
    jobs.iter()
        .map(|j| (j.source.to_string(), j.destination.clone()))
        .collect()
}

#[test]
fn one_job_per_file_with_source_then_destination() {
    init_tracing();
    let (_dir, root) = fixture();

    let mut dispatcher = Dispatcher::new(request(&root), RecordingSink::default());
    let report = dispatcher.run().unwrap();
    let sink = dispatcher.into_sink();

    assert_eq!(report.dispatched, 3);
    assert_eq!(report.rejected, 0);

    let expected: BTreeSet<(String, String)> = [
        (root.join("shop/1/a.jpg"), "shop/1/a.jpg"),
        (root.join("shop/1/b.jpg"), "shop/1/b.jpg"),
        (root.join("top.png"), "top.png"),
    ]
    .into_iter()
    .map(|(src, rel)| (src.to_string(), format!("{BASE}/{rel}")))
    .collect();
    assert_eq!(pairs(&sink.jobs), expected);
    assert_eq!(sink.jobs.len(), expected.len());
}

#[test]
fn root_with_trailing_separator_maps_identically() {
    let (_dir, root) = fixture();
    let slashed = Utf8PathBuf::from(format!("{}/", root));

    let mut plain = Dispatcher::new(request(&root), RecordingSink::default());
    plain.run().unwrap();
    let mut trailing = Dispatcher::new(request(&slashed), RecordingSink::default());
    trailing.run().unwrap();

    let plain_dest: BTreeSet<String> = plain
        .into_sink()
        .jobs
        .into_iter()
        .map(|j| j.destination)
        .collect();
    let trailing_dest: BTreeSet<String> = trailing
        .into_sink()
        .jobs
        .into_iter()
        .map(|j| j.destination)
        .collect();
    assert_eq!(plain_dest, trailing_dest);
}

#[test]
fn rerun_produces_same_pairs() {
    let (_dir, root) = fixture();

    let mut first = Dispatcher::new(request(&root), RecordingSink::default());
    first.run().unwrap();
    let mut second = Dispatcher::new(request(&root), RecordingSink::default());
    second.run().unwrap();

    assert_eq!(pairs(&first.into_sink().jobs), pairs(&second.into_sink().jobs));
}

#[test]
fn empty_root_dispatches_nothing() {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let mut dispatcher = Dispatcher::new(request(&root), RecordingSink::default());
    let report = dispatcher.run().unwrap();

    assert_eq!(report.dispatched, 0);
    assert!(dispatcher.into_sink().jobs.is_empty());
}

#[test]
fn missing_root_fails_before_any_dispatch() {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().join("absent")).unwrap();

    let mut dispatcher = Dispatcher::new(request(&root), RecordingSink::default());
    let result = dispatcher.run();

    assert!(matches!(result, Err(PipelineError::Scan(_))), "{:?}", result);
    assert!(dispatcher.into_sink().jobs.is_empty());
}

#[test]
fn dry_run_never_touches_the_sink() {
    let (_dir, root) = fixture();
    let mut req = request(&root);
    req.dry_run = true;

    let mut seen = Vec::new();
    let mut dispatcher = Dispatcher::new(req, RecordingSink::default());
    let report = dispatcher.run_with(|job| seen.push(job.clone())).unwrap();

    assert_eq!(report.dispatched, 3);
    assert_eq!(seen.len(), 3);
    assert!(dispatcher.into_sink().jobs.is_empty());
}

/// Answers every other job with an error reply.
#[derive(Default)]
struct PickySink {
    calls: usize,
}

impl ReplicationSink for PickySink {
    fn dispatch(&mut self, _job: &ReplicationJob) -> Result<DispatchOutcome, SinkError> {
        self.calls += 1;
        if self.calls % 2 == 0 {
            Ok(DispatchOutcome::Rejected("sync fail".into()))
        } else {
            Ok(DispatchOutcome::Accepted)
        }
    }
}

#[test]
fn rejected_replies_do_not_stop_the_walk() {
    let (_dir, root) = fixture();

    let mut dispatcher = Dispatcher::new(request(&root), PickySink::default());
    let report = dispatcher.run().unwrap();

    assert_eq!(report.dispatched, 3);
    assert_eq!(report.rejected, 1);
    assert_eq!(dispatcher.into_sink().calls, 3);
}

/// Loses the connection on the second call.
#[derive(Default)]
struct FlakySink {
    calls: usize,
}

impl ReplicationSink for FlakySink {
    fn dispatch(&mut self, _job: &ReplicationJob) -> Result<DispatchOutcome, SinkError> {
        self.calls += 1;
        if self.calls == 2 {
            return Err(SinkError::Transport("connection reset".into()));
        }
        Ok(DispatchOutcome::Accepted)
    }
}

#[test]
fn transport_error_stops_the_run() {
    let (_dir, root) = fixture();

    let mut dispatcher = Dispatcher::new(request(&root), FlakySink::default());
    let result = dispatcher.run();

    match result {
        Err(PipelineError::Sink(SinkError::Transport(cause))) => {
            assert!(cause.to_string().contains("reset"), "unexpected cause: {}", cause)
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(dispatcher.into_sink().calls, 2);
}

#[test]
fn borrowed_sink_can_be_reused() {
    let (_dir, root) = fixture();
    let mut sink = RecordingSink::default();

    Dispatcher::new(request(&root), &mut sink).run().unwrap();
    Dispatcher::new(request(&root), &mut sink).run().unwrap();

    assert_eq!(sink.jobs.len(), 6);
}

#[test]
fn relative_root_sends_absolute_sources() {
    let (_dir, root) = fixture();
    std::env::set_current_dir(&root).unwrap();

    let relative = Utf8PathBuf::from(".");
    let mut dispatcher = Dispatcher::new(request(&relative), RecordingSink::default());
    let report = dispatcher.run().unwrap();
    let jobs = dispatcher.into_sink().jobs;

    assert_eq!(report.dispatched, 3);
    assert!(
        jobs.iter().all(|j| j.source.is_absolute()),
        "relative source leaked: {:?}",
        jobs
    );
    let destinations: BTreeSet<String> = jobs.into_iter().map(|j| j.destination).collect();
    assert!(destinations.contains(&format!("{BASE}/shop/1/a.jpg")));
    assert!(destinations.contains(&format!("{BASE}/top.png")));
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_file_stops_the_run_before_dispatch() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    fs::write(dir.path().join(OsStr::from_bytes(b"\xff.jpg")), b"x").unwrap();

    let mut dispatcher = Dispatcher::new(request(&root), RecordingSink::default());
    let result = dispatcher.run();

    assert!(
        matches!(
            result,
            Err(PipelineError::Scan(assetsync_scanner::ScannerError::NonUtf8Path(_)))
        ),
        "{:?}",
        result
    );
    assert!(dispatcher.into_sink().jobs.is_empty());
}
