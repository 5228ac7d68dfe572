use crate::SyncSettings;
use anyhow::Context;
use assetsync_core::RecordingSink;
use assetsync_infra::StoreClient;
use assetsync_pipeline::{DispatchReport, DispatchRequest, Dispatcher};

pub fn cmd_sync(settings: SyncSettings) -> anyhow::Result<DispatchReport> {
    println!(":: Replicating assets...");
    println!("   Local:  {}", settings.local_root);
    println!("   Remote: {}", settings.remote_base);

    let request = DispatchRequest {
        local_root: settings.local_root.clone(),
        remote_base: settings.remote_base.clone(),
        dry_run: settings.dry_run,
    };

    let report = if settings.dry_run {
        println!("   Store:  (dry run, nothing is sent)");
        Dispatcher::new(request, RecordingSink::default())
            .run_with(|job| println!("{} {}", job.source, job.destination))
            .with_context(|| format!("Failed to walk {}", settings.local_root))?
    } else {
        println!("   Store:  {}", settings.store.url());
        let client = StoreClient::connect(&settings.store).context("Failed to reach store")?;
        Dispatcher::new(request, client)
            .run()
            .with_context(|| format!("Replication of {} aborted", settings.local_root))?
    };

    println!("\n:: Result");
    println!("   Dispatched: {}", report.dispatched);
    if report.rejected > 0 {
        println!("   Rejected:   {}", report.rejected);
    }

    Ok(report)
}
