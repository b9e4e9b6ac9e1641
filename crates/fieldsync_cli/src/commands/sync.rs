//! Push and pull command implementations.

use fieldsync_app::{App, Module};
use fieldsync_sync_engine::{GistClient, PullReport, PushReport, RemoteEndpoint, SyncEngine};
use std::path::Path;
use std::sync::Arc;

fn engine(app: &App, module: Module, api_url: Option<&str>) -> Result<SyncEngine<GistClient>, Box<dyn std::error::Error>> {
    let endpoint = api_url.map_or_else(RemoteEndpoint::default, RemoteEndpoint::new);
    tracing::debug!(%module, base_url = %endpoint.base_url, "using remote endpoint");
    let client = GistClient::new(endpoint)?;
    Ok(app.sync_engine(module, Arc::new(client))?)
}

/// Runs the push command.
pub async fn push(path: &Path, module: Module, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let app = super::open_existing(path)?;
    let engine = engine(&app, module, api_url)?;
    let report = engine.push().await.map_err(|err| err.user_message())?;
    print_push(&report);
    Ok(())
}

/// Runs the pull command.
pub async fn pull(path: &Path, module: Module, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let app = super::open_existing(path)?;
    let engine = engine(&app, module, api_url)?;
    let report = engine.pull().await.map_err(|err| err.user_message())?;
    print_pull(&report);
    Ok(())
}

fn print_push(report: &PushReport) {
    println!("Pushed {} ({} records)", report.module, report.uploaded());
    if report.remote_file_missing {
        println!("  remote file created");
    } else if report.remote_unreadable {
        println!("  remote content was unreadable and has been overwritten");
    }
    for collection in &report.collections {
        let stats = &collection.stats;
        println!(
            "  {:<10} {:>5} merged ({} local, {} remote, {} overwritten)",
            collection.snapshot_key, stats.merged, stats.local, stats.remote, stats.overwritten
        );
    }
    if !report.defaulted_keys.is_empty() {
        println!("  missing remotely: {}", report.defaulted_keys.join(", "));
    }
    if report.dropped() > 0 {
        println!("  {} remote records without a usable id were not uploaded", report.dropped());
    }
}

fn print_pull(report: &PullReport) {
    println!("Pulled {} ({} records)", report.module, report.replaced());
    for collection in &report.collections {
        println!("  {:<10} {:>5} records", collection.collection, collection.replaced);
    }
}
