//! Inspect command implementation.

use fieldsync_app::{App, Module};
use serde::Serialize;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Schema version.
    pub schema_version: u32,
    /// Per-collection record counts.
    pub collections: Vec<CollectionStats>,
    /// Modules with saved credentials.
    pub configured_modules: Vec<String>,
}

/// Statistics for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of records.
    pub record_count: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = super::open_existing(path)?;
    let result = inspect(&app, path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects statistics of an opened store.
pub fn inspect(app: &App, path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let store = app.store();
    let collections = store
        .collection_names()
        .into_iter()
        .map(|name| {
            let record_count = store.count(&name)?;
            Ok(CollectionStats { name, record_count })
        })
        .collect::<Result<Vec<_>, fieldsync_core::CoreError>>()?;

    let configured_modules = Module::ALL
        .iter()
        .filter(|module| app.load_credentials(**module).is_ok())
        .map(|module| module.name().to_string())
        .collect();

    Ok(InspectResult {
        path: path.display().to_string(),
        schema_version: store.schema_version(),
        collections,
        configured_modules,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("fieldsync Store Inspection");
    println!("=========================");
    println!();
    println!("Path:           {}", result.path);
    println!("Schema version: {}", result.schema_version);
    println!();
    println!("Collections:");
    for collection in &result.collections {
        println!("  {:<12} {:>6} records", collection.name, collection.record_count);
    }
    println!();
    if result.configured_modules.is_empty() {
        println!("Remote: not configured");
    } else {
        println!("Remote: configured for {}", result.configured_modules.join(", "));
    }
}
