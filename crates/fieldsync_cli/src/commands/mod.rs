//! CLI command implementations.

pub mod config;
pub mod inspect;
pub mod progress;
pub mod sync;

use fieldsync_app::App;
use fieldsync_core::StoreConfig;
use std::path::Path;

/// Opens the store, creating it on first use.
pub fn open(path: &Path) -> Result<App, Box<dyn std::error::Error>> {
    Ok(App::open(path, StoreConfig::default())?)
}

/// Opens an existing store.
pub fn open_existing(path: &Path) -> Result<App, Box<dyn std::error::Error>> {
    if !path.join("store.json").exists() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    Ok(App::open(path, StoreConfig::default().create_if_missing(false))?)
}
