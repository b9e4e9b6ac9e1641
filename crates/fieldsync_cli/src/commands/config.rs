//! Config command implementation.

use fieldsync_app::Module;
use std::path::Path;

/// Runs the config command.
pub fn run(path: &Path, module: Module, document_id: &str, token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = super::open(path)?;
    app.save_credentials(module, document_id, token)
        .map_err(|err| err.user_message())?;
    println!("Remote document for {module} set to {}", document_id.trim());
    Ok(())
}
