//! Progress command implementation.

use fieldsync_app::{MonthlyProgress, Progress};
use std::path::Path;

/// Runs the progress command.
pub fn run(path: &Path, month: u32, year: i32) -> Result<(), Box<dyn std::error::Error>> {
    let app = super::open_existing(path)?;
    let progress = app.monthly_progress(month, year).map_err(|err| err.user_message())?;
    print!("{}", render(&progress));
    Ok(())
}

fn line(label: &str, progress: &Progress) -> String {
    format!(
        "  {:<16} {:>6} / {:<6} {:>4}%\n",
        label,
        progress.sold,
        progress.target,
        progress.pct()
    )
}

/// Renders the progress report.
pub fn render(progress: &MonthlyProgress) -> String {
    let mut out = format!("Goal progress {:02}/{}\n\n", progress.month, progress.year);
    out.push_str(&line("Total", &progress.total));
    out.push_str("\nBy product:\n");
    for (product, p) in &progress.by_product {
        out.push_str(&line(product, p));
    }
    out.push_str("\nBy branch:\n");
    for (branch, p) in &progress.by_branch {
        out.push_str(&line(branch, p));
    }
    out
}
