mod document;
mod exports;
mod progress;
mod report;
mod styling;
mod tables;

use std::path::Path;

use crate::workflow::SkippedFile;

pub use document::{s6_document, workflow_document, write_document};
pub use exports::export_json;
pub use progress::PhaseProgress;
pub use report::print_report;
pub use tables::overview_table;

use styling::{brand, failure, heading, location, muted, success};

/// Prints the `ciflow` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        brand("🔀 ciflow"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("CI workflow and service dependency diagrams")
    );
}

/// Lists files that were excluded from the analysis, if any.
pub fn print_skipped(skipped: &[SkippedFile]) {
    if skipped.is_empty() {
        return;
    }
    eprintln!(
        "\n{}  {}",
        failure("⚠️"),
        heading(format!("Skipped {} file(s)", skipped.len()))
    );
    for file in skipped {
        eprintln!("  {} {}", location(file.path.display()), muted(&file.reason));
    }
}

/// Confirms where a document was written.
pub fn print_saved(path: &Path) {
    eprintln!("\n{} {}", success("✅ Diagram saved to:"), location(path.display()));
}
