use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::diagram::{render_fenced, Diagram};
use crate::error::{CiflowError, Result};

/// Name, URL and note for each place the diagram can be pasted into.
const USAGE_TARGETS: [(&str, &str, &str); 3] = [
    ("Mermaid Live Editor", "https://mermaid.live", ""),
    ("GitHub Markdown", "https://github.com/", " (supports Mermaid)"),
    ("Notion", "https://notion.so/", " (with Mermaid block)"),
];

/// Markdown page embedding the workflow diagram and a short usage note.
pub fn workflow_document(diagram: &Diagram) -> String {
    let mut doc = String::from("# GitHub Actions Workflow Diagrams\n\n");
    doc.push_str(&render_fenced(diagram));
    doc.push_str("\n\n## Usage\n\n");
    doc.push_str("Copy the Mermaid code above and paste it into:\n");
    for (name, url, note) in USAGE_TARGETS {
        let _ = writeln!(doc, "- [{name}]({url}){note}");
    }
    doc
}

/// Markdown page embedding the s6-rc dependency graph.
pub fn s6_document(diagram: &Diagram) -> String {
    let fenced = render_fenced(diagram);
    [
        "# s6-overlay Module Dependency Tree",
        "",
        "Graph generated automatically from the `s6-rc.d` definitions.",
        "",
        fenced.as_str(),
        "",
    ]
    .join("\n")
}

/// Writes a rendered document, creating parent directories as needed.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| CiflowError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}
