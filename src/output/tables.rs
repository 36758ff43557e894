use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::workflow::{trigger_summary, Analysis};

fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Cell counting workflows that chain into this one; grey when none do.
fn upstream_cell(count: usize) -> Cell {
    if count == 0 {
        Cell::new("-").fg(TableColor::DarkGrey)
    } else {
        Cell::new(count).fg(TableColor::Yellow)
    }
}

/// One row per workflow: name, file, leading triggers, job count and chaining.
pub fn overview_table(analysis: &Analysis) -> Table {
    let mut table = create_table();
    table.set_header(create_cyan_header(&[
        "Workflow",
        "File",
        "Triggers",
        "Jobs",
        "Upstream",
    ]));

    for (name, workflow) in &analysis.workflows {
        let upstream = analysis
            .dependencies
            .upstream_of(name)
            .map_or(0, |set| set.len());
        table.add_row(vec![
            Cell::new(name),
            Cell::new(&workflow.filename),
            Cell::new(trigger_summary(workflow)),
            Cell::new(workflow.jobs.len()),
            upstream_cell(upstream),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{DependencyIndex, Trigger, Workflow};
    use std::collections::BTreeMap;

    #[test]
    fn test_overview_has_row_per_workflow() {
        let mut ci = Workflow::new("ci.yml", "CI");
        ci.triggers.push(Trigger::new("push"));
        let workflows: BTreeMap<_, _> = [
            ("CI".to_string(), ci),
            ("Docs".to_string(), Workflow::new("docs.yml", "Docs")),
        ]
        .into_iter()
        .collect();
        let analysis = Analysis {
            dependencies: DependencyIndex::build(&workflows),
            workflows,
            skipped: Vec::new(),
        };

        let table = overview_table(&analysis);

        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("ci.yml"));
        assert!(rendered.contains("docs.yml"));
    }
}
