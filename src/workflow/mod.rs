mod graph;
mod index;
mod loader;
mod model;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diagram::Diagram;

pub use graph::{build_diagram, trigger_summary};
pub use index::{DependencyIndex, WORKFLOW_RUN};
pub use loader::{load_workflows, LoadOutcome, SkippedFile};
pub use model::{Job, Trigger, Workflow};

/// Everything derived from one workflow directory.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub workflows: BTreeMap<String, Workflow>,
    pub dependencies: DependencyIndex,
    pub skipped: Vec<SkippedFile>,
}

impl Analysis {
    /// Derives the dependency index from a loaded directory.
    pub fn new(outcome: LoadOutcome) -> Self {
        let dependencies = DependencyIndex::build(&outcome.workflows);
        Self {
            workflows: outcome.workflows,
            dependencies,
            skipped: outcome.skipped,
        }
    }

    pub fn diagram(&self) -> Diagram {
        build_diagram(&self.workflows, &self.dependencies)
    }
}
