use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::model::Workflow;

pub const WORKFLOW_RUN: &str = "workflow_run";

/// Cross-workflow chaining derived from `workflow_run` triggers.
///
/// Maps each downstream workflow name to the set of upstream workflow names
/// whose completion dispatches it. Upstream names are not required to match
/// a loaded workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DependencyIndex {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyIndex {
    pub fn build(workflows: &BTreeMap<String, Workflow>) -> Self {
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for (name, workflow) in workflows {
            let upstream: BTreeSet<String> = workflow
                .triggers_of(WORKFLOW_RUN)
                .flat_map(|trigger| trigger.detail_list("workflows"))
                .collect();

            if !upstream.is_empty() {
                edges.entry(name.clone()).or_default().extend(upstream);
            }
        }

        Self { edges }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of workflows with at least one upstream workflow.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Iterates downstream workflows in name order with their sorted upstream names.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.edges.iter()
    }

    pub fn upstream_of(&self, workflow: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(workflow)
    }

    /// Upstream names that do not correspond to any loaded workflow.
    pub fn dangling<'a>(&'a self, workflows: &BTreeMap<String, Workflow>) -> BTreeSet<&'a str> {
        self.edges
            .values()
            .flatten()
            .filter(|name| !workflows.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}
