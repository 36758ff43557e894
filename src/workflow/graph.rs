use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use serde_yaml::Value;

use crate::diagram::{
    collisions, sanitize, truncate, ClassDef, Diagram, Direction, Edge, EdgeStyle, Group, Kind,
    Node, Statement,
};

use super::index::DependencyIndex;
use super::model::{Job, Workflow};

const CLASS_WORKFLOW: &str = "workflow";
const CLASS_TRIGGER: &str = "trigger";
const CLASS_JOB: &str = "job";
const CLASS_DATA_FLOW: &str = "dataFlow";

const PUSH_NODE: &str = "Push";
const TAG_PUSH_NODE: &str = "TagPush";
const MANUAL_NODE: &str = "Manual";

const CHANGELOG: &str = "CHANGELOG.md";

const TRIGGER_SUMMARY_LIMIT: usize = 2;
const OUTPUT_ID_LIMIT: usize = 30;
const OUTPUT_LABEL_LIMIT: usize = 20;

fn class_defs() -> Vec<ClassDef> {
    vec![
        ClassDef::new(
            CLASS_WORKFLOW,
            "fill:#e1f5fe,stroke:#01579b,stroke-width:2px,color:#000000",
        ),
        ClassDef::new(
            CLASS_TRIGGER,
            "fill:#fff3e0,stroke:#e65100,stroke-width:2px,color:#000000",
        ),
        ClassDef::new(
            CLASS_JOB,
            "fill:#f3e5f5,stroke:#4a148c,stroke-width:2px,color:#000000",
        ),
        ClassDef::new(
            CLASS_DATA_FLOW,
            "fill:#e8f5e9,stroke:#1b5e20,stroke-width:2px,stroke-dasharray: 5 5,color:#000000",
        ),
    ]
}

/// Id of the trigger node for a workflow name, parsed or not.
pub fn trigger_id(workflow_name: &str) -> String {
    format!("{}_trigger", sanitize(workflow_name))
}

fn job_id(workflow_id: &str, job_name: &str) -> String {
    format!("{workflow_id}_{}", sanitize(job_name))
}

/// Node ids already used in the diagram.
///
/// Job and data ids are built by concatenating sanitized names, so they can
/// land on a trigger id or on each other (job `trigger` in `CI` is
/// `CI_trigger`). A taken id gets the first free `_2`, `_3`, ... suffix.
#[derive(Debug, Default)]
struct NodeIds {
    taken: BTreeSet<String>,
}

impl NodeIds {
    /// Marks ids that must keep their exact spelling.
    fn reserve(&mut self, id: impl Into<String>) {
        self.taken.insert(id.into());
    }

    fn claim(&mut self, id: String) -> String {
        if self.taken.insert(id.clone()) {
            return id;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{id}_{suffix}");
            if self.taken.insert(candidate.clone()) {
                warn!("Diagram id '{id}' is already in use, renamed to '{candidate}'");
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Summarizes the first two trigger types, e.g. `push | workflow_dispatch`.
pub fn trigger_summary(workflow: &Workflow) -> String {
    workflow
        .triggers
        .iter()
        .take(TRIGGER_SUMMARY_LIMIT)
        .map(|t| t.kind.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn job_label(job: &Job) -> String {
    match &job.environment {
        Some(env) => format!("📋 {}\\n(env: {env})", job.name),
        None => format!("📋 {}", job.name),
    }
}

/// Builds the full workflow diagram: one group per workflow, cross-workflow
/// chaining, and the external push/tag/manual entry points.
pub fn build_diagram(workflows: &BTreeMap<String, Workflow>, index: &DependencyIndex) -> Diagram {
    let mut diagram = Diagram::new(Kind::Flowchart, Direction::TopDown);
    diagram.comment = Some("GitHub Actions Workflow Dependency Diagram".to_string());
    diagram.classes = class_defs();

    for (id, names) in collisions(workflows.keys().map(String::as_str)) {
        warn!(
            "Workflows {} share the diagram id '{id}' and will be merged in the diagram",
            names.join(", ")
        );
    }

    let dangling = index.dangling(workflows);

    let mut ids = NodeIds::default();
    for id in [PUSH_NODE, TAG_PUSH_NODE, MANUAL_NODE] {
        ids.reserve(id);
    }
    for name in workflows.keys().map(String::as_str).chain(dangling.iter().copied()) {
        ids.reserve(sanitize(name));
        ids.reserve(trigger_id(name));
    }

    for (name, workflow) in workflows {
        diagram
            .statements
            .push(Statement::Group(workflow_group(name, workflow, &mut ids)));
        diagram.statements.push(Statement::Blank);
    }

    for name in dangling {
        diagram.statements.push(Statement::Node(
            Node::labeled(trigger_id(name), name).class(CLASS_WORKFLOW),
        ));
    }

    for (downstream, upstream) in index.iter() {
        for source in upstream {
            diagram.statements.push(Statement::Edge(
                Edge::new(
                    Node::bare(trigger_id(source)),
                    Node::bare(trigger_id(downstream)),
                    EdgeStyle::Thick,
                )
                .label("triggers"),
            ));
        }
    }

    diagram.statements.extend([
        Statement::Node(Node::labeled(PUSH_NODE, "📝 git push").class(CLASS_TRIGGER)),
        Statement::Node(Node::labeled(TAG_PUSH_NODE, "🏷️ git tag").class(CLASS_TRIGGER)),
        Statement::Node(Node::labeled(MANUAL_NODE, "⚡ Manual").class(CLASS_TRIGGER)),
        Statement::Blank,
    ]);

    for (name, workflow) in workflows {
        let target = trigger_id(name);
        for source in external_sources(workflow) {
            diagram
                .statements
                .push(Statement::Edge(Edge::link(source, target.clone())));
        }
    }

    diagram
}

fn workflow_group(name: &str, workflow: &Workflow, ids: &mut NodeIds) -> Group {
    let workflow_id = sanitize(name);

    // Claimed up front so `needs` can point at jobs declared later.
    let mut job_ids: BTreeMap<&str, String> = BTreeMap::new();
    for job in workflow.jobs.values() {
        let id = ids.claim(job_id(&workflow_id, &job.name));
        job_ids.insert(job.name.as_str(), id);
    }

    let mut statements = vec![Statement::Node(
        Node::labeled(
            trigger_id(name),
            format!("🎯 {}", trigger_summary(workflow)).trim_end().to_string(),
        )
        .class(CLASS_TRIGGER),
    )];

    for job in workflow.jobs.values() {
        let id = job_ids[job.name.as_str()].clone();
        statements.push(Statement::Node(
            Node::labeled(id.clone(), job_label(job)).class(CLASS_JOB),
        ));

        for dep in &job.needs {
            let dep_id = match job_ids.get(dep.as_str()) {
                Some(dep_id) => dep_id.clone(),
                None => {
                    // Unknown job: one shared bare node per name.
                    let dep_id = ids.claim(job_id(&workflow_id, dep));
                    job_ids.insert(dep.as_str(), dep_id.clone());
                    dep_id
                }
            };
            statements.push(Statement::Edge(Edge::link(dep_id, id.clone())));
        }

        for output in job.outputs.keys() {
            let data_id =
                ids.claim(format!("{id}_{}", truncate(&sanitize(output), OUTPUT_ID_LIMIT)));
            statements.push(Statement::Edge(
                Edge::new(
                    Node::bare(id.clone()),
                    Node::labeled(data_id, "data").class(CLASS_DATA_FLOW),
                    EdgeStyle::Dotted,
                )
                .label(truncate(output, OUTPUT_LABEL_LIMIT)),
            ));
        }
    }

    Group {
        id: workflow_id,
        label: name.to_string(),
        direction: Some(Direction::TopBottom),
        statements,
    }
}

/// External pseudo-nodes that feed a workflow's trigger node.
fn external_sources(workflow: &Workflow) -> Vec<&'static str> {
    let mut sources = Vec::new();
    for trigger in &workflow.triggers {
        match trigger.kind.as_str() {
            "push" => {
                let touches_changelog = trigger
                    .detail_list("paths")
                    .iter()
                    .any(|path| path.rsplit('/').next() == Some(CHANGELOG));
                if touches_changelog {
                    sources.push(PUSH_NODE);
                }
                if trigger.detail("tags").is_some_and(is_truthy) {
                    sources.push(TAG_PUSH_NODE);
                }
            }
            "workflow_dispatch" => sources.push(MANUAL_NODE),
            _ => {}
        }
    }
    sources
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Number(_) | Value::Tagged(_) => true,
    }
}
