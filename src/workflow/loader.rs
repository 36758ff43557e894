use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{CiflowError, Result};

use super::model::{normalize, Job, OneOrMany, Trigger, Workflow, DEFAULT_RUNS_ON};

const WORKFLOW_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Workflow file as written on disk.
///
/// `on` is read as an ordinary named field: serde_yaml follows the YAML 1.2
/// core schema, where only `true`/`false` are booleans.
#[derive(Debug, Deserialize)]
struct RawWorkflow {
    name: Option<String>,
    #[serde(rename = "on")]
    triggers: Option<RawTriggers>,
    jobs: Option<IndexMap<String, RawJob>>,
    env: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTriggers {
    Single(String),
    List(Vec<String>),
    Map(IndexMap<String, Value>),
}

#[derive(Debug, Deserialize)]
struct RawJob {
    needs: Option<OneOrMany<String>>,
    #[serde(rename = "runs-on")]
    runs_on: Option<RawRunsOn>,
    environment: Option<RawEnvironment>,
    outputs: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRunsOn {
    Labels(OneOrMany<String>),
    Group {
        group: Option<String>,
        labels: Option<OneOrMany<String>>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEnvironment {
    Name(String),
    Detailed { name: String },
}

impl RawTriggers {
    fn into_triggers(self) -> Vec<Trigger> {
        match self {
            Self::Single(kind) => vec![Trigger::new(kind)],
            Self::List(kinds) => kinds.into_iter().map(Trigger::new).collect(),
            Self::Map(entries) => entries
                .into_iter()
                .map(|(kind, detail)| match detail {
                    Value::Mapping(details) => Trigger::with_details(kind, details),
                    _ => Trigger::with_details(kind, Mapping::new()),
                })
                .collect(),
        }
    }
}

impl RawRunsOn {
    fn describe(self) -> String {
        match self {
            Self::Labels(labels) => labels.into_vec().join(", "),
            Self::Group { group, labels } => {
                let parts: Vec<String> = group.into_iter().chain(normalize(labels)).collect();
                if parts.is_empty() {
                    DEFAULT_RUNS_ON.to_string()
                } else {
                    parts.join(", ")
                }
            }
        }
    }
}

impl RawEnvironment {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Detailed { name } => name,
        }
    }
}

impl RawJob {
    fn into_job(self, name: String) -> Job {
        let mut job = Job::new(name);
        job.needs = normalize(self.needs);
        if let Some(runs_on) = self.runs_on {
            job.runs_on = runs_on.describe();
        }
        job.environment = self.environment.map(RawEnvironment::into_name);
        job.outputs = self.outputs.unwrap_or_default();
        job
    }
}

/// A declaration file excluded from the result because it could not be parsed.
#[derive(Debug, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of loading a workflow directory.
///
/// Partial success is the normal outcome: files that fail to parse end up in
/// `skipped` and the remaining files are still analyzed.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Workflows keyed by display name; a later file with the same name replaces an earlier one
    pub workflows: BTreeMap<String, Workflow>,
    pub skipped: Vec<SkippedFile>,
}

/// Parses workflow YAML text.
///
/// Returns `Ok(None)` for documents that are empty or contain only comments.
///
/// `path` is only used for error reporting and to derive the file name and
/// the fallback display name (the file stem); nothing is read from disk.
pub fn parse_workflow(content: &str, path: &Path) -> Result<Option<Workflow>> {
    let parse_err = |source| CiflowError::Parse {
        path: path.to_path_buf(),
        source,
    };

    if is_blank_document(content) {
        return Ok(None);
    }

    // Deserialized straight into IndexMap so a repeated job name replaces the
    // earlier declaration instead of failing the whole file.
    let raw: RawWorkflow = serde_yaml::from_str(content).map_err(parse_err)?;

    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = raw.name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let triggers = raw.triggers.map(RawTriggers::into_triggers).unwrap_or_default();

    let jobs: IndexMap<String, Job> = raw
        .jobs
        .unwrap_or_default()
        .into_iter()
        .map(|(job_name, job)| (job_name.clone(), job.into_job(job_name)))
        .collect();

    let mut workflow = Workflow::new(filename, name);
    workflow.triggers = triggers;
    workflow.jobs = jobs;
    workflow.env = raw.env.unwrap_or_default();
    Ok(Some(workflow))
}

fn is_blank_document(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Reads and parses a single workflow file.
pub fn parse_workflow_file(path: &Path) -> Result<Option<Workflow>> {
    let content = fs::read_to_string(path).map_err(|source| CiflowError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_workflow(&content, path)
}

/// Lists `*.yml` / `*.yaml` files in `dir`, sorted by file name.
fn workflow_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source| CiflowError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let is_workflow = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| WORKFLOW_EXTENSIONS.contains(&ext));
        if is_workflow && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Loads every workflow declaration in `dir`.
///
/// Files are processed in lexicographic order of their names, so when two
/// files resolve to the same workflow name the later one deterministically
/// wins.
///
/// # Errors
///
/// Returns `MissingDirectory` if `dir` is not a directory, or `Read` if it
/// cannot be listed. Individual file failures are never errors; they are
/// logged and reported through `LoadOutcome::skipped`.
pub fn load_workflows(dir: &Path) -> Result<LoadOutcome> {
    if !dir.is_dir() {
        return Err(CiflowError::MissingDirectory(dir.to_path_buf()));
    }

    let mut outcome = LoadOutcome::default();

    for path in workflow_files(dir)? {
        match parse_workflow_file(&path) {
            Ok(Some(workflow)) => {
                debug!(
                    "Parsed {} ({} triggers, {} jobs)",
                    path.display(),
                    workflow.triggers.len(),
                    workflow.jobs.len()
                );
                if let Some(previous) = outcome.workflows.get(&workflow.name) {
                    warn!(
                        "Workflow name '{}' from {} replaces the one from {}",
                        workflow.name, workflow.filename, previous.filename
                    );
                }
                outcome.workflows.insert(workflow.name.clone(), workflow);
            }
            Ok(None) => debug!("Skipping empty document {}", path.display()),
            Err(err) => {
                warn!("Error parsing {}: {err}", path.display());
                outcome.skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        "Loaded {} workflows from {} ({} skipped)",
        outcome.workflows.len(),
        dir.display(),
        outcome.skipped.len()
    );

    Ok(outcome)
}
