use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Runner used when a job does not declare `runs-on`.
pub const DEFAULT_RUNS_ON: &str = "ubuntu-latest";

/// Event that starts a workflow (`push`, `workflow_dispatch`, `workflow_run`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trigger {
    /// Trigger type as declared under `on:`
    pub kind: String,
    /// Trigger-specific configuration, passed through untouched
    pub details: Mapping,
}

impl Trigger {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            details: Mapping::new(),
        }
    }

    pub fn with_details(kind: impl Into<String>, details: Mapping) -> Self {
        Self {
            kind: kind.into(),
            details,
        }
    }

    /// Looks up a detail key such as `paths`, `tags` or `workflows`.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Reads a detail that may be written as a single string or a list of strings.
    ///
    /// Non-string entries are ignored; an absent key yields an empty list.
    pub fn detail_list(&self, key: &str) -> Vec<String> {
        match self.detail(key) {
            Some(Value::String(single)) => vec![single.clone()],
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Named unit of work within a workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub name: String,
    /// Jobs this one waits for, in declaration order. Not checked for existence or cycles.
    pub needs: Vec<String>,
    /// Execution target, list forms joined with `", "`
    pub runs_on: String,
    pub environment: Option<String>,
    /// Output name to declared expression; only the keys matter downstream
    pub outputs: IndexMap<String, Value>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            needs: Vec::new(),
            runs_on: DEFAULT_RUNS_ON.to_string(),
            environment: None,
            outputs: IndexMap::new(),
        }
    }
}

/// One CI automation definition loaded from a single file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    /// File name including extension, e.g. `release.yml`
    pub filename: String,
    /// Display name, falling back to the file stem
    pub name: String,
    pub triggers: Vec<Trigger>,
    /// Jobs keyed by name in declaration order
    pub jobs: IndexMap<String, Job>,
    pub env: IndexMap<String, Value>,
}

impl Workflow {
    pub fn new(filename: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            name: name.into(),
            triggers: Vec::new(),
            jobs: IndexMap::new(),
            env: IndexMap::new(),
        }
    }

    /// Iterates over triggers of the given type.
    pub fn triggers_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Trigger> + 'a {
        self.triggers.iter().filter(move |t| t.kind == kind)
    }
}

/// A field written either as a single value or as a list of values.
///
/// Only used while deserializing; callers receive the normalized `Vec`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Normalizes an optional string-or-list field, treating absence (or YAML `null`) as empty.
pub fn normalize<T>(field: Option<OneOrMany<T>>) -> Vec<T> {
    field.map(OneOrMany::into_vec).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_singleton_list_normalize_identically() {
        let scalar: Option<OneOrMany<String>> = serde_yaml::from_str("buildJob").unwrap();
        let list: Option<OneOrMany<String>> = serde_yaml::from_str("[buildJob]").unwrap();

        assert_eq!(normalize(scalar), vec!["buildJob".to_string()]);
        assert_eq!(normalize(list), vec!["buildJob".to_string()]);
    }

    #[test]
    fn test_null_normalizes_to_empty() {
        let absent: Option<OneOrMany<String>> = serde_yaml::from_str("~").unwrap();
        assert!(normalize(absent).is_empty());
    }

    #[test]
    fn test_detail_list_accepts_string_or_sequence() {
        let details: Mapping =
            serde_yaml::from_str("workflows: Build\ntypes: [completed, requested]").unwrap();
        let trigger = Trigger::with_details("workflow_run", details);

        assert_eq!(trigger.detail_list("workflows"), vec!["Build"]);
        assert_eq!(trigger.detail_list("types"), vec!["completed", "requested"]);
        assert!(trigger.detail_list("branches").is_empty());
    }

    #[test]
    fn test_job_defaults() {
        let job = Job::new("build");
        assert_eq!(job.runs_on, DEFAULT_RUNS_ON);
        assert!(job.needs.is_empty());
        assert!(job.environment.is_none());
        assert!(job.outputs.is_empty());
    }
}
