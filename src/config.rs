use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure for ciflow.
///
/// Lets a repository pin its input and output locations instead of passing
/// them on every run. Command line flags and environment variables still take
/// precedence over anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Workflow analyzer settings
    #[serde(default)]
    pub workflows: WorkflowsConfig,

    /// s6-rc dependency tree settings
    #[serde(default)]
    pub s6: S6Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkflowsConfig {
    /// Directory holding the workflow YAML files
    #[serde(default = "default_workflows_dir")]
    pub dir: PathBuf,

    /// Markdown output path; defaults to `workflows-diagram.md` inside `dir`
    pub output: Option<PathBuf>,

    /// Report format printed to stdout
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct S6Config {
    /// The `s6-rc.d` directory to scan
    #[serde(default = "default_s6_tree")]
    pub tree: PathBuf,

    /// Markdown output path
    #[serde(default = "default_s6_output")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Default for WorkflowsConfig {
    fn default() -> Self {
        Self {
            dir: default_workflows_dir(),
            output: None,
            format: OutputFormat::Text,
            pretty: false,
        }
    }
}

impl Default for S6Config {
    fn default() -> Self {
        Self {
            tree: default_s6_tree(),
            output: default_s6_output(),
        }
    }
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from(".github/workflows")
}

fn default_s6_tree() -> PathBuf {
    PathBuf::from("data/config/tmp/s6-overlay/s6-rc.d")
}

fn default_s6_output() -> PathBuf {
    PathBuf::from("dependency_tree.md")
}

/// File name of the generated workflow document.
pub const WORKFLOWS_DIAGRAM_FILE: &str = "workflows-diagram.md";

impl WorkflowsConfig {
    /// Output path, falling back to `workflows-diagram.md` next to the workflows.
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| dir.join(WORKFLOWS_DIAGRAM_FILE))
    }

    /// Resolves input directory and output path.
    ///
    /// `dir` and `output` come from the command line (flag or environment
    /// variable) and win over the configured values.
    pub fn resolve(&self, dir: Option<&Path>, output: Option<&Path>) -> (PathBuf, PathBuf) {
        let dir = expand_home(dir.unwrap_or(&self.dir));
        let output = match output {
            Some(output) => output.to_path_buf(),
            None => self.output_path(&dir),
        };
        (dir, expand_home(&output))
    }
}

impl S6Config {
    /// Resolves tree directory and output path, command line first.
    pub fn resolve(&self, tree: Option<&Path>, output: Option<&Path>) -> (PathBuf, PathBuf) {
        (
            expand_home(tree.unwrap_or(&self.tree)),
            expand_home(output.unwrap_or(&self.output)),
        )
    }
}

/// Expands a leading `~/` (or a bare `~`) to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./ciflow.toml
    /// 3. ./ciflow.json
    /// 4. ./ciflow.yaml
    /// 5. ./ciflow.yml
    /// 6. `<config dir>/ciflow/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["ciflow.toml", "ciflow.json", "ciflow.yaml", "ciflow.yml"]
            .into_iter()
            .map(PathBuf::from)
            .chain(dirs::config_dir().map(|dir| dir.join("ciflow").join("config.toml")));

        for candidate in candidates {
            if candidate.is_file() {
                log::debug!("Using config file {}", candidate.display());
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workflows.dir, PathBuf::from(".github/workflows"));
        assert!(config.workflows.output.is_none());
        assert_eq!(config.workflows.format, OutputFormat::Text);
        assert_eq!(config.s6.output, PathBuf::from("dependency_tree.md"));
    }

    #[test]
    fn test_output_path_defaults_next_to_workflows() {
        let config = WorkflowsConfig::default();
        assert_eq!(
            config.output_path(Path::new("ci/workflows")),
            PathBuf::from("ci/workflows/workflows-diagram.md")
        );
    }

    #[test]
    fn test_resolve_prefers_command_line_over_config() {
        let config = WorkflowsConfig {
            dir: PathBuf::from("config/workflows"),
            output: Some(PathBuf::from("config/ci.md")),
            ..WorkflowsConfig::default()
        };

        assert_eq!(
            config.resolve(None, None),
            (PathBuf::from("config/workflows"), PathBuf::from("config/ci.md"))
        );
        assert_eq!(
            config.resolve(Some(Path::new("cli/wf")), Some(Path::new("cli/out.md"))),
            (PathBuf::from("cli/wf"), PathBuf::from("cli/out.md"))
        );
    }

    #[test]
    fn test_resolve_default_output_follows_resolved_dir() {
        let config = WorkflowsConfig::default();
        assert_eq!(
            config.resolve(Some(Path::new("cli/wf")), None),
            (PathBuf::from("cli/wf"), PathBuf::from("cli/wf/workflows-diagram.md"))
        );

        let s6 = S6Config::default();
        assert_eq!(
            s6.resolve(None, Some(Path::new("tree.md"))),
            (
                PathBuf::from("data/config/tmp/s6-overlay/s6-rc.d"),
                PathBuf::from("tree.md")
            )
        );
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[workflows]
dir = "/srv/repo/.github/workflows"
output = "docs/ci.md"
format = "json"
pretty = true

[s6]
tree = "rootfs/etc/s6-overlay/s6-rc.d"
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.workflows.dir, PathBuf::from("/srv/repo/.github/workflows"));
        assert_eq!(config.workflows.output, Some(PathBuf::from("docs/ci.md")));
        assert_eq!(config.workflows.format, OutputFormat::Json);
        assert!(config.workflows.pretty);
        assert_eq!(config.s6.tree, PathBuf::from("rootfs/etc/s6-overlay/s6-rc.d"));
        assert_eq!(config.s6.output, PathBuf::from("dependency_tree.md"));
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(temp_file, "s6:\n  output: out/tree.md\n").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.s6.output, PathBuf::from("out/tree.md"));
        assert_eq!(config.workflows.dir, PathBuf::from(".github/workflows"));
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, r#"{{"workflows": {{"format": "text"}}}}"#).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.workflows.format, OutputFormat::Text);
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("relative/dir")), PathBuf::from("relative/dir"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/ci")), home.join("ci"));
        }
    }
}
