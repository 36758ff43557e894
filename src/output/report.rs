use std::fmt::Write;

use crate::workflow::{Analysis, Job, Trigger, Workflow, WORKFLOW_RUN};

const RULE_WIDTH: usize = 80;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "─".repeat(RULE_WIDTH)
}

fn add_banner(output: &mut String, title: &str) {
    let _ = writeln!(output, "{}\n{title}\n{}", heavy_rule(), heavy_rule());
}

/// Prints the text analysis of all workflows to stdout.
pub fn print_report(analysis: &Analysis) {
    print!("{}", render_report(analysis));
}

/// Renders the workflow analysis as plain text.
///
/// Output is fully deterministic: workflows, triggers and jobs are sorted by
/// name, and the dependency section is sorted by downstream then upstream
/// name. No terminal styling is applied.
pub fn render_report(analysis: &Analysis) -> String {
    let mut output = String::new();

    add_banner(&mut output, "GITHUB ACTIONS WORKFLOW ANALYSIS");

    for (name, workflow) in &analysis.workflows {
        render_workflow(&mut output, name, workflow);
    }

    output.push('\n');
    add_banner(&mut output, "WORKFLOW DEPENDENCY GRAPH");

    if analysis.dependencies.is_empty() {
        let _ = writeln!(output, "\n  No workflow_run triggers found");
    } else {
        let _ = writeln!(output, "\n🔗 Workflow chaining:");
        for (downstream, upstream) in analysis.dependencies.iter() {
            let sources: Vec<&str> = upstream.iter().map(String::as_str).collect();
            let _ = writeln!(output, "  {downstream} → {}", sources.join(", "));
        }
    }

    output
}

fn render_workflow(output: &mut String, name: &str, workflow: &Workflow) {
    let _ = writeln!(output, "\n{}", light_rule());
    let _ = writeln!(output, "WORKFLOW: {name}");
    let _ = writeln!(output, "File: {}", workflow.filename);
    let _ = writeln!(output, "{}", light_rule());

    let _ = writeln!(output, "\n🎯 TRIGGERS:");
    let mut triggers: Vec<&Trigger> = workflow.triggers.iter().collect();
    triggers.sort_by(|a, b| a.kind.cmp(&b.kind));
    for trigger in triggers {
        render_trigger(output, trigger);
    }

    let _ = writeln!(output, "\n📋 JOBS:");
    let mut jobs: Vec<&Job> = workflow.jobs.values().collect();
    jobs.sort_by(|a, b| a.name.cmp(&b.name));
    for job in jobs {
        render_job(output, job);
    }
}

fn render_trigger(output: &mut String, trigger: &Trigger) {
    let _ = writeln!(output, "  • {}", trigger.kind);
    if trigger.kind == WORKFLOW_RUN {
        let _ = writeln!(output, "    → workflows: {}", trigger.detail_list("workflows").join(", "));
        let _ = writeln!(output, "    → types: {}", trigger.detail_list("types").join(", "));
    }
}

fn render_job(output: &mut String, job: &Job) {
    let _ = writeln!(output, "\n  Job: {}", job.name);
    let _ = writeln!(output, "    Runs on: {}", job.runs_on);
    if let Some(env) = &job.environment {
        let _ = writeln!(output, "    Environment: {env}");
    }
    if !job.needs.is_empty() {
        let _ = writeln!(output, "    Depends on: {}", job.needs.join(", "));
    }
    if !job.outputs.is_empty() {
        let keys: Vec<&str> = job.outputs.keys().map(String::as_str).collect();
        let _ = writeln!(output, "    Outputs: {}", keys.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{load_workflows, DependencyIndex};
    use std::collections::BTreeMap;
    use std::fs;

    fn analysis_from(files: &[(&str, &str)]) -> Analysis {
        let dir = tempfile::tempdir().unwrap();
        for (filename, content) in files {
            fs::write(dir.path().join(filename), content).unwrap();
        }
        Analysis::new(load_workflows(dir.path()).unwrap())
    }

    #[test]
    fn test_empty_analysis_prints_sentinel() {
        let analysis = Analysis {
            workflows: BTreeMap::new(),
            dependencies: DependencyIndex::default(),
            skipped: Vec::new(),
        };

        let report = render_report(&analysis);

        assert!(report.starts_with(&heavy_rule()));
        assert!(report.contains("GITHUB ACTIONS WORKFLOW ANALYSIS"));
        assert!(report.ends_with("\n  No workflow_run triggers found\n"));
    }

    #[test]
    fn test_workflow_section_snapshot() {
        let analysis = analysis_from(&[(
            "deploy.yml",
            r#"
name: Deploy
on:
  workflow_run:
    workflows: [Test, Build]
    types: [completed]
  push:
    branches: [main]
jobs:
  release:
    needs: [package, verify]
    runs-on: [self-hosted, linux]
    environment: production
    outputs:
      url: x
      version: y
  package:
    runs-on: ubuntu-22.04
"#,
        )]);

        let report = render_report(&analysis);

        let expected_workflow = "\
WORKFLOW: Deploy
File: deploy.yml
────────────────────────────────────────────────────────────────────────────────

🎯 TRIGGERS:
  • push
  • workflow_run
    → workflows: Test, Build
    → types: completed

📋 JOBS:

  Job: package
    Runs on: ubuntu-22.04

  Job: release
    Runs on: self-hosted, linux
    Environment: production
    Depends on: package, verify
    Outputs: url, version
";
        assert!(report.contains(expected_workflow), "report was:\n{report}");
        assert!(report.contains("🔗 Workflow chaining:\n  Deploy → Build, Test\n"));
    }

    #[test]
    fn test_report_is_stable_across_runs() {
        let files = [
            ("b.yml", "name: Beta\non: push\n"),
            ("a.yml", "name: Alpha\non: workflow_dispatch\n"),
        ];
        assert_eq!(
            render_report(&analysis_from(&files)),
            render_report(&analysis_from(&files))
        );
    }

    #[test]
    fn test_report_and_diagram_enumerate_same_workflows() {
        let analysis = analysis_from(&[
            ("z.yml", "name: Zeta Flow\non: push\n"),
            ("a.yml", "name: alpha\non: push\n"),
            ("m.yaml", "on: workflow_dispatch\n"),
            ("broken.yml", "jobs: [\n"),
        ]);

        let report = render_report(&analysis);
        let from_report: Vec<&str> = report
            .lines()
            .filter_map(|line| line.strip_prefix("WORKFLOW: "))
            .collect();

        let diagram = analysis.diagram();
        let from_diagram: Vec<&str> = diagram.groups().map(|g| g.label.as_str()).collect();

        assert_eq!(from_report, vec!["Zeta Flow", "alpha", "m"]);
        assert_eq!(from_report, from_diagram);
    }
}
