use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Config, OutputFormat};
use crate::diagram::render_fenced;
use crate::output::{self, PhaseProgress};
use crate::s6;
use crate::workflow::{load_workflows, Analysis};

#[derive(Parser)]
#[command(name = "ciflow")]
#[command(author, version, about = "CI workflow and service dependency diagrams", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./ciflow.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a GitHub Actions workflow directory and write a Mermaid diagram
    Workflows {
        /// Workflow directory (default: .github/workflows)
        #[arg(short, long, env = "WORKFLOWS_DIR")]
        dir: Option<PathBuf>,

        /// Markdown output file (default: <dir>/workflows-diagram.md)
        #[arg(short, long, env = "WORKFLOWS_OUTPUT")]
        output: Option<PathBuf>,

        /// Stdout format: text report or JSON analysis
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Pretty-print the JSON analysis (only used with `--format json`)
        #[arg(short, long, default_value_t = false)]
        pretty: bool,

        /// Do not print the Mermaid block to stdout
        #[arg(long, default_value_t = false)]
        no_diagram_echo: bool,
    },

    /// Scan an s6-rc.d tree and write a Mermaid dependency graph
    #[command(name = "s6-tree")]
    S6Tree {
        /// The s6-rc.d directory to scan
        #[arg(short, long, env = "S6_TREE")]
        tree: Option<PathBuf>,

        /// Markdown output file (default: dependency_tree.md)
        #[arg(short, long, env = "OUTPUT_FILE")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn execute_workflows(
        config: &Config,
        dir: Option<&Path>,
        output: Option<&Path>,
        format: Option<OutputFormat>,
        pretty: bool,
        echo_diagram: bool,
    ) -> Result<()> {
        let (dir, output_path) = config.workflows.resolve(dir, output);
        let format = format.unwrap_or(config.workflows.format);
        let pretty = pretty || config.workflows.pretty;

        info!("Analyzing workflows in: {}", dir.display());

        let progress = PhaseProgress::start_loading();
        let outcome = load_workflows(&dir)?;
        let progress = progress.finish_loading_start_analysis(outcome.workflows.len());
        let analysis = Analysis::new(outcome);
        let progress = progress.finish_analysis_start_render(analysis.dependencies.len());
        let diagram = analysis.diagram();
        let document = output::workflow_document(&diagram);
        progress.finish_render();

        match format {
            OutputFormat::Text => {
                output::print_report(&analysis);
                println!("\n{}", output::overview_table(&analysis));
                if echo_diagram {
                    println!("\n{}", render_fenced(&diagram));
                }
            }
            OutputFormat::Json => {
                output::export_json(&analysis, pretty, &mut io::stdout().lock())?;
            }
        }
        output::print_skipped(&analysis.skipped);

        output::write_document(&output_path, &document)?;
        info!("Workflow diagram written to: {}", output_path.display());
        output::print_saved(&output_path);

        Ok(())
    }

    fn execute_s6_tree(config: &Config, tree: Option<&Path>, output: Option<&Path>) -> Result<()> {
        let (tree, output_path) = config.s6.resolve(tree, output);

        info!("Scanning s6-rc tree: {}", tree.display());

        let deps = s6::read_dependencies(&tree)?;
        let document = output::s6_document(&s6::build_diagram(&deps));

        output::write_document(&output_path, &document)?;
        info!("Dependency graph written to: {}", output_path.display());
        output::print_saved(&output_path);

        Ok(())
    }

    pub fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;

        match &self.command {
            Commands::Workflows {
                dir,
                output,
                format,
                pretty,
                no_diagram_echo,
            } => Self::execute_workflows(
                &config,
                dir.as_deref(),
                output.as_deref(),
                *format,
                *pretty,
                !*no_diagram_echo,
            ),
            Commands::S6Tree { tree, output } => {
                Self::execute_s6_tree(&config, tree.as_deref(), output.as_deref())
            }
        }
    }
}
