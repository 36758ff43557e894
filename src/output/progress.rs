use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{heading, pending, success};

/// Progress tracking for the load, analyze and render phases
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_loading() -> Self {
        eprintln!("{}  {}", heading("⚙️"), heading("Phases"));
        let pb = create_spinner(pending("Phase 1/3: Loading workflow files").to_string());
        Self { pb }
    }

    pub fn finish_loading_start_analysis(self, workflow_count: usize) -> Self {
        self.pb.finish_with_message(
            success(format!("Phase 1/3: Loaded {workflow_count} workflows ✓")).to_string(),
        );
        let pb = create_spinner(pending("Phase 2/3: Resolving workflow chaining").to_string());
        Self { pb }
    }

    pub fn finish_analysis_start_render(self, chained_count: usize) -> Self {
        self.pb.finish_with_message(
            success(format!("Phase 2/3: Resolved {chained_count} chained workflows ✓")).to_string(),
        );
        let pb = create_spinner(pending("Phase 3/3: Rendering diagram").to_string());
        Self { pb }
    }

    pub fn finish_render(self) {
        self.pb
            .finish_with_message(success("Phase 3/3: Diagram rendered ✓").to_string());
        eprintln!();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
