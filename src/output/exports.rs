use std::io::Write;

use anyhow::Result;

use crate::workflow::Analysis;

/// Writes the full analysis (workflows, dependency index, skipped files) as JSON.
pub fn export_json(analysis: &Analysis, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(analysis)?
    } else {
        serde_json::to_string(analysis)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}
