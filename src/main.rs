mod cli;
mod config;
mod diagram;
mod error;
mod output;
mod s6;
mod workflow;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting ciflow");
    cli.execute()?;

    Ok(())
}
