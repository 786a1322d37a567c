mod app;
mod cli;
mod config;
mod content;
mod db;
mod logging;
mod paths;
mod store;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
