use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod channel;
mod cli;
mod cohort;
mod config;
mod extract;
mod filters;
mod identity;
mod merge;
mod model;
mod org;
mod pipeline;
mod report;
mod util;
mod window;

use crate::cli::{Cli, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  let default_filter = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .with_writer(std::io::stderr)
    .init();

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: run the extract/merge/classify pipeline
  pipeline::run(&cfg)
}
