use anyhow::{Context, Result};
use bd_weather_collector::cli::{run, Cli};
use clap::Parser;

fn main() -> Result<()> {
    // A missing .env is fine; the key may come from the flag or environment
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    run(cli).context("daily collection failed")
}
