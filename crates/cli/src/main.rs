//! trd - run commands when a file is rewritten

use anyhow::Result;
use clap::Parser;
use trd_cli::{background, daemon, logging, Cli, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli)?;

    if !settings.foreground {
        background::start(&settings)?;
        return Ok(());
    }

    let _guard = logging::init(&settings.log, settings.verbose)?;
    daemon::start(&settings).await
}
