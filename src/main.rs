mod config;
mod error;
mod git;
mod logger;
mod sync;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use config::Config;
use error::Result;
use git::Repository;
use sync::report::Reporter;

/// Fetch the main remote, fast-forward branches that fell behind it and
/// delete merged branches whose upstream is gone.
#[derive(Debug, Parser)]
#[command(name = "git-sync", version, about)]
struct Cli {
    /// Run as if started in <PATH>
    #[arg(short = 'C', value_name = "PATH")]
    directory: Option<PathBuf>,

    /// Print diagnostics to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the run report as JSON instead of report lines
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "sync aborted");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    debug!(?config, "loaded config");

    let repo = match &cli.directory {
        Some(dir) => Repository::discover_from(dir)?,
        None => Repository::discover()?,
    };
    debug!(path = %repo.path().display(), "using repository");

    let report = sync::run(&repo, &config)?;

    if cli.json {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        std::io::Write::write_all(&mut stdout, b"\n")?;
        return Ok(());
    }

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    Reporter::stdio().report_all(&report.branches)?;
    Ok(())
}
