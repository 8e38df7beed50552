//! treesyncd — live file-tree mirroring daemon.
//!
//! # Usage
//!
//! ```text
//! treesyncd [--runner <runner-file>] <config-file>
//! ```
//!
//! The core validates both files, wires the built-in runner, and hands
//! control to the master loop. What gets mirrored where is entirely the
//! runner's decision; the config file is passed through to it untouched.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use treesync_core::logging::{Level, LogConfig, Logger};
use treesync_core::reset;
use treesync_daemon::{runtime, DaemonError, EchoRunner, Host, Runner};
use treesync_events::EventSource;

/// Compiled-in version every runner must match.
const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_RUNNER_FILE: &str = "treesync.runner";

#[derive(Parser, Debug)]
#[command(
    name = "treesyncd",
    version,
    about = "Live file-tree mirroring daemon",
    long_about = None,
)]
struct Cli {
    /// Runner file wiring the synchronization policy.
    #[arg(long, default_value = DEFAULT_RUNNER_FILE)]
    runner: PathBuf,

    /// Config file handed through to the runner.
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.runner.is_file() {
        bail!(
            "cannot find runner file at [{}]; point --runner at one",
            cli.runner.display()
        );
    }
    if !cli.config.is_file() {
        bail!("cannot find config file at [{}]", cli.config.display());
    }

    reset::install_handlers().map_err(DaemonError::Signals)?;

    let logger = Logger::new(LogConfig::default());
    let source = EventSource::new()?;
    let mut host = Host::new(logger, source);

    let mut runner = EchoRunner::new(cli.runner, cli.config);
    if runner.version() != CORE_VERSION {
        return Err(DaemonError::VersionMismatch {
            runner: runner.version().to_string(),
            core: CORE_VERSION.to_string(),
        }
        .into());
    }

    runner.initialize(&mut host);
    runtime::run(&mut host, &mut runner)?;

    host.logger()
        .core(Level::Normal, format_args!("reset received, shutting down"));
    Ok(())
}
