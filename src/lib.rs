//! buildon: push a git working tree to a remote host and work there.
//!
//! The pipeline is linear and synchronous:
//!
//! 1. resolve the named [`config::RemoteProfile`]
//! 2. compute the [`files::FileSet`] from git and push it with rsync ([`sync`])
//! 3. open a login shell or run a command over ssh ([`remote::session`])
//!
//! The first failure aborts the run.

pub mod cli;
pub mod config;
pub mod files;
pub mod process;
pub mod remote;
pub mod sync;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::Cli;
use crate::config::Config;
use crate::files::GitFileLister;
use crate::process::{ProcessRunner, SystemRunner};
use crate::sync::SyncEngine;

/// Run the CLI against real git, rsync and ssh.
pub fn run(cli: Cli) -> Result<()> {
    run_with(cli, &SystemRunner)
}

/// Run the CLI with a caller-supplied process runner for rsync and ssh.
pub fn run_with(cli: Cli, runner: &dyn ProcessRunner) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    if cli.list {
        for (name, profile) in &config.remote {
            println!(
                "{}\t{}:{}\t{}",
                name.bold(),
                profile.target(),
                profile.path,
                profile.shell
            );
        }
        return Ok(());
    }

    let name = cli.remote.as_deref().context("no remote name given")?;
    let profile = config.remote(name)?;
    tracing::debug!(
        remote = name,
        ssh_target = %profile.target(),
        shell = %profile.shell,
        "resolved remote"
    );

    if cli.no_sync {
        tracing::debug!("skipping sync");
    } else {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let lister = GitFileLister::new(cwd);
        SyncEngine::new(runner)
            .with_dry_run(cli.dry_run)
            .sync(profile, &lister)
            .with_context(|| format!("sync to {name} failed"))?;
    }

    let line = remote::build(profile, &cli.command);
    if cli.dry_run {
        println!("{} Would run: {}", "==>".blue().bold(), line.display());
        return Ok(());
    }

    if !cli.command.is_empty() {
        println!(
            "{} Running on {}: {}",
            "==>".blue().bold(),
            line.target(),
            cli.command.join(" ")
        );
    }
    remote::run_session(runner, &line)?;
    Ok(())
}
