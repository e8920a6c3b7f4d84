use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::config::CONFIG_ENV;

/// Sync the current git working tree to a remote, then open a shell or run a command there.
#[derive(Parser, Debug)]
#[command(name = "buildon", version, about)]
pub struct Cli {
    /// Config file (default: ~/.config/buildon/config.toml)
    #[arg(short, long, env = CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the rsync and ssh invocations without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the rsync step
    #[arg(long)]
    pub no_sync: bool,

    /// List configured remotes and exit
    #[arg(long, conflicts_with_all = ["remote", "command"])]
    pub list: bool,

    /// Remote name from the config file
    pub remote: Option<String>,

    /// Command to run in the remote directory; opens a login shell when omitted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, requires = "remote")]
    pub command: Vec<String>,
}

impl Cli {
    /// One-line usage string.
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_verifies() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_remote_and_command() {
        let cli = Cli::try_parse_from(["buildon", "devbox", "cargo", "test", "--", "--nocapture"])
            .unwrap();
        assert_eq!(cli.remote.as_deref(), Some("devbox"));
        assert_eq!(cli.command, ["cargo", "test", "--", "--nocapture"]);
    }

    #[test]
    fn test_command_keeps_hyphenated_tokens() {
        let cli = Cli::try_parse_from(["buildon", "devbox", "cargo", "build", "--release"]).unwrap();
        assert_eq!(cli.command, ["cargo", "build", "--release"]);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_flags_before_remote() {
        let cli = Cli::try_parse_from(["buildon", "-n", "--no-sync", "-c", "/tmp/c.toml", "devbox"])
            .unwrap();
        assert!(cli.dry_run);
        assert!(cli.no_sync);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(cli.command.is_empty());
    }

    #[test]
    fn test_remote_optional_at_parse_time() {
        let cli = Cli::try_parse_from(["buildon"]).unwrap();
        assert!(cli.remote.is_none());
    }

    #[test]
    fn test_usage_mentions_remote() {
        let usage = Cli::usage();
        assert!(usage.contains("buildon"));
        assert!(usage.contains("REMOTE"));
    }
}
