//! Build and run the ssh invocation that follows a sync.
//!
//! Four shapes, chosen by dialect and by whether command tokens were given:
//!
//! | tokens | dialect    | remote script                                                         |
//! |--------|------------|-----------------------------------------------------------------------|
//! | none   | POSIX      | `mkdir -p P && cd P && exec ${SHELL:-bash} -l`                          |
//! | none   | PowerShell | `$p=P; New-Item ... ; Set-Location -Path $p;` under `-NoExit`          |
//! | some   | POSIX      | `mkdir -p P && cd P && <tokens>`                                       |
//! | some   | PowerShell | `$p=P; New-Item ... ; Set-Location -Path $p; <tokens>`                 |
//!
//! Tokens are joined with single spaces and passed through unquoted, so
//! `buildon box 'cargo test -- --nocapture'` and `buildon box cargo test`
//! behave the same. Quote tokens yourself when they need it.

use std::ffi::OsString;

use thiserror::Error;

use super::ShellDialect;
use crate::config::RemoteProfile;
use crate::process::{ProcessExit, ProcessRunner, display_command};

/// ssh client binary.
pub const SSH_PROGRAM: &str = "ssh";

/// PowerShell binary invoked on Windows remotes.
const POWERSHELL_PROGRAM: &str = "powershell";

/// Errors from the remote session step.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to execute ssh: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Remote session on {target} failed ({exit})")]
    RemoteSessionFailed { target: String, exit: ProcessExit },
}

/// Interactive login shell or one-shot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Interactive,
    Command,
}

/// Fully assembled ssh invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommandLine {
    kind: SessionKind,
    target: String,
    /// Program run remotely ahead of the script; only PowerShell remotes set this.
    remote_program: Vec<String>,
    script: String,
}

impl RemoteCommandLine {
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// `user@host`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The remote-side shell script.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Whether ssh is asked for a pseudo-terminal.
    pub fn wants_tty(&self) -> bool {
        self.kind == SessionKind::Interactive
    }

    /// Arguments for the ssh client, script last.
    pub fn ssh_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(self.remote_program.len() + 3);
        if self.wants_tty() {
            args.push("-t".into());
        }
        args.push(self.target.clone().into());
        args.extend(self.remote_program.iter().map(OsString::from));
        args.push(self.script.clone().into());
        args
    }

    /// The ssh invocation rendered for display.
    pub fn display(&self) -> String {
        display_command(SSH_PROGRAM, &self.ssh_args())
    }
}

/// Assemble the ssh invocation for `profile`; empty `tokens` means an interactive shell.
pub fn build(profile: &RemoteProfile, tokens: &[String]) -> RemoteCommandLine {
    let kind = if tokens.is_empty() {
        SessionKind::Interactive
    } else {
        SessionKind::Command
    };
    let command = tokens.join(" ");
    let quoted = profile.shell.quote(&profile.path);

    let (remote_program, script) = match profile.shell {
        ShellDialect::Posix => {
            let tail = match kind {
                SessionKind::Interactive => "exec ${SHELL:-bash} -l",
                SessionKind::Command => command.as_str(),
            };
            (
                Vec::new(),
                format!("mkdir -p {quoted} && cd {quoted} && {tail}"),
            )
        }
        ShellDialect::PowerShell => {
            let prelude = format!(
                "$p={quoted}; New-Item -ItemType Directory -Force -Path $p *> $null; Set-Location -Path $p;"
            );
            let mut program: Vec<String> = [POWERSHELL_PROGRAM, "-NoProfile", "-NoLogo"]
                .into_iter()
                .map(String::from)
                .collect();
            let script = match kind {
                SessionKind::Interactive => {
                    program.push("-NoExit".into());
                    prelude
                }
                SessionKind::Command => format!("{prelude} {command}"),
            };
            program.push("-Command".into());
            (program, script)
        }
    };

    RemoteCommandLine {
        kind,
        target: profile.target(),
        remote_program,
        script,
    }
}

/// Run the session, blocking until the remote shell or command exits.
pub fn run_session(
    runner: &dyn ProcessRunner,
    line: &RemoteCommandLine,
) -> Result<(), SessionError> {
    tracing::debug!(
        ssh_target = %line.target(),
        kind = ?line.kind(),
        script = %line.script(),
        "starting remote session"
    );
    let exit = runner.run(SSH_PROGRAM, &line.ssh_args())?;
    if !exit.success {
        return Err(SessionError::RemoteSessionFailed {
            target: line.target().to_string(),
            exit,
        });
    }
    Ok(())
}
