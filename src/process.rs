//! Subprocess seam for rsync and ssh.
//!
//! Both tools run with inherited stdio so their progress and interactive
//! sessions reach the terminal directly. Tests substitute a recording runner.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

/// How a child process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub success: bool,
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

impl std::fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Locates and runs external programs.
pub trait ProcessRunner {
    /// Resolve `program` on the executable search path.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` to completion with inherited stdin/stdout/stderr.
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ProcessExit>;
}

/// Runs real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ProcessExit> {
        tracing::debug!(program, args = ?args, "spawning");
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.into())
    }
}

/// Render a command line for display, quoting arguments that need it.
pub fn display_command(program: &str, args: &[OsString]) -> String {
    let mut words = Vec::with_capacity(args.len() + 1);
    words.push(program.to_string());
    words.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
    shell_words::join(words)
}
