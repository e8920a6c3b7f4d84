//! Remote shell handling.
//!
//! # Architecture
//!
//! - **quote**: single-quote literals for POSIX shells and PowerShell
//! - **session**: assemble the ssh invocation for an interactive shell or a one-shot command
//!
//! The dialect comes from the profile's `shell` field. It is never inferred
//! from the local operating system.

pub mod quote;
pub mod session;

use serde::Deserialize;

pub use quote::{quote_posix, quote_powershell};
pub use session::{RemoteCommandLine, SessionError, SessionKind, build, run_session};

/// Shell dialect spoken on the remote side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ShellDialect {
    /// sh, bash, zsh and friends.
    #[default]
    Posix,
    /// Windows PowerShell reached through OpenSSH.
    PowerShell,
}

impl ShellDialect {
    /// Quote `s` as a single literal word in this dialect.
    pub fn quote(self, s: &str) -> String {
        match self {
            Self::Posix => quote_posix(s),
            Self::PowerShell => quote_powershell(s),
        }
    }
}

impl From<&str> for ShellDialect {
    /// `powershell` selects PowerShell; anything else, including empty, is POSIX.
    fn from(value: &str) -> Self {
        match value {
            "powershell" => Self::PowerShell,
            _ => Self::Posix,
        }
    }
}

impl From<String> for ShellDialect {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl std::fmt::Display for ShellDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Posix => write!(f, "posix"),
            Self::PowerShell => write!(f, "powershell"),
        }
    }
}
