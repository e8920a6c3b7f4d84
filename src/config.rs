//! Remote profile configuration.
//!
//! Remotes are configured in `~/.config/buildon/config.toml`:
//!
//! ```toml
//! [remote.devbox]
//! host = "devbox.local"
//! user = "alice"
//! path = "/srv/app"
//!
//! [remote.winbuild]
//! host = "10.0.0.12"
//! user = "builder"
//! shell = "powershell"
//! path = "Projects/deno"
//! ```
//!
//! Only the existence of a named entry is checked; field contents are passed
//! through to rsync and ssh as written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::remote::ShellDialect;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "BUILDON_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No remote named {name} (configured: {available})")]
    UnknownRemote { name: String, available: String },
}

/// A single remote target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteProfile {
    pub host: String,
    pub user: String,
    /// Shell dialect spoken by the remote login shell.
    #[serde(default)]
    pub shell: ShellDialect,
    /// Directory on the remote that mirrors the local working tree.
    pub path: String,
}

impl RemoteProfile {
    /// `user@host`, the ssh target and the prefix of the rsync destination.
    pub fn target(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// `user@host:path`, the rsync destination.
    pub fn destination(&self) -> String {
        format!("{}:{}", self.target(), self.path)
    }
}

/// Parsed config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: BTreeMap<String, RemoteProfile>,
}

impl Config {
    /// Default config location: `<home>/.config/buildon/config.toml` on every platform.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
        Ok(dirs
            .home_dir()
            .join(".config")
            .join("buildon")
            .join("config.toml"))
    }

    /// Load from an explicit path, or from [`Config::default_path`] when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        tracing::debug!(path = %path.display(), "loading config");

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Look up a remote by name.
    pub fn remote(&self, name: &str) -> Result<&RemoteProfile, ConfigError> {
        self.remote
            .get(name)
            .ok_or_else(|| ConfigError::UnknownRemote {
                name: name.to_string(),
                available: if self.remote.is_empty() {
                    "none".to_string()
                } else {
                    self.remote_names().collect::<Vec<_>>().join(", ")
                },
            })
    }

    pub fn remote_names(&self) -> impl Iterator<Item = &str> {
        self.remote.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[remote.devbox]
host = "devbox.local"
user = "alice"
path = "/srv/app"

[remote.winbuild]
host = "10.0.0.12"
user = "builder"
shell = "powershell"
path = "Projects/deno"

[remote.zsh]
host = "zbox"
user = "bob"
shell = "zsh"
path = "~/work"
"#;

    #[test]
    fn test_parse_profiles() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.remote.len(), 3);

        let devbox = config.remote("devbox").unwrap();
        assert_eq!(devbox.host, "devbox.local");
        assert_eq!(devbox.user, "alice");
        assert_eq!(devbox.path, "/srv/app");
        assert_eq!(devbox.shell, ShellDialect::Posix);

        assert_eq!(
            config.remote("winbuild").unwrap().shell,
            ShellDialect::PowerShell
        );
    }

    #[test]
    fn test_unrecognised_shell_is_posix() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.remote("zsh").unwrap().shell, ShellDialect::Posix);
    }

    #[test]
    fn test_target_and_destination() {
        let config = Config::parse(SAMPLE).unwrap();
        let devbox = config.remote("devbox").unwrap();
        assert_eq!(devbox.target(), "alice@devbox.local");
        assert_eq!(devbox.destination(), "alice@devbox.local:/srv/app");
    }

    #[test]
    fn test_unknown_remote_lists_available() {
        let config = Config::parse(SAMPLE).unwrap();
        let err = config.remote("nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No remote named nope (configured: devbox, winbuild, zsh)"
        );
    }

    #[test]
    fn test_unknown_remote_empty_config() {
        let config = Config::parse("").unwrap();
        let err = config.remote("devbox").unwrap_err();
        assert!(err.to_string().contains("configured: none"));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let err = Config::parse("[remote.x]\nhost = \"h\"\n").unwrap_err();
        assert!(err.to_string().contains("user") || err.to_string().contains("missing"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.remote("devbox").is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[remote.devbox\nhost=").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_default_path_shape() {
        if let Ok(path) = Config::default_path() {
            assert!(path.ends_with(".config/buildon/config.toml"));
        }
    }
}
