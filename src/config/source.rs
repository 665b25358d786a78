//! Resolution of the configuration file location.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming the configuration file path.
pub const CONFIG_PATH_ENV: &str = "CONF_PATH";

/// Resolved identity of the configuration source.
///
/// Resolution is deterministic and side-effect free: the same environment
/// always yields the same source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    path: PathBuf,
}

impl ConfigSource {
    /// Resolves the source from the `CONF_PATH` environment variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(std::env::var_os(CONFIG_PATH_ENV))
    }

    /// Resolution logic, separated from the environment read so it can be
    /// exercised without mutating process-global state.
    fn resolve(value: Option<std::ffi::OsString>) -> Result<Self, ConfigError> {
        match value {
            Some(path) => Ok(Self {
                path: PathBuf::from(path),
            }),
            None => Err(ConfigError::SourceNotConfigured {
                var: CONFIG_PATH_ENV,
            }),
        }
    }

    /// Builds a source from an explicit path, bypassing the environment.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The resolved file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_is_kept_verbatim() {
        let source = ConfigSource::from_path("/etc/diskmon/config.yaml");
        assert_eq!(source.path(), Path::new("/etc/diskmon/config.yaml"));
    }

    #[test]
    fn present_value_resolves_to_its_path() {
        let resolved =
            ConfigSource::resolve(Some(std::ffi::OsString::from("/tmp/diskmon.yaml"))).unwrap();
        assert_eq!(resolved.path(), Path::new("/tmp/diskmon.yaml"));
    }

    #[test]
    fn missing_value_is_not_configured() {
        let missing = ConfigSource::resolve(None);
        assert!(matches!(
            missing,
            Err(ConfigError::SourceNotConfigured { var: CONFIG_PATH_ENV })
        ));
    }
}
