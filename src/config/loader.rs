//! Configuration file loading and parsing.

use crate::error::ConfigError;

use super::model::AgentConfig;
use super::source::ConfigSource;

/// Reads and deserializes the configuration file named by `source`.
///
/// Pure beyond the single file read: no global state is touched, and the
/// function is safe to call repeatedly and concurrently. Either a fully
/// populated [`AgentConfig`] is returned or an error — never a partial
/// document.
pub fn load(source: &ConfigSource) -> Result<AgentConfig, ConfigError> {
    let path = source.path();

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::SourceUnreadable {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: AgentConfig =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::SourceInvalid {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> ConfigSource {
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        ConfigSource::from_path(path)
    }

    #[test]
    fn well_formed_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_config(&dir, "general:\n  http_port: 8080\n");

        let config = load(&source).unwrap();
        assert_eq!(config.general.http_port, 8080);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let source = ConfigSource::from_path("/nonexistent/diskmon/config.yaml");

        let err = load(&source).unwrap_err();
        assert!(matches!(err, ConfigError::SourceUnreadable { .. }));
    }

    #[test]
    fn malformed_yaml_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_config(&dir, "general: [not, a, mapping\n");

        let err = load(&source).unwrap_err();
        assert!(matches!(err, ConfigError::SourceInvalid { .. }));
    }

    #[test]
    fn schema_mismatch_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_config(&dir, "general:\n  http_port: not-a-port\n");

        let err = load(&source).unwrap_err();
        assert!(matches!(err, ConfigError::SourceInvalid { .. }));
    }
}
