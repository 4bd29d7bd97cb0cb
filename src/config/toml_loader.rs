//! TOML configuration file parsing.
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Deserialize a TOML file, treating a missing file as empty.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
/// [`ConfigError::InvalidConfigFile`] if it is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&content).map_err(|e| ConfigError::InvalidConfigFile {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Contents of `config.toml`.
///
/// ```toml
/// lists = ["work", "gaming.md"]
/// manager = "paru"
/// assume_yes = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Extra lists, by bare name or path.
    pub lists: Vec<String>,
    /// Package manager to use instead of auto-detection.
    pub manager: Option<String>,
    /// Skip confirmations.
    pub assume_yes: bool,
}

impl FileConfig {
    /// Load `config.toml` from `config_dir`.
    ///
    /// # Errors
    ///
    /// See [`load_config`].
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        load_config(&config_dir.join(super::CONFIG_FILE))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FileConfig::load(dir.path()).unwrap(), FileConfig::default());
    }

    #[test]
    fn full_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "lists = [\"work\", \"/etc/pipac/base.txt\"]\nmanager = \"yay\"\nassume_yes = true\n",
        )
        .unwrap();

        let config = FileConfig::load(dir.path()).unwrap();
        assert_eq!(config.lists, vec!["work", "/etc/pipac/base.txt"]);
        assert_eq!(config.manager.as_deref(), Some("yay"));
        assert!(config.assume_yes);
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "lists = \"work\"\n").unwrap();

        let err = FileConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfigFile { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "prune = true\n").unwrap();
        assert!(FileConfig::load(dir.path()).is_err());
    }
}
