//! Invocation configuration: where the lists live and how to act on them.
//!
//! Sources, lowest precedence first: built-in defaults, `config.toml` in the
//! config directory, then the command line. [`resolve`] merges them without
//! touching the filesystem itself; existence checks are injected so the
//! discovery rules can be tested in isolation.
pub mod toml_loader;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use toml_loader::FileConfig;

use crate::error::ConfigError;
use crate::manager::ManagerKind;

/// Name of the optional settings file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Base name of the list every host reads.
pub const DEFAULT_LIST: &str = "packages";

/// Recognised list extensions, in lookup order.
pub const LIST_EXTENSIONS: [&str; 3] = ["txt", "md", "org"];

/// Process environment relevant to configuration, captured once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    /// `$HOME`.
    pub home: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME`.
    pub xdg_config_home: Option<PathBuf>,
    /// Host name, for host-specific lists.
    pub hostname: Option<String>,
}

impl Env {
    /// Read the current process environment.
    ///
    /// The host name comes from `$HOSTNAME`, falling back to
    /// `/etc/hostname`.
    #[must_use]
    pub fn from_process() -> Self {
        let non_empty = |v: String| (!v.trim().is_empty()).then(|| v.trim().to_string());
        let hostname = std::env::var("HOSTNAME")
            .ok()
            .and_then(non_empty)
            .or_else(|| {
                std::fs::read_to_string("/etc/hostname")
                    .ok()
                    .and_then(non_empty)
            });
        Self {
            home: std::env::var_os("HOME").map(PathBuf::from),
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            hostname,
        }
    }

    /// Default config directory: `$XDG_CONFIG_HOME/pipac`, else
    /// `$HOME/.config/pipac`, else `./pipac`.
    #[must_use]
    pub fn default_config_dir(&self) -> PathBuf {
        self.xdg_config_home.as_ref().map_or_else(
            || {
                self.home
                    .as_ref()
                    .map_or_else(PathBuf::new, |h| h.join(".config"))
                    .join("pipac")
            },
            |x| x.join("pipac"),
        )
    }
}

/// Settings taken from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Explicit list files; replace discovery when non-empty.
    pub lists: Vec<PathBuf>,
    /// Config directory override.
    pub config_dir: Option<PathBuf>,
    /// Package manager override.
    pub manager: Option<ManagerKind>,
    /// `--yes`.
    pub assume_yes: bool,
    /// `--dry-run`.
    pub dry_run: bool,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory lists and `config.toml` are read from.
    pub config_dir: PathBuf,
    /// List files to load, deduplicated, in resolution order.
    pub list_files: Vec<PathBuf>,
    /// Package manager, or `None` to auto-detect.
    pub manager: Option<ManagerKind>,
    /// Skip confirmations.
    pub assume_yes: bool,
    /// Log commands instead of running them.
    pub dry_run: bool,
}

impl Config {
    /// Resolve configuration against the real environment and filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config.toml` is invalid or no list file
    /// can be found.
    pub fn load(env: &Env, overrides: &Overrides) -> Result<Self, ConfigError> {
        let config_dir = config_dir(env, overrides);
        let file = FileConfig::load(&config_dir)?;
        resolve(env, overrides, &file, |p| p.is_file())
    }
}

/// The config directory selected by `overrides` and `env`.
#[must_use]
pub fn config_dir(env: &Env, overrides: &Overrides) -> PathBuf {
    overrides
        .config_dir
        .clone()
        .unwrap_or_else(|| env.default_config_dir())
}

/// First existing `<dir>/<stem>.<ext>` in [`LIST_EXTENSIONS`] order.
fn find_list(dir: &Path, stem: &str, exists: &impl Fn(&Path) -> bool) -> Option<PathBuf> {
    LIST_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| exists(p))
}

/// Resolve one `lists` entry from `config.toml`.
///
/// A bare name is looked up like the default lists; a name ending in one of
/// [`LIST_EXTENSIONS`] is a path, relative to the config dir unless absolute.
/// Other dots are part of the name (`my.host` finds `my.host.txt`).
fn named_list(dir: &Path, name: &str, exists: &impl Fn(&Path) -> bool) -> Option<PathBuf> {
    let path = Path::new(name);
    let has_list_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LIST_EXTENSIONS.contains(&e));
    if has_list_extension || path.is_absolute() {
        let full = dir.join(path);
        exists(&full).then_some(full)
    } else {
        find_list(dir, name, exists)
    }
}

/// Merge defaults, `file` and `overrides` into a [`Config`].
///
/// With positional lists those are used as given. Otherwise the config dir
/// is searched for `packages.*`, `<hostname>.*` and every entry of
/// `file.lists`; entries that resolve to nothing are logged and skipped.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownManager`] for a bad `manager` value and
/// [`ConfigError::NoListFiles`] if no list was given or found.
pub fn resolve(
    env: &Env,
    overrides: &Overrides,
    file: &FileConfig,
    exists: impl Fn(&Path) -> bool,
) -> Result<Config, ConfigError> {
    let config_dir = config_dir(env, overrides);

    let manager = overrides.manager.map_or_else(
        || file.manager.as_deref().map(str::parse).transpose(),
        |kind| Ok(Some(kind)),
    )?;

    let mut list_files = if overrides.lists.is_empty() {
        let mut found = Vec::new();
        let stems = std::iter::once(DEFAULT_LIST).chain(env.hostname.as_deref());
        found.extend(stems.filter_map(|stem| find_list(&config_dir, stem, &exists)));
        for name in &file.lists {
            match named_list(&config_dir, name, &exists) {
                Some(path) => found.push(path),
                None => tracing::warn!("list '{name}' from {CONFIG_FILE} not found"),
            }
        }
        found
    } else {
        overrides.lists.clone()
    };

    let mut seen = HashSet::new();
    list_files.retain(|p| seen.insert(p.clone()));

    if list_files.is_empty() {
        return Err(ConfigError::NoListFiles(config_dir));
    }

    Ok(Config {
        config_dir,
        list_files,
        manager,
        assume_yes: overrides.assume_yes || file.assume_yes,
        dry_run: overrides.dry_run,
    })
}
