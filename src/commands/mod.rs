//! Command orchestration.
pub mod sync;

use crate::config::{Config, Env, Overrides};
use crate::error::{ConfigError, PipacError};
use crate::exec::Executor;
use crate::lists::{self, PackageSet};
use crate::logging::Logger;
use crate::manager::ManagerKind;

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved configuration.
    pub config: Config,
    /// Union of every readable list.
    pub desired: PackageSet,
    /// Package manager to drive.
    pub manager: ManagerKind,
}

impl CommandSetup {
    /// Resolve configuration, load the lists, and pick a package manager.
    ///
    /// Unreadable list files are reported as warnings; the run continues
    /// with the remaining ones.
    ///
    /// # Errors
    ///
    /// Returns [`PipacError::Config`] if configuration cannot be resolved, if
    /// none of the list files can be read, or if no package manager is
    /// available.
    pub fn init(
        env: &Env,
        overrides: &Overrides,
        executor: &dyn Executor,
        log: &Logger,
    ) -> Result<Self, PipacError> {
        log.stage("Loading configuration");
        let config = Config::load(env, overrides)?;
        log.debug(&format!("config dir: {}", config.config_dir.display()));

        log.stage("Reading package lists");
        let loaded = lists::load_all(&config.list_files);
        for error in &loaded.errors {
            log.warn(&error.to_string());
        }
        if loaded.read.is_empty() {
            return Err(ConfigError::NoReadableLists(config.list_files.len()).into());
        }
        for path in &loaded.read {
            log.info(&format!("list: {}", path.display()));
        }
        log.info(&format!(
            "{} package(s) declared, {} optional",
            loaded.packages.len(),
            loaded.packages.optional_names().len()
        ));

        let manager = match config.manager {
            Some(kind) => kind,
            None => ManagerKind::detect(executor)?,
        };
        log.info(&format!("package manager: {manager}"));

        Ok(Self {
            config,
            desired: loaded.packages,
            manager,
        })
    }
}
