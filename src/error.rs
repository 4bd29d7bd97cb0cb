//! Domain-specific error types for the reconciliation engine.
//!
//! Internal modules return typed errors built with [`thiserror`]; the command
//! layer converts them to [`anyhow::Error`] through the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! PipacError
//! ├── Config(ConfigError)              unresolvable lists, bad config.toml
//! ├── Parse(ParseError)                unreadable list file
//! └── Manager(ManagerInvocationError)  package manager exited non-zero
//! ```
//!
//! A declined confirmation is not an error: it is the `Skipped` outcome of a
//! step (see [`crate::apply::StepOutcome`]).

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for one invocation.
#[derive(Error, Debug)]
pub enum PipacError {
    /// Configuration could not be resolved; fatal before reconciliation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A list file could not be read.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The package manager reported a failure.
    #[error("Package manager error: {0}")]
    Manager(#[from] ManagerInvocationError),
}

/// Errors raised while resolving configuration and list files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No list file was given on the command line and none was discovered.
    #[error("no package lists found in {0} (expected packages.{{txt,md,org}} or <hostname>.{{txt,md,org}})")]
    NoListFiles(PathBuf),

    /// List files were resolved but not a single one could be read.
    #[error("none of the {0} package list(s) could be read")]
    NoReadableLists(usize),

    /// `config.toml` exists but is not valid.
    #[error("invalid config file {path}: {message}")]
    InvalidConfigFile {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The configured package manager name is not supported.
    #[error("unknown package manager '{0}': must be one of pacman, paru, yay")]
    UnknownManager(String),

    /// Auto-detection found no supported package manager on `PATH`.
    #[error("no supported package manager found (tried yay, paru, pacman)")]
    NoManagerFound,

    /// An I/O error occurred while reading configuration.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised by the list parser.
///
/// Comment and whitespace anomalies are normalised silently; only an
/// unreadable file surfaces here.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The list file could not be opened or decoded.
    #[error("cannot read package list {path}: {source}")]
    Unreadable {
        /// Path of the list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Logical package manager operation, used to label invocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerOperation {
    /// Query explicitly installed packages.
    ListExplicit,
    /// Query packages installed as dependencies.
    ListDependencies,
    /// Query orphaned packages.
    ListOrphans,
    /// Install packages.
    Install,
    /// Change install reason to dependency.
    MarkAsDependency,
    /// Change install reason to explicit.
    MarkAsExplicit,
    /// Remove packages.
    Remove,
}

impl fmt::Display for ManagerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ListExplicit => "list explicit packages",
            Self::ListDependencies => "list dependency packages",
            Self::ListOrphans => "list orphans",
            Self::Install => "install",
            Self::MarkAsDependency => "mark as dependency",
            Self::MarkAsExplicit => "mark as explicit",
            Self::Remove => "remove",
        };
        f.write_str(label)
    }
}

/// The external package manager process failed.
///
/// Carries the exit code (if the process exited normally) and whatever the
/// process wrote, so the user can see why the manager refused.
#[derive(Error, Debug)]
#[error(
    "{operation} failed: {program} exited with {exit}: {}",
    .diagnostics.trim(),
    exit = exit_label(.code)
)]
pub struct ManagerInvocationError {
    /// Operation that was being performed.
    pub operation: ManagerOperation,
    /// Program that was invoked.
    pub program: String,
    /// Exit code, or `None` when terminated by a signal or never started.
    pub code: Option<i32>,
    /// Captured stderr (or stdout when stderr was empty).
    pub diagnostics: String,
}

#[allow(clippy::ref_option)]
fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "no exit code".to_string(), |c| format!("code {c}"))
}
