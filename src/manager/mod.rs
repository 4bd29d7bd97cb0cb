//! System state adapter: the boundary to the external package manager.
//!
//! Everything the engine knows about the installed system comes from a
//! [`PackageManagerBackend`]. Every operation is one blocking subprocess
//! invocation covering all the packages it is given.
pub mod pacman;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub use pacman::PacmanBackend;

use crate::error::{ConfigError, ManagerInvocationError, ManagerOperation};
use crate::exec::Executor;

/// Read and write operations the engine needs from a package manager.
///
/// Write operations receive the full batch of names; implementations must
/// not be called with an empty batch (the executor short-circuits those).
pub trait PackageManagerBackend: fmt::Debug {
    /// Packages recorded as explicitly installed.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerInvocationError`] if the query exits non-zero.
    fn list_explicit(&self) -> Result<BTreeSet<String>, ManagerInvocationError>;

    /// Packages installed only as dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerInvocationError`] if the query exits non-zero.
    fn list_dependencies(&self) -> Result<BTreeSet<String>, ManagerInvocationError>;

    /// Dependency packages nothing requires any more.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerInvocationError`] if the query exits non-zero.
    fn list_orphans(&self) -> Result<BTreeSet<String>, ManagerInvocationError>;

    /// Install packages explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerInvocationError`] if the manager exits non-zero.
    fn install(&self, names: &[String]) -> Result<(), ManagerInvocationError>;

    /// Demote packages to dependency install reason.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerInvocationError`] if the manager exits non-zero.
    fn mark_as_dependency(&self, names: &[String]) -> Result<(), ManagerInvocationError>;

    /// Promote installed packages to explicit install reason.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerInvocationError`] if the manager exits non-zero.
    fn mark_as_explicit(&self, names: &[String]) -> Result<(), ManagerInvocationError>;

    /// Remove packages.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerInvocationError`] if the manager exits non-zero.
    fn remove(&self, names: &[String]) -> Result<(), ManagerInvocationError>;

    /// Human-readable command line for a write operation, used in dry runs
    /// and confirmation prompts.
    fn command_line(&self, op: WriteOp, names: &[String]) -> String;
}

/// Write operations, named for previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// See [`PackageManagerBackend::install`].
    Install,
    /// See [`PackageManagerBackend::mark_as_dependency`].
    MarkAsDependency,
    /// See [`PackageManagerBackend::mark_as_explicit`].
    MarkAsExplicit,
    /// See [`PackageManagerBackend::remove`].
    Remove,
}

impl From<WriteOp> for ManagerOperation {
    fn from(op: WriteOp) -> Self {
        match op {
            WriteOp::Install => Self::Install,
            WriteOp::MarkAsDependency => Self::MarkAsDependency,
            WriteOp::MarkAsExplicit => Self::MarkAsExplicit,
            WriteOp::Remove => Self::Remove,
        }
    }
}

/// Point-in-time view of the installed system.
///
/// Fetched once at the start of a run and never refreshed. Steps that run
/// later act on this view even though earlier steps may have changed the
/// system; for example orphans created by a prune in the same run are not
/// removed until the next run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Explicitly installed packages.
    pub explicit: BTreeSet<String>,
    /// Packages installed as dependencies.
    pub dependencies: BTreeSet<String>,
    /// Dependency packages with no remaining dependents.
    pub orphans: BTreeSet<String>,
}

impl Snapshot {
    /// Query the backend once for everything the reconciler needs.
    ///
    /// # Errors
    ///
    /// Returns the first failing query.
    pub fn fetch(backend: &dyn PackageManagerBackend) -> Result<Self, ManagerInvocationError> {
        Ok(Self {
            explicit: backend.list_explicit()?,
            dependencies: backend.list_dependencies()?,
            orphans: backend.list_orphans()?,
        })
    }
}

/// Supported pacman-family front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerKind {
    /// `pacman`, run through `sudo` for writes.
    Pacman,
    /// `paru` AUR helper.
    Paru,
    /// `yay` AUR helper.
    Yay,
}

impl ManagerKind {
    /// Auto-detection preference, best first.
    pub const PREFERENCE: [Self; 3] = [Self::Yay, Self::Paru, Self::Pacman];

    /// Binary name.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Paru => "paru",
            Self::Yay => "yay",
        }
    }

    /// Pick the first available manager in [`Self::PREFERENCE`] order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoManagerFound`] if none is on `PATH`.
    pub fn detect(executor: &dyn Executor) -> Result<Self, ConfigError> {
        Self::PREFERENCE
            .into_iter()
            .find(|kind| executor.which(kind.program()))
            .ok_or(ConfigError::NoManagerFound)
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for ManagerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pacman" => Ok(Self::Pacman),
            "paru" => Ok(Self::Paru),
            "yay" => Ok(Self::Yay),
            _ => Err(ConfigError::UnknownManager(s.to_string())),
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::test_helpers::RecordingBackend;
    use super::*;
    use crate::exec::ExecResult;

    #[derive(Debug)]
    struct WhichOnly(&'static [&'static str]);

    impl Executor for WhichOnly {
        fn run_unchecked(&self, _: &str, _: &[&str]) -> anyhow::Result<ExecResult> {
            anyhow::bail!("not expected")
        }

        fn which(&self, program: &str) -> bool {
            self.0.iter().any(|p| *p == program)
        }
    }

    #[test]
    fn detect_prefers_yay_then_paru_then_pacman() {
        assert_eq!(
            ManagerKind::detect(&WhichOnly(&["pacman", "paru", "yay"])).unwrap(),
            ManagerKind::Yay
        );
        assert_eq!(
            ManagerKind::detect(&WhichOnly(&["pacman", "paru"])).unwrap(),
            ManagerKind::Paru
        );
        assert_eq!(
            ManagerKind::detect(&WhichOnly(&["pacman"])).unwrap(),
            ManagerKind::Pacman
        );
    }

    #[test]
    fn detect_fails_without_manager() {
        let err = ManagerKind::detect(&WhichOnly(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::NoManagerFound));
    }

    #[test]
    fn parse_manager_kind() {
        assert_eq!("Paru".parse::<ManagerKind>().unwrap(), ManagerKind::Paru);
        assert_eq!(" yay ".parse::<ManagerKind>().unwrap(), ManagerKind::Yay);
        assert!(matches!(
            "apt".parse::<ManagerKind>(),
            Err(ConfigError::UnknownManager(name)) if name == "apt"
        ));
    }

    #[test]
    fn snapshot_fetch_reads_all_three_sets() {
        let expected = Snapshot {
            explicit: ["base".to_string()].into(),
            dependencies: ["glibc".to_string()].into(),
            orphans: ["libfoo".to_string()].into(),
        };
        let backend = RecordingBackend::new(expected.clone());
        assert_eq!(Snapshot::fetch(&backend).unwrap(), expected);
        assert!(backend.calls().is_empty(), "fetch must not write");
    }
}
