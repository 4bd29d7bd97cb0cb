//! Desired-versus-actual diffs and the ordered operation plan.
//!
//! Given the desired [`PackageSet`] and one [`Snapshot`]:
//!
//! - **to prune**: explicit packages not declared in any list, neither as
//!   required nor as optional
//! - **to install**: required declarations that are not explicit
//! - **newly explicit**: explicit packages not declared anywhere, reported
//!   only
//!
//! Orphans that are declared in a list are never removed; required ones are
//! promoted back to explicit by the install step instead.
//!
//! Optional declarations protect a package from pruning but are never
//! installed.
use std::collections::BTreeSet;
use std::fmt;

use crate::lists::PackageSet;
use crate::manager::Snapshot;

/// An operation the user can request.
///
/// The derived ordering is the execution order and must not change: prune,
/// orphans, install, then the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// Demote undeclared explicit packages to dependencies.
    Prune,
    /// Remove orphaned dependency packages.
    Orphans,
    /// Install missing required packages.
    Install,
    /// Report undeclared explicit packages.
    New,
}

impl Operation {
    /// Every operation, in execution order.
    pub const ALL: [Self; 4] = [Self::Prune, Self::Orphans, Self::Install, Self::New];

    /// Fixed processing position, starting at 1.
    #[must_use]
    pub const fn order(self) -> u8 {
        match self {
            Self::Prune => 1,
            Self::Orphans => 2,
            Self::Install => 3,
            Self::New => 4,
        }
    }

    /// Short name used in logs and the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prune => "prune",
            Self::Orphans => "orphans",
            Self::Install => "install",
            Self::New => "new",
        }
    }

    /// Whether the step needs the user's consent before it runs.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, Self::Prune | Self::Orphans)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three derived sets of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Explicit packages absent from every list.
    pub to_prune: BTreeSet<String>,
    /// Required packages that are not explicit.
    pub to_install: BTreeSet<String>,
    /// Explicit packages declared nowhere; for reporting.
    pub newly_explicit: BTreeSet<String>,
}

impl Diff {
    /// Compute all three diffs.
    #[must_use]
    pub fn compute(desired: &PackageSet, actual: &Snapshot) -> Self {
        let required = desired.required_names();

        let newly_explicit: BTreeSet<String> = actual
            .explicit
            .iter()
            .filter(|name| !desired.contains(name))
            .cloned()
            .collect();

        Self {
            to_prune: newly_explicit.clone(),
            to_install: required.difference(&actual.explicit).cloned().collect(),
            newly_explicit,
        }
    }
}

/// One step of an [`OperationPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Mark these packages as dependencies.
    Prune {
        /// Packages to demote.
        packages: Vec<String>,
    },
    /// Remove these orphans.
    Orphans {
        /// Packages to remove.
        packages: Vec<String>,
    },
    /// Bring required packages to explicit status.
    Install {
        /// Packages not installed at all.
        install: Vec<String>,
        /// Packages already installed as dependencies; only their install
        /// reason changes.
        mark_explicit: Vec<String>,
    },
    /// Print undeclared explicit packages.
    ReportNew {
        /// Packages to print.
        packages: Vec<String>,
    },
}

impl Step {
    /// The operation this step performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Prune { .. } => Operation::Prune,
            Self::Orphans { .. } => Operation::Orphans,
            Self::Install { .. } => Operation::Install,
            Self::ReportNew { .. } => Operation::New,
        }
    }

    /// Whether the step has nothing to act on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Prune { packages } | Self::Orphans { packages } | Self::ReportNew { packages } => {
                packages.is_empty()
            }
            Self::Install {
                install,
                mark_explicit,
            } => install.is_empty() && mark_explicit.is_empty(),
        }
    }

    /// Every package the step touches.
    #[must_use]
    pub fn packages(&self) -> Vec<&str> {
        match self {
            Self::Prune { packages } | Self::Orphans { packages } | Self::ReportNew { packages } => {
                packages.iter().map(String::as_str).collect()
            }
            Self::Install {
                install,
                mark_explicit,
            } => install
                .iter()
                .chain(mark_explicit)
                .map(String::as_str)
                .collect(),
        }
    }
}

/// Requested steps in fixed execution order, plus the full diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPlan {
    /// Diffs computed for this run, independent of what was requested.
    pub diff: Diff,
    steps: Vec<Step>,
}

impl OperationPlan {
    /// Steps sorted by [`Operation::order`].
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether no mutating step has anything to do.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.steps
            .iter()
            .filter(|s| s.operation() != Operation::New)
            .all(Step::is_empty)
    }
}

impl fmt::Display for OperationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            let packages = step.packages();
            let detail = if packages.is_empty() {
                "(nothing)".to_string()
            } else {
                packages.join(" ")
            };
            writeln!(
                f,
                "{}. {:<8} {detail}",
                step.operation().order(),
                step.operation().label()
            )?;
        }
        Ok(())
    }
}

/// Compute the diffs and build the plan for the requested operations.
///
/// Requested operations may come in any order and may repeat; the plan is
/// always in [`Operation`] order with each operation at most once.
#[must_use]
pub fn reconcile(
    desired: &PackageSet,
    actual: &Snapshot,
    requested: impl IntoIterator<Item = Operation>,
) -> OperationPlan {
    let diff = Diff::compute(desired, actual);
    let requested: BTreeSet<Operation> = requested.into_iter().collect();

    let steps = requested
        .into_iter()
        .map(|op| match op {
            Operation::Prune => Step::Prune {
                packages: diff.to_prune.iter().cloned().collect(),
            },
            Operation::Orphans => Step::Orphans {
                packages: actual
                    .orphans
                    .iter()
                    .filter(|name| !desired.contains(name))
                    .cloned()
                    .collect(),
            },
            Operation::Install => {
                let (mark_explicit, install): (Vec<String>, Vec<String>) = diff
                    .to_install
                    .iter()
                    .cloned()
                    .partition(|name| actual.dependencies.contains(name));
                Step::Install {
                    install,
                    mark_explicit,
                }
            }
            Operation::New => Step::ReportNew {
                packages: diff.newly_explicit.iter().cloned().collect(),
            },
        })
        .collect();

    OperationPlan { diff, steps }
}
