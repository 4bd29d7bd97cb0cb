//! Mutation executor: applies an [`OperationPlan`] through a backend.
//!
//! Steps run strictly one after another in plan order. Destructive steps
//! (prune, orphans) move through
//! `Pending -> AwaitingConfirmation -> Confirmed -> Applied` or
//! `... -> Declined -> Skipped`; a declined step does not affect the others.
//! Install is not gated. The first backend failure marks its step `Failed`
//! and no later step is attempted.
use std::io::{self, BufRead as _, Write as _};

use crate::error::ManagerInvocationError;
use crate::logging::Log;
use crate::manager::{PackageManagerBackend, WriteOp};
use crate::reconcile::{Operation, OperationPlan, Step};

/// Synchronous yes/no question to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    /// Ask `question`; `true` means go ahead.
    fn confirm(&self, question: &str) -> bool;
}

/// Interactive prompt on the terminal: question on stderr, answer on stdin.
///
/// Anything but `y` or `yes` (case-insensitive) declines, including EOF and
/// read errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&self, question: &str) -> bool {
        let mut stderr = io::stderr().lock();
        if write!(stderr, "{question} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Terminal state of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The backend call(s) succeeded.
    Applied,
    /// The user declined the confirmation.
    Skipped,
    /// The backend failed; carries the reason.
    Failed(String),
    /// Nothing to do; the backend was not called.
    NotApplicable,
    /// Dry run: the command was logged, not run.
    DryRun,
}

/// Outcome of one step, with the packages it covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Which operation this was.
    pub operation: Operation,
    /// How it ended.
    pub outcome: StepOutcome,
    /// Packages the step covered.
    pub packages: Vec<String>,
}

/// Result of executing a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Steps that were attempted, in order.
    pub steps: Vec<StepReport>,
    /// Undeclared explicit packages, present when `New` was requested and
    /// reached.
    pub new_packages: Option<Vec<String>>,
}

impl ExecutionReport {
    /// The failed step, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }

    /// Whether every attempted step ended without failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    /// Outcome of `operation`, if it was attempted.
    #[must_use]
    pub fn outcome(&self, operation: Operation) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|s| s.operation == operation)
            .map(|s| &s.outcome)
    }
}

/// Applies plans against a backend.
pub struct MutationExecutor<'a> {
    backend: &'a dyn PackageManagerBackend,
    confirm: &'a dyn Confirm,
    log: &'a dyn Log,
    dry_run: bool,
}

impl std::fmt::Debug for MutationExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationExecutor")
            .field("backend", &self.backend)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> MutationExecutor<'a> {
    /// Create an executor.
    #[must_use]
    pub fn new(
        backend: &'a dyn PackageManagerBackend,
        confirm: &'a dyn Confirm,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            backend,
            confirm,
            log,
            dry_run: false,
        }
    }

    /// Log commands instead of running them; no confirmation is asked.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run every step of `plan` in order.
    #[must_use]
    pub fn execute(&self, plan: &OperationPlan) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for step in plan.steps() {
            let operation = step.operation();
            self.log.stage(&format!("Step {}: {operation}", operation.order()));

            let outcome = self.run_step(step);
            if let Step::ReportNew { packages } = step {
                report.new_packages = Some(packages.clone());
            }
            let halted = matches!(outcome, StepOutcome::Failed(_));
            report.steps.push(StepReport {
                operation,
                outcome,
                packages: step.packages().into_iter().map(str::to_string).collect(),
            });

            if halted {
                self.log
                    .error(&format!("{operation} failed; remaining steps not attempted"));
                break;
            }
        }

        report
    }

    fn run_step(&self, step: &Step) -> StepOutcome {
        match step {
            Step::Prune { packages } => self.destructive(
                WriteOp::MarkAsDependency,
                packages,
                &format!(
                    "Mark {} package(s) as dependencies: {}. Proceed?",
                    packages.len(),
                    packages.join(", ")
                ),
            ),
            Step::Orphans { packages } => self.destructive(
                WriteOp::Remove,
                packages,
                &format!(
                    "Remove {} orphaned package(s): {}. Proceed?",
                    packages.len(),
                    packages.join(", ")
                ),
            ),
            Step::Install {
                install,
                mark_explicit,
            } => self.install(install, mark_explicit),
            Step::ReportNew { packages } => {
                self.log.info(&format!(
                    "{} explicit package(s) not in any list",
                    packages.len()
                ));
                StepOutcome::Applied
            }
        }
    }

    fn destructive(&self, op: WriteOp, names: &[String], question: &str) -> StepOutcome {
        if names.is_empty() {
            self.log.info("nothing to do");
            return StepOutcome::NotApplicable;
        }

        let command = self.backend.command_line(op, names);
        if self.dry_run {
            self.log.dry_run(&command);
            return StepOutcome::DryRun;
        }

        self.log.info(&format!("about to execute: {command}"));
        if !self.confirm.confirm(question) {
            self.log.info("declined, skipping");
            return StepOutcome::Skipped;
        }

        match self.write(op, names) {
            Ok(()) => StepOutcome::Applied,
            Err(e) => self.failed(&e),
        }
    }

    fn install(&self, install: &[String], mark_explicit: &[String]) -> StepOutcome {
        if install.is_empty() && mark_explicit.is_empty() {
            self.log.info("nothing to do");
            return StepOutcome::NotApplicable;
        }

        for (op, names, what) in [
            (
                WriteOp::MarkAsExplicit,
                mark_explicit,
                "fixing install reason to explicit",
            ),
            (WriteOp::Install, install, "installing"),
        ] {
            if names.is_empty() {
                continue;
            }
            if self.dry_run {
                self.log.dry_run(&self.backend.command_line(op, names));
                continue;
            }
            self.log.info(&format!("{what}: {}", names.join(", ")));
            if let Err(e) = self.write(op, names) {
                return self.failed(&e);
            }
        }

        if self.dry_run {
            StepOutcome::DryRun
        } else {
            StepOutcome::Applied
        }
    }

    fn write(&self, op: WriteOp, names: &[String]) -> Result<(), ManagerInvocationError> {
        match op {
            WriteOp::Install => self.backend.install(names),
            WriteOp::MarkAsDependency => self.backend.mark_as_dependency(names),
            WriteOp::MarkAsExplicit => self.backend.mark_as_explicit(names),
            WriteOp::Remove => self.backend.remove(names),
        }
    }

    fn failed(&self, e: &ManagerInvocationError) -> StepOutcome {
        let reason = e.to_string();
        self.log.error(&reason);
        StepOutcome::Failed(reason)
    }
}
