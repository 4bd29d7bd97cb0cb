//! The reconciliation run: snapshot, plan, apply, report.
use std::io::{self, Write as _};

use anyhow::Result;

use crate::apply::{
    AssumeYes, Confirm, ExecutionReport, MutationExecutor, StepOutcome, TerminalPrompt,
};
use crate::cli::Cli;
use crate::config::Env;
use crate::error::PipacError;
use crate::exec::SystemExecutor;
use crate::lists::PackageSet;
use crate::logging::{Log, Logger, StepStatus};
use crate::manager::{PackageManagerBackend, PacmanBackend, Snapshot};
use crate::reconcile::{self, Operation};

/// Run the requested operations against the real system.
///
/// Undeclared explicit packages (`--new`) are written to stdout, one per
/// line; everything else goes to the log.
///
/// # Errors
///
/// Returns an error if setup fails, the system cannot be queried, or a step
/// fails.
pub fn run(cli: &Cli, log: &Logger) -> Result<()> {
    let version = option_env!("PIPAC_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("pipac {version}"));

    let executor = SystemExecutor;
    let setup = super::CommandSetup::init(&Env::from_process(), &cli.overrides(), &executor, log)?;
    let backend = PacmanBackend::new(setup.manager, &executor);

    let confirm: &dyn Confirm = if setup.config.assume_yes {
        &AssumeYes
    } else {
        &TerminalPrompt
    };

    let report = reconcile_and_apply(
        &backend,
        &setup.desired,
        cli.operations(),
        confirm,
        log,
        setup.config.dry_run,
    )?;

    if let Some(packages) = &report.new_packages {
        let mut out = io::stdout().lock();
        for name in packages {
            writeln!(out, "{name}")?;
        }
    }

    finish(log)
}

/// Snapshot the system, build the plan, and execute it.
///
/// # Errors
///
/// Returns [`PipacError::Manager`] if any snapshot query fails, before
/// anything is changed; step failures are reported in the returned
/// [`ExecutionReport`] instead.
pub fn reconcile_and_apply(
    backend: &dyn PackageManagerBackend,
    desired: &PackageSet,
    operations: impl IntoIterator<Item = Operation>,
    confirm: &dyn Confirm,
    log: &dyn Log,
    dry_run: bool,
) -> Result<ExecutionReport, PipacError> {
    log.stage("Querying installed packages");
    let snapshot = Snapshot::fetch(backend)?;
    log.info(&format!(
        "{} explicit, {} dependencies, {} orphans",
        snapshot.explicit.len(),
        snapshot.dependencies.len(),
        snapshot.orphans.len()
    ));

    let plan = reconcile::reconcile(desired, &snapshot, operations);
    for line in plan.to_string().lines() {
        log.debug(line);
    }
    if plan.is_noop() {
        log.info("system already matches the package lists");
    }

    let report = MutationExecutor::new(backend, confirm, log)
        .dry_run(dry_run)
        .execute(&plan);

    for step in &report.steps {
        let (status, message) = match &step.outcome {
            StepOutcome::Applied => (StepStatus::Ok, None),
            StepOutcome::Skipped => (StepStatus::Skipped, Some("declined")),
            StepOutcome::Failed(reason) => (StepStatus::Failed, Some(reason.as_str())),
            StepOutcome::NotApplicable => (StepStatus::NotApplicable, None),
            StepOutcome::DryRun => (StepStatus::DryRun, None),
        };
        let name = format!("{} ({} package(s))", step.operation, step.packages.len());
        log.record_step(&name, status, message);
    }

    Ok(report)
}

/// Print the summary and fail if a step failed.
fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} step(s) failed; later steps were not run");
    }
    Ok(())
}
