//! Backend for pacman and pacman-compatible AUR helpers (paru, yay).
use std::collections::BTreeSet;

use super::{ManagerKind, PackageManagerBackend, WriteOp};
use crate::error::{ManagerInvocationError, ManagerOperation};
use crate::exec::{ExecResult, Executor};

/// Queries always go to pacman itself; they need no privileges and the AUR
/// helpers only forward them.
const QUERY_PROGRAM: &str = "pacman";

/// [`PackageManagerBackend`] that shells out to a pacman-family binary.
///
/// Writes through plain pacman are prefixed with `sudo`; paru and yay
/// escalate on their own.
#[derive(Debug)]
pub struct PacmanBackend<'a> {
    kind: ManagerKind,
    executor: &'a dyn Executor,
}

impl<'a> PacmanBackend<'a> {
    /// Create a backend for `kind` running commands through `executor`.
    #[must_use]
    pub const fn new(kind: ManagerKind, executor: &'a dyn Executor) -> Self {
        Self { kind, executor }
    }

    /// Program and full argument list for a write operation.
    fn write_command<'n>(&self, op: WriteOp, names: &'n [String]) -> (&'static str, Vec<&'n str>) {
        let flags: &[&'static str] = match op {
            WriteOp::Install => &["-S", "--needed", "--noconfirm"],
            WriteOp::MarkAsDependency => &["-D", "--asdeps"],
            WriteOp::MarkAsExplicit => &["-D", "--asexplicit"],
            WriteOp::Remove => &["-Rns", "--noconfirm"],
        };

        let mut args: Vec<&str> = Vec::with_capacity(flags.len() + names.len() + 1);
        let program = match self.kind {
            ManagerKind::Pacman => {
                args.push("pacman");
                "sudo"
            }
            ManagerKind::Paru | ManagerKind::Yay => self.kind.program(),
        };
        args.extend_from_slice(flags);
        args.extend(names.iter().map(String::as_str));
        (program, args)
    }

    fn invoke(
        &self,
        operation: ManagerOperation,
        program: &str,
        args: &[&str],
    ) -> Result<ExecResult, ManagerInvocationError> {
        self.executor
            .run_unchecked(program, args)
            .map_err(|e| ManagerInvocationError {
                operation,
                program: program.to_string(),
                code: None,
                diagnostics: format!("{e:#}"),
            })
    }

    fn write(&self, op: WriteOp, names: &[String]) -> Result<(), ManagerInvocationError> {
        let operation = ManagerOperation::from(op);
        let (program, args) = self.write_command(op, names);
        let result = self.invoke(operation, program, &args)?;
        if !result.success {
            return Err(ManagerInvocationError {
                operation,
                program: program.to_string(),
                code: result.code,
                diagnostics: result.diagnostics(),
            });
        }
        if !result.stdout.trim().is_empty() {
            tracing::debug!("{}", result.stdout.trim_end());
        }
        Ok(())
    }

    /// Run a `pacman -Q…` query and collect the first column of each line.
    ///
    /// pacman exits 1 with no output when a filtered query matches nothing
    /// (for example `-Qdt` on a system without orphans); that is an empty
    /// result, not a failure.
    fn query(
        &self,
        operation: ManagerOperation,
        flags: &str,
    ) -> Result<BTreeSet<String>, ManagerInvocationError> {
        let result = self.invoke(operation, QUERY_PROGRAM, &[flags])?;
        let nothing_matched = result.code == Some(1)
            && result.stdout.trim().is_empty()
            && result.stderr.trim().is_empty();
        if nothing_matched {
            return Ok(BTreeSet::new());
        }
        if !result.success {
            return Err(ManagerInvocationError {
                operation,
                program: QUERY_PROGRAM.to_string(),
                code: result.code,
                diagnostics: result.diagnostics(),
            });
        }
        Ok(result
            .stdout
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect())
    }
}

impl PackageManagerBackend for PacmanBackend<'_> {
    fn list_explicit(&self) -> Result<BTreeSet<String>, ManagerInvocationError> {
        self.query(ManagerOperation::ListExplicit, "-Qqe")
    }

    fn list_dependencies(&self) -> Result<BTreeSet<String>, ManagerInvocationError> {
        self.query(ManagerOperation::ListDependencies, "-Qqd")
    }

    fn list_orphans(&self) -> Result<BTreeSet<String>, ManagerInvocationError> {
        self.query(ManagerOperation::ListOrphans, "-Qqdt")
    }

    fn install(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::Install, names)
    }

    fn mark_as_dependency(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::MarkAsDependency, names)
    }

    fn mark_as_explicit(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::MarkAsExplicit, names)
    }

    fn remove(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::Remove, names)
    }

    fn command_line(&self, op: WriteOp, names: &[String]) -> String {
        let (program, args) = self.write_command(op, names);
        format!("{program} {}", args.join(" "))
    }
}
