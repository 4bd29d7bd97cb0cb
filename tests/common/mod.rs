// Shared helpers for integration tests.
//
// Provides an in-memory package database that behaves like pacman for the
// operations the engine uses, a scripted confirmation source, and a
// temporary directory of list files.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pipac::apply::Confirm;
use pipac::error::ManagerInvocationError;
use pipac::lists::{self, PackageSet};
use pipac::manager::{PackageManagerBackend, WriteOp};

/// Mutable state of the fake system.
#[derive(Debug, Default, Clone)]
pub struct SystemState {
    /// Installed packages and whether each is explicit.
    pub installed: BTreeMap<String, bool>,
    /// Dependencies each package pulls in when installed.
    pub requires: BTreeMap<String, Vec<String>>,
}

/// In-memory package manager.
///
/// Orphans are dependency packages that no installed package requires.
/// Like pacman, changing the install reason of or removing a package that
/// is not installed fails. Every write is recorded so tests can assert call
/// order.
#[derive(Debug, Default)]
pub struct FakeSystem {
    state: Mutex<SystemState>,
    calls: Mutex<Vec<(WriteOp, Vec<String>)>>,
    fail_on: Option<WriteOp>,
}

impl FakeSystem {
    /// Start with the given explicit packages and nothing else.
    pub fn with_explicit(names: &[&str]) -> Self {
        let system = Self::default();
        {
            let mut state = system.state.lock().unwrap();
            for name in names {
                state.installed.insert((*name).to_string(), true);
            }
        }
        system
    }

    /// Add a package installed as a dependency.
    pub fn with_dependency(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .installed
            .insert(name.to_string(), false);
        self
    }

    /// Declare that `name` requires `deps`.
    pub fn with_requires(self, name: &str, deps: &[&str]) -> Self {
        self.state.lock().unwrap().requires.insert(
            name.to_string(),
            deps.iter().map(|d| (*d).to_string()).collect(),
        );
        self
    }

    /// Make every call of `op` fail.
    pub fn failing(mut self, op: WriteOp) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Current explicit packages.
    pub fn explicit(&self) -> BTreeSet<String> {
        self.select(true)
    }

    /// Current dependency packages.
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.select(false)
    }

    /// Whether `name` is installed at all.
    pub fn is_installed(&self, name: &str) -> bool {
        self.state.lock().unwrap().installed.contains_key(name)
    }

    /// Recorded writes, in order.
    pub fn calls(&self) -> Vec<(WriteOp, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded writes.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn select(&self, explicit: bool) -> BTreeSet<String> {
        self.state
            .lock()
            .unwrap()
            .installed
            .iter()
            .filter(|(_, e)| **e == explicit)
            .map(|(n, _)| n.clone())
            .collect()
    }

    fn write(
        &self,
        op: WriteOp,
        names: &[String],
        apply: impl FnOnce(&mut SystemState),
    ) -> Result<(), ManagerInvocationError> {
        self.calls.lock().unwrap().push((op, names.to_vec()));
        let fail = |diagnostics: String| ManagerInvocationError {
            operation: op.into(),
            program: "fake".to_string(),
            code: Some(1),
            diagnostics,
        };
        if self.fail_on == Some(op) {
            return Err(fail("error: target not found".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        // pacman -D and -R only accept installed packages.
        if op != WriteOp::Install
            && let Some(missing) = names.iter().find(|n| !state.installed.contains_key(*n))
        {
            return Err(fail(format!("error: package '{missing}' was not found")));
        }
        apply(&mut *state);
        Ok(())
    }
}

impl PackageManagerBackend for FakeSystem {
    fn list_explicit(&self) -> Result<BTreeSet<String>, ManagerInvocationError> {
        Ok(self.explicit())
    }

    fn list_dependencies(&self) -> Result<BTreeSet<String>, ManagerInvocationError> {
        Ok(self.dependencies())
    }

    fn list_orphans(&self) -> Result<BTreeSet<String>, ManagerInvocationError> {
        let state = self.state.lock().unwrap();
        let required: BTreeSet<&String> = state
            .installed
            .keys()
            .filter_map(|n| state.requires.get(n))
            .flatten()
            .collect();
        Ok(state
            .installed
            .iter()
            .filter(|(n, explicit)| !**explicit && !required.contains(n))
            .map(|(n, _)| n.clone())
            .collect())
    }

    fn install(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::Install, names, |state| {
            for name in names {
                state.installed.insert(name.clone(), true);
                let deps = state.requires.get(name).cloned().unwrap_or_default();
                for dep in deps {
                    state.installed.entry(dep).or_insert(false);
                }
            }
        })
    }

    fn mark_as_dependency(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::MarkAsDependency, names, |state| {
            for name in names {
                state.installed.insert(name.clone(), false);
            }
        })
    }

    fn mark_as_explicit(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::MarkAsExplicit, names, |state| {
            for name in names {
                state.installed.insert(name.clone(), true);
            }
        })
    }

    fn remove(&self, names: &[String]) -> Result<(), ManagerInvocationError> {
        self.write(WriteOp::Remove, names, |state| {
            for name in names {
                state.installed.remove(name);
            }
        })
    }

    fn command_line(&self, op: WriteOp, names: &[String]) -> String {
        format!("fake {op:?} {}", names.join(" "))
    }
}

/// Confirmation source that replays fixed answers and records questions.
///
/// Once the answers run out every further question is declined.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    /// Replay `answers` in order.
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, question: &str) -> bool {
        self.asked.lock().unwrap().push(question.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// A temporary directory of list files.
pub struct ListDir {
    /// Backing directory, deleted on drop.
    pub dir: tempfile::TempDir,
}

impl ListDir {
    /// Empty directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Write `content` to `name` and return the path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write list file");
        path
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Load the given files as one desired set.
    pub fn load(&self, paths: &[PathBuf]) -> PackageSet {
        let loaded = lists::load_all(paths);
        assert!(loaded.errors.is_empty(), "unexpected errors: {:?}", loaded.errors);
        loaded.packages
    }
}
