//! Declarative package reconciliation for pacman-based systems.
//!
//! Package lists name the software that should be explicitly installed.
//! Each run compares them with what the package manager reports and applies
//! the requested operations in a fixed order: prune, orphans, install, new.
//!
//! - **[`lists`]**: parse list files into a [`lists::PackageSet`]
//! - **[`manager`]**: query and mutate the system through a backend
//! - **[`reconcile`]**: compute diffs and the ordered operation plan
//! - **[`apply`]**: execute a plan with confirmation gating
//! - **[`commands`]**: wire configuration, lists, and backend together
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod lists;
pub mod logging;
pub mod manager;
pub mod reconcile;
