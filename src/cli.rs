//! Command-line interface.
use std::path::PathBuf;

use clap::Parser;

use crate::config::Overrides;
use crate::manager::ManagerKind;
use crate::reconcile::Operation;

/// Declarative package reconciliation for pacman-based systems.
///
/// Reads package lists and brings the set of explicitly installed packages
/// in line with them. Without an action flag, prints this help.
#[derive(Parser, Debug)]
#[command(name = "pipac", version)]
pub struct Cli {
    /// Package list files; replaces the lists discovered in the config dir
    #[arg(value_name = "PACKAGE_LIST")]
    pub lists: Vec<PathBuf>,

    /// Mark explicit packages that are in no list as dependencies
    #[arg(short, long)]
    pub prune: bool,

    /// Remove orphaned dependency packages
    #[arg(short, long)]
    pub orphans: bool,

    /// Install listed packages that are not explicitly installed
    #[arg(short, long)]
    pub install: bool,

    /// Print explicit packages that are in no list
    #[arg(short, long)]
    pub new: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Show the commands that would run without running them
    #[arg(short, long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Package manager to use instead of auto-detection
    #[arg(long, value_name = "pacman|paru|yay")]
    pub manager: Option<ManagerKind>,

    /// Directory holding package lists and config.toml
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Cli {
    /// Requested operations, in flag order.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        [
            (self.prune, Operation::Prune),
            (self.orphans, Operation::Orphans),
            (self.install, Operation::Install),
            (self.new, Operation::New),
        ]
        .into_iter()
        .filter_map(|(set, op)| set.then_some(op))
        .collect()
    }

    /// Whether at least one action flag was given.
    #[must_use]
    pub fn any_action(&self) -> bool {
        self.prune || self.orphans || self.install || self.new
    }

    /// Configuration overrides carried by the command line.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            lists: self.lists.clone(),
            config_dir: self.config_dir.clone(),
            manager: self.manager,
            assume_yes: self.yes,
            dry_run: self.dry_run,
        }
    }
}
