//! Branch reconciliation against the main remote.
//!
//! A run selects the main remote, fetches it, works out how each local branch
//! relates to it and then applies one decision per branch:
//!
//! - behind its upstream: fast-forwarded
//! - upstream deleted and merged into the default branch: deleted
//! - diverged, or deleted upstream with unmerged work: left alone with a warning
//!
//! Classification is pure; only [`engine::Engine`] mutates the repository.

pub mod classify;
pub mod engine;
pub mod remote;
pub mod report;
pub mod upstream;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::git::{remote_ref, short_name, Branch, Range, RefStore};

use classify::{classify, Plan};
use engine::{BranchOutcome, Engine};
use remote::select_main_remote;
use upstream::{resolve_upstream, tracking_remotes};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub remote: String,
    pub default_branch: String,
    pub branches: Vec<BranchOutcome>,
}

pub fn run<S: RefStore + ?Sized>(store: &S, config: &Config) -> Result<RunReport> {
    let remote = select_main_remote(&store.list_remotes()?, &config.remote_priority)?;
    let default_branch = default_branch(store, &remote.name, &config.default_branch)?;
    let default_ref = remote_ref(&remote.name, &default_branch);
    let current = current_branch(store)?;
    info!(
        remote = %remote.name,
        default = %default_branch,
        current = current.as_deref().unwrap_or("(detached)"),
        "starting sync"
    );

    store.fetch_from_remote(&remote.name, config.prune)?;

    let tracking = tracking_remotes(&store.config_values("branch.*.remote")?);
    let plans = store
        .list_local_branches()?
        .into_iter()
        .map(|name| {
            let link = resolve_upstream(store, &name, &remote.name, &tracking);
            classify(&Branch::new(name), &link, &default_ref, |a: &str, b: &str| {
                Range::new(store, a, b)
            })
        })
        .collect::<Result<Vec<Plan>>>()?;

    let mut engine = Engine::new(store, &remote.name, &default_branch, &default_ref, current);
    let branches = engine.apply_all(&plans);
    info!(
        current = engine.state().current.as_deref().unwrap_or("(detached)"),
        branches = branches.len(),
        "sync finished"
    );

    Ok(RunReport {
        remote: remote.name,
        default_branch,
        branches,
    })
}

/// The branch `refs/remotes/<remote>/HEAD` points at, else `fallback`.
fn default_branch<S: RefStore + ?Sized>(store: &S, remote: &str, fallback: &str) -> Result<String> {
    let head = format!("refs/remotes/{}/HEAD", remote);
    let target = store
        .resolve_symbolic_ref(&head)?
        .filter(|target| target != &head);

    Ok(match target {
        Some(target) => short_name(&target).to_string(),
        None => fallback.to_string(),
    })
}

/// `None` when HEAD is detached.
fn current_branch<S: RefStore + ?Sized>(store: &S) -> Result<Option<String>> {
    Ok(store
        .resolve_symbolic_ref("HEAD")?
        .and_then(|head| head.strip_prefix("refs/heads/").map(str::to_string)))
}
