use tracing::debug;

use crate::error::{Error, Result};
use crate::git::Remote;

/// Collapses repeated entries for one remote, keeping the first URL seen of each kind.
pub fn dedup_remotes(remotes: &[Remote]) -> Vec<Remote> {
    let mut unique: Vec<Remote> = Vec::new();
    for remote in remotes {
        match unique.iter_mut().find(|r| r.name == remote.name) {
            Some(existing) => {
                if existing.fetch_url.is_none() {
                    existing.fetch_url = remote.fetch_url.clone();
                }
                if existing.push_url.is_none() {
                    existing.push_url = remote.push_url.clone();
                }
            }
            None => unique.push(remote.clone()),
        }
    }
    unique
}

/// Picks the remote branches are reconciled against: the first name in
/// `priority` that is configured, otherwise the first remote discovered.
pub fn select_main_remote(remotes: &[Remote], priority: &[String]) -> Result<Remote> {
    let remotes = dedup_remotes(remotes);

    let chosen = priority
        .iter()
        .find_map(|preferred| remotes.iter().find(|r| &r.name == preferred))
        .or_else(|| remotes.first())
        .cloned()
        .ok_or(Error::NoRemotesConfigured)?;

    debug!(remote = %chosen.name, candidates = remotes.len(), "selected main remote");
    Ok(chosen)
}
