use std::cell::Cell;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    BranchType, Cred, CredentialType, FetchOptions, FetchPrune, Oid, RemoteCallbacks,
    Repository as Git2Repository,
};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};

use super::remote::Remote;
use super::store::RefStore;

const MAX_AUTH_ATTEMPTS: u8 = 3;
const DEFAULT_SSH_USER: &str = "git";

/// [`RefStore`] backed by libgit2.
pub struct Repository {
    repo: Git2Repository,
    path: PathBuf,
}

impl Repository {
    pub fn discover() -> Result<Self> {
        Self::discover_from(".")
    }

    pub fn discover_from<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();
        let repo = Git2Repository::discover(start).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => Error::NotARepository(start.display().to_string()),
            _ => Error::Git(e),
        })?;
        Ok(Self::wrap(repo))
    }

    #[cfg(test)]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repository::open(path.as_ref())?;
        Ok(Self::wrap(repo))
    }

    fn wrap(repo: Git2Repository) -> Self {
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!(path = %path.display(), "opened repository");
        Self { repo, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn peel(&self, rev: &str) -> Result<Oid> {
        let obj = self
            .repo
            .revparse_single(rev)
            .map_err(|_| Error::UnknownRevision(rev.to_string()))?;
        Ok(obj.peel_to_commit()?.id())
    }

    fn descends(&self, tip: Oid, ancestor: Oid) -> Result<bool> {
        Ok(tip == ancestor || self.repo.graph_descendant_of(tip, ancestor)?)
    }

    fn safe_checkout(&self, id: Oid) -> Result<()> {
        let commit = self.repo.find_commit(id)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
        Ok(())
    }

    /// Creates `name` from the single remote-tracking branch `<remote>/<name>`.
    fn create_from_remote(&self, name: &str) -> Result<()> {
        let mut candidates = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = branch?;
            if let Some(remote_name) = branch.name()? {
                if remote_name.split_once('/').map(|(_, short)| short) == Some(name) {
                    candidates.push(remote_name.to_string());
                }
            }
        }

        let [upstream] = candidates.as_slice() else {
            return Err(Error::NoSuchBranch(name.to_string()));
        };

        let commit = self
            .repo
            .revparse_single(&format!("refs/remotes/{}", upstream))?
            .peel_to_commit()?;
        let mut branch = self.repo.branch(name, &commit, false)?;
        branch.set_upstream(Some(upstream.as_str()))?;
        info!(branch = name, upstream = %upstream, "created local branch");
        Ok(())
    }
}

/// Picks a credential of a kind the transport accepts: ssh-agent, then the
/// configured credential helper, then the platform default.
fn credential_for(
    config: &git2::Config,
    url: &str,
    username: Option<&str>,
    allowed: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    // SSH URLs without a user ask for the name before any key.
    if allowed.contains(CredentialType::USERNAME) {
        return Cred::username(username.unwrap_or(DEFAULT_SSH_USER));
    }
    if allowed.contains(CredentialType::SSH_KEY) {
        if let Some(username) = username {
            return Cred::ssh_key_from_agent(username);
        }
    }
    if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
        return Cred::credential_helper(config, url, username);
    }
    if allowed.contains(CredentialType::DEFAULT) {
        return Cred::default();
    }
    Err(git2::Error::from_str("no supported credential type"))
}

fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '.' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push('$');
    regex
}

impl RefStore for Repository {
    fn list_remotes(&self) -> Result<Vec<Remote>> {
        let mut remotes = Vec::new();
        for name in self.repo.remotes()?.iter().flatten() {
            let remote = self.repo.find_remote(name)?;
            let push_url = remote.pushurl().or_else(|| remote.url());
            remotes.push(Remote::new(name).with_urls(remote.url(), push_url));
        }
        Ok(remotes)
    }

    fn fetch_from_remote(&self, name: &str, prune: bool) -> Result<()> {
        let mut remote = self.repo.find_remote(name)?;
        let config = self.repo.config()?;
        let attempts = Cell::new(0u8);

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|url, username, allowed| {
            attempts.set(attempts.get() + 1);
            if attempts.get() > MAX_AUTH_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }
            credential_for(&config, url, username, allowed)
        });
        callbacks.transfer_progress(|stats| {
            trace!(
                received = stats.received_objects(),
                total = stats.total_objects(),
                "fetch progress"
            );
            true
        });

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        if prune {
            options.prune(FetchPrune::On);
        }

        info!(remote = name, prune, "fetching");
        remote
            .fetch(&[] as &[&str], Some(&mut options), None)
            .map_err(|source| Error::Fetch {
                remote: name.to_string(),
                source,
            })
    }

    fn resolve_symbolic_ref(&self, name: &str) -> Result<Option<String>> {
        if let Ok(reference) = self.repo.find_reference(name) {
            if let Some(target) = reference.symbolic_target() {
                return Ok(Some(target.to_string()));
            }
            return Ok(reference.name().map(str::to_string));
        }

        match self.repo.revparse_ext(name) {
            Ok((_, reference)) => Ok(reference.and_then(|r| r.name().map(str::to_string))),
            Err(e) => {
                debug!(rev = name, error = %e, "symbolic ref does not resolve");
                Ok(None)
            }
        }
    }

    fn config_values(&self, pattern: &str) -> Result<Vec<String>> {
        let config = self.repo.config()?;
        let mut lines = Vec::new();
        let mut entries = config.entries(Some(&glob_to_regex(pattern)))?;
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let (Some(key), Some(value)) = (entry.name(), entry.value()) {
                lines.push(format!("{} {}", key, value));
            }
        }
        Ok(lines)
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn ref_path_exists(&self, segments: &[&str]) -> bool {
        self.repo.find_reference(&segments.join("/")).is_ok()
    }

    fn resolve_revision_pair(&self, a: &str, b: &str) -> Result<(String, String)> {
        Ok((self.peel(a)?.to_string(), self.peel(b)?.to_string()))
    }

    fn is_ancestor(&self, a: &str, b: &str) -> Result<bool> {
        let (a, b) = (self.peel(a)?, self.peel(b)?);
        self.descends(b, a)
    }

    fn fast_forward_merge(&self, target: &str) -> Result<()> {
        let head = self.repo.head()?;
        let (Some(head_name), true) = (head.name().map(str::to_string), head.is_branch()) else {
            return Err(Error::UnknownRevision("HEAD".to_string()));
        };
        let current = head.peel_to_commit()?.id();
        let target_id = self.peel(target)?;

        if current == target_id {
            return Ok(());
        }
        if !self.descends(target_id, current)? {
            return Err(Error::NotFastForward {
                branch: head.shorthand().unwrap_or(&head_name).to_string(),
                target: target.to_string(),
            });
        }

        // Working tree first: a refused checkout must leave the branch where it was.
        self.safe_checkout(target_id)?;
        self.repo.reference_matching(
            &head_name,
            target_id,
            true,
            current,
            &format!("sync: fast-forward to {}", target),
        )?;
        debug!(branch = %head_name, %target_id, "fast-forwarded checked out branch");
        Ok(())
    }

    fn update_branch_ref(&self, branch: &str, target: &str) -> Result<()> {
        if self.repo.find_branch(branch, BranchType::Local)?.is_head() {
            return Err(Error::CheckedOut(branch.to_string()));
        }

        let full = format!("refs/heads/{}", branch);
        let current = self.peel(&full)?;
        let target_id = self.peel(target)?;

        if current == target_id {
            return Ok(());
        }
        if !self.descends(target_id, current)? {
            return Err(Error::NotFastForward {
                branch: branch.to_string(),
                target: target.to_string(),
            });
        }

        self.repo.reference_matching(
            &full,
            target_id,
            true,
            current,
            &format!("sync: fast-forward to {}", target),
        )?;
        debug!(branch, %target_id, "updated branch ref");
        Ok(())
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        let full = format!("refs/heads/{}", name);
        if self.repo.find_reference(&full).is_err() {
            self.create_from_remote(name)?;
        }

        self.safe_checkout(self.peel(&full)?)?;
        self.repo.set_head(&full)?;
        info!(branch = name, "checked out");
        Ok(())
    }

    fn delete_branch(&self, name: &str, merged_into: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(name, BranchType::Local)?;
        if branch.is_head() {
            return Err(Error::CheckedOut(name.to_string()));
        }

        let tip = branch.get().peel_to_commit()?.id();
        let target = self.peel(merged_into)?;
        if !self.descends(target, tip)? {
            return Err(Error::NotMerged {
                branch: name.to_string(),
                target: merged_into.to_string(),
            });
        }

        branch.delete()?;
        debug!(branch = name, %tip, "deleted branch");
        Ok(())
    }
}
