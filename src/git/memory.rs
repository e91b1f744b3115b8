//! In-memory [`RefStore`] for exercising the sync logic without a repository.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{Error, Result};

use super::remote::Remote;
use super::store::RefStore;

#[derive(Default)]
pub struct MemoryStore {
    commits: RefCell<HashMap<String, Vec<String>>>,
    refs: RefCell<BTreeMap<String, String>>,
    symrefs: RefCell<HashMap<String, String>>,
    upstreams: RefCell<HashMap<String, String>>,
    config: RefCell<Vec<(String, String)>>,
    remotes: RefCell<Vec<Remote>>,
    ops: RefCell<Vec<String>>,
    pub fail_fetch: Cell<bool>,
    pub fail_checkout: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&self, id: &str, parents: &[&str]) {
        self.commits
            .borrow_mut()
            .insert(id.to_string(), parents.iter().map(|p| p.to_string()).collect());
    }

    pub fn set_ref(&self, name: &str, id: &str) {
        self.refs.borrow_mut().insert(name.to_string(), id.to_string());
    }

    pub fn remove_ref(&self, name: &str) {
        self.refs.borrow_mut().remove(name);
    }

    pub fn set_symref(&self, name: &str, target: &str) {
        self.symrefs.borrow_mut().insert(name.to_string(), target.to_string());
    }

    pub fn add_remote(&self, name: &str) {
        self.remotes.borrow_mut().push(Remote::new(name));
    }

    /// Writes `branch.<name>.remote` and records the upstream ref `@{upstream}` resolves to.
    pub fn track(&self, branch: &str, remote: &str, upstream: &str) {
        self.config
            .borrow_mut()
            .push((format!("branch.{}.remote", branch), remote.to_string()));
        self.upstreams
            .borrow_mut()
            .insert(branch.to_string(), upstream.to_string());
    }

    pub fn checkout(&self, branch: &str) {
        self.set_symref("HEAD", &format!("refs/heads/{}", branch));
    }

    pub fn tip(&self, name: &str) -> Option<String> {
        self.refs.borrow().get(name).cloned()
    }

    pub fn head_branch(&self) -> Option<String> {
        self.symrefs
            .borrow()
            .get("HEAD")
            .and_then(|t| t.strip_prefix("refs/heads/"))
            .map(str::to_string)
    }

    /// Mutations performed so far, e.g. `update refs/heads/a c3`.
    pub fn ops(&self) -> Vec<String> {
        self.ops.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter(|op| !op.starts_with("fetch "))
            .collect()
    }

    fn record(&self, op: String) {
        self.ops.borrow_mut().push(op);
    }

    fn resolve(&self, rev: &str) -> Option<String> {
        if self.commits.borrow().contains_key(rev) {
            return Some(rev.to_string());
        }
        if let Some(branch) = rev.strip_suffix("@{upstream}") {
            let upstream = self.upstreams.borrow().get(branch).cloned()?;
            return self.resolve(&upstream);
        }
        if let Some(target) = self.symrefs.borrow().get(rev).cloned() {
            return self.resolve(&target);
        }
        let refs = self.refs.borrow();
        refs.get(rev)
            .or_else(|| refs.get(&format!("refs/heads/{}", rev)))
            .or_else(|| refs.get(&format!("refs/remotes/{}", rev)))
            .cloned()
    }

    fn resolve_or_err(&self, rev: &str) -> Result<String> {
        self.resolve(rev)
            .ok_or_else(|| Error::UnknownRevision(rev.to_string()))
    }

    fn reachable(&self, from: &str, wanted: &str) -> bool {
        let commits = self.commits.borrow();
        let mut seen = HashSet::new();
        let mut stack = vec![from.to_string()];
        while let Some(id) = stack.pop() {
            if id == wanted {
                return true;
            }
            if seen.insert(id.clone()) {
                if let Some(parents) = commits.get(&id) {
                    stack.extend(parents.iter().cloned());
                }
            }
        }
        false
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            text.len() >= prefix.len() + suffix.len()
                && text.starts_with(prefix)
                && text.ends_with(suffix)
        }
        None => pattern == text,
    }
}

impl RefStore for MemoryStore {
    fn list_remotes(&self) -> Result<Vec<Remote>> {
        Ok(self.remotes.borrow().clone())
    }

    fn fetch_from_remote(&self, name: &str, prune: bool) -> Result<()> {
        self.record(format!("fetch {} prune={}", name, prune));
        if self.fail_fetch.get() {
            return Err(Error::Fetch {
                remote: name.to_string(),
                source: git2::Error::from_str("unable to access remote"),
            });
        }
        Ok(())
    }

    fn resolve_symbolic_ref(&self, name: &str) -> Result<Option<String>> {
        if let Some(target) = self.symrefs.borrow().get(name) {
            return Ok(Some(target.clone()));
        }
        if let Some(branch) = name.strip_suffix("@{upstream}") {
            let upstream = self.upstreams.borrow().get(branch).cloned();
            return Ok(upstream.filter(|u| self.refs.borrow().contains_key(u)));
        }
        Ok(self
            .refs
            .borrow()
            .contains_key(name)
            .then(|| name.to_string()))
    }

    fn config_values(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(self
            .config
            .borrow()
            .iter()
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, value)| format!("{} {}", key, value))
            .collect())
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        Ok(self
            .refs
            .borrow()
            .keys()
            .filter_map(|name| name.strip_prefix("refs/heads/"))
            .map(str::to_string)
            .collect())
    }

    fn ref_path_exists(&self, segments: &[&str]) -> bool {
        self.refs.borrow().contains_key(&segments.join("/"))
    }

    fn resolve_revision_pair(&self, a: &str, b: &str) -> Result<(String, String)> {
        Ok((self.resolve_or_err(a)?, self.resolve_or_err(b)?))
    }

    fn is_ancestor(&self, a: &str, b: &str) -> Result<bool> {
        let (a, b) = self.resolve_revision_pair(a, b)?;
        Ok(self.reachable(&b, &a))
    }

    fn fast_forward_merge(&self, target: &str) -> Result<()> {
        let branch = self
            .head_branch()
            .ok_or_else(|| Error::UnknownRevision("HEAD".to_string()))?;
        let full = format!("refs/heads/{}", branch);
        if !self.is_ancestor(&full, target)? {
            return Err(Error::NotFastForward {
                branch,
                target: target.to_string(),
            });
        }
        let id = self.resolve_or_err(target)?;
        self.set_ref(&full, &id);
        self.record(format!("merge {} {}", full, id));
        Ok(())
    }

    fn update_branch_ref(&self, branch: &str, target: &str) -> Result<()> {
        let full = format!("refs/heads/{}", branch);
        if !self.is_ancestor(&full, target)? {
            return Err(Error::NotFastForward {
                branch: branch.to_string(),
                target: target.to_string(),
            });
        }
        let id = self.resolve_or_err(target)?;
        self.set_ref(&full, &id);
        self.record(format!("update {} {}", full, id));
        Ok(())
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        let full = format!("refs/heads/{}", name);
        if self.fail_checkout.get() {
            return Err(Error::Git(git2::Error::from_str(
                "your local changes would be overwritten by checkout",
            )));
        }
        if !self.refs.borrow().contains_key(&full) {
            return Err(Error::NoSuchBranch(name.to_string()));
        }
        self.set_symref("HEAD", &full);
        self.record(format!("checkout {}", name));
        Ok(())
    }

    fn delete_branch(&self, name: &str, merged_into: &str) -> Result<()> {
        let full = format!("refs/heads/{}", name);
        if self.head_branch().as_deref() == Some(name) {
            return Err(Error::CheckedOut(name.to_string()));
        }
        if !self.is_ancestor(&full, merged_into)? {
            return Err(Error::NotMerged {
                branch: name.to_string(),
                target: merged_into.to_string(),
            });
        }
        self.remove_ref(&full);
        self.record(format!("delete {}", full));
        Ok(())
    }
}
