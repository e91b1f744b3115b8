use crate::error::Result;

use super::remote::Remote;

/// Everything the sync logic needs from the version-control engine.
///
/// Queries never mutate. Mutations re-validate their own preconditions
/// (fast-forward, merged) at the moment they run, so a ref moved by another
/// process between planning and applying is refused rather than clobbered.
pub trait RefStore {
    /// Configured remotes in discovery order. Names may repeat when a
    /// backend reports fetch and push URLs separately.
    fn list_remotes(&self) -> Result<Vec<Remote>>;

    fn fetch_from_remote(&self, name: &str, prune: bool) -> Result<()>;

    /// Target of a symbolic ref, or the full ref name a revision such as
    /// `topic@{upstream}` resolves to. `None` when it does not resolve.
    fn resolve_symbolic_ref(&self, name: &str) -> Result<Option<String>>;

    /// Config entries matching a glob (`branch.*.remote`) as `"<key> <value>"` lines.
    fn config_values(&self, pattern: &str) -> Result<Vec<String>>;

    /// Local branch names, sorted.
    fn list_local_branches(&self) -> Result<Vec<String>>;

    fn ref_path_exists(&self, segments: &[&str]) -> bool;

    /// Resolves both revisions to commit ids.
    fn resolve_revision_pair(&self, a: &str, b: &str) -> Result<(String, String)>;

    /// True when `a` is reachable from `b` (including `a == b`).
    fn is_ancestor(&self, a: &str, b: &str) -> Result<bool>;

    /// Fast-forwards the checked-out branch and its working tree to `target`.
    fn fast_forward_merge(&self, target: &str) -> Result<()>;

    /// Moves a branch that is not checked out to `target`; fast-forward only.
    fn update_branch_ref(&self, branch: &str, target: &str) -> Result<()>;

    fn checkout_branch(&self, name: &str) -> Result<()>;

    /// Deletes a local branch, refusing unless its tip is an ancestor of `merged_into`.
    fn delete_branch(&self, name: &str, merged_into: &str) -> Result<()>;
}
