use crate::error::Result;

use super::store::RefStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestryFact {
    Identical,
    /// `b` is strictly ahead of `a`.
    AIsAncestorOfB,
    Diverged,
}

/// Two resolved commits: `a` the local tip, `b` the candidate new tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub a: String,
    pub b: String,
    pub fact: AncestryFact,
}

impl Range {
    pub fn new<S: RefStore + ?Sized>(store: &S, a: &str, b: &str) -> Result<Self> {
        let (a, b) = store.resolve_revision_pair(a, b)?;

        let fact = if a.eq_ignore_ascii_case(&b) {
            AncestryFact::Identical
        } else if store.is_ancestor(&a, &b)? {
            AncestryFact::AIsAncestorOfB
        } else {
            AncestryFact::Diverged
        };

        Ok(Self { a, b, fact })
    }
}

/// Abbreviates a commit id to seven characters.
pub fn short_id(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}
