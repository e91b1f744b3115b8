use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::git::{AncestryFact, Branch, Range, UpstreamLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    MergedIntoDefault,
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteReason::MergedIntoDefault => write!(f, "merged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    NoOp,
    /// Move the branch to this ref; it is strictly ahead of the local tip.
    FastForward(String),
    Delete(DeleteReason),
    /// Local commits missing from the upstream.
    WarnDiverged,
    /// Upstream is gone but the branch has commits outside the default branch.
    WarnUnmerged,
}

/// A branch paired with what should happen to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub branch: Branch,
    pub decision: Decision,
    /// Local tip when the decision was made, if ancestry was consulted.
    pub old_tip: Option<String>,
}

/// Decides what to do with one branch. `ancestry(a, b)` compares two revisions;
/// nothing else about the run (ordering, other branches, HEAD) is consulted.
pub fn classify<F>(
    branch: &Branch,
    link: &UpstreamLink,
    default_ref: &str,
    mut ancestry: F,
) -> Result<Plan>
where
    F: FnMut(&str, &str) -> Result<Range>,
{
    let local = branch.full_ref();

    let (decision, range) = match link {
        UpstreamLink::TrackedOnMainRemote(upstream)
        | UpstreamLink::UntrackedButMirrored(upstream) => {
            let range = ancestry(&local, upstream)?;
            let decision = match range.fact {
                AncestryFact::Identical => Decision::NoOp,
                AncestryFact::AIsAncestorOfB => Decision::FastForward(upstream.clone()),
                AncestryFact::Diverged => Decision::WarnDiverged,
            };
            (decision, Some(range))
        }
        UpstreamLink::Gone => {
            let range = ancestry(&local, default_ref).map_err(|e| match e {
                Error::UnknownRevision(rev) if rev == default_ref => {
                    Error::DefaultBranchUnresolved(default_ref.to_string())
                }
                other => other,
            })?;
            let decision = match range.fact {
                AncestryFact::Identical | AncestryFact::AIsAncestorOfB => {
                    Decision::Delete(DeleteReason::MergedIntoDefault)
                }
                AncestryFact::Diverged => Decision::WarnUnmerged,
            };
            (decision, Some(range))
        }
        UpstreamLink::TracksOtherRemote => (Decision::NoOp, None),
    };

    Ok(Plan {
        branch: branch.clone(),
        decision,
        old_tip: range.map(|r| r.a),
    })
}
