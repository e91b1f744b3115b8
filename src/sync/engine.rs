use serde::Serialize;
use tracing::{debug, warn};

use crate::git::{short_id, RefStore};

use super::classify::{Decision, DeleteReason, Plan};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Updated { old_tip: String },
    Deleted { old_tip: String, reason: DeleteReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    /// Local commits are not on the remote.
    Unpushed,
    /// Deleted on `remote` while holding commits outside `default_branch`.
    Unmerged { remote: String, default_branch: String },
    /// The store refused or failed the mutation.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Applied(Action),
    Skipped,
    Warned(Warning),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchOutcome {
    pub branch: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// What the engine may change while it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// `None` while HEAD is detached.
    pub current: Option<String>,
}

pub struct Engine<'a, S: RefStore + ?Sized> {
    store: &'a S,
    remote: &'a str,
    default_branch: &'a str,
    default_ref: &'a str,
    state: RunState,
}

impl<'a, S: RefStore + ?Sized> Engine<'a, S> {
    pub fn new(
        store: &'a S,
        remote: &'a str,
        default_branch: &'a str,
        default_ref: &'a str,
        current: Option<String>,
    ) -> Self {
        Self {
            store,
            remote,
            default_branch,
            default_ref,
            state: RunState { current },
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Applies every plan in order. A failing branch never stops the others.
    pub fn apply_all(&mut self, plans: &[Plan]) -> Vec<BranchOutcome> {
        plans
            .iter()
            .map(|plan| BranchOutcome {
                branch: plan.branch.name.clone(),
                outcome: self.apply(plan),
            })
            .collect()
    }

    pub fn apply(&mut self, plan: &Plan) -> Outcome {
        let name = plan.branch.name.as_str();
        let old_tip = plan.old_tip.as_deref().map(short_id).unwrap_or_default().to_string();

        match &plan.decision {
            Decision::NoOp => Outcome::Skipped,
            Decision::FastForward(target) => {
                let result = if self.is_current(name) {
                    self.store.fast_forward_merge(target)
                } else {
                    self.store.update_branch_ref(name, target)
                };
                match result {
                    Ok(()) => {
                        debug!(branch = name, %target, "fast-forwarded");
                        Outcome::Applied(Action::Updated { old_tip })
                    }
                    Err(e) => failed(name, e.to_string()),
                }
            }
            Decision::Delete(reason) => {
                if self.is_current(name) {
                    if let Err(e) = self.store.checkout_branch(self.default_branch) {
                        return failed(
                            name,
                            format!("could not switch to '{}': {}", self.default_branch, e),
                        );
                    }
                    self.state.current = Some(self.default_branch.to_string());
                }
                match self.store.delete_branch(name, self.default_ref) {
                    Ok(()) => {
                        debug!(branch = name, %reason, "deleted");
                        Outcome::Applied(Action::Deleted {
                            old_tip,
                            reason: *reason,
                        })
                    }
                    Err(e) => failed(name, e.to_string()),
                }
            }
            Decision::WarnDiverged => Outcome::Warned(Warning::Unpushed),
            Decision::WarnUnmerged => Outcome::Warned(Warning::Unmerged {
                remote: self.remote.to_string(),
                default_branch: self.default_branch.to_string(),
            }),
        }
    }

    fn is_current(&self, name: &str) -> bool {
        self.state.current.as_deref() == Some(name)
    }
}

fn failed(branch: &str, message: String) -> Outcome {
    warn!(branch, error = %message, "branch left untouched");
    Outcome::Warned(Warning::Failed { message })
}
