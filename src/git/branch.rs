#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Full ref path, e.g. `refs/heads/feature/login`.
    pub fn full_ref(&self) -> String {
        format!("refs/heads/{}", self.name)
    }
}

/// How a local branch relates to the main remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamLink {
    /// Configured to track the main remote and the upstream ref resolves.
    TrackedOnMainRemote(String),
    /// Configured to track the main remote but the upstream was deleted there.
    Gone,
    /// Follows another remote, or nothing we can pair it with.
    TracksOtherRemote,
    /// No matching tracking config, but the main remote has a same-named ref.
    UntrackedButMirrored(String),
}

/// Strips `refs/heads/` or `refs/remotes/<remote>/` (any `refs/<kind>/`) from a ref.
pub fn short_name(reference: &str) -> &str {
    let Some(rest) = reference.strip_prefix("refs/") else {
        return reference;
    };
    let rest = rest.strip_prefix("remotes/").unwrap_or(rest);
    match rest.split_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => reference,
    }
}

pub fn remote_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{}/{}", remote, branch)
}
