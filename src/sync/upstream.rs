use std::collections::HashMap;

use tracing::trace;

use crate::git::{remote_ref, RefStore, UpstreamLink};

/// Parses `branch.<name>.remote <remote>` lines into a branch → remote map.
pub fn tracking_remotes(lines: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in lines {
        let Some((key, remote)) = line.split_once(' ') else {
            continue;
        };
        let branch = key
            .strip_prefix("branch.")
            .and_then(|rest| rest.strip_suffix(".remote"));
        match branch {
            Some(branch) if !branch.is_empty() && !remote.trim().is_empty() => {
                map.insert(branch.to_string(), remote.trim().to_string());
            }
            _ => trace!(line = %line, "ignoring config line"),
        }
    }
    map
}

pub fn resolve_upstream<S: RefStore + ?Sized>(
    store: &S,
    branch: &str,
    main_remote: &str,
    tracking: &HashMap<String, String>,
) -> UpstreamLink {
    if tracking.get(branch).map(String::as_str) == Some(main_remote) {
        return match store.resolve_symbolic_ref(&format!("{}@{{upstream}}", branch)) {
            Ok(Some(upstream)) => UpstreamLink::TrackedOnMainRemote(upstream),
            Ok(None) => UpstreamLink::Gone,
            Err(e) => {
                trace!(branch, error = %e, "upstream lookup failed");
                UpstreamLink::Gone
            }
        };
    }

    let mirror = remote_ref(main_remote, branch);
    let segments: Vec<&str> = mirror.split('/').collect();
    if store.ref_path_exists(&segments) {
        UpstreamLink::UntrackedButMirrored(mirror)
    } else {
        UpstreamLink::TracksOtherRemote
    }
}
