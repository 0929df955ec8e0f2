//! Mapping from CI event metadata to the app name a run operates on.

/// CI events the action reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind { Push, PullRequest }

impl EventKind {
    /// `None` for events the action ignores.
    pub fn parse(event_name: &str) -> Option<Self> {
        match event_name {
            "push" => Some(Self::Push),
            "pull_request" => Some(Self::PullRequest),
            _ => None,
        }
    }
}

pub const SHA_SUFFIX_LEN: usize = 8;

/// App name for `event`, before normalization.
///
/// Pull requests get their own preview app suffixed with the short commit hash;
/// pushes reuse the base name.
pub fn raw_app_name(base_name: &str, event: EventKind, sha: &str) -> String {
    match event {
        EventKind::Push => base_name.to_string(),
        EventKind::PullRequest => format!("{base_name}/{}", short_sha(sha)),
    }
}

pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHA_SUFFIX_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Makes a name usable as an app identifier: `:` and `/` each become one `-`.
pub fn normalize(name: &str) -> String {
    name.replace(':', "/").replace('/', "-")
}

/// Full derivation: explicit base name if non-empty, else the repository.
/// Returns `None` when the event is not one the action handles.
pub fn target_app_name(explicit: Option<&str>, repository: &str, event_name: &str, sha: &str) -> Option<String> {
    let event = EventKind::parse(event_name)?;
    let base = explicit.filter(|s| !s.is_empty()).unwrap_or(repository);
    Some(normalize(&raw_app_name(base, event, sha)))
}
