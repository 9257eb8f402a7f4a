//! Candidate backend registry.
//!
//! Option strings look like `"native"`, `"native,gtk"` or
//! `"opengl:native,gtk"`. Everything before the first colon is a group
//! selector and is ignored.

use serde::{Deserialize, Serialize};

/// Candidates tried when the option string is empty.
pub const DEFAULT_BACKENDS: &[&str] = &["native"];

/// Every backend kind the built-in table can load.
pub const KNOWN_BACKENDS: &[&str] = &["native", "gtk"];

/// Group keywords and the lists they expand to.
pub const GROUP_KEYWORDS: &[(&str, &[&str])] = &[
    ("auto", DEFAULT_BACKENDS),
    ("yes", DEFAULT_BACKENDS),
    ("all", KNOWN_BACKENDS),
];

/// A backend the probe is willing to try, in ascending `priority`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendCandidate {
    pub name: String,
    pub priority: usize,
}

impl BackendCandidate {
    pub fn new(name: impl Into<String>, priority: usize) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }
}

/// Build the ordered candidate list from a plain list of names.
pub fn candidates<I, S>(names: I) -> Vec<BackendCandidate>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .enumerate()
        .map(|(priority, name)| BackendCandidate::new(name, priority))
        .collect()
}

/// Parse an option string into an ordered candidate list.
///
/// `group:list` keeps only `list`. A group keyword expands to its list, a
/// string with a comma is split on commas, and any other name is a
/// singleton list. Entries are trimmed and empty ones dropped; nothing left
/// means [`DEFAULT_BACKENDS`].
pub fn backends_from_option(option: &str) -> Vec<BackendCandidate> {
    let list = option.split_once(':').map_or(option, |(_, list)| list).trim();

    if let Some((keyword, names)) = GROUP_KEYWORDS
        .iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(list))
    {
        tracing::debug!(option, keyword, backends = ?names, "Expanding group keyword");
        return candidates(names.iter().copied());
    }

    let names: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        tracing::debug!(option, defaults = ?DEFAULT_BACKENDS, "Option names no backend");
        return candidates(DEFAULT_BACKENDS.iter().copied());
    }
    candidates(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(option: &str) -> Vec<String> {
        backends_from_option(option)
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn bare_keyword_is_a_singleton() {
        assert_eq!(names("gtk"), vec!["gtk"]);
        assert_eq!(names("native"), vec!["native"]);
    }

    #[test]
    fn group_prefix_is_dropped() {
        assert_eq!(names("opengl:gtk,native"), vec!["gtk", "native"]);
        assert_eq!(names("opengl:gtk"), vec!["gtk"]);
    }

    #[test]
    fn comma_list_keeps_order_and_drops_empties() {
        assert_eq!(names("b, a,,c"), vec!["b", "a", "c"]);
    }

    #[test]
    fn unrecognized_name_is_kept_as_a_singleton() {
        assert_eq!(names("vulkan"), vec!["vulkan"]);
        assert_eq!(names(" vulkan "), vec!["vulkan"]);
        assert_eq!(names("a:b:gtk"), vec!["b:gtk"]);
    }

    #[test]
    fn leading_comma_still_makes_a_list() {
        assert_eq!(names(",gtk"), vec!["gtk"]);
        assert_eq!(names(",gtk,,native,"), vec!["gtk", "native"]);
    }

    #[test]
    fn group_keywords_expand() {
        assert_eq!(names("auto"), vec!["native"]);
        assert_eq!(names("opengl:YES"), vec!["native"]);
        assert_eq!(names("all"), vec!["native", "gtk"]);
    }

    #[test]
    fn empty_option_uses_defaults() {
        assert_eq!(names(""), vec!["native"]);
        assert_eq!(names("opengl:"), vec!["native"]);
        assert_eq!(names(" , "), vec!["native"]);
    }

    #[test]
    fn priorities_follow_list_order() {
        let list = backends_from_option("gtk,native");
        assert_eq!(list[0], BackendCandidate::new("gtk", 0));
        assert_eq!(list[1], BackendCandidate::new("native", 1));
    }
}
