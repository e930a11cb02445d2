//! Organization path algebra.
//!
//! Organizations form a strict tree. A node is addressed by its path: the
//! segments from the root down to the node joined by [`ORG_SEPARATOR`], for
//! example `root>parent>child`. The ancestors of a path are exactly its
//! prefixes that end at a segment boundary.

use std::collections::BTreeSet;

/// Separator between the segments of an organization path.
pub const ORG_SEPARATOR: char = '>';

/// Returns the prefix paths of `path`, root first.
///
/// With `include_self` the last item is `path` itself. A single segment path
/// has no proper ancestors, so it yields nothing unless `include_self` is set.
///
/// ```
/// use istack_auth::org::iterate_parents;
///
/// assert_eq!(iterate_parents("a>b>c", false), vec!["a", "a>b"]);
/// assert_eq!(iterate_parents("a>b>c", true), vec!["a", "a>b", "a>b>c"]);
/// ```
pub fn iterate_parents(path: &str, include_self: bool) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut parents: Vec<&str> = path
        .match_indices(ORG_SEPARATOR)
        .map(|(idx, _)| &path[..idx])
        .collect();
    if include_self {
        parents.push(path);
    }
    parents
}

/// Union of the proper ancestors of every path in `paths`.
pub fn ancestors<I, S>(paths: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = BTreeSet::new();
    for path in paths {
        for parent in iterate_parents(path.as_ref(), false) {
            // Shared prefixes are visited once per input; skip the allocation.
            if !result.contains(parent) {
                result.insert(parent.to_string());
            }
        }
    }
    result
}

/// Whether `ancestor` is a proper ancestor of `path`.
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && !ancestor.is_empty()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(ORG_SEPARATOR)
}

/// Whether `path` is `org` itself or one of its descendants.
pub fn is_within(path: &str, org: &str) -> bool {
    path == org || is_ancestor(org, path)
}

/// A well-formed path is non-empty and has no empty segments.
pub fn is_valid(path: &str) -> bool {
    !path.is_empty() && path.split(ORG_SEPARATOR).all(|segment| !segment.is_empty())
}

/// Number of segments in `path`.
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.matches(ORG_SEPARATOR).count() + 1
    }
}
