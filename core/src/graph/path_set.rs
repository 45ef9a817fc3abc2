//! Include-path algebra.

use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::config::canonical_name;

/// A set of dot-separated relationship paths (`"friends.job"`).
///
/// Segments are stored in canonical (snake-case) form so `best-friend`,
/// `bestFriend` and `best_friend` all name the same relationship.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PathSet {
    /// Every relationship at every depth.
    All,
    /// No relationship.
    #[default]
    None,
    /// Exactly these paths.
    Paths(BTreeSet<String>),
}

impl PathSet {
    /// Builds an explicit set from raw include paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PathSet::Paths(
            paths
                .into_iter()
                .filter_map(|path| normalize(path.as_ref()))
                .collect(),
        )
    }

    /// `true` if some path starts with relationship `name`.
    pub fn matches_property(&self, name: &str) -> bool {
        match self {
            PathSet::All => true,
            PathSet::None => false,
            PathSet::Paths(paths) => {
                let name = canonical_name(name);
                paths.iter().any(|path| first_segment(path) == name)
            }
        }
    }

    /// Paths below relationship `name`, with the `name.` prefix stripped.
    pub fn child_path_set(&self, name: &str) -> PathSet {
        match self {
            PathSet::All => PathSet::All,
            PathSet::None => PathSet::None,
            PathSet::Paths(paths) => {
                let name = canonical_name(name);
                PathSet::Paths(
                    paths
                        .iter()
                        .filter_map(|path| {
                            let (head, rest) = path.split_once('.')?;
                            (head == name).then(|| rest.to_string())
                        })
                        .collect(),
                )
            }
        }
    }

    pub fn union(&self, other: &PathSet) -> PathSet {
        match (self, other) {
            (PathSet::All, _) | (_, PathSet::All) => PathSet::All,
            (PathSet::None, other) | (other, PathSet::None) => other.clone(),
            (PathSet::Paths(a), PathSet::Paths(b)) => PathSet::Paths(a.union(b).cloned().collect()),
        }
    }

    /// Every relationship name mentioned anywhere in the set.
    pub fn segments(&self) -> BTreeSet<&str> {
        match self {
            PathSet::Paths(paths) => paths.iter().flat_map(|p| p.split('.')).collect(),
            _ => BTreeSet::new(),
        }
    }
}

fn first_segment(path: &str) -> &str {
    path.split_once('.').map_or(path, |(head, _)| head)
}

fn normalize(path: &str) -> Option<String> {
    let segments: SmallVec<[String; 4]> = path
        .split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(canonical_name)
        .collect();
    (!segments.is_empty()).then(|| segments.join("."))
}
