//! Canonical desired-package set.
use std::collections::{BTreeMap, BTreeSet};

/// One package named in a list file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageDeclaration {
    /// Package name, never empty.
    pub name: String,
    /// `true` when the list entry carried the `&` marker.
    pub optional: bool,
}

impl PackageDeclaration {
    /// A declaration that must be installed explicitly.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    /// A declaration that is kept if already explicit but never installed.
    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }
}

/// Union of every declaration from every list file of one invocation.
///
/// Names are unique. When a name is declared both required and optional,
/// the required declaration wins regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    // name -> optional
    entries: BTreeMap<String, bool>,
}

impl PackageSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one declaration.
    pub fn insert(&mut self, decl: PackageDeclaration) {
        self.entries
            .entry(decl.name)
            .and_modify(|optional| *optional = *optional && decl.optional)
            .or_insert(decl.optional);
    }

    /// Merge another set into this one.
    pub fn union_with(&mut self, other: Self) {
        for (name, optional) in other.entries {
            self.insert(PackageDeclaration { name, optional });
        }
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` is declared at all, required or optional.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look up a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<PackageDeclaration> {
        self.entries
            .get_key_value(name)
            .map(|(name, optional)| PackageDeclaration {
                name: name.clone(),
                optional: *optional,
            })
    }

    /// Names declared as required.
    #[must_use]
    pub fn required_names(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|(_, optional)| !**optional)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names declared only as optional dependencies.
    #[must_use]
    pub fn optional_names(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|(_, optional)| **optional)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Iterate declarations in name order.
    pub fn iter(&self) -> impl Iterator<Item = PackageDeclaration> + '_ {
        self.entries
            .iter()
            .map(|(name, optional)| PackageDeclaration {
                name: name.clone(),
                optional: *optional,
            })
    }
}

impl FromIterator<PackageDeclaration> for PackageSet {
    fn from_iter<I: IntoIterator<Item = PackageDeclaration>>(iter: I) -> Self {
        let mut set = Self::new();
        for decl in iter {
            set.insert(decl);
        }
        set
    }
}

impl Extend<PackageDeclaration> for PackageSet {
    fn extend<I: IntoIterator<Item = PackageDeclaration>>(&mut self, iter: I) {
        for decl in iter {
            self.insert(decl);
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn required_wins_over_optional_in_either_order() {
        let a: PackageSet = [
            PackageDeclaration::optional("git"),
            PackageDeclaration::required("git"),
        ]
        .into_iter()
        .collect();
        let b: PackageSet = [
            PackageDeclaration::required("git"),
            PackageDeclaration::optional("git"),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
        assert_eq!(a.get("git"), Some(PackageDeclaration::required("git")));
    }

    #[test]
    fn union_is_commutative() {
        let left: PackageSet = [
            PackageDeclaration::required("vim"),
            PackageDeclaration::optional("python-pynvim"),
        ]
        .into_iter()
        .collect();
        let right: PackageSet = [
            PackageDeclaration::required("python-pynvim"),
            PackageDeclaration::required("git"),
        ]
        .into_iter()
        .collect();

        let mut lr = left.clone();
        lr.union_with(right.clone());
        let mut rl = right;
        rl.union_with(left);

        assert_eq!(lr, rl);
        assert_eq!(lr.len(), 3);
        assert!(lr.optional_names().is_empty());
    }

    #[test]
    fn required_and_optional_names_partition_the_set() {
        let set: PackageSet = [
            PackageDeclaration::required("base"),
            PackageDeclaration::optional("pipewire-jack"),
            PackageDeclaration::required("linux"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            set.required_names().into_iter().collect::<Vec<_>>(),
            vec!["base", "linux"]
        );
        assert_eq!(
            set.optional_names().into_iter().collect::<Vec<_>>(),
            vec!["pipewire-jack"]
        );
        assert!(set.contains("pipewire-jack"));
        assert!(!set.contains("firefox"));
    }

    #[test]
    fn duplicates_collapse() {
        let mut set = PackageSet::new();
        set.extend([
            PackageDeclaration::optional("a"),
            PackageDeclaration::optional("a"),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next(), Some(PackageDeclaration::optional("a")));
    }
}
