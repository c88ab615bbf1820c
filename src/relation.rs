//! Relation taxonomy registry
//!
//! Every grammatical relation is a `RelationDescriptor` with an optional
//! `specific` qualifier (the `of` in `nmod:of`) and a parent link. The
//! parent links form a single tree rooted at `dep`. Specific variants are
//! children of their base relation and are minted on demand.
//!
//! The registry is shared read-mostly across threads. Lookups take a read
//! lock; creating a variant takes the write lock only when the variant is
//! actually new. Relation names are interned once in a `ThreadedRodeo`.

use lasso::{Spur, ThreadedRodeo};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Name of the root of every taxonomy
pub const ROOT_NAME: &str = "dep";

/// Handle to a registered relation
///
/// Only meaningful together with the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Relation(u32);

impl Relation {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An immutable entry of the taxonomy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub relation: Relation,
    pub name: String,
    pub specific: Option<String>,
    pub parent: Option<Relation>,
    /// The relation without its specific qualifier
    pub base: Relation,
}

impl RelationDescriptor {
    /// `name` or `name:specific`
    pub fn full_name(&self) -> String {
        match &self.specific {
            Some(s) => format!("{}:{}", self.name, s),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for RelationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.specific {
            Some(s) => write!(f, "{}:{}", self.name, s),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Default)]
struct Inner {
    by_key: FxHashMap<(Spur, Option<Spur>), Relation>,
    descriptors: Vec<Arc<RelationDescriptor>>,
}

/// Registry of relation descriptors
pub struct RelationRegistry {
    strings: ThreadedRodeo,
    inner: RwLock<Inner>,
}

static GLOBAL: Lazy<Arc<RelationRegistry>> = Lazy::new(|| Arc::new(RelationRegistry::new()));

/// The process-wide registry
pub fn global() -> Arc<RelationRegistry> {
    Arc::clone(&GLOBAL)
}

impl fmt::Debug for RelationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationRegistry")
            .field("relations", &self.len())
            .finish()
    }
}

impl Default for RelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationRegistry {
    /// Create a registry holding only the root relation
    pub fn new() -> Self {
        let registry = Self {
            strings: ThreadedRodeo::new(),
            inner: RwLock::new(Inner::default()),
        };
        registry.insert(ROOT_NAME, None, None);
        registry
    }

    /// The root relation `dep`
    pub fn root(&self) -> Relation {
        Relation(0)
    }

    pub fn len(&self) -> usize {
        self.read().descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(&self, name: &str, specific: Option<&str>) -> Option<(Spur, Option<Spur>)> {
        let name = self.strings.get(name)?;
        let specific = match specific {
            Some(s) => Some(self.strings.get(s)?),
            None => None,
        };
        Some((name, specific))
    }

    /// Insert under the write lock unless another thread got there first
    fn insert(&self, name: &str, specific: Option<&str>, parent: Option<Relation>) -> Relation {
        let key = (
            self.strings.get_or_intern(name),
            specific.map(|s| self.strings.get_or_intern(s)),
        );
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&existing) = inner.by_key.get(&key) {
            return existing;
        }

        let relation = Relation(inner.descriptors.len() as u32);
        let base = match (specific, parent) {
            (Some(_), Some(p)) => inner.descriptors.get(p.index()).map_or(p, |d| d.base),
            _ => relation,
        };
        inner.descriptors.push(Arc::new(RelationDescriptor {
            relation,
            name: name.to_string(),
            specific: specific.map(str::to_string),
            parent,
            base,
        }));
        inner.by_key.insert(key, relation);
        tracing::trace!(relation = %inner.descriptors[relation.index()], "registered relation");
        relation
    }

    /// Register a base relation under `parent` (the root when `None`)
    ///
    /// Registering an existing name returns the existing relation and
    /// leaves its parent unchanged.
    pub fn register(&self, name: &str, parent: Option<Relation>) -> Relation {
        if let Some(existing) = self.get(name, None) {
            return existing;
        }
        let parent = parent.unwrap_or_else(|| self.root());
        self.insert(name, None, Some(parent))
    }

    /// Look up a relation without creating it
    pub fn get(&self, name: &str, specific: Option<&str>) -> Option<Relation> {
        let key = self.key(name, specific)?;
        self.read().by_key.get(&key).copied()
    }

    /// Look up `name` or `name:specific`
    pub fn lookup(&self, full_name: &str) -> Option<Relation> {
        match full_name.split_once(':') {
            Some((name, specific)) => self.get(name, Some(specific)),
            None => self.get(full_name, None),
        }
    }

    /// Look up a relation, minting it if needed
    ///
    /// An unknown base is registered under the root; a specific variant
    /// is registered as a child of its base.
    pub fn get_or_create(&self, name: &str, specific: Option<&str>) -> Relation {
        if let Some(existing) = self.get(name, specific) {
            return existing;
        }
        let base = self.register(name, None);
        match specific {
            Some(s) => self.insert(name, Some(s), Some(base)),
            None => base,
        }
    }

    pub fn descriptor(&self, relation: Relation) -> Option<Arc<RelationDescriptor>> {
        self.read().descriptors.get(relation.index()).cloned()
    }

    /// Full printable name, `name:specific` for variants
    pub fn name(&self, relation: Relation) -> String {
        match self.descriptor(relation) {
            Some(d) => d.full_name(),
            None => format!("#{}", relation.0),
        }
    }

    pub fn specific(&self, relation: Relation) -> Option<String> {
        self.descriptor(relation).and_then(|d| d.specific.clone())
    }

    pub fn parent(&self, relation: Relation) -> Option<Relation> {
        self.read()
            .descriptors
            .get(relation.index())
            .and_then(|d| d.parent)
    }

    /// The relation stripped of its specific qualifier
    pub fn base(&self, relation: Relation) -> Relation {
        self.read()
            .descriptors
            .get(relation.index())
            .map(|d| d.base)
            .unwrap_or(relation)
    }

    /// True if `ancestor` lies strictly above `relation` in the taxonomy
    pub fn is_ancestor(&self, ancestor: Relation, relation: Relation) -> bool {
        let inner = self.read();
        let mut current = inner.descriptors.get(relation.index()).and_then(|d| d.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = inner.descriptors.get(p.index()).and_then(|d| d.parent);
        }
        false
    }

    /// True if `relation` is `ancestor` or lies below it
    pub fn descends_from(&self, relation: Relation, ancestor: Relation) -> bool {
        relation == ancestor || self.is_ancestor(ancestor, relation)
    }

    /// Pick one relation from candidates given in list order
    ///
    /// A later candidate replaces the current choice only when the current
    /// choice is its taxonomic ancestor; otherwise the earlier one stays.
    pub fn most_specific(&self, candidates: &[Relation]) -> Option<Relation> {
        let mut iter = candidates.iter().copied();
        let first = iter.next()?;
        Some(iter.fold(first, |chosen, next| {
            if self.is_ancestor(chosen, next) {
                next
            } else {
                chosen
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_taxonomy() -> (RelationRegistry, Relation, Relation, Relation) {
        let registry = RelationRegistry::new();
        let modifier = registry.register("mod", None);
        let amod = registry.register("amod", Some(modifier));
        let nummod = registry.register("nummod", Some(amod));
        (registry, modifier, amod, nummod)
    }

    #[test]
    fn test_root_and_register() {
        let (registry, modifier, amod, _) = small_taxonomy();
        assert_eq!(registry.name(registry.root()), "dep");
        assert_eq!(registry.parent(modifier), Some(registry.root()));
        assert_eq!(registry.parent(amod), Some(modifier));
        assert_eq!(registry.register("amod", None), amod);
        assert_eq!(registry.parent(amod), Some(modifier));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_get_or_create_specific() {
        let registry = RelationRegistry::new();
        let nmod = registry.register("nmod", None);
        let nmod_of = registry.get_or_create("nmod", Some("of"));
        assert_ne!(nmod, nmod_of);
        assert_eq!(registry.get_or_create("nmod", Some("of")), nmod_of);
        assert_eq!(registry.parent(nmod_of), Some(nmod));
        assert_eq!(registry.base(nmod_of), nmod);
        assert_eq!(registry.name(nmod_of), "nmod:of");
        assert_eq!(registry.specific(nmod_of).as_deref(), Some("of"));
        assert_eq!(registry.lookup("nmod:of"), Some(nmod_of));
        assert_eq!(registry.lookup("nmod:in"), None);
    }

    #[test]
    fn test_get_or_create_unknown_base() {
        let registry = RelationRegistry::new();
        let conj_and = registry.get_or_create("conj", Some("and"));
        let conj = registry.get("conj", None).unwrap();
        assert_eq!(registry.parent(conj), Some(registry.root()));
        assert_eq!(registry.base(conj_and), conj);
    }

    #[test]
    fn test_ancestry() {
        let (registry, modifier, amod, nummod) = small_taxonomy();
        assert!(registry.is_ancestor(modifier, nummod));
        assert!(registry.is_ancestor(registry.root(), amod));
        assert!(!registry.is_ancestor(nummod, amod));
        assert!(!registry.is_ancestor(amod, amod));
        assert!(registry.descends_from(amod, amod));
    }

    #[test]
    fn test_most_specific_prefers_descendant() {
        let (registry, modifier, amod, nummod) = small_taxonomy();
        assert_eq!(registry.most_specific(&[amod, nummod]), Some(nummod));
        assert_eq!(registry.most_specific(&[nummod, amod]), Some(nummod));
        assert_eq!(registry.most_specific(&[modifier, amod, nummod]), Some(nummod));
        assert_eq!(registry.most_specific(&[]), None);
    }

    #[test]
    fn test_most_specific_unrelated_keeps_first() {
        let (registry, _, amod, _) = small_taxonomy();
        let det = registry.register("det", None);
        assert_eq!(registry.most_specific(&[det, amod]), Some(det));
        assert_eq!(registry.most_specific(&[amod, det]), Some(amod));
    }

    #[test]
    fn test_concurrent_get_or_create() {
        let registry = RelationRegistry::new();
        registry.register("nmod", None);
        let lexemes = ["of", "in", "on", "at", "by", "for"];

        let results: Vec<Vec<Relation>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        lexemes
                            .iter()
                            .map(|l| registry.get_or_create("nmod", Some(l)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for r in &results[1..] {
            assert_eq!(r, &results[0]);
        }
        assert_eq!(registry.len(), 2 + lexemes.len());
    }

    #[test]
    fn test_global_registry_shared() {
        let a = global();
        let b = global();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(a.root()), "dep");
    }
}
