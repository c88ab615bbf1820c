//! Compiled relation taxonomy
//!
//! A `Taxonomy` is a catalog registered in a `RelationRegistry` and
//! compiled against a `PatternMatcher`. It keeps the catalog's list order,
//! which is the order patterns are tried in.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::ConvertError;
use crate::matcher::PatternMatcher;
use crate::relation::{Relation, RelationRegistry};
use crate::tree::{NodeId, Tree};

/// A relation with its compiled patterns
pub struct TaxonomyEntry<C> {
    pub relation: Relation,
    pub patterns: Vec<C>,
}

/// Relations in list order, ready for matching
pub struct Taxonomy<M: PatternMatcher> {
    registry: Arc<RelationRegistry>,
    matcher: M,
    entries: Vec<TaxonomyEntry<M::Compiled>>,
    positions: FxHashMap<Relation, usize>,
}

impl<M: PatternMatcher> Taxonomy<M> {
    /// Register the catalog's relations and compile their patterns
    ///
    /// Parents may be listed after their children; a parent that never
    /// appears (and is not already registered) is an error.
    pub fn compile(
        catalog: &Catalog,
        matcher: M,
        registry: Arc<RelationRegistry>,
    ) -> Result<Self, ConvertError> {
        let mut relations: Vec<Option<Relation>> = vec![None; catalog.entries.len()];
        loop {
            let mut progress = false;
            for (i, entry) in catalog.entries.iter().enumerate() {
                if relations[i].is_some() {
                    continue;
                }
                let parent = match &entry.parent {
                    None => Some(registry.root()),
                    Some(p) => registry.get(p, None),
                };
                if let Some(parent) = parent {
                    relations[i] = Some(registry.register(&entry.name, Some(parent)));
                    progress = true;
                }
            }
            if !progress {
                break;
            }
        }

        let mut entries = Vec::with_capacity(catalog.entries.len());
        let mut positions = FxHashMap::default();
        for (entry, relation) in catalog.entries.iter().zip(relations) {
            let Some(relation) = relation else {
                return Err(ConvertError::UnknownParent {
                    relation: entry.name.clone(),
                    parent: entry.parent.clone().unwrap_or_default(),
                });
            };
            let patterns = entry
                .patterns
                .iter()
                .map(|source| {
                    matcher.compile(source).map_err(|source| ConvertError::Pattern {
                        relation: entry.name.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            positions.entry(relation).or_insert(entries.len());
            entries.push(TaxonomyEntry { relation, patterns });
        }

        tracing::debug!(
            language = %catalog.language,
            relations = entries.len(),
            "compiled relation taxonomy"
        );

        Ok(Self {
            registry,
            matcher,
            entries,
            positions,
        })
    }

    pub fn registry(&self) -> &Arc<RelationRegistry> {
        &self.registry
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn entries(&self) -> &[TaxonomyEntry<M::Compiled>] {
        &self.entries
    }

    /// List position of a relation, if it is part of this taxonomy
    pub fn position(&self, relation: Relation) -> Option<usize> {
        self.positions.get(&relation).copied()
    }

    /// Every (relation, target) pair matched at `node`, in list order
    pub fn candidates(&self, tree: &Tree, node: NodeId) -> Vec<(Relation, NodeId)> {
        let mut out = Vec::new();
        for entry in &self.entries {
            for pattern in &entry.patterns {
                for m in self.matcher.find(pattern, tree, node) {
                    if let Some(target) = m.get("target") {
                        out.push((entry.relation, target));
                    }
                }
            }
        }
        out
    }
}

/// Relations the builder and the rewrite passes refer to by name
#[derive(Debug, Clone, Copy)]
pub struct CoreRelations {
    pub dep: Relation,
    pub subj: Relation,
    pub obj: Relation,
    pub nsubj: Relation,
    pub nsubjpass: Relation,
    pub csubj: Relation,
    pub csubjpass: Relation,
    pub xsubj: Relation,
    pub dobj: Relation,
    pub xcomp: Relation,
    pub agent: Relation,
    pub aux: Relation,
    pub auxpass: Relation,
    pub mark: Relation,
    pub cc: Relation,
    pub conj: Relation,
    pub case: Relation,
    pub nmod: Relation,
    pub poss: Relation,
    pub advcl: Relation,
    pub advmod: Relation,
    pub amod: Relation,
    pub mwe: Relation,
    pub prt: Relation,
    pub compound: Relation,
    pub name: Relation,
    pub rcmod: Relation,
    pub rel_ref: Relation,
}

impl CoreRelations {
    /// Look up the core relations, registering any that are missing
    pub fn resolve(registry: &RelationRegistry) -> Self {
        let dep = registry.root();
        let arg = registry.register("arg", Some(dep));
        let subj = registry.register("subj", Some(arg));
        let comp = registry.register("comp", Some(arg));
        let obj = registry.register("obj", Some(comp));
        let modifier = registry.register("mod", Some(dep));
        let nsubj = registry.register("nsubj", Some(subj));
        let csubj = registry.register("csubj", Some(subj));
        let aux = registry.register("aux", Some(dep));
        let advmod = registry.register("advmod", Some(modifier));
        let amod = registry.register("amod", Some(modifier));

        Self {
            dep,
            subj,
            obj,
            nsubj,
            nsubjpass: registry.register("nsubjpass", Some(nsubj)),
            csubj,
            csubjpass: registry.register("csubjpass", Some(csubj)),
            xsubj: registry.register("xsubj", Some(nsubj)),
            dobj: registry.register("dobj", Some(obj)),
            xcomp: registry.register("xcomp", Some(comp)),
            agent: registry.register("agent", Some(arg)),
            aux,
            auxpass: registry.register("auxpass", Some(aux)),
            mark: registry.register("mark", Some(dep)),
            cc: registry.register("cc", Some(dep)),
            conj: registry.register("conj", Some(dep)),
            case: registry.register("case", Some(dep)),
            nmod: registry.register("nmod", Some(modifier)),
            poss: registry.register("poss", Some(modifier)),
            advcl: registry.register("advcl", Some(modifier)),
            advmod,
            amod,
            mwe: registry.register("mwe", Some(dep)),
            prt: registry.register("prt", Some(dep)),
            compound: registry.register("compound", Some(modifier)),
            name: registry.register("name", Some(modifier)),
            rcmod: registry.register("rcmod", Some(modifier)),
            rel_ref: registry.register("ref", Some(dep)),
        }
    }
}
