//! Dependency graph
//!
//! A `DependencyGraph` owns one sentence's token table and a multigraph of
//! labelled edges over it. Tokens are addressed by `TokenId` (position in
//! the table); copy tokens made by the rewrite passes are appended to the
//! same table and remember their origin.
//!
//! Edges are never removed in place. `kill` tombstones an edge so the rest
//! of a pass still sees it through `edge`, while the adjacency queries
//! (`out_edges`, `in_edges`, `edges_between`) skip it. `sweep` compacts
//! the edge list at pass boundaries and invalidates every `EdgeId`.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;

use crate::relation::{Relation, RelationRegistry};
use crate::tree::{Token, Tree};

/// Position of a token in the graph's token table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

impl TokenId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of an edge in the edge list; valid until the next `sweep`
pub type EdgeId = usize;

/// A typed dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub gov: TokenId,
    pub dep: TokenId,
    pub rel: Relation,
    /// Added by a rewrite pass rather than the basic builder
    pub extra: bool,
}

/// Typed dependencies over one sentence
#[derive(Clone)]
pub struct DependencyGraph {
    registry: Arc<RelationRegistry>,
    tokens: Vec<Token>,
    origins: Vec<Option<TokenId>>,
    root: Option<TokenId>,
    edges: Vec<Edge>,
    dead: FxHashSet<EdgeId>,
    out: Vec<Vec<EdgeId>>,
    inc: Vec<Vec<EdgeId>>,
    pairs: FxHashMap<(TokenId, TokenId), Vec<EdgeId>>,
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("tokens", &self.tokens.len())
            .field("edges", &self.lines())
            .finish()
    }
}

impl DependencyGraph {
    /// Create an edgeless graph over a token table
    pub fn new(registry: Arc<RelationRegistry>, tokens: Vec<Token>) -> Self {
        let n = tokens.len();
        Self {
            registry,
            origins: vec![None; n],
            tokens,
            root: None,
            edges: Vec::new(),
            dead: FxHashSet::default(),
            out: vec![Vec::new(); n],
            inc: vec![Vec::new(); n],
            pairs: FxHashMap::default(),
        }
    }

    /// Create an edgeless graph over a tree's tokens
    pub fn from_tree(registry: Arc<RelationRegistry>, tree: &Tree) -> Self {
        Self::new(registry, tree.tokens.clone())
    }

    pub fn registry(&self) -> &Arc<RelationRegistry> {
        &self.registry
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    pub fn token_ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        (0..self.tokens.len() as u32).map(TokenId)
    }

    /// The original (non-copy) token at a 1-based sentence index
    pub fn token_at(&self, index: usize) -> Option<TokenId> {
        self.token_ids()
            .find(|&t| self.tokens[t.index()].index == index && !self.tokens[t.index()].is_copy())
    }

    pub fn root(&self) -> Option<TokenId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<TokenId>) {
        self.root = root;
    }

    /// The token a copy was made from, or the token itself
    pub fn origin(&self, id: TokenId) -> TokenId {
        self.origins.get(id.index()).copied().flatten().unwrap_or(id)
    }

    /// Append a copy of a token
    ///
    /// Copies of copies are copies of the same origin; each receives the
    /// next unused copy number.
    pub fn copy_token(&mut self, id: TokenId) -> TokenId {
        let origin = self.origin(id);
        let next = self
            .token_ids()
            .filter(|&t| self.origin(t) == origin)
            .map(|t| self.tokens[t.index()].copy)
            .max()
            .unwrap_or(0)
            + 1;

        let mut token = self.tokens[origin.index()].clone();
        token.copy = next;
        let copy = TokenId(self.tokens.len() as u32);
        self.tokens.push(token);
        self.origins.push(Some(origin));
        self.out.push(Vec::new());
        self.inc.push(Vec::new());
        copy
    }

    pub fn add_edge(&mut self, gov: TokenId, dep: TokenId, rel: Relation, extra: bool) -> EdgeId {
        let id = self.edges.len();
        self.edges.push(Edge {
            gov,
            dep,
            rel,
            extra,
        });
        self.out[gov.index()].push(id);
        self.inc[dep.index()].push(id);
        self.pairs.entry((gov, dep)).or_default().push(id);
        id
    }

    /// An edge by id, dead or alive
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Snapshot of the live edge ids in list order
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        (0..self.edges.len()).filter(|e| !self.dead.contains(e)).collect()
    }

    /// Live edges in list order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.dead.contains(i))
            .map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.edges.len() - self.dead.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live edges governed by a token
    pub fn out_edges(&self, gov: TokenId) -> Vec<EdgeId> {
        self.live(self.out.get(gov.index()))
    }

    /// Live edges into a token
    pub fn in_edges(&self, dep: TokenId) -> Vec<EdgeId> {
        self.live(self.inc.get(dep.index()))
    }

    /// Live edges between a governor and a dependent
    pub fn edges_between(&self, gov: TokenId, dep: TokenId) -> Vec<EdgeId> {
        self.live(self.pairs.get(&(gov, dep)))
    }

    fn live(&self, ids: Option<&Vec<EdgeId>>) -> Vec<EdgeId> {
        ids.map(|ids| {
            ids.iter()
                .copied()
                .filter(|e| !self.dead.contains(e))
                .collect()
        })
        .unwrap_or_default()
    }

    /// The live edge with this exact triple
    pub fn find(&self, gov: TokenId, dep: TokenId, rel: Relation) -> Option<EdgeId> {
        self.edges_between(gov, dep)
            .into_iter()
            .find(|&e| self.edges[e].rel == rel)
    }

    pub fn contains(&self, gov: TokenId, dep: TokenId, rel: Relation) -> bool {
        self.find(gov, dep, rel).is_some()
    }

    /// The relation of an edge without its specific qualifier
    pub fn base(&self, id: EdgeId) -> Relation {
        self.registry.base(self.edges[id].rel)
    }

    /// Live edges whose relation has this base
    pub fn edges_with_base(&self, base: Relation) -> Vec<EdgeId> {
        self.edge_ids()
            .into_iter()
            .filter(|&e| self.base(e) == base)
            .collect()
    }

    /// Live out-edges of `gov` whose relation has this base
    pub fn out_with_base(&self, gov: TokenId, base: Relation) -> Vec<EdgeId> {
        self.out_edges(gov)
            .into_iter()
            .filter(|&e| self.base(e) == base)
            .collect()
    }

    /// True if `gov` has a live out-edge with this base relation
    pub fn has_out(&self, gov: TokenId, base: Relation) -> bool {
        !self.out_with_base(gov, base).is_empty()
    }

    pub fn kill(&mut self, id: EdgeId) {
        self.dead.insert(id);
    }

    pub fn is_dead(&self, id: EdgeId) -> bool {
        self.dead.contains(&id)
    }

    pub fn relabel(&mut self, id: EdgeId, rel: Relation) {
        self.edges[id].rel = rel;
    }

    pub fn set_extra(&mut self, id: EdgeId, extra: bool) {
        self.edges[id].extra = extra;
    }

    /// Move an edge to a new governor, keeping its dependent
    pub fn reattach_governor(&mut self, id: EdgeId, gov: TokenId) {
        let old = self.edges[id];
        if old.gov == gov {
            return;
        }
        self.out[old.gov.index()].retain(|&e| e != id);
        self.unpair(old.gov, old.dep, id);
        self.edges[id].gov = gov;
        self.out[gov.index()].push(id);
        self.pairs.entry((gov, old.dep)).or_default().push(id);
    }

    /// Move an edge to a new dependent, keeping its governor
    pub fn reattach_dependent(&mut self, id: EdgeId, dep: TokenId) {
        let old = self.edges[id];
        if old.dep == dep {
            return;
        }
        self.inc[old.dep.index()].retain(|&e| e != id);
        self.unpair(old.gov, old.dep, id);
        self.edges[id].dep = dep;
        self.inc[dep.index()].push(id);
        self.pairs.entry((old.gov, dep)).or_default().push(id);
    }

    fn unpair(&mut self, gov: TokenId, dep: TokenId, id: EdgeId) {
        if let Some(ids) = self.pairs.get_mut(&(gov, dep)) {
            ids.retain(|&e| e != id);
            if ids.is_empty() {
                self.pairs.remove(&(gov, dep));
            }
        }
    }

    /// Drop dead edges and rebuild the indices
    ///
    /// Every `EdgeId` handed out before the sweep is invalid afterwards.
    pub fn sweep(&mut self) {
        if self.dead.is_empty() {
            return;
        }
        let edges = std::mem::take(&mut self.edges)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !self.dead.contains(i))
            .map(|(_, e)| e)
            .collect();
        self.rebuild(edges);
    }

    fn rebuild(&mut self, edges: Vec<Edge>) {
        self.edges = Vec::with_capacity(edges.len());
        self.dead.clear();
        self.pairs.clear();
        for list in self.out.iter_mut().chain(self.inc.iter_mut()) {
            list.clear();
        }
        for e in edges {
            self.add_edge(e.gov, e.dep, e.rel, e.extra);
        }
    }

    /// Remove exact duplicate triples
    ///
    /// The first occurrence is kept; it stays a basic edge if any of its
    /// duplicates was one.
    pub fn dedup(&mut self) {
        let mut first: FxHashMap<(TokenId, TokenId, Relation), EdgeId> = FxHashMap::default();
        for id in self.edge_ids() {
            let e = self.edges[id];
            match first.get(&(e.gov, e.dep, e.rel)) {
                Some(&kept) => {
                    self.edges[kept].extra &= e.extra;
                    self.dead.insert(id);
                }
                None => {
                    first.insert((e.gov, e.dep, e.rel), id);
                }
            }
        }
        self.sweep();
    }

    /// Order edges by dependent, then governor, then relation name
    pub fn sort(&mut self) {
        let mut edges: Vec<Edge> = self.edges().copied().collect();
        let key = |e: &Edge| {
            let dep = self.token(e.dep);
            let gov = self.token(e.gov);
            (dep.index, dep.copy, gov.index, gov.copy, self.registry.name(e.rel))
        };
        edges.sort_by_cached_key(key);
        self.rebuild(edges);
    }

    /// True if every token but the root has exactly one governor
    pub fn is_tree(&self) -> bool {
        self.token_ids().all(|t| {
            let n = self.in_edges(t).len();
            if Some(t) == self.root { n == 0 } else { n == 1 }
        })
    }

    /// `form-index`, with one `'` per copy number
    pub fn token_label(&self, id: TokenId) -> String {
        let t = self.token(id);
        format!("{}-{}{}", t.form, t.index, "'".repeat(t.copy as usize))
    }

    /// `rel(gov-i, dep-j)`
    pub fn render(&self, id: EdgeId) -> String {
        let e = &self.edges[id];
        format!(
            "{}({}, {})",
            self.registry.name(e.rel),
            self.token_label(e.gov),
            self.token_label(e.dep)
        )
    }

    /// The root line followed by every live edge in list order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.len() + 1);
        if let Some(root) = self.root {
            lines.push(format!("root(ROOT-0, {})", self.token_label(root)));
        }
        lines.extend(self.edge_ids().into_iter().map(|e| self.render(e)));
        lines
    }
}

impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
