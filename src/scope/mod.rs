//! Suite scope tree
//!
//! Scopes live in an arena and refer to their parent by id. Site facts and
//! the feature set belong to the root scope; sub-suite scopes only carry
//! local rules. Walking to the root is iterative and bounded so a malformed,
//! cyclic tree fails instead of spinning.

mod suite;

pub use suite::{LocalRule, SubSuite};

use crate::error::ResolveError;

/// Longest parent chain accepted before the tree is declared malformed
pub const MAX_SCOPE_DEPTH: usize = 64;

/// Name of the root scope
pub const ROOT_SCOPE: &str = "root";

/// Index of a scope in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    /// Id of the node at `index` in [`ScopeTree::from_nodes`] input
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One scope: a name, an optional parent and its local rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub rules: Vec<LocalRule>,
}

/// Arena of scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree holding only the root scope
    pub fn new() -> Self {
        Self {
            nodes: vec![ScopeNode {
                name: ROOT_SCOPE.to_string(),
                parent: None,
                rules: Vec::new(),
            }],
        }
    }

    /// Root scope plus the standard sub-suites
    pub fn standard() -> Self {
        let mut tree = Self::new();
        let root = tree.root();
        tree.nodes
            .extend(SubSuite::standard().into_iter().map(|suite| ScopeNode {
                name: suite.name,
                parent: Some(root),
                rules: suite.rules,
            }));
        tree
    }

    /// Build a tree from raw nodes. Parent ids must be in range; the chain
    /// shape is checked lazily by [`ScopeTree::root_of`].
    pub fn from_nodes(nodes: Vec<ScopeNode>) -> Result<Self, ResolveError> {
        for node in &nodes {
            if let Some(parent) = node.parent {
                if parent.0 >= nodes.len() {
                    return Err(ResolveError::UnknownScope(parent.0));
                }
            }
        }
        Ok(Self { nodes })
    }

    /// The scope `new` created
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn add_child(&mut self, parent: ScopeId, suite: SubSuite) -> Result<ScopeId, ResolveError> {
        self.node(parent)?;
        let id = ScopeId(self.nodes.len());
        self.nodes.push(ScopeNode {
            name: suite.name,
            parent: Some(parent),
            rules: suite.rules,
        });
        Ok(id)
    }

    pub fn node(&self, id: ScopeId) -> Result<&ScopeNode, ResolveError> {
        self.nodes.get(id.0).ok_or(ResolveError::UnknownScope(id.0))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Scope ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.nodes.len()).map(ScopeId)
    }

    /// First scope with the given name
    pub fn find(&self, name: &str) -> Option<ScopeId> {
        self.nodes.iter().position(|n| n.name == name).map(ScopeId)
    }

    /// Path from `id` up to its root, `id` first and the root last.
    pub fn ancestors(&self, id: ScopeId) -> Result<Vec<ScopeId>, ResolveError> {
        let mut chain = vec![id];
        let mut current = self.node(id)?;

        while let Some(parent) = current.parent {
            if chain.len() > MAX_SCOPE_DEPTH {
                return Err(ResolveError::ScopeChain {
                    scope: self.node(id)?.name.clone(),
                    limit: MAX_SCOPE_DEPTH,
                });
            }
            chain.push(parent);
            current = self.node(parent)?;
        }
        Ok(chain)
    }

    /// The ancestor of `id` that has no parent (`id` itself for a root).
    pub fn root_of(&self, id: ScopeId) -> Result<ScopeId, ResolveError> {
        let chain = self.ancestors(id)?;
        Ok(chain[chain.len() - 1])
    }
}
