//! Type graph discovery.
//!
//! The walker starts from a set of root types and collects every composite
//! and enum type transitively reachable through declared members. Collection,
//! array, and nullable wrappers are unwrapped to the type that defines graph
//! identity (canonicalization); map-shaped types terminate canonicalization
//! as opaque leaves and never become nodes. The traversal is depth-first,
//! pre-order, and cycle-safe: a node is recorded before its own members are
//! explored.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

use crate::classify::{classify, Classification};
use crate::config::GenerateConfig;
use crate::error::MetadataError;
use crate::provider::{TypeMetadata, TypeRef};

/// Whether a discovered node is a composite or an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A record/class-shaped type whose members are expanded.
    Composite,
    /// An enum type; terminal, never expanded.
    Enum,
}

/// One canonical type slated for declaration emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphNode {
    /// The canonical type (all nullable/array/collection wrappers removed).
    pub ty: TypeRef,
    /// Composite or enum.
    pub kind: NodeKind,
}

/// The set of types already emitted or excluded, accumulated over the
/// lifetime of one generation run (or across runs when the host opts in).
///
/// Once a type enters the set it is never emitted again, and references to it
/// render by simple name instead of being re-expanded.
#[derive(Debug, Clone, Default)]
pub struct KnownTypes(HashSet<TypeRef>);

impl KnownTypes {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the type is already known.
    pub fn contains(&self, ty: TypeRef) -> bool {
        self.0.contains(&ty)
    }

    /// Mark a type as known. The set only grows.
    pub fn insert(&mut self, ty: TypeRef) {
        self.0.insert(ty);
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of canonicalizing a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Canonical {
    /// The type (after unwrapping) is a composite or enum graph node.
    Node(GraphNode),
    /// The type bottoms out in something that never becomes a node:
    /// a primitive, terminal, map, or excluded type.
    Opaque,
}

/// Repeatedly unwrap nullable/array/collection wrappers until a non-wrapper
/// classification is reached. Maps are not unwrapped; they terminate as
/// opaque leaves.
pub(crate) fn canonicalize(
    provider: &dyn TypeMetadata,
    config: &GenerateConfig,
    ty: TypeRef,
) -> Result<Canonical, MetadataError> {
    let mut ty = ty;
    loop {
        match classify(provider, config, ty)? {
            Classification::Nullable(inner)
            | Classification::Array(inner)
            | Classification::Collection(inner) => ty = inner,
            Classification::Enum => {
                return Ok(Canonical::Node(GraphNode {
                    ty,
                    kind: NodeKind::Enum,
                }));
            }
            Classification::Composite => {
                return Ok(Canonical::Node(GraphNode {
                    ty,
                    kind: NodeKind::Composite,
                }));
            }
            _ => return Ok(Canonical::Opaque),
        }
    }
}

/// Depth-first discoverer of the representable type graph.
///
/// The walker keeps its working list across [`GraphWalker::walk`] calls, so
/// multiple roots share one de-duplicated node sequence. Nodes appended
/// before a failed walk remain inspectable via [`GraphWalker::nodes`].
pub struct GraphWalker<'a> {
    provider: &'a dyn TypeMetadata,
    config: &'a GenerateConfig,
    known: &'a KnownTypes,
    nodes: Vec<GraphNode>,
}

impl fmt::Debug for GraphWalker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphWalker")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

impl<'a> GraphWalker<'a> {
    /// A walker with an empty working list.
    pub fn new(
        provider: &'a dyn TypeMetadata,
        config: &'a GenerateConfig,
        known: &'a KnownTypes,
    ) -> Self {
        Self {
            provider,
            config,
            known,
            nodes: Vec::new(),
        }
    }

    /// Nodes discovered so far, in discovery order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Consume the walker, yielding the discovered nodes.
    pub fn into_nodes(self) -> Vec<GraphNode> {
        self.nodes
    }

    fn contains(&self, ty: TypeRef) -> bool {
        self.nodes.iter().any(|n| n.ty == ty)
    }

    /// Discover every representable type reachable from `root`.
    ///
    /// Types already known or already in the working list are skipped by
    /// canonical equality, so a collection-of-X root and a bare X root are
    /// the same graph node.
    pub fn walk(&mut self, root: TypeRef) -> Result<(), MetadataError> {
        let node = match canonicalize(self.provider, self.config, root)? {
            Canonical::Node(node) => node,
            Canonical::Opaque => return Ok(()),
        };

        if self.known.contains(node.ty) || self.contains(node.ty) {
            return Ok(());
        }

        // Record before expanding members: this is what terminates cycles.
        trace!(ty = node.ty.raw(), kind = ?node.kind, "discovered graph node");
        self.nodes.push(node);

        if node.kind == NodeKind::Enum {
            return Ok(());
        }

        // Canonicalize members, de-duplicating ones that collapse to the
        // same type (keep first) and dropping everything that is not a node.
        let mut member_nodes: Vec<GraphNode> = Vec::new();
        for member in self.provider.members(node.ty)? {
            let member_node = match canonicalize(self.provider, self.config, member.ty)? {
                Canonical::Node(n) => n,
                Canonical::Opaque => continue,
            };
            if member_nodes.iter().any(|n| n.ty == member_node.ty) {
                continue;
            }
            if self.known.contains(member_node.ty) || self.contains(member_node.ty) {
                continue;
            }
            member_nodes.push(member_node);
        }

        // Enum members are terminal and appended directly; composite members
        // recurse before the next root is considered.
        for member_node in &member_nodes {
            if member_node.kind == NodeKind::Enum && !self.contains(member_node.ty) {
                trace!(ty = member_node.ty.raw(), "discovered enum member node");
                self.nodes.push(*member_node);
            }
        }
        for member_node in &member_nodes {
            if member_node.kind == NodeKind::Composite {
                self.walk(member_node.ty)?;
            }
        }

        Ok(())
    }
}

/// Discover the graph for an ordered sequence of roots with a fresh walker.
///
/// Deterministic for a fixed input order and a fixed provider.
pub fn discover(
    provider: &dyn TypeMetadata,
    config: &GenerateConfig,
    known: &KnownTypes,
    roots: &[TypeRef],
) -> Result<Vec<GraphNode>, MetadataError> {
    let mut walker = GraphWalker::new(provider, config, known);
    for root in roots {
        walker.walk(*root)?;
    }
    Ok(walker.into_nodes())
}
