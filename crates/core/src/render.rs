//! Declaration rendering.
//!
//! Turns one discovered graph node into declaration text plus the set of
//! other declarations it references (used for import lines in multi-file
//! output). Rendering is pure string building; all structural decisions were
//! made by classification and discovery.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::classify::{classify, Classification};
use crate::config::GenerateConfig;
use crate::error::MetadataError;
use crate::graph::{canonicalize, Canonical, GraphNode, KnownTypes, NodeKind};
use crate::names;
use crate::provider::{TypeMetadata, TypeRef};

/// One rendered declaration, ready for the output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDeclaration {
    /// Simple name of the declared type; doubles as the stream name in
    /// multi-file output.
    pub type_name: String,
    /// Full declaration body, terminated with a newline.
    pub body: String,
    /// Simple names of other known declarations referenced by the body.
    /// Ordered for deterministic import lines.
    pub dependencies: BTreeSet<String>,
}

/// Render one graph node, or `None` when there is nothing to emit (a
/// composite that became excluded through configuration between discovery
/// and render).
pub fn render_node(
    provider: &dyn TypeMetadata,
    config: &GenerateConfig,
    known: &KnownTypes,
    node: GraphNode,
) -> Result<Option<RenderedDeclaration>, MetadataError> {
    match node.kind {
        NodeKind::Enum => render_enum(provider, node.ty).map(Some),
        NodeKind::Composite => render_composite(provider, config, known, node.ty),
    }
}

fn render_enum(
    provider: &dyn TypeMetadata,
    ty: TypeRef,
) -> Result<RenderedDeclaration, MetadataError> {
    let type_name = provider.display_name(ty)?;
    let members = provider.enum_members(ty)?;

    let mut body = format!("export const enum {type_name} {{\n");
    let last = members.len().saturating_sub(1);
    for (index, member) in members.iter().enumerate() {
        let separator = if index < last { "," } else { "" };
        let _ = writeln!(body, "    {} = {}{}", member.name, member.value, separator);
    }
    body.push_str("}\n");

    Ok(RenderedDeclaration {
        type_name,
        body,
        dependencies: BTreeSet::new(),
    })
}

fn render_composite(
    provider: &dyn TypeMetadata,
    config: &GenerateConfig,
    known: &KnownTypes,
    ty: TypeRef,
) -> Result<Option<RenderedDeclaration>, MetadataError> {
    // Defensive re-canonicalization: a composite may become excluded through
    // configuration changes between discovery and render.
    let ty = match canonicalize(provider, config, ty)? {
        Canonical::Node(node) => node.ty,
        Canonical::Opaque => return Ok(None),
    };

    let type_name = provider.display_name(ty)?;
    let mut dependencies = BTreeSet::new();
    let mut body = format!("export interface {type_name} {{\n");

    for member in provider.members(ty)? {
        let nullable = matches!(
            classify(provider, config, member.ty)?,
            Classification::Nullable(_)
        );
        let rendered_type = names::type_name(provider, config, known, member.ty)?;
        let _ = writeln!(
            body,
            "    {}{}: {};",
            names::field_name(&member.name),
            if nullable { "?" } else { "" },
            rendered_type
        );

        // Dependency detection runs on the canonical member type, so that a
        // collection-of-X member depends on X.
        if let Canonical::Node(member_node) = canonicalize(provider, config, member.ty)? {
            if known.contains(member_node.ty) {
                let dependency = provider.display_name(member_node.ty)?;
                if dependency != type_name {
                    dependencies.insert(dependency);
                }
            }
        }
    }

    body.push_str("}\n");

    Ok(Some(RenderedDeclaration {
        type_name,
        body,
        dependencies,
    }))
}
