//! Type classification.
//!
//! [`classify`] reduces a host type to the closed set of shapes the target
//! system can express. The rules run in a fixed priority order; notably,
//! map-shaped types are detected before general sequences (maps are also
//! enumerable) and awaitable/result wrappers are unwrapped to their payload
//! before any shape detection.

use crate::config::GenerateConfig;
use crate::error::MetadataError;
use crate::provider::{PrimitiveKind, TypeMetadata, TypeRef};

/// The shape of a host type, as seen by the target type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not representable: synthetic, explicitly excluded, or the host's
    /// untyped placeholder. Never expanded; referencing fields render as the
    /// untyped placeholder name.
    Excluded,
    /// A primitive of the given kind.
    Primitive(PrimitiveKind),
    /// The host string type.
    Str,
    /// A date/time type. Terminal; renders as the untyped placeholder.
    DateLike,
    /// A globally-unique-identifier type. Terminal; renders as a string.
    Identifier,
    /// A nullable-value wrapper around the inner type.
    Nullable(TypeRef),
    /// An array with the given element type.
    Array(TypeRef),
    /// A general sequence/collection with the given element type.
    Collection(TypeRef),
    /// A map-shaped type with key and value types. Opaque: never expanded
    /// into a declaration of its own.
    Map(TypeRef, TypeRef),
    /// An enum type.
    Enum,
    /// A record/class-shaped type with named members.
    Composite,
}

/// Classify one type. Pure given the provider's answers.
///
/// Fails only when the provider cannot answer a required structural query,
/// in particular when a sequence-shaped type has no generic argument at any
/// level of its inheritance chain.
pub fn classify(
    provider: &dyn TypeMetadata,
    config: &GenerateConfig,
    ty: TypeRef,
) -> Result<Classification, MetadataError> {
    let mut ty = ty;
    loop {
        if provider.is_synthetic(ty) {
            return Ok(Classification::Excluded);
        }

        // Explicit exclusion overrides every shape rule.
        if config.is_excluded_type(ty) {
            return Ok(Classification::Excluded);
        }
        if config.has_exclude_patterns() && config.matches_exclude(&provider.qualified_name(ty)?) {
            return Ok(Classification::Excluded);
        }

        if provider.is_string(ty) {
            return Ok(Classification::Str);
        }
        if provider.is_date_like(ty) {
            return Ok(Classification::DateLike);
        }
        if provider.is_identifier(ty) {
            return Ok(Classification::Identifier);
        }
        if provider.is_untyped(ty) {
            return Ok(Classification::Excluded);
        }
        if let Some(kind) = provider.primitive_kind(ty) {
            return Ok(Classification::Primitive(kind));
        }

        // Awaitable/result wrappers are transparent; re-run the full rule
        // chain on the payload to handle nested wrappers.
        if let Some(payload) = provider.wrapper_payload(ty) {
            ty = payload;
            continue;
        }

        if let Some(inner) = provider.nullable_inner(ty) {
            return Ok(Classification::Nullable(inner));
        }
        if let Some(element) = provider.array_element(ty) {
            return Ok(Classification::Array(element));
        }

        // Maps are also enumerable; this check must precede the sequence one.
        if let Some((key, value)) = provider.map_args(ty) {
            return Ok(Classification::Map(key, value));
        }

        if provider.is_sequence(ty) {
            let element = provider.generic_args(ty)?.first().copied().ok_or_else(|| {
                let name = provider
                    .display_name(ty)
                    .unwrap_or_else(|_| "<unknown>".to_string());
                MetadataError::MissingElementType(name)
            })?;
            return Ok(Classification::Collection(element));
        }

        if provider.is_enum(ty) {
            return Ok(Classification::Enum);
        }

        return Ok(Classification::Composite);
    }
}
