//! Target-side name rendering.
//!
//! Maps classified host types to TypeScript type-name strings and host member
//! names to the target naming convention. Nullability is not part of a type
//! name; it is signaled at the field-declaration site by the renderer.

use crate::classify::{classify, Classification};
use crate::config::GenerateConfig;
use crate::error::MetadataError;
use crate::graph::KnownTypes;
use crate::provider::{PrimitiveKind, TypeMetadata, TypeRef};

/// The target's untyped placeholder, used for anything filtered out of the
/// graph but still referenced by a field.
pub const UNTYPED_NAME: &str = "any";

/// Render the declaration-time type name for a host type.
///
/// Composite and enum types render by simple name only when they are in the
/// known-type set; otherwise they fall back to the untyped placeholder,
/// never to a broken reference.
pub fn type_name(
    provider: &dyn TypeMetadata,
    config: &GenerateConfig,
    known: &KnownTypes,
    ty: TypeRef,
) -> Result<String, MetadataError> {
    let name = match classify(provider, config, ty)? {
        Classification::Excluded | Classification::DateLike => UNTYPED_NAME.to_string(),
        Classification::Primitive(PrimitiveKind::Bool) => "boolean".to_string(),
        Classification::Primitive(PrimitiveKind::Char)
        | Classification::Str
        | Classification::Identifier => "string".to_string(),
        Classification::Primitive(_) => "number".to_string(),
        Classification::Nullable(inner) => type_name(provider, config, known, inner)?,
        Classification::Array(element) | Classification::Collection(element) => {
            format!("{}[]", type_name(provider, config, known, element)?)
        }
        Classification::Map(key, value) => format!(
            "Map<{}, {}>",
            type_name(provider, config, known, key)?,
            type_name(provider, config, known, value)?
        ),
        Classification::Enum | Classification::Composite => {
            if known.contains(ty) {
                provider.display_name(ty)?
            } else {
                UNTYPED_NAME.to_string()
            }
        }
    };
    Ok(name)
}

/// Render a host member name in the target convention: lower the first
/// character only; names of a single character are fully lower-cased.
pub fn field_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let rest = chars.as_str();
            if rest.is_empty() {
                first.to_lowercase().collect()
            } else {
                first.to_lowercase().chain(rest.chars()).collect()
            }
        }
    }
}
