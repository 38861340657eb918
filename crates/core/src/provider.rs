//! The type metadata provider contract.
//!
//! The translator core never inspects a host type system directly. Every
//! structural question ("what members does this type declare?", "is this a
//! nullable wrapper?", "what does this metadata source contain?") goes
//! through the [`TypeMetadata`] trait. Any host with structural introspection
//! (reflection, a schema registry, parsed source ASTs) can implement it; the
//! crate ships [`crate::registry::TypeRegistry`] as a declarative in-memory
//! implementation.

use crate::error::MetadataError;

/// Opaque handle to one type in the host's type system.
///
/// Handles are minted by the provider; two handles refer to the same type
/// exactly when they compare equal. The core never fabricates handles and
/// never looks inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(u32);

impl TypeRef {
    /// Build a handle from a provider-assigned index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The provider-assigned index backing this handle.
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Primitive kind of a host type, as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Boolean primitive.
    Bool,
    /// Character primitive (renders as a string in the target system).
    Char,
    /// Integral numeric primitive.
    Integer,
    /// Floating-point or decimal numeric primitive.
    Float,
}

/// One declared member of a composite type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// The member name as declared by the host.
    pub name: String,
    /// The member's declared type.
    pub ty: TypeRef,
    /// Whether the element type of an array/sequence-shaped member is a
    /// nullable wrapper; `false` for non-collection members. The renderer
    /// derives field optionality from the member type itself, so this is
    /// informational for hosts whose member metadata carries it.
    pub element_nullable: bool,
}

/// One member of an enum type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberInfo {
    /// The member name as declared by the host.
    pub name: String,
    /// The member's underlying integer value.
    pub value: i64,
}

/// Structural questions the translator core asks about host types.
///
/// Implementations must be read-only and answer deterministically for the
/// duration of one generation run. Predicate methods are infallible; queries
/// that can genuinely fail (unknown handle, shape mismatch, missing generic
/// argument) return [`MetadataError`].
pub trait TypeMetadata {
    /// Simple (declaration-site) name of a type, e.g. `Item`.
    fn display_name(&self, ty: TypeRef) -> Result<String, MetadataError>;

    /// Fully qualified name used for include/exclude pattern matching,
    /// e.g. `Demo.Models.Item`.
    fn qualified_name(&self, ty: TypeRef) -> Result<String, MetadataError>;

    /// Declared members of a composite type, in declaration order.
    ///
    /// Fails with [`MetadataError::NotComposite`] for anything that has no
    /// named members.
    fn members(&self, ty: TypeRef) -> Result<Vec<MemberInfo>, MetadataError>;

    /// Members of an enum type with their integer values, in declaration
    /// order.
    fn enum_members(&self, ty: TypeRef) -> Result<Vec<EnumMemberInfo>, MetadataError>;

    /// Primitive kind, if the type is a primitive.
    fn primitive_kind(&self, ty: TypeRef) -> Option<PrimitiveKind>;

    /// Whether the type is the host's string type.
    fn is_string(&self, ty: TypeRef) -> bool;

    /// Whether the type is a date/time type (no cross-system date contract is
    /// assumed; these render as the untyped placeholder).
    fn is_date_like(&self, ty: TypeRef) -> bool;

    /// Whether the type is a globally-unique-identifier type.
    fn is_identifier(&self, ty: TypeRef) -> bool;

    /// Whether the type is the host's untyped/opaque placeholder
    /// (`object`, `void` and friends).
    fn is_untyped(&self, ty: TypeRef) -> bool;

    /// Whether the type is an enum.
    fn is_enum(&self, ty: TypeRef) -> bool;

    /// Whether the type is compiler-synthesized or anonymous. Such types are
    /// never representable, regardless of shape.
    fn is_synthetic(&self, ty: TypeRef) -> bool;

    /// Payload of an awaitable/result container wrapper (`Task<T>`,
    /// `ActionResult<T>` analogs), or `None` if the type is not one.
    fn wrapper_payload(&self, ty: TypeRef) -> Option<TypeRef>;

    /// Inner type of a nullable-value wrapper, or `None`.
    fn nullable_inner(&self, ty: TypeRef) -> Option<TypeRef>;

    /// Element type of an array type, or `None`.
    fn array_element(&self, ty: TypeRef) -> Option<TypeRef>;

    /// Key and value types of a map-shaped type (dictionary interfaces,
    /// key/value pair enumerations), or `None`.
    fn map_args(&self, ty: TypeRef) -> Option<(TypeRef, TypeRef)>;

    /// Whether the type implements a general sequence/enumerable interface.
    /// Map-shaped types may report `true` here too; callers check
    /// [`Self::map_args`] first.
    fn is_sequence(&self, ty: TypeRef) -> bool;

    /// Generic type arguments, searching up the inheritance chain when the
    /// immediate type supplies none. An empty result is a valid answer; the
    /// classifier turns it into a diagnosable failure where an element type
    /// was required.
    fn generic_args(&self, ty: TypeRef) -> Result<Vec<TypeRef>, MetadataError>;

    /// All types declared in one named metadata source (assembly analog),
    /// used for include-pattern scanning. Unknown sources yield an empty
    /// list.
    fn types_in_source(&self, source: &str) -> Vec<TypeRef>;
}
