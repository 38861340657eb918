//! Declarative in-memory metadata provider.
//!
//! [`TypeRegistry`] lets a host describe its type system to the translator
//! without any live reflection: built-in primitives are pre-minted, derived
//! shapes (nullable, array, sequence, map, wrapper) are interned so repeated
//! construction yields the same handle, and named composites and enums are
//! declared member by member. It backs every test in this crate and is the
//! reference implementation of [`TypeMetadata`].

use std::collections::HashMap;

use crate::error::MetadataError;
use crate::provider::{EnumMemberInfo, MemberInfo, PrimitiveKind, TypeMetadata, TypeRef};

/// Pre-minted built-in types, in minting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Bool,
    Char,
    Int,
    Float,
    Str,
    DateTime,
    Uuid,
    Untyped,
}

const BUILTINS: [Builtin; 8] = [
    Builtin::Bool,
    Builtin::Char,
    Builtin::Int,
    Builtin::Float,
    Builtin::Str,
    Builtin::DateTime,
    Builtin::Uuid,
    Builtin::Untyped,
];

impl Builtin {
    fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::DateTime => "DateTime",
            Self::Uuid => "Guid",
            Self::Untyped => "object",
        }
    }
}

/// Interning key for derived shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum InternKey {
    Nullable(TypeRef),
    Array(TypeRef),
    Sequence(TypeRef),
    Map(TypeRef, TypeRef),
    Wrapper(TypeRef),
}

#[derive(Debug, Clone)]
enum TypeKind {
    Builtin(Builtin),
    Nullable(TypeRef),
    Array(TypeRef),
    Sequence(TypeRef),
    Map(TypeRef, TypeRef),
    Wrapper(TypeRef),
    Struct {
        name: String,
        source: Option<String>,
        fields: Vec<MemberInfo>,
    },
    Enum {
        name: String,
        source: Option<String>,
        members: Vec<EnumMemberInfo>,
    },
    Synthetic {
        name: String,
    },
    /// A sequence-shaped type that exposes no element type anywhere.
    OpaqueSequence {
        name: String,
    },
}

/// Declarative, in-memory [`TypeMetadata`] provider.
#[derive(Debug)]
pub struct TypeRegistry {
    types: Vec<TypeKind>,
    interned: HashMap<InternKey, TypeRef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry with the built-in primitives pre-minted.
    pub fn new() -> Self {
        Self {
            types: BUILTINS.iter().copied().map(TypeKind::Builtin).collect(),
            interned: HashMap::new(),
        }
    }

    fn builtin(&self, which: Builtin) -> TypeRef {
        // Builtins are minted in declaration order at construction.
        let index = self
            .types
            .iter()
            .position(|kind| matches!(kind, TypeKind::Builtin(b) if *b == which))
            .unwrap_or(0);
        TypeRef::from_raw(u32::try_from(index).unwrap_or(0))
    }

    /// The boolean primitive.
    pub fn boolean(&self) -> TypeRef {
        self.builtin(Builtin::Bool)
    }

    /// The character primitive.
    pub fn char(&self) -> TypeRef {
        self.builtin(Builtin::Char)
    }

    /// The integral numeric primitive.
    pub fn int(&self) -> TypeRef {
        self.builtin(Builtin::Int)
    }

    /// The floating-point numeric primitive.
    pub fn float(&self) -> TypeRef {
        self.builtin(Builtin::Float)
    }

    /// The string type.
    pub fn string(&self) -> TypeRef {
        self.builtin(Builtin::Str)
    }

    /// The date/time type.
    pub fn date_time(&self) -> TypeRef {
        self.builtin(Builtin::DateTime)
    }

    /// The globally-unique-identifier type.
    pub fn uuid(&self) -> TypeRef {
        self.builtin(Builtin::Uuid)
    }

    /// The untyped/opaque placeholder type.
    pub fn untyped(&self) -> TypeRef {
        self.builtin(Builtin::Untyped)
    }

    fn mint(&mut self, kind: TypeKind) -> TypeRef {
        let raw = u32::try_from(self.types.len()).unwrap_or(u32::MAX);
        self.types.push(kind);
        TypeRef::from_raw(raw)
    }

    fn intern(&mut self, key: InternKey, kind: TypeKind) -> TypeRef {
        if let Some(existing) = self.interned.get(&key) {
            return *existing;
        }
        let ty = self.mint(kind);
        self.interned.insert(key, ty);
        ty
    }

    /// The nullable-value wrapper of `inner`. Interned.
    pub fn nullable_of(&mut self, inner: TypeRef) -> TypeRef {
        self.intern(InternKey::Nullable(inner), TypeKind::Nullable(inner))
    }

    /// The array type with element `element`. Interned.
    pub fn array_of(&mut self, element: TypeRef) -> TypeRef {
        self.intern(InternKey::Array(element), TypeKind::Array(element))
    }

    /// A generic sequence (list) of `element`. Interned.
    pub fn sequence_of(&mut self, element: TypeRef) -> TypeRef {
        self.intern(InternKey::Sequence(element), TypeKind::Sequence(element))
    }

    /// A map from `key` to `value`. Interned.
    pub fn map_of(&mut self, key: TypeRef, value: TypeRef) -> TypeRef {
        self.intern(InternKey::Map(key, value), TypeKind::Map(key, value))
    }

    /// An awaitable/result container around `payload`. Interned.
    pub fn wrapper_of(&mut self, payload: TypeRef) -> TypeRef {
        self.intern(InternKey::Wrapper(payload), TypeKind::Wrapper(payload))
    }

    /// Define a composite type with the given fields, outside any named
    /// metadata source.
    pub fn define_struct(&mut self, name: &str, fields: &[(&str, TypeRef)]) -> TypeRef {
        self.define_struct_inner(None, name, fields)
    }

    /// Define a composite type inside a named metadata source.
    pub fn define_struct_in(
        &mut self,
        source: &str,
        name: &str,
        fields: &[(&str, TypeRef)],
    ) -> TypeRef {
        self.define_struct_inner(Some(source.to_string()), name, fields)
    }

    fn define_struct_inner(
        &mut self,
        source: Option<String>,
        name: &str,
        fields: &[(&str, TypeRef)],
    ) -> TypeRef {
        let fields = fields
            .iter()
            .map(|(field_name, ty)| MemberInfo {
                name: (*field_name).to_string(),
                ty: *ty,
                element_nullable: self.element_nullable(*ty),
            })
            .collect();
        self.mint(TypeKind::Struct {
            name: name.to_string(),
            source,
            fields,
        })
    }

    /// Whether an array/sequence-shaped type's element is a nullable wrapper.
    fn element_nullable(&self, ty: TypeRef) -> bool {
        match self.kind_opt(ty) {
            Some(TypeKind::Array(element) | TypeKind::Sequence(element)) => {
                matches!(self.kind_opt(*element), Some(TypeKind::Nullable(_)))
            }
            _ => false,
        }
    }

    /// Declare a composite type with no fields yet; fields are added with
    /// [`Self::add_field`]. This is how cyclic shapes are built.
    pub fn declare_struct(&mut self, name: &str) -> TypeRef {
        self.define_struct(name, &[])
    }

    /// Append a field to a previously declared composite type.
    pub fn add_field(
        &mut self,
        ty: TypeRef,
        name: &str,
        field_ty: TypeRef,
    ) -> Result<(), MetadataError> {
        let display = self.display_name(ty)?;
        let element_nullable = self.element_nullable(field_ty);
        let index = usize::try_from(ty.raw()).map_err(|_| MetadataError::UnknownType(ty))?;
        match self.types.get_mut(index) {
            Some(TypeKind::Struct { fields, .. }) => {
                fields.push(MemberInfo {
                    name: name.to_string(),
                    ty: field_ty,
                    element_nullable,
                });
                Ok(())
            }
            Some(_) => Err(MetadataError::NotComposite(display)),
            None => Err(MetadataError::UnknownType(ty)),
        }
    }

    /// Define an enum type with `(name, value)` members, outside any named
    /// metadata source.
    pub fn define_enum(&mut self, name: &str, members: &[(&str, i64)]) -> TypeRef {
        self.define_enum_inner(None, name, members)
    }

    /// Define an enum type inside a named metadata source.
    pub fn define_enum_in(
        &mut self,
        source: &str,
        name: &str,
        members: &[(&str, i64)],
    ) -> TypeRef {
        self.define_enum_inner(Some(source.to_string()), name, members)
    }

    fn define_enum_inner(
        &mut self,
        source: Option<String>,
        name: &str,
        members: &[(&str, i64)],
    ) -> TypeRef {
        let members = members
            .iter()
            .map(|(member_name, value)| EnumMemberInfo {
                name: (*member_name).to_string(),
                value: *value,
            })
            .collect();
        self.mint(TypeKind::Enum {
            name: name.to_string(),
            source,
            members,
        })
    }

    /// Define a compiler-synthesized/anonymous type.
    pub fn define_synthetic(&mut self, name: &str) -> TypeRef {
        self.mint(TypeKind::Synthetic {
            name: name.to_string(),
        })
    }

    /// Define a sequence-shaped type that exposes no element type at any
    /// level, the non-generic collection case.
    pub fn define_opaque_sequence(&mut self, name: &str) -> TypeRef {
        self.mint(TypeKind::OpaqueSequence {
            name: name.to_string(),
        })
    }

    fn kind(&self, ty: TypeRef) -> Result<&TypeKind, MetadataError> {
        self.kind_opt(ty).ok_or(MetadataError::UnknownType(ty))
    }

    fn kind_opt(&self, ty: TypeRef) -> Option<&TypeKind> {
        self.types.get(usize::try_from(ty.raw()).ok()?)
    }
}

impl TypeMetadata for TypeRegistry {
    fn display_name(&self, ty: TypeRef) -> Result<String, MetadataError> {
        let name = match self.kind(ty)? {
            TypeKind::Builtin(builtin) => builtin.name().to_string(),
            TypeKind::Nullable(inner) => format!("{}?", self.display_name(*inner)?),
            TypeKind::Array(element) => format!("{}[]", self.display_name(*element)?),
            TypeKind::Sequence(element) => format!("List<{}>", self.display_name(*element)?),
            TypeKind::Map(key, value) => format!(
                "Dictionary<{}, {}>",
                self.display_name(*key)?,
                self.display_name(*value)?
            ),
            TypeKind::Wrapper(payload) => format!("Task<{}>", self.display_name(*payload)?),
            TypeKind::Struct { name, .. }
            | TypeKind::Enum { name, .. }
            | TypeKind::Synthetic { name }
            | TypeKind::OpaqueSequence { name } => name.clone(),
        };
        Ok(name)
    }

    fn qualified_name(&self, ty: TypeRef) -> Result<String, MetadataError> {
        match self.kind(ty)? {
            TypeKind::Struct {
                name,
                source: Some(source),
                ..
            }
            | TypeKind::Enum {
                name,
                source: Some(source),
                ..
            } => Ok(format!("{source}.{name}")),
            _ => self.display_name(ty),
        }
    }

    fn members(&self, ty: TypeRef) -> Result<Vec<MemberInfo>, MetadataError> {
        match self.kind(ty)? {
            TypeKind::Struct { fields, .. } => Ok(fields.clone()),
            _ => Err(MetadataError::NotComposite(self.display_name(ty)?)),
        }
    }

    fn enum_members(&self, ty: TypeRef) -> Result<Vec<EnumMemberInfo>, MetadataError> {
        match self.kind(ty)? {
            TypeKind::Enum { members, .. } => Ok(members.clone()),
            _ => Err(MetadataError::NotEnum(self.display_name(ty)?)),
        }
    }

    fn primitive_kind(&self, ty: TypeRef) -> Option<PrimitiveKind> {
        match self.kind_opt(ty)? {
            TypeKind::Builtin(Builtin::Bool) => Some(PrimitiveKind::Bool),
            TypeKind::Builtin(Builtin::Char) => Some(PrimitiveKind::Char),
            TypeKind::Builtin(Builtin::Int) => Some(PrimitiveKind::Integer),
            TypeKind::Builtin(Builtin::Float) => Some(PrimitiveKind::Float),
            _ => None,
        }
    }

    fn is_string(&self, ty: TypeRef) -> bool {
        matches!(self.kind_opt(ty), Some(TypeKind::Builtin(Builtin::Str)))
    }

    fn is_date_like(&self, ty: TypeRef) -> bool {
        matches!(self.kind_opt(ty), Some(TypeKind::Builtin(Builtin::DateTime)))
    }

    fn is_identifier(&self, ty: TypeRef) -> bool {
        matches!(self.kind_opt(ty), Some(TypeKind::Builtin(Builtin::Uuid)))
    }

    fn is_untyped(&self, ty: TypeRef) -> bool {
        matches!(self.kind_opt(ty), Some(TypeKind::Builtin(Builtin::Untyped)))
    }

    fn is_enum(&self, ty: TypeRef) -> bool {
        matches!(self.kind_opt(ty), Some(TypeKind::Enum { .. }))
    }

    fn is_synthetic(&self, ty: TypeRef) -> bool {
        matches!(self.kind_opt(ty), Some(TypeKind::Synthetic { .. }))
    }

    fn wrapper_payload(&self, ty: TypeRef) -> Option<TypeRef> {
        match self.kind_opt(ty)? {
            TypeKind::Wrapper(payload) => Some(*payload),
            _ => None,
        }
    }

    fn nullable_inner(&self, ty: TypeRef) -> Option<TypeRef> {
        match self.kind_opt(ty)? {
            TypeKind::Nullable(inner) => Some(*inner),
            _ => None,
        }
    }

    fn array_element(&self, ty: TypeRef) -> Option<TypeRef> {
        match self.kind_opt(ty)? {
            TypeKind::Array(element) => Some(*element),
            _ => None,
        }
    }

    fn map_args(&self, ty: TypeRef) -> Option<(TypeRef, TypeRef)> {
        match self.kind_opt(ty)? {
            TypeKind::Map(key, value) => Some((*key, *value)),
            _ => None,
        }
    }

    fn is_sequence(&self, ty: TypeRef) -> bool {
        matches!(
            self.kind_opt(ty),
            Some(TypeKind::Sequence(_) | TypeKind::Map(..) | TypeKind::OpaqueSequence { .. })
        )
    }

    fn generic_args(&self, ty: TypeRef) -> Result<Vec<TypeRef>, MetadataError> {
        let args = match self.kind(ty)? {
            TypeKind::Sequence(element) => vec![*element],
            TypeKind::Map(key, value) => vec![*key, *value],
            TypeKind::Wrapper(payload) => vec![*payload],
            TypeKind::Nullable(inner) => vec![*inner],
            _ => Vec::new(),
        };
        Ok(args)
    }

    fn types_in_source(&self, source: &str) -> Vec<TypeRef> {
        self.types
            .iter()
            .enumerate()
            .filter_map(|(index, kind)| match kind {
                TypeKind::Struct {
                    source: Some(declared),
                    ..
                }
                | TypeKind::Enum {
                    source: Some(declared),
                    ..
                } if declared.as_str() == source => {
                    Some(TypeRef::from_raw(u32::try_from(index).unwrap_or(u32::MAX)))
                }
                _ => None,
            })
            .collect()
    }
}
