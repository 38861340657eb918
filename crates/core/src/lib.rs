//! Translate a host type graph into TypeScript declaration files.
//!
//! Given a set of root types and a [`provider::TypeMetadata`] implementation
//! describing the host's type system, the generator discovers every
//! representable composite and enum type transitively reachable through
//! declared members and renders one `export interface` / `export const enum`
//! declaration per type, either concatenated into a single `models.d.ts`
//! stream or as one file per type with import lines.
//!
//! ```
//! use declgen_core::{Generator, GenerateConfig, MemorySink, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let string = registry.string();
//! let item = registry.define_struct("Item", &[("Name", string)]);
//!
//! let config = GenerateConfig::builder().build()?;
//! let mut generator = Generator::new(&registry, config);
//! let mut sink = MemorySink::new();
//! generator.run(&[item], &mut sink)?;
//!
//! assert_eq!(
//!     sink.stream("models.d.ts"),
//!     Some("export interface Item {\n    name: string;\n}\n"),
//! );
//! # Ok::<(), declgen_core::GenerateError>(())
//! ```

pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod graph;
pub mod names;
pub mod provider;
pub mod registry;
pub mod render;

pub use classify::{classify, Classification};
pub use config::{GenerateConfig, GenerateConfigBuilder, GenerateOptions};
pub use emit::{FsSink, Generator, MemorySink, OutputSink, SINGLE_FILE_NAME};
pub use error::{ConfigError, GenerateError, MetadataError, SinkError};
pub use graph::{GraphNode, GraphWalker, KnownTypes, NodeKind};
pub use provider::{EnumMemberInfo, MemberInfo, PrimitiveKind, TypeMetadata, TypeRef};
pub use registry::TypeRegistry;
pub use render::RenderedDeclaration;
