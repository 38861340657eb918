//! Emission driver and output sinks.
//!
//! [`Generator`] orchestrates root collection, graph discovery, declaration
//! rendering, and writing. All I/O is delegated to an [`OutputSink`]; the
//! driver never touches the filesystem itself, which keeps the whole pipeline
//! testable against [`MemorySink`].

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;

use tracing::debug;

use crate::config::GenerateConfig;
use crate::error::{GenerateError, SinkError};
use crate::graph::{canonicalize, Canonical, GraphWalker, KnownTypes};
use crate::provider::{TypeMetadata, TypeRef};
use crate::render::render_node;

/// Stream name used in single-file mode.
pub const SINGLE_FILE_NAME: &str = "models.d.ts";

/// Extension appended to per-type stream names in multi-file mode.
const DECLARATION_EXTENSION: &str = ".d.ts";

/// Receiver of rendered declaration text.
///
/// The driver opens exactly one stream at a time: one for the whole run in
/// single-file mode, or one per declaration in multi-file mode.
pub trait OutputSink {
    /// Open a named stream for writing, replacing any previous content.
    fn open(&mut self, stream_id: &str) -> Result<(), SinkError>;

    /// Append text to the currently open stream.
    fn write(&mut self, text: &str) -> Result<(), SinkError>;

    /// Flush and release the currently open stream.
    fn close(&mut self) -> Result<(), SinkError>;
}

/// Filesystem sink: each stream is a file under the output directory, which
/// is created on first open if missing.
#[derive(Debug)]
pub struct FsSink {
    dir: PathBuf,
    current: Option<(String, BufWriter<File>)>,
}

impl FsSink {
    /// A sink rooted at the given output directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: None,
        }
    }
}

impl OutputSink for FsSink {
    fn open(&mut self, stream_id: &str) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir).map_err(|source| SinkError::Open {
            stream_id: stream_id.to_string(),
            source,
        })?;
        let file = File::create(self.dir.join(stream_id)).map_err(|source| SinkError::Open {
            stream_id: stream_id.to_string(),
            source,
        })?;
        self.current = Some((stream_id.to_string(), BufWriter::new(file)));
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), SinkError> {
        let (stream_id, writer) = self.current.as_mut().ok_or(SinkError::NotOpen)?;
        writer
            .write_all(text.as_bytes())
            .map_err(|source| SinkError::Write {
                stream_id: stream_id.clone(),
                source,
            })
    }

    fn close(&mut self) -> Result<(), SinkError> {
        let (stream_id, mut writer) = self.current.take().ok_or(SinkError::NotOpen)?;
        writer
            .flush()
            .map_err(|source| SinkError::Close { stream_id, source })
    }
}

/// In-memory sink capturing `(stream_id, contents)` pairs in open order.
#[derive(Debug, Default)]
pub struct MemorySink {
    streams: Vec<(String, String)>,
    open: bool,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All closed-or-open streams in the order they were opened.
    pub fn streams(&self) -> &[(String, String)] {
        &self.streams
    }

    /// Contents of a stream by name, if it was opened.
    pub fn stream(&self, stream_id: &str) -> Option<&str> {
        self.streams
            .iter()
            .find(|(id, _)| id == stream_id)
            .map(|(_, contents)| contents.as_str())
    }
}

impl OutputSink for MemorySink {
    fn open(&mut self, stream_id: &str) -> Result<(), SinkError> {
        self.streams.push((stream_id.to_string(), String::new()));
        self.open = true;
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        if let Some((_, contents)) = self.streams.last_mut() {
            contents.push_str(text);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        self.open = false;
        Ok(())
    }
}

/// The emission driver: walks the configured root set and writes one
/// declaration per representable type to the sink.
///
/// The known-type set is fresh per generator by default; hosts that want
/// cross-run memoization construct the next generator with
/// [`Generator::with_known_types`] using the set recovered from
/// [`Generator::into_known_types`].
pub struct Generator<'a> {
    provider: &'a dyn TypeMetadata,
    config: GenerateConfig,
    known: KnownTypes,
}

impl fmt::Debug for Generator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("known", &self.known)
            .finish_non_exhaustive()
    }
}

impl<'a> Generator<'a> {
    /// A generator with a fresh known-type set.
    pub fn new(provider: &'a dyn TypeMetadata, config: GenerateConfig) -> Self {
        Self::with_known_types(provider, config, KnownTypes::new())
    }

    /// A generator that carries over an accumulated known-type set from an
    /// earlier run. Types already in the set are never re-declared.
    pub fn with_known_types(
        provider: &'a dyn TypeMetadata,
        config: GenerateConfig,
        known: KnownTypes,
    ) -> Self {
        Self {
            provider,
            config,
            known,
        }
    }

    /// The known-type set in its current accumulated state.
    pub fn known_types(&self) -> &KnownTypes {
        &self.known
    }

    /// Consume the generator, recovering the accumulated known-type set.
    pub fn into_known_types(self) -> KnownTypes {
        self.known
    }

    /// Run one generation pass over the given roots, writing declarations to
    /// the sink.
    ///
    /// Any failure is fatal for the run; the known-type set keeps whatever it
    /// accumulated before the failure.
    pub fn run(
        &mut self,
        roots: &[TypeRef],
        sink: &mut dyn OutputSink,
    ) -> Result<(), GenerateError> {
        let roots = self.effective_roots(roots)?;
        debug!(roots = roots.len(), "collected effective root set");

        let mut walker = GraphWalker::new(self.provider, &self.config, &self.known);
        let mut walk_error = None;
        for root in &roots {
            if let Err(err) = walker.walk(*root) {
                walk_error = Some(err);
                break;
            }
        }
        let nodes = walker.into_nodes();
        debug!(nodes = nodes.len(), "discovered type graph");

        // Every discovered node becomes known before anything renders, so
        // declarations reference each other by name instead of falling back
        // to the untyped placeholder. Raw root forms are marked too, so a
        // later run handed the same wrapped root skips it outright.
        for node in &nodes {
            self.known.insert(node.ty);
        }
        for root in &roots {
            if let Ok(Canonical::Node(node)) = canonicalize(self.provider, &self.config, *root) {
                if self.known.contains(node.ty) {
                    self.known.insert(*root);
                }
            }
        }

        if let Some(err) = walk_error {
            return Err(err.into());
        }

        if self.config.single_file() {
            self.write_single_file(&nodes, sink)
        } else {
            self.write_per_type(&nodes, sink)
        }
    }

    /// Effective roots: caller-supplied roots, explicit includes, and
    /// pattern-scanned types, minus exclusions and already-known types, each
    /// unwrapped through the awaitable/result wrapper transform.
    fn effective_roots(&self, roots: &[TypeRef]) -> Result<Vec<TypeRef>, GenerateError> {
        let mut candidates: Vec<TypeRef> = roots.to_vec();
        candidates.extend_from_slice(self.config.include_types());

        if self.config.has_include_patterns() {
            for source in self.config.scan_sources() {
                for ty in self.provider.types_in_source(source) {
                    if self.config.matches_include(&self.provider.qualified_name(ty)?) {
                        candidates.push(ty);
                    }
                }
            }
        }

        let mut effective = Vec::new();
        for ty in candidates {
            if self.config.has_exclude_patterns()
                && self.config.matches_exclude(&self.provider.qualified_name(ty)?)
            {
                continue;
            }

            let mut ty = ty;
            while let Some(payload) = self.provider.wrapper_payload(ty) {
                ty = payload;
            }

            if self.config.is_excluded_type(ty)
                || self.known.contains(ty)
                || effective.contains(&ty)
            {
                continue;
            }
            effective.push(ty);
        }
        Ok(effective)
    }

    fn write_single_file(
        &self,
        nodes: &[crate::graph::GraphNode],
        sink: &mut dyn OutputSink,
    ) -> Result<(), GenerateError> {
        sink.open(SINGLE_FILE_NAME)?;
        let mut result: Result<(), GenerateError> = Ok(());
        for node in nodes {
            match render_node(self.provider, &self.config, &self.known, *node) {
                Ok(Some(decl)) => {
                    debug!(type_name = %decl.type_name, "emitting declaration");
                    if let Err(err) = sink.write(&decl.body) {
                        result = Err(err.into());
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    result = Err(err.into());
                    break;
                }
            }
        }
        // Close even when a write failed; surface the first error.
        let close_result = sink.close();
        result?;
        close_result?;
        Ok(())
    }

    fn write_per_type(
        &self,
        nodes: &[crate::graph::GraphNode],
        sink: &mut dyn OutputSink,
    ) -> Result<(), GenerateError> {
        for node in nodes {
            let Some(decl) = render_node(self.provider, &self.config, &self.known, *node)? else {
                continue;
            };
            debug!(type_name = %decl.type_name, "emitting declaration");
            sink.open(&format!("{}{}", decl.type_name, DECLARATION_EXTENSION))?;

            let mut result = Ok(());
            for dependency in &decl.dependencies {
                if let Err(err) = sink.write(&format!(
                    "import {{ {dependency} }} from \"./{dependency}{DECLARATION_EXTENSION}\";\n"
                )) {
                    result = Err(err);
                    break;
                }
            }
            if result.is_ok() && !decl.dependencies.is_empty() {
                result = sink.write("\n");
            }
            if result.is_ok() {
                result = sink.write(&decl.body);
            }

            let close_result = sink.close();
            result?;
            close_result?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;

    fn single_file_config() -> GenerateConfig {
        GenerateConfig::builder().build().unwrap()
    }

    /// The Result/Item/Map scenario: a root with an identifier, a list of
    /// composites, and an opaque dictionary member.
    fn scenario_registry() -> (TypeRegistry, TypeRef) {
        let mut r = TypeRegistry::new();
        let (guid, string, int) = (r.uuid(), r.string(), r.int());
        let nullable_int = r.nullable_of(int);
        let item = r.define_struct("Item", &[("Name", string), ("Value", nullable_int)]);
        let items = r.sequence_of(item);
        let map = r.map_of(string, string);
        let result = r.define_struct(
            "Result",
            &[("Id", guid), ("Items", items), ("Map", map)],
        );
        (r, result)
    }

    #[test]
    fn test_single_file_scenario() {
        let (r, result) = scenario_registry();
        let mut generator = Generator::new(&r, single_file_config());
        let mut sink = MemorySink::new();
        generator.run(&[result], &mut sink).unwrap();

        assert_eq!(sink.streams().len(), 1);
        let contents = sink.stream(SINGLE_FILE_NAME).unwrap();
        assert_eq!(
            contents,
            "export interface Result {\n    id: string;\n    items: Item[];\n    map: Map<string, string>;\n}\nexport interface Item {\n    name: string;\n    value?: number;\n}\n"
        );
    }

    #[test]
    fn test_multi_file_imports() {
        let (r, result) = scenario_registry();
        let config = GenerateConfig::builder().single_file(false).build().unwrap();
        let mut generator = Generator::new(&r, config);
        let mut sink = MemorySink::new();
        generator.run(&[result], &mut sink).unwrap();

        let ids: Vec<_> = sink.streams().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["Result.d.ts", "Item.d.ts"]);

        let result_file = sink.stream("Result.d.ts").unwrap();
        assert!(result_file.starts_with("import { Item } from \"./Item.d.ts\";\n\n"));
        assert!(result_file.contains("export interface Result {"));

        let item_file = sink.stream("Item.d.ts").unwrap();
        assert!(!item_file.contains("import"));
        assert!(item_file.starts_with("export interface Item {"));
    }

    #[test]
    fn test_wrapped_root_unwraps_to_payload() {
        let mut r = TypeRegistry::new();
        let string = r.string();
        let item = r.define_struct("Item", &[("Name", string)]);
        let task = r.wrapper_of(item);

        let mut generator = Generator::new(&r, single_file_config());
        let mut sink = MemorySink::new();
        generator.run(&[task], &mut sink).unwrap();

        let contents = sink.stream(SINGLE_FILE_NAME).unwrap();
        assert_eq!(contents, "export interface Item {\n    name: string;\n}\n");
    }

    #[test]
    fn test_pattern_excluded_root_renders_as_untyped_elsewhere() {
        let mut r = TypeRegistry::new();
        let secret = r.define_struct_in("models", "Secret", &[]);
        let holder = r.define_struct_in("models", "Holder", &[("Secret", secret)]);
        let config = GenerateConfig::builder()
            .exclude_pattern("^models\\.Secret$")
            .build()
            .unwrap();

        let mut generator = Generator::new(&r, config);
        let mut sink = MemorySink::new();
        generator.run(&[secret, holder], &mut sink).unwrap();

        let contents = sink.stream(SINGLE_FILE_NAME).unwrap();
        assert!(!contents.contains("export interface Secret"));
        assert!(contents.contains("    secret: any;\n"));
    }

    #[test]
    fn test_include_pattern_scanning() {
        let mut r = TypeRegistry::new();
        let string = r.string();
        let item = r.define_struct_in("models", "Item", &[("Name", string)]);
        let _other = r.define_struct_in("internals", "Hidden", &[]);
        let config = GenerateConfig::builder()
            .include_pattern("^models\\.")
            .scan_source("models")
            .build()
            .unwrap();

        let mut generator = Generator::new(&r, config);
        let mut sink = MemorySink::new();
        generator.run(&[], &mut sink).unwrap();

        let contents = sink.stream(SINGLE_FILE_NAME).unwrap();
        assert!(contents.contains("export interface Item {"));
        assert!(!contents.contains("Hidden"));
        assert!(generator.known_types().contains(item));
    }

    #[test]
    fn test_exclusion_precedence_over_include() {
        let mut r = TypeRegistry::new();
        let secret = r.define_struct_in("models", "Secret", &[]);
        let config = GenerateConfig::builder()
            .include_pattern("^models\\.")
            .scan_source("models")
            .exclude_type(secret)
            .build()
            .unwrap();

        let mut generator = Generator::new(&r, config);
        let mut sink = MemorySink::new();
        generator.run(&[], &mut sink).unwrap();
        assert_eq!(sink.stream(SINGLE_FILE_NAME).unwrap(), "");
    }

    #[test]
    fn test_cross_run_known_types_suppress_re_emission() {
        let mut r = TypeRegistry::new();
        let string = r.string();
        let item = r.define_struct("Item", &[("Name", string)]);
        let holder = r.define_struct("Holder", &[("Item", item)]);

        let mut first = Generator::new(&r, single_file_config());
        let mut sink = MemorySink::new();
        first.run(&[item], &mut sink).unwrap();
        let known = first.into_known_types();
        assert!(known.contains(item));

        let mut second = Generator::with_known_types(&r, single_file_config(), known);
        let mut sink = MemorySink::new();
        second.run(&[holder], &mut sink).unwrap();

        let contents = sink.stream(SINGLE_FILE_NAME).unwrap();
        // Item was declared by the earlier run: not re-emitted, but still
        // referenced by name.
        assert!(!contents.contains("export interface Item"));
        assert_eq!(
            contents,
            "export interface Holder {\n    item: Item;\n}\n"
        );
    }

    #[test]
    fn test_metadata_failure_preserves_known_types() {
        let mut r = TypeRegistry::new();
        let good = r.define_struct("Good", &[]);
        let bag = r.define_opaque_sequence("LegacyBag");
        let bad = r.define_struct("Bad", &[("Bag", bag)]);

        let mut generator = Generator::new(&r, single_file_config());
        let mut sink = MemorySink::new();
        let err = generator.run(&[good, bad], &mut sink).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Metadata(crate::error::MetadataError::MissingElementType(_))
        ));
        // Nothing was written, but the accumulated state is inspectable.
        assert!(sink.streams().is_empty());
        assert!(generator.known_types().contains(good));
    }

    /// Sink double whose writes always fail; records opens and closes.
    struct FailingWriteSink {
        opened: Vec<String>,
        closed: usize,
    }

    impl FailingWriteSink {
        fn new() -> Self {
            Self {
                opened: Vec::new(),
                closed: 0,
            }
        }
    }

    impl OutputSink for FailingWriteSink {
        fn open(&mut self, stream_id: &str) -> Result<(), SinkError> {
            self.opened.push(stream_id.to_string());
            Ok(())
        }

        fn write(&mut self, _text: &str) -> Result<(), SinkError> {
            Err(SinkError::Write {
                stream_id: self.opened.last().cloned().unwrap_or_default(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn close(&mut self) -> Result<(), SinkError> {
            self.closed += 1;
            Ok(())
        }
    }

    #[test]
    fn test_single_file_write_failure_propagates_and_closes_stream() {
        let (r, result) = scenario_registry();
        let mut generator = Generator::new(&r, single_file_config());
        let mut sink = FailingWriteSink::new();

        let err = generator.run(&[result], &mut sink).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Sink(SinkError::Write { ref stream_id, .. })
                if stream_id == SINGLE_FILE_NAME
        ));
        // The stream opened before the failed write is still closed.
        assert_eq!(sink.opened, vec![SINGLE_FILE_NAME.to_string()]);
        assert_eq!(sink.closed, 1);
    }

    #[test]
    fn test_per_type_write_failure_propagates_and_closes_stream() {
        let (r, result) = scenario_registry();
        let config = GenerateConfig::builder().single_file(false).build().unwrap();
        let mut generator = Generator::new(&r, config);
        let mut sink = FailingWriteSink::new();

        let err = generator.run(&[result], &mut sink).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Sink(SinkError::Write { ref stream_id, .. })
                if stream_id == "Result.d.ts"
        ));
        // Only the first declaration's stream was opened, and it was closed.
        assert_eq!(sink.opened, vec!["Result.d.ts".to_string()]);
        assert_eq!(sink.closed, 1);
    }

    #[test]
    fn test_fs_sink_writes_files() {
        let (r, result) = scenario_registry();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("types");

        let config = GenerateConfig::builder().single_file(false).build().unwrap();
        let mut generator = Generator::new(&r, config);
        let mut sink = FsSink::new(&out);
        generator.run(&[result], &mut sink).unwrap();

        let result_file = fs::read_to_string(out.join("Result.d.ts")).unwrap();
        assert!(result_file.starts_with("import { Item } from \"./Item.d.ts\";\n\n"));
        let item_file = fs::read_to_string(out.join("Item.d.ts")).unwrap();
        assert!(item_file.contains("value?: number;"));
    }

    #[test]
    fn test_fs_sink_write_without_open_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path());
        assert!(matches!(sink.write("x"), Err(SinkError::NotOpen)));
        assert!(matches!(sink.close(), Err(SinkError::NotOpen)));
    }
}
