//! Generation run configuration.
//!
//! A [`GenerateConfig`] is built once through [`GenerateConfigBuilder`] and
//! consumed immutably by a run. Include/exclude conflicts and malformed name
//! patterns are rejected when the config is built, never at generation time.
//! [`GenerateOptions`] is the declarative (serde-friendly) subset a host can
//! keep in its own configuration file.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::provider::TypeRef;

/// Validated, immutable configuration for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    single_file: bool,
    include_types: Vec<TypeRef>,
    exclude_types: Vec<TypeRef>,
    include_patterns: Vec<Regex>,
    exclude_patterns: Vec<Regex>,
    scan_sources: Vec<String>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            single_file: true,
            include_types: Vec::new(),
            exclude_types: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            scan_sources: Vec::new(),
        }
    }
}

impl GenerateConfig {
    /// Start building a configuration.
    pub fn builder() -> GenerateConfigBuilder {
        GenerateConfigBuilder::new()
    }

    /// Whether all declarations go into one concatenated stream.
    pub fn single_file(&self) -> bool {
        self.single_file
    }

    /// Explicitly included root types.
    pub fn include_types(&self) -> &[TypeRef] {
        &self.include_types
    }

    /// Metadata sources scanned for include-pattern matches.
    pub fn scan_sources(&self) -> &[String] {
        &self.scan_sources
    }

    /// Whether any include name patterns are configured.
    pub fn has_include_patterns(&self) -> bool {
        !self.include_patterns.is_empty()
    }

    /// Whether any exclude name patterns are configured.
    pub fn has_exclude_patterns(&self) -> bool {
        !self.exclude_patterns.is_empty()
    }

    /// Whether the type was explicitly excluded.
    pub fn is_excluded_type(&self, ty: TypeRef) -> bool {
        self.exclude_types.contains(&ty)
    }

    /// Whether a qualified name matches any include pattern.
    pub fn matches_include(&self, qualified_name: &str) -> bool {
        self.include_patterns.iter().any(|r| r.is_match(qualified_name))
    }

    /// Whether a qualified name matches any exclude pattern.
    pub fn matches_exclude(&self, qualified_name: &str) -> bool {
        self.exclude_patterns.iter().any(|r| r.is_match(qualified_name))
    }
}

/// Builder for [`GenerateConfig`]. Conflicting include/exclude entries and
/// invalid patterns surface from [`GenerateConfigBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct GenerateConfigBuilder {
    single_file: bool,
    include_types: Vec<TypeRef>,
    exclude_types: Vec<TypeRef>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    scan_sources: Vec<String>,
}

impl GenerateConfigBuilder {
    /// New builder with defaults: single-file output, nothing included or
    /// excluded.
    pub fn new() -> Self {
        Self {
            single_file: true,
            ..Self::default()
        }
    }

    /// Emit one concatenated stream (`true`, default) or one stream per
    /// declaration.
    pub fn single_file(mut self, single_file: bool) -> Self {
        self.single_file = single_file;
        self
    }

    /// Always include this type as a generation root.
    pub fn include_type(mut self, ty: TypeRef) -> Self {
        if !self.include_types.contains(&ty) {
            self.include_types.push(ty);
        }
        self
    }

    /// Never represent this type; fields referencing it render as the
    /// untyped placeholder.
    pub fn exclude_type(mut self, ty: TypeRef) -> Self {
        if !self.exclude_types.contains(&ty) {
            self.exclude_types.push(ty);
        }
        self
    }

    /// Include every type whose qualified name matches this pattern when
    /// scanning the configured sources.
    pub fn include_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !self.include_patterns.contains(&pattern) {
            self.include_patterns.push(pattern);
        }
        self
    }

    /// Exclude every type whose qualified name matches this pattern.
    pub fn exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !self.exclude_patterns.contains(&pattern) {
            self.exclude_patterns.push(pattern);
        }
        self
    }

    /// Register a metadata source (assembly analog) for include-pattern
    /// scanning.
    pub fn scan_source(mut self, source: impl Into<String>) -> Self {
        let source = source.into();
        if !self.scan_sources.contains(&source) {
            self.scan_sources.push(source);
        }
        self
    }

    /// Apply the declarative subset from host configuration.
    pub fn options(mut self, options: &GenerateOptions) -> Self {
        self.single_file = options.single_file;
        for pattern in &options.include_type_names {
            self = self.include_pattern(pattern.clone());
        }
        for pattern in &options.exclude_type_names {
            self = self.exclude_pattern(pattern.clone());
        }
        for source in &options.scan_sources {
            self = self.scan_source(source.clone());
        }
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<GenerateConfig, ConfigError> {
        if let Some(ty) = self
            .include_types
            .iter()
            .find(|ty| self.exclude_types.contains(ty))
        {
            return Err(ConfigError::ConflictingType(*ty));
        }

        if let Some(pattern) = self
            .include_patterns
            .iter()
            .find(|p| self.exclude_patterns.contains(p))
        {
            return Err(ConfigError::ConflictingPattern(pattern.clone()));
        }

        let compile = |patterns: Vec<String>| -> Result<Vec<Regex>, ConfigError> {
            patterns
                .into_iter()
                .map(|pattern| {
                    Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
                        pattern,
                        source,
                    })
                })
                .collect()
        };

        Ok(GenerateConfig {
            single_file: self.single_file,
            include_types: self.include_types,
            exclude_types: self.exclude_types,
            include_patterns: compile(self.include_patterns)?,
            exclude_patterns: compile(self.exclude_patterns)?,
            scan_sources: self.scan_sources,
        })
    }
}

/// Declarative configuration subset, suitable for a host config file.
///
/// Type handles cannot live in a config file; explicit include/exclude
/// [`TypeRef`]s are added on the builder directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Emit one concatenated stream rather than one file per declaration.
    pub single_file: bool,
    /// Qualified-name patterns for additional root types.
    pub include_type_names: Vec<String>,
    /// Qualified-name patterns for excluded types.
    pub exclude_type_names: Vec<String>,
    /// Metadata sources scanned for include-pattern matches.
    pub scan_sources: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            single_file: true,
            include_type_names: Vec::new(),
            exclude_type_names: Vec::new(),
            scan_sources: Vec::new(),
        }
    }
}
