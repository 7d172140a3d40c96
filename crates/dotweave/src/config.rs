//! Configuration types for DOT emission and themes.
//!
//! All types implement [`serde::Deserialize`] and are usually loaded from
//! TOML.
//!
//! # Overview
//!
//! - [`DotConfig`] - Top-level configuration combining emission and rendering
//!   settings.
//! - [`EmitConfig`] - Controls the layout of the emitted text.
//! - [`ThemeConfig`] - Describes a theme (graph attributes, defaults, and
//!   roles) that can be built into a [`Dot`].
//!
//! # Example
//!
//! ```
//! # use dotweave::config::ThemeConfig;
//! let theme = ThemeConfig::from_toml_str(
//!     r#"
//!     [defaults.node]
//!     shape = "box"
//!
//!     [roles.node.warning]
//!     color = "orange"
//!     "#,
//! )?
//! .build()?;
//! # Ok::<(), dotweave::DotError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use dotweave_core::{
    attribute::Attrs,
    identifier::Id,
};

use crate::{error::DotError, graph::Dot, render::RenderOptions};

/// Failures while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

fn read_config_file(path: &Path) -> Result<String, DotError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }
    let content = fs::read_to_string(path)?;
    debug!(path = path.display().to_string(); "Configuration file read");
    Ok(content)
}

// =============================================================================
// DotConfig
// =============================================================================

/// Top-level configuration combining emission and rendering settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DotConfig {
    /// Emission configuration section.
    #[serde(default)]
    emit: EmitConfig,

    /// Rendering configuration section.
    #[serde(default)]
    render: RenderOptions,
}

impl DotConfig {
    /// Creates a new [`DotConfig`].
    ///
    /// # Arguments
    ///
    /// * `emit` - Text layout settings.
    /// * `render` - Settings handed to a renderer.
    pub fn new(emit: EmitConfig, render: RenderOptions) -> Self {
        Self { emit, render }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Config`] if the text is not valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, DotError> {
        let config: DotConfig = toml::from_str(text).map_err(ConfigError::from)?;
        config.emit.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Config`] if the file is missing or invalid, and
    /// [`DotError::Io`] if it cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DotError> {
        Self::from_toml_str(&read_config_file(path.as_ref())?)
    }

    /// Returns the emission configuration.
    pub fn emit(&self) -> &EmitConfig {
        &self.emit
    }

    /// Returns the rendering configuration.
    pub fn render(&self) -> &RenderOptions {
        &self.render
    }
}

// =============================================================================
// EmitConfig
// =============================================================================

const DEFAULT_INDENT: usize = 4;
const MAX_INDENT: usize = 64;
const DEFAULT_COMPACT_THRESHOLD: usize = 8;
const DEFAULT_TEXT_ATTRIBUTES: [&str; 5] = ["label", "headlabel", "taillabel", "xlabel", "comment"];

/// Layout of the emitted DOT text.
///
/// The defaults produce the canonical form; changing them changes the text
/// but never its meaning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Spaces per nesting level.
    indent: usize,

    /// Blocks with at most this many statements are written without blank
    /// separator lines.
    compact_threshold: usize,

    /// Attributes whose values are always written quoted (or as markup).
    text_attributes: Vec<String>,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
            text_attributes: DEFAULT_TEXT_ATTRIBUTES.map(String::from).to_vec(),
        }
    }
}

impl EmitConfig {
    /// Sets the number of spaces per nesting level, at most 64.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.min(MAX_INDENT);
        self
    }

    /// Sets the statement count up to which blocks are written compactly.
    pub fn with_compact_threshold(mut self, compact_threshold: usize) -> Self {
        self.compact_threshold = compact_threshold;
        self
    }

    /// Replaces the set of general-text attributes.
    pub fn with_text_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_attributes = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn compact_threshold(&self) -> usize {
        self.compact_threshold
    }

    pub fn text_attributes(&self) -> &[String] {
        &self.text_attributes
    }

    /// Returns `true` if values of attribute `name` are always quoted.
    pub fn is_text_attribute(&self, name: &str) -> bool {
        self.text_attributes.iter().any(|text| text == name)
    }

    pub(crate) fn indentation(&self, depth: usize) -> String {
        " ".repeat(self.indent.min(MAX_INDENT).saturating_mul(depth))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.indent > MAX_INDENT {
            return Err(ConfigError::Validation(format!(
                "indent {} exceeds the maximum of {MAX_INDENT}",
                self.indent
            )));
        }
        if let Some(name) = self
            .text_attributes
            .iter()
            .find(|name| name.is_empty() || name.contains(char::is_whitespace))
        {
            return Err(ConfigError::Validation(format!(
                "invalid text attribute name {name:?}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// ThemeConfig
// =============================================================================

/// An attribute value as written in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum AttrLiteral {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&AttrLiteral> for Id {
    fn from(literal: &AttrLiteral) -> Self {
        match literal {
            AttrLiteral::Bool(value) => Id::Bool(*value),
            AttrLiteral::Int(value) => Id::Int(*value),
            AttrLiteral::Float(value) => Id::Float(*value),
            AttrLiteral::Text(value) => Id::Text(value.clone()),
        }
    }
}

type AttrTable = IndexMap<String, AttrLiteral>;

fn to_attrs(table: &AttrTable) -> Attrs {
    table
        .iter()
        .map(|(name, value)| (name.clone(), Id::from(value)))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DefaultTables {
    #[serde(default)]
    graph: AttrTable,
    #[serde(default)]
    node: AttrTable,
    #[serde(default)]
    edge: AttrTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RoleTables {
    #[serde(default)]
    graph: IndexMap<String, AttrTable>,
    #[serde(default)]
    node: IndexMap<String, AttrTable>,
    #[serde(default)]
    edge: IndexMap<String, AttrTable>,
}

/// A theme described in TOML.
///
/// ```toml
/// [graph]
/// rankdir = "LR"
///
/// [defaults.node]
/// shape = "box"
/// fontsize = 10
///
/// [roles.edge.dashed]
/// style = "dashed"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeConfig {
    /// Graph attributes of the root block.
    #[serde(default)]
    graph: AttrTable,

    /// Default attributes of the root block, per entity kind.
    #[serde(default)]
    defaults: DefaultTables,

    /// Role definitions, per entity kind.
    #[serde(default)]
    roles: RoleTables,
}

impl ThemeConfig {
    /// Parses a theme from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Config`] if the text is not a valid theme.
    pub fn from_toml_str(text: &str) -> Result<Self, DotError> {
        Ok(toml::from_str(text).map_err(ConfigError::from)?)
    }

    /// Loads a theme from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Config`] if the file is missing or invalid, and
    /// [`DotError::Io`] if it cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DotError> {
        Self::from_toml_str(&read_config_file(path.as_ref())?)
    }

    /// Builds a graph carrying the theme's heritable attributes, ready to be
    /// shared with [`Dot::into_shared`] and used as a theme.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Core`] if a default or role assigns the reserved
    /// `role` attribute.
    pub fn build(&self) -> Result<Dot, DotError> {
        let mut dot = Dot::new();
        dot.root()
            .graph(&to_attrs(&self.graph))?
            .graph_default(&to_attrs(&self.defaults.graph))?
            .node_default(&to_attrs(&self.defaults.node))?
            .edge_default(&to_attrs(&self.defaults.edge))?;

        for (name, attrs) in &self.roles.graph {
            dot.graph_role(name, &to_attrs(attrs))?;
        }
        for (name, attrs) in &self.roles.node {
            dot.node_role(name, &to_attrs(attrs))?;
        }
        for (name, attrs) in &self.roles.edge {
            dot.edge_role(name, &to_attrs(attrs))?;
        }

        debug!(
            graph_roles = self.roles.graph.len(),
            node_roles = self.roles.node.len(),
            edge_roles = self.roles.edge.len();
            "Theme built"
        );
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use dotweave_core::identifier::NormalizedId;

    use super::*;

    #[test]
    fn test_emit_config_defaults() {
        let config = EmitConfig::default();
        assert_eq!(config.indent(), 4);
        assert_eq!(config.compact_threshold(), 8);
        assert!(config.is_text_attribute("xlabel"));
        assert!(!config.is_text_attribute("color"));
    }

    #[test]
    fn test_dot_config_partial_toml() {
        let config = DotConfig::from_toml_str(
            r#"
            [emit]
            indent = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.emit().indent(), 2);
        assert_eq!(config.emit().compact_threshold(), 8);
        assert_eq!(config.emit().text_attributes().len(), 5);
        assert_eq!(config.render().program(), "dot");
    }

    #[test]
    fn test_dot_config_invalid() {
        let err = DotConfig::from_toml_str("[emit]\nindent = \"wide\"\n").unwrap_err();
        assert!(matches!(err, DotError::Config(ConfigError::Parse(_))));

        let err = DotConfig::from_toml_str("[emit]\ntext_attributes = [\"a b\"]\n").unwrap_err();
        assert!(matches!(err, DotError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn test_indent_bounds() {
        let err = DotConfig::from_toml_str("[emit]\nindent = 4611686018427387904\n").unwrap_err();
        assert!(matches!(err, DotError::Config(ConfigError::Validation(_))));

        let err = DotConfig::from_toml_str("[emit]\nindent = 65\n").unwrap_err();
        assert!(matches!(err, DotError::Config(ConfigError::Validation(_))));

        let config = DotConfig::from_toml_str("[emit]\nindent = 64\n").unwrap();
        assert_eq!(config.emit().indent(), 64);

        let config = EmitConfig::default().with_indent(usize::MAX);
        assert_eq!(config.indent(), 64);
        assert_eq!(config.indentation(3).len(), 192);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ThemeConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, DotError::Config(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_theme_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [graph]
            rankdir = "LR"

            [defaults.node]
            shape = "box"
            fontsize = 10
            width = 0.5
            fixedsize = true

            [roles.edge.dashed]
            style = "dashed"
            "#
        )
        .unwrap();

        let mut dot = ThemeConfig::load(file.path()).unwrap().build().unwrap();
        assert_eq!(
            dot.emit().unwrap(),
            "graph {\n    node [shape=box fontsize=10 width=0.5 fixedsize=true]\n    rankdir=LR\n}\n"
        );
        dot.root()
            .edge("a", "b", None, &dotweave_core::attrs! { role = "dashed" })
            .unwrap();
        assert_eq!(
            dot.resolved_edge_attributes("a", "b", None)
                .unwrap()
                .get("style"),
            Some(&NormalizedId::literal("dashed"))
        );
    }

    #[test]
    fn test_theme_rejects_role_in_defaults() {
        let theme = ThemeConfig::from_toml_str("[defaults.node]\nrole = \"x\"\n").unwrap();
        assert!(matches!(theme.build(), Err(DotError::Core(_))));
    }
}
