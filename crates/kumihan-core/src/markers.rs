//! Marker definitions: what `;;;name;;;` turns into.
//!
//! The parser only needs [`MarkerLookup`]. [`MarkerTable`] is the stock
//! implementation, seeded with the default Japanese marker names and
//! optionally extended from TOML:
//!
//! ```toml
//! [markers."強調"]
//! tag = "mark"
//! class = "emphasis"
//!
//! [markers."強調".attributes]
//! style = "color: red"
//! ```

use std::collections::{BTreeMap, HashMap};

use rustc_hash::FxBuildHasher;
use serde::Deserialize;

use crate::error::ConfigError;

/// Separators accepted between parts of a compound marker name.
pub const COMPOUND_SEPARATORS: [char; 2] = ['+', '＋'];

/// How a marker name maps to a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkerDefinition {
    /// Node type, usually an HTML tag name.
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
    /// Label for collapsible markers (rendered as `<summary>`).
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl MarkerDefinition {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            class: None,
            summary: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidMarker {
            name: name.to_string(),
            reason,
        };
        if name.trim().is_empty() {
            return Err(invalid("marker name is empty"));
        }
        if name.contains(";;;") || name.contains(COMPOUND_SEPARATORS) {
            return Err(invalid("marker name contains a reserved delimiter"));
        }
        if self.tag.is_empty() {
            return Err(invalid("tag is empty"));
        }
        if self.tag.contains(char::is_whitespace) {
            return Err(invalid("tag contains whitespace"));
        }
        Ok(())
    }
}

/// Read-only marker name resolution.
pub trait MarkerLookup {
    fn marker_definition(&self, name: &str) -> Option<&MarkerDefinition>;
}

impl<T: MarkerLookup + ?Sized> MarkerLookup for &T {
    fn marker_definition(&self, name: &str) -> Option<&MarkerDefinition> {
        (**self).marker_definition(name)
    }
}

impl<S: std::hash::BuildHasher> MarkerLookup for HashMap<String, MarkerDefinition, S> {
    fn marker_definition(&self, name: &str) -> Option<&MarkerDefinition> {
        self.get(name)
    }
}

impl MarkerLookup for BTreeMap<String, MarkerDefinition> {
    fn marker_definition(&self, name: &str) -> Option<&MarkerDefinition> {
        self.get(name)
    }
}

/// Which built-in markers a table starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capabilities {
    /// Text decoration, boxes and heading markers.
    Base,
    /// Everything in `Base` plus collapsible, spoiler and alert boxes.
    #[default]
    Extended,
}

impl Capabilities {
    /// Whether markers in this tier may carry a `summary`.
    pub fn supports_summary(self) -> bool {
        matches!(self, Capabilities::Extended)
    }

    fn builtin(self) -> Vec<(&'static str, MarkerDefinition)> {
        let mut defs = vec![
            ("太字", MarkerDefinition::new("strong")),
            ("イタリック", MarkerDefinition::new("em")),
            ("下線", MarkerDefinition::new("u")),
            ("取り消し線", MarkerDefinition::new("del")),
            ("コード", MarkerDefinition::new("code")),
            ("引用", MarkerDefinition::new("blockquote")),
            ("枠線", MarkerDefinition::new("div").with_class("box")),
            ("ハイライト", MarkerDefinition::new("div").with_class("highlight")),
            ("見出し1", MarkerDefinition::new("h1")),
            ("見出し2", MarkerDefinition::new("h2")),
            ("見出し3", MarkerDefinition::new("h3")),
            ("見出し4", MarkerDefinition::new("h4")),
            ("見出し5", MarkerDefinition::new("h5")),
        ];
        if self == Capabilities::Extended {
            defs.extend([
                (
                    "折りたたみ",
                    MarkerDefinition::new("details")
                        .with_class("collapsible")
                        .with_summary("詳細を表示"),
                ),
                (
                    "ネタバレ",
                    MarkerDefinition::new("details")
                        .with_class("spoiler")
                        .with_summary("ネタバレを表示"),
                ),
                ("注意", MarkerDefinition::new("div").with_class("box-warning")),
                ("情報", MarkerDefinition::new("div").with_class("box-info")),
                ("警告", MarkerDefinition::new("div").with_class("box-error")),
            ]);
        }
        defs
    }
}

/// Marker name to definition map.
#[derive(Debug, Clone)]
pub struct MarkerTable {
    capabilities: Capabilities,
    definitions: HashMap<String, MarkerDefinition, FxBuildHasher>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkerFile {
    #[serde(default)]
    capabilities: Capabilities,
    #[serde(default)]
    replace_defaults: bool,
    #[serde(default)]
    markers: BTreeMap<String, MarkerDefinition>,
}

impl MarkerTable {
    /// A table with no markers; every `;;;name;;;` is unknown.
    pub fn empty() -> Self {
        Self {
            capabilities: Capabilities::Base,
            definitions: HashMap::default(),
        }
    }

    /// The built-in markers of the given tier.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        let mut table = Self::empty();
        table.capabilities = capabilities;
        for (name, def) in capabilities.builtin() {
            table.definitions.insert(name.to_string(), def);
        }
        table
    }

    /// Load definitions from TOML, layered over the built-ins unless the file
    /// sets `replace_defaults = true`.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: MarkerFile = toml::from_str(source)?;
        let mut table = if file.replace_defaults {
            let mut table = Self::empty();
            table.capabilities = file.capabilities;
            table
        } else {
            Self::with_capabilities(file.capabilities)
        };
        for (name, def) in file.markers {
            table.insert(name, def)?;
        }
        Ok(table)
    }

    /// Add or replace a definition.
    ///
    /// A `summary` is only accepted when the table's capabilities allow it.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        definition: MarkerDefinition,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        definition.validate(&name)?;
        if definition.summary.is_some() && !self.capabilities.supports_summary() {
            return Err(ConfigError::InvalidMarker {
                name,
                reason: "summary requires extended capabilities",
            });
        }
        self.definitions.insert(name.trim().to_string(), definition);
        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Marker names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::with_capabilities(Capabilities::default())
    }
}

impl MarkerLookup for MarkerTable {
    fn marker_definition(&self, name: &str) -> Option<&MarkerDefinition> {
        self.definitions.get(name)
    }
}
