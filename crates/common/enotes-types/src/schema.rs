//! Strongly typed subset of JSON Schema (draft-07).
//!
//! Covers the constructs the notes schemas need: objects with required
//! lists, arrays, strings with `pattern`/`maxLength`, numbers and local
//! `#/definitions/...` references. A [`SchemaDocument`] checks its own
//! structure on construction.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";
const DEFINITIONS_PREFIX: &str = "#/definitions/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema title must not be empty")]
    EmptyTitle,

    #[error("schema root must be an object")]
    RootNotObject,

    #[error("{path}: required property '{name}' is not declared")]
    UnknownRequired { path: String, name: String },

    #[error("{path}: reference to undefined definition '{name}'")]
    DanglingRef { path: String, name: String },

    #[error("{path}: maxLength must be greater than zero")]
    InvalidMaxLength { path: String },

    #[error("{path}: pattern must not be empty")]
    EmptyPattern { path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object {
        title: Option<String>,
        properties: BTreeMap<String, SchemaNode>,
        required: Vec<String>,
    },
    Array {
        title: Option<String>,
        items: Box<SchemaNode>,
    },
    String {
        title: Option<String>,
        pattern: Option<String>,
        max_length: Option<u32>,
    },
    Number {
        title: Option<String>,
    },
    /// Reference to a named entry of the document's `definitions`.
    Ref(String),
}

impl SchemaNode {
    pub fn object() -> Self {
        Self::Object {
            title: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::Array {
            title: None,
            items: Box::new(items),
        }
    }

    pub fn string() -> Self {
        Self::String {
            title: None,
            pattern: None,
            max_length: None,
        }
    }

    pub fn number() -> Self {
        Self::Number { title: None }
    }

    pub fn definition(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    /// Set the title. References carry no title and are returned unchanged.
    pub fn titled(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Object { title, .. }
            | Self::Array { title, .. }
            | Self::String { title, .. }
            | Self::Number { title } => *title = Some(value.into()),
            Self::Ref(_) => {}
        }
        self
    }

    /// Declare a property. Only meaningful on objects.
    pub fn property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        if let Self::Object { properties, .. } = &mut self {
            properties.insert(name.into(), node);
        }
        self
    }

    /// Mark properties as required. Only meaningful on objects.
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Self::Object { required, .. } = &mut self {
            required.extend(names.into_iter().map(Into::into));
        }
        self
    }

    /// Only meaningful on strings.
    pub fn pattern(mut self, value: impl Into<String>) -> Self {
        if let Self::String { pattern, .. } = &mut self {
            *pattern = Some(value.into());
        }
        self
    }

    /// Only meaningful on strings.
    pub fn max_length(mut self, value: u32) -> Self {
        if let Self::String { max_length, .. } = &mut self {
            *max_length = Some(value);
        }
        self
    }

    fn validate(
        &self,
        path: &str,
        definitions: &BTreeMap<String, SchemaNode>,
    ) -> Result<(), SchemaError> {
        match self {
            Self::Object {
                properties,
                required,
                ..
            } => {
                if let Some(missing) = required.iter().find(|name| !properties.contains_key(*name)) {
                    return Err(SchemaError::UnknownRequired {
                        path: path.to_string(),
                        name: missing.clone(),
                    });
                }
                for (name, node) in properties {
                    node.validate(&format!("{}/properties/{}", path, name), definitions)?;
                }
                Ok(())
            }
            Self::Array { items, .. } => items.validate(&format!("{}/items", path), definitions),
            Self::String {
                pattern,
                max_length,
                ..
            } => {
                if matches!(max_length, Some(0)) {
                    return Err(SchemaError::InvalidMaxLength {
                        path: path.to_string(),
                    });
                }
                if matches!(pattern.as_deref(), Some("")) {
                    return Err(SchemaError::EmptyPattern {
                        path: path.to_string(),
                    });
                }
                Ok(())
            }
            Self::Number { .. } => Ok(()),
            Self::Ref(name) if definitions.contains_key(name) => Ok(()),
            Self::Ref(name) => Err(SchemaError::DanglingRef {
                path: path.to_string(),
                name: name.clone(),
            }),
        }
    }

    fn serialize_entries<M: SerializeMap>(&self, map: &mut M, with_title: bool) -> Result<(), M::Error> {
        let (title, kind) = match self {
            Self::Object { title, .. } => (title, "object"),
            Self::Array { title, .. } => (title, "array"),
            Self::String { title, .. } => (title, "string"),
            Self::Number { title } => (title, "number"),
            Self::Ref(name) => {
                return map.serialize_entry("$ref", &format!("{}{}", DEFINITIONS_PREFIX, name));
            }
        };

        map.serialize_entry("type", kind)?;
        if let Some(title) = title.as_ref().filter(|_| with_title) {
            map.serialize_entry("title", title)?;
        }

        match self {
            Self::Object {
                properties,
                required,
                ..
            } => {
                if !properties.is_empty() {
                    map.serialize_entry("properties", properties)?;
                }
                if !required.is_empty() {
                    map.serialize_entry("required", required)?;
                }
            }
            Self::Array { items, .. } => map.serialize_entry("items", items)?,
            Self::String {
                pattern,
                max_length,
                ..
            } => {
                if let Some(pattern) = pattern {
                    map.serialize_entry("pattern", pattern)?;
                }
                if let Some(max_length) = max_length {
                    map.serialize_entry("maxLength", max_length)?;
                }
            }
            Self::Number { .. } | Self::Ref(_) => {}
        }
        Ok(())
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_entries(&mut map, true)?;
        map.end()
    }
}

/// A complete, self-validated schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    title: String,
    root: SchemaNode,
    definitions: BTreeMap<String, SchemaNode>,
}

impl SchemaDocument {
    /// Build a document. `root` must be an object; its own title is
    /// superseded by `title`.
    pub fn new<I>(title: impl Into<String>, root: SchemaNode, definitions: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (String, SchemaNode)>,
    {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(SchemaError::EmptyTitle);
        }
        if !matches!(root, SchemaNode::Object { .. }) {
            return Err(SchemaError::RootNotObject);
        }
        let definitions: BTreeMap<_, _> = definitions.into_iter().collect();

        root.validate("", &definitions)?;
        for (name, node) in &definitions {
            node.validate(&format!("/definitions/{}", name), &definitions)?;
        }

        Ok(Self {
            title,
            root,
            definitions,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Serialize for SchemaDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("$schema", DRAFT_07)?;
        map.serialize_entry("title", &self.title)?;
        self.root.serialize_entries(&mut map, false)?;
        if !self.definitions.is_empty() {
            map.serialize_entry("definitions", &self.definitions)?;
        }
        map.end()
    }
}
