//! In-memory shape of the scripting API surface
//!
//! The schema is a small, immutable graph:
//!
//! - the **global scope**, whose children are the top-level objects (`app`, ...)
//! - a **type registry** of named shapes reachable through `TypeRef::Named`
//! - **constant groups** (`ProjectItemType.BIN`, ...)
//!
//! Property types are an explicit tagged union so the resolver can follow a
//! named reference or descend into an inline shape without probing fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal value of a constant inside a constant group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantLiteral {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for ConstantLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantLiteral::Integer(value) => write!(f, "{}", value),
            ConstantLiteral::Float(value) => write!(f, "{}", value),
            ConstantLiteral::Bool(value) => write!(f, "{}", value),
            ConstantLiteral::Text(value) => write!(f, "{:?}", value),
        }
    }
}

/// Type of a property: either a reference into the type registry or a nested shape
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Resolved through `ApiSchema::lookup_type`
    Named(String),
    /// Shape declared in place
    Inline(Box<SchemaNode>),
}

impl TypeRef {
    /// Name shown to the user as the property's declared type
    pub fn display_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::Inline(node) => node.type_name.as_deref().unwrap_or("Object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: String,
    pub readonly: bool,
}

impl PropertyDescriptor {
    /// Property whose type lives in the registry
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: TypeRef::Named(type_name.into()),
            description: String::new(),
            readonly: false,
        }
    }

    /// Property with an inline nested shape
    pub fn inline(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            name: name.into(),
            type_ref: TypeRef::Inline(Box::new(node)),
            description: String::new(),
            readonly: false,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// One declared parameter of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_name: Option<String>,
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            description: None,
        }
    }

    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    pub return_type: String,
    pub signature: String,
    pub parameters: Vec<Parameter>,
    pub description: String,
}

impl MethodDescriptor {
    /// Create a method; the signature is synthesized from the parameter names
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        let name = name.into();
        let signature = synthesize_signature(&name, &parameters);
        Self {
            name,
            return_type: return_type.into(),
            signature,
            parameters,
            description: String::new(),
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// `name(a, b, c)`
pub(crate) fn synthesize_signature(name: &str, parameters: &[Parameter]) -> String {
    let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
    format!("{}({})", name, names.join(", "))
}

/// Shape of one type: its members and pre-typed sub-shapes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    pub type_name: Option<String>,
    pub description: Option<String>,
    pub properties: BTreeMap<String, PropertyDescriptor>,
    pub methods: BTreeMap<String, MethodDescriptor>,
    pub children: BTreeMap<String, SchemaNode>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn with_child(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.children.insert(name.into(), node);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.methods.is_empty() && self.children.is_empty()
    }

    /// Depth-first search for a method by name
    ///
    /// Order: own methods, then inline property shapes, then children, each in
    /// name order. Named references are not followed, so the walk is finite.
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        if let Some(method) = self.methods.get(name) {
            return Some(method);
        }

        let inline_shapes = self.properties.values().filter_map(|p| match &p.type_ref {
            TypeRef::Inline(node) => Some(node.as_ref()),
            TypeRef::Named(_) => None,
        });

        inline_shapes
            .chain(self.children.values())
            .find_map(|node| node.find_method(name))
    }
}

pub type ConstantGroups = BTreeMap<String, BTreeMap<String, ConstantLiteral>>;

/// Immutable description of the scripting API surface
///
/// Built once at startup and shared as `Arc<ApiSchema>`; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiSchema {
    scope: SchemaNode,
    types: BTreeMap<String, SchemaNode>,
    constants: ConstantGroups,
}

impl ApiSchema {
    pub fn new(
        globals: BTreeMap<String, SchemaNode>,
        types: BTreeMap<String, SchemaNode>,
        constants: ConstantGroups,
    ) -> Self {
        Self {
            scope: SchemaNode {
                children: globals,
                ..SchemaNode::default()
            },
            types,
            constants,
        }
    }

    /// Schema with no globals, types or constants; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_empty() && self.types.is_empty() && self.constants.is_empty()
    }

    /// The synthetic node whose children are the top-level globals
    pub fn global_scope(&self) -> &SchemaNode {
        &self.scope
    }

    pub fn globals(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.scope.children.iter()
    }

    pub fn lookup_type(&self, name: &str) -> Option<&SchemaNode> {
        self.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.types.iter()
    }

    pub fn constant_groups(&self) -> &ConstantGroups {
        &self.constants
    }

    /// First method named `name` anywhere in the graph: globals first, then the registry
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.scope
            .find_method(name)
            .or_else(|| self.types.values().find_map(|node| node.find_method(name)))
    }
}
