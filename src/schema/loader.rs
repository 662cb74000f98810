//! JSON schema loading
//!
//! The on-disk format mirrors the descriptor objects the console panel ships
//! with: a property that declares its own `properties`/`methods` is an inline
//! shape, any other property names its type through `type`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::error::{Result, SchemaError};
use super::model::{
    ApiSchema, ConstantGroups, MethodDescriptor, Parameter, PropertyDescriptor, SchemaNode,
    TypeRef, synthesize_signature,
};

/// Premiere Pro API surface bundled with the crate
const BUILTIN_SCHEMA: &str = include_str!("../../data/premiere_pro.json");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSchema {
    globals: BTreeMap<String, RawNode>,
    types: BTreeMap<String, RawNode>,
    constants: ConstantGroups,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNode {
    #[serde(rename = "type")]
    type_name: Option<String>,
    description: Option<String>,
    properties: BTreeMap<String, RawProperty>,
    methods: BTreeMap<String, RawMethod>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProperty {
    #[serde(rename = "type")]
    type_name: Option<String>,
    description: Option<String>,
    readonly: bool,
    properties: Option<BTreeMap<String, RawProperty>>,
    methods: Option<BTreeMap<String, RawMethod>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMethod {
    return_type: Option<String>,
    description: Option<String>,
    signature: Option<String>,
    parameters: Vec<RawParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawParameter {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, rename = "type")]
        type_name: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<RawParameter> for Parameter {
    fn from(raw: RawParameter) -> Self {
        match raw {
            RawParameter::Name(name) => Parameter::new(name),
            RawParameter::Detailed {
                name,
                type_name,
                description,
            } => Parameter {
                name,
                type_name,
                description,
            },
        }
    }
}

fn convert_method(name: String, raw: RawMethod) -> MethodDescriptor {
    let parameters: Vec<Parameter> = raw.parameters.into_iter().map(Parameter::from).collect();
    let signature = raw
        .signature
        .unwrap_or_else(|| synthesize_signature(&name, &parameters));
    MethodDescriptor {
        name,
        return_type: raw.return_type.unwrap_or_else(|| "Unknown".to_string()),
        signature,
        parameters,
        description: raw.description.unwrap_or_default(),
    }
}

fn convert_members(
    properties: BTreeMap<String, RawProperty>,
    methods: BTreeMap<String, RawMethod>,
) -> (
    BTreeMap<String, PropertyDescriptor>,
    BTreeMap<String, MethodDescriptor>,
) {
    let properties = properties
        .into_iter()
        .map(|(name, raw)| {
            let property = convert_property(name.clone(), raw);
            (name, property)
        })
        .collect();
    let methods = methods
        .into_iter()
        .map(|(name, raw)| {
            let method = convert_method(name.clone(), raw);
            (name, method)
        })
        .collect();
    (properties, methods)
}

fn convert_property(name: String, raw: RawProperty) -> PropertyDescriptor {
    let type_ref = if raw.properties.is_some() || raw.methods.is_some() {
        let (properties, methods) = convert_members(
            raw.properties.unwrap_or_default(),
            raw.methods.unwrap_or_default(),
        );
        TypeRef::Inline(Box::new(SchemaNode {
            type_name: raw.type_name,
            description: raw.description.clone(),
            properties,
            methods,
            children: BTreeMap::new(),
        }))
    } else {
        TypeRef::Named(raw.type_name.unwrap_or_else(|| "Unknown".to_string()))
    };

    PropertyDescriptor {
        name,
        type_ref,
        description: raw.description.unwrap_or_default(),
        readonly: raw.readonly,
    }
}

fn convert_node(raw: RawNode) -> SchemaNode {
    let (properties, methods) = convert_members(raw.properties, raw.methods);
    SchemaNode {
        type_name: raw.type_name,
        description: raw.description,
        properties,
        methods,
        children: BTreeMap::new(),
    }
}

fn convert_nodes(raw: BTreeMap<String, RawNode>) -> BTreeMap<String, SchemaNode> {
    raw.into_iter()
        .map(|(name, node)| (name, convert_node(node)))
        .collect()
}

impl ApiSchema {
    /// Parse a schema document
    ///
    /// A document that parses but declares nothing is reported as
    /// `SchemaError::Empty`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawSchema = serde_json::from_str(json)?;
        let schema = ApiSchema::new(
            convert_nodes(raw.globals),
            convert_nodes(raw.types),
            raw.constants,
        );
        if schema.is_empty() {
            return Err(SchemaError::Empty);
        }
        Ok(schema)
    }

    /// Read and parse a schema document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The bundled Premiere Pro schema
    pub fn builtin() -> Self {
        match Self::from_json_str(BUILTIN_SCHEMA) {
            Ok(schema) => schema,
            Err(e) => {
                warn!("Bundled schema is unusable, completion disabled: {}", e);
                ApiSchema::empty()
            }
        }
    }
}

/// Load the schema at `path` (or the bundled one), degrading to an empty schema on failure
///
/// With an empty schema every completion request answers "no suggestions".
pub fn load_or_empty(path: Option<&Path>) -> Arc<ApiSchema> {
    let schema = match path {
        Some(path) => match ApiSchema::load(path) {
            Ok(schema) => {
                info!("Loaded API schema from {:?}", path);
                schema
            }
            Err(e) => {
                warn!("{}; completion will return no suggestions", e);
                ApiSchema::empty()
            }
        },
        None => ApiSchema::builtin(),
    };

    info!(
        "API schema ready: {} globals, {} types, {} constant groups",
        schema.globals().count(),
        schema.types().count(),
        schema.constant_groups().len()
    );
    Arc::new(schema)
}
