//! Completion candidates

use serde::Serialize;

use crate::schema::{ConstantLiteral, MethodDescriptor, Parameter, PropertyDescriptor, SchemaNode};

/// What a suggestion stands for
///
/// The derived ordering is the final tie-break of the ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Property,
    Method,
    Object,
    Constant,
    Keyword,
    /// Display-only hint for the argument under the cursor; cannot be accepted
    ParameterHint,
}

/// One candidate completion item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub kind: SuggestionKind,
    pub declared_type: Option<String>,
    pub description: String,
    /// Text inserted on accept; empty for parameter hints
    pub insert_text: String,
    pub detail: String,
    /// Declared parameters of a method suggestion
    pub parameter_count: usize,
    pub readonly: bool,
}

impl Suggestion {
    pub fn property(property: &PropertyDescriptor) -> Self {
        Self {
            name: property.name.clone(),
            kind: SuggestionKind::Property,
            declared_type: Some(property.type_ref.display_name().to_string()),
            description: property.description.clone(),
            insert_text: property.name.clone(),
            detail: if property.readonly {
                format!("{} (readonly)", property.type_ref.display_name())
            } else {
                property.type_ref.display_name().to_string()
            },
            parameter_count: 0,
            readonly: property.readonly,
        }
    }

    pub fn method(method: &MethodDescriptor) -> Self {
        Self {
            name: method.name.clone(),
            kind: SuggestionKind::Method,
            declared_type: Some(method.return_type.clone()),
            description: method.description.clone(),
            insert_text: format!("{}()", method.name),
            detail: method.signature.clone(),
            parameter_count: method.parameters.len(),
            readonly: false,
        }
    }

    pub fn object(name: &str, node: &SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            kind: SuggestionKind::Object,
            declared_type: node.type_name.clone(),
            description: node
                .description
                .clone()
                .unwrap_or_else(|| format!("{} object", name)),
            insert_text: name.to_string(),
            detail: node.type_name.clone().unwrap_or_else(|| "Object".to_string()),
            parameter_count: 0,
            readonly: false,
        }
    }

    pub fn constant_group(group: &str) -> Self {
        Self {
            name: group.to_string(),
            kind: SuggestionKind::Constant,
            declared_type: None,
            description: format!("{} constants", group),
            insert_text: group.to_string(),
            detail: "constant group".to_string(),
            parameter_count: 0,
            readonly: true,
        }
    }

    /// A single constant; inserts the qualified `group.constant` form
    pub fn constant(group: &str, name: &str, value: &ConstantLiteral) -> Self {
        Self {
            name: name.to_string(),
            kind: SuggestionKind::Constant,
            declared_type: Some(group.to_string()),
            description: format!("{}.{}", group, name),
            insert_text: format!("{}.{}", group, name),
            detail: format!("= {}", value),
            parameter_count: 0,
            readonly: true,
        }
    }

    pub fn keyword(word: &str) -> Self {
        Self {
            name: word.to_string(),
            kind: SuggestionKind::Keyword,
            declared_type: None,
            description: String::new(),
            insert_text: word.to_string(),
            detail: "keyword".to_string(),
            parameter_count: 0,
            readonly: false,
        }
    }

    /// Hint for parameter `index` of `method`, or `None` past the declared parameters
    pub fn parameter_hint(method: &MethodDescriptor, index: usize) -> Option<Self> {
        let Parameter {
            name,
            type_name,
            description,
        } = method.parameters.get(index)?;

        Some(Self {
            name: name.clone(),
            kind: SuggestionKind::ParameterHint,
            declared_type: type_name.clone(),
            description: description.clone().unwrap_or_default(),
            insert_text: String::new(),
            detail: format!(
                "{} (parameter {} of {})",
                method.signature,
                index + 1,
                method.parameters.len()
            ),
            parameter_count: method.parameters.len(),
            readonly: false,
        })
    }

    pub fn is_acceptable(&self) -> bool {
        self.kind != SuggestionKind::ParameterHint
    }
}
