//! Turning resolved schema nodes into completion candidates
//!
//! Filtering is a case-insensitive prefix match on the partial token; order
//! is left to the ranker.

use crate::schema::{ApiSchema, SchemaNode};

use super::context::argument_index;
use super::suggestion::Suggestion;

/// Reserved words offered in identifier position
pub const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "continue", "default", "delete", "do", "else", "false", "finally",
    "for", "function", "if", "in", "instanceof", "new", "null", "return", "switch", "this",
    "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "with",
];

/// Case-insensitive prefix test
pub fn matches_prefix(name: &str, partial: &str) -> bool {
    name.len() >= partial.len()
        && name.is_char_boundary(partial.len())
        && name[..partial.len()].eq_ignore_ascii_case(partial)
}

/// Properties and methods of `node` matching `partial`
pub fn collect_members(node: &SchemaNode, partial: &str) -> Vec<Suggestion> {
    let properties = node
        .properties
        .values()
        .filter(|property| matches_prefix(&property.name, partial))
        .map(Suggestion::property);
    let methods = node
        .methods
        .values()
        .filter(|method| matches_prefix(&method.name, partial))
        .map(Suggestion::method);

    properties.chain(methods).collect()
}

/// Globals, constant groups, individual constants and reserved words matching `partial`
pub fn collect_globals(schema: &ApiSchema, partial: &str) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = schema
        .globals()
        .filter(|(name, _)| matches_prefix(name, partial))
        .map(|(name, node)| Suggestion::object(name, node))
        .collect();

    for (group, constants) in schema.constant_groups() {
        if matches_prefix(group, partial) {
            suggestions.push(Suggestion::constant_group(group));
        }
        suggestions.extend(
            constants
                .iter()
                .filter(|(name, _)| matches_prefix(name, partial))
                .map(|(name, value)| Suggestion::constant(group, name, value)),
        );
    }

    suggestions.extend(
        RESERVED_WORDS
            .iter()
            .filter(|word| matches_prefix(word, partial))
            .map(|word| Suggestion::keyword(word)),
    );

    suggestions
}

/// Hint for the argument being typed in a call to `callee_name`
///
/// Method names are not unique across the graph; the first one found
/// depth-first is good enough for a hint.
pub fn collect_parameter_hint(
    schema: &ApiSchema,
    callee_name: &str,
    raw_args: &str,
) -> Vec<Suggestion> {
    schema
        .find_method(callee_name)
        .and_then(|method| Suggestion::parameter_hint(method, argument_index(raw_args)))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::suggestion::SuggestionKind;
    use crate::schema::{
        ConstantGroups, ConstantLiteral, MethodDescriptor, Parameter, PropertyDescriptor,
    };
    use std::collections::BTreeMap;

    fn project() -> SchemaNode {
        SchemaNode::typed("Project")
            .with_property(PropertyDescriptor::named("name", "String").readonly())
            .with_property(PropertyDescriptor::named("path", "String"))
            .with_method(MethodDescriptor::new("save", "Number", vec![]))
            .with_method(MethodDescriptor::new(
                "saveAs",
                "Number",
                vec![Parameter::new("path").typed("String")],
            ))
    }

    fn schema() -> ApiSchema {
        let mut globals = BTreeMap::new();
        globals.insert(
            "app".to_string(),
            SchemaNode::typed("Application")
                .with_property(PropertyDescriptor::inline("project", project())),
        );
        let mut constants = ConstantGroups::new();
        constants.insert(
            "ProjectItemType".to_string(),
            BTreeMap::from([
                ("BIN".to_string(), ConstantLiteral::Integer(2)),
                ("CLIP".to_string(), ConstantLiteral::Integer(1)),
            ]),
        );
        ApiSchema::new(globals, BTreeMap::new(), constants)
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        assert!(matches_prefix("saveAs", "SA"));
        assert!(matches_prefix("saveAs", ""));
        assert!(!matches_prefix("save", "saveAs"));
        assert!(!matches_prefix("éa", "e"));
    }

    #[test]
    fn test_collect_members() {
        let suggestions = collect_members(&project(), "sa");
        let names: Vec<_> = suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["save", "saveAs"]);
        assert_eq!(suggestions[0].insert_text, "save()");
        assert_eq!(suggestions[1].parameter_count, 1);
        assert_eq!(suggestions[1].detail, "saveAs(path)");

        let name = &collect_members(&project(), "na")[0];
        assert_eq!(name.kind, SuggestionKind::Property);
        assert_eq!(name.declared_type.as_deref(), Some("String"));
        assert!(name.readonly);
    }

    #[test]
    fn test_collect_globals_includes_constants_and_keywords() {
        let schema = schema();

        let suggestions = collect_globals(&schema, "ap");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Object);

        let suggestions = collect_globals(&schema, "Pro");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "ProjectItemType");

        let suggestions = collect_globals(&schema, "BI");
        assert_eq!(suggestions[0].insert_text, "ProjectItemType.BIN");
        assert_eq!(suggestions[0].detail, "= 2");

        let suggestions = collect_globals(&schema, "fun");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Keyword);
    }

    #[test]
    fn test_parameter_hint() {
        let schema = schema();

        let hints = collect_parameter_hint(&schema, "saveAs", "");
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].name, "path");
        assert_eq!(hints[0].kind, SuggestionKind::ParameterHint);
        assert!(hints[0].insert_text.is_empty());

        assert!(collect_parameter_hint(&schema, "saveAs", "a, b").is_empty());
        assert!(collect_parameter_hint(&schema, "missing", "").is_empty());
    }
}
