//! Path resolution against the schema graph
//!
//! Each segment of an access path is resolved in order:
//!
//! 1. a property of that name (named type → registry, inline type → nested shape)
//! 2. a pre-typed child shape of that name
//! 3. the collection fallback: a segment whose name looks like a collection
//!    (`videoTracks`, `children`, ...) continues from the presumed element type
//!
//! The schema models property types precisely but not method return types or
//! collection element types; step 3 is a fixed, knowingly unsound table that
//! keeps `collection[i].member` and `xxxTracks.member` completion working.
//! An unresolvable segment fails the whole path, which callers report as
//! "no suggestions".

use tracing::trace;

use crate::schema::{ApiSchema, SchemaNode, TypeRef};

/// Collection-ish name fragments and the element type they stand for
///
/// Matched case-insensitively as substrings, first entry wins.
const COLLECTION_ELEMENT_TYPES: &[(&str, &str)] = &[
    ("tracks", "Track"),
    ("clips", "TrackItem"),
    ("transitions", "TrackItem"),
    ("markers", "Marker"),
    ("sequences", "Sequence"),
    ("items", "ProjectItem"),
    ("children", "ProjectItem"),
    ("collection", "ProjectItem"),
];

/// Element type presumed for a collection-like segment name
pub fn collection_element_type(segment: &str) -> Option<&'static str> {
    let lowered = segment.to_ascii_lowercase();
    COLLECTION_ELEMENT_TYPES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, element)| *element)
}

/// Walks the schema graph from the global scope
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    schema: &'a ApiSchema,
}

impl<'a> PathResolver<'a> {
    pub fn new(schema: &'a ApiSchema) -> Self {
        Self { schema }
    }

    /// Resolve a dotted access path; an empty path is the global scope
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&'a SchemaNode> {
        path.iter().try_fold(self.schema.global_scope(), |node, segment| {
            let next = self.step(node, segment.as_ref());
            if next.is_none() {
                trace!("Path resolution failed at segment '{}'", segment.as_ref());
            }
            next
        })
    }

    /// Resolve a path whose last segment was indexed (`path[expr]`)
    ///
    /// The indexed segment is read as an element access: when the collection
    /// table knows its element type, resolution continues from that type,
    /// otherwise from the segment's own shape.
    pub fn resolve_indexed<S: AsRef<str>>(&self, path: &[S]) -> Option<&'a SchemaNode> {
        let node = self.resolve(path)?;
        let element = path
            .last()
            .and_then(|segment| collection_element_type(segment.as_ref()))
            .and_then(|type_name| self.schema.lookup_type(type_name));
        Some(element.unwrap_or(node))
    }

    fn step(&self, node: &'a SchemaNode, segment: &str) -> Option<&'a SchemaNode> {
        if let Some(property) = node.property(segment) {
            match &property.type_ref {
                TypeRef::Inline(shape) => return Some(shape.as_ref()),
                TypeRef::Named(type_name) => {
                    if let Some(target) = self.schema.lookup_type(type_name) {
                        return Some(target);
                    }
                    trace!(
                        "Type '{}' of property '{}' is not registered",
                        type_name, segment
                    );
                }
            }
        }

        if let Some(child) = node.child(segment) {
            return Some(child);
        }

        let element = collection_element_type(segment)?;
        trace!(
            "Collection fallback: '{}' treated as a collection of '{}'",
            segment, element
        );
        self.schema.lookup_type(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ConstantGroups, PropertyDescriptor};
    use std::collections::BTreeMap;

    fn schema() -> ApiSchema {
        let app = SchemaNode::typed("Application")
            .with_property(PropertyDescriptor::named("project", "Project"))
            .with_property(PropertyDescriptor::inline(
                "encoder",
                SchemaNode::typed("Encoder")
                    .with_property(PropertyDescriptor::named("version", "String")),
            ));
        let mut globals = BTreeMap::new();
        globals.insert("app".to_string(), app);

        let mut types = BTreeMap::new();
        types.insert(
            "Project".to_string(),
            SchemaNode::typed("Project")
                .with_property(PropertyDescriptor::named("name", "String"))
                .with_property(PropertyDescriptor::named("sequences", "SequenceCollection")),
        );
        types.insert(
            "Track".to_string(),
            SchemaNode::typed("Track").with_property(PropertyDescriptor::named("id", "Number")),
        );
        types.insert(
            "Sequence".to_string(),
            SchemaNode::typed("Sequence")
                .with_property(PropertyDescriptor::named("name", "String")),
        );

        ApiSchema::new(globals, types, ConstantGroups::new())
    }

    #[test]
    fn test_named_reference_follows_registry() {
        let schema = schema();
        let node = PathResolver::new(&schema).resolve(&["app", "project"]).unwrap();
        assert_eq!(node.type_name.as_deref(), Some("Project"));
    }

    #[test]
    fn test_inline_reference_descends() {
        let schema = schema();
        let node = PathResolver::new(&schema).resolve(&["app", "encoder"]).unwrap();
        assert!(node.property("version").is_some());
    }

    #[test]
    fn test_empty_path_is_global_scope() {
        let schema = schema();
        let empty: [&str; 0] = [];
        let node = PathResolver::new(&schema).resolve(&empty).unwrap();
        assert!(node.child("app").is_some());
    }

    #[test]
    fn test_collection_fallback() {
        let schema = schema();
        let resolver = PathResolver::new(&schema);
        let node = resolver.resolve(&["app", "project", "videoTracks"]).unwrap();
        assert_eq!(node.type_name.as_deref(), Some("Track"));

        // A registered-but-unknown collection type also falls back
        let node = resolver.resolve(&["app", "project", "sequences"]).unwrap();
        assert_eq!(node.type_name.as_deref(), Some("Sequence"));
    }

    #[test]
    fn test_unresolvable_path() {
        let schema = schema();
        let resolver = PathResolver::new(&schema);
        assert!(resolver.resolve(&["nothing"]).is_none());
        assert!(resolver.resolve(&["app", "project", "name"]).is_none());
        assert!(resolver.resolve(&["app", "missing", "name"]).is_none());
    }

    #[test]
    fn test_indexed_segment_resolves_to_element() {
        let schema = schema();
        let resolver = PathResolver::new(&schema);
        let node = resolver
            .resolve_indexed(&["app", "project", "sequences"])
            .unwrap();
        assert_eq!(node.type_name.as_deref(), Some("Sequence"));

        // Without an element mapping the indexed shape itself is used
        let node = resolver.resolve_indexed(&["app", "project"]).unwrap();
        assert_eq!(node.type_name.as_deref(), Some("Project"));
    }

    #[test]
    fn test_collection_element_type_table() {
        assert_eq!(collection_element_type("videoTracks"), Some("Track"));
        assert_eq!(collection_element_type("rootItemChildren"), Some("ProjectItem"));
        assert_eq!(collection_element_type("allMarkers"), Some("Marker"));
        assert_eq!(collection_element_type("MarkerCollection"), Some("ProjectItem"));
        assert_eq!(collection_element_type("project"), None);
    }
}
