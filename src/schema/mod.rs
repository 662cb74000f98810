//! The API schema graph driving completion
//!
//! Loaded once at startup (from a JSON document or the bundled Premiere Pro
//! surface) and shared read-only for the lifetime of the process.

pub mod error;
pub mod loader;
pub mod model;

pub use error::SchemaError;
pub use loader::load_or_empty;
pub use model::{
    ApiSchema, ConstantGroups, ConstantLiteral, MethodDescriptor, Parameter, PropertyDescriptor,
    SchemaNode, TypeRef,
};
