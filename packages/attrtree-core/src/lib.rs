#![forbid(unsafe_code)]
//! Typed attribute trees with schema-driven coercion.
//! Callers build an untyped attribute tree from request data and a schema tree from
//! configuration; the engine reconciles the two, converting leaf values to the types the
//! schema expects or reporting the first mismatch as a structured error.

pub mod attribute;
pub mod cardinality;
pub mod coercion;
pub mod config;
pub mod copier;
pub mod error;
pub mod ids;
pub mod path;
pub mod schema;
pub mod schema_coercion;
pub mod timezone;
pub mod traits;
pub mod tree;
pub mod type_tag;
pub mod value;

pub use attribute::{Attribute, AttributeTree};
pub use cardinality::Cardinality;
pub use coercion::coerce;
pub use config::CoercionConfig;
#[cfg(feature = "serde")]
pub use config::SchemaSpec;
pub use copier::{copy_tree, TreeCopier};
pub use error::{Error, ErrorCode, Result};
pub use ids::NodeId;
pub use path::Path;
pub use schema::{SchemaEntry, SchemaTree, TIMEZONE_OPTION};
pub use schema_coercion::{SchemaCoercion, SchemaCoercionVisitor};
pub use timezone::Timezone;
pub use traits::{Visit, Visitor, VisitorMut};
pub use tree::Tree;
pub use type_tag::TypeTag;
pub use value::Value;
