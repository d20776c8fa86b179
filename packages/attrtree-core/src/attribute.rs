//! Attribute trees: the data side of the engine.
//!
//! Leaves carry a typed payload, inner nodes only give structure. A payload is
//! a scalar for SINGLE cardinality and a [`Value::Array`] otherwise; NULL
//! leaves carry nothing.

use crate::cardinality::Cardinality;
use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::path::Path;
use crate::tree::Tree;
use crate::type_tag::TypeTag;
use crate::value::Value;

pub type AttributeTree = Tree<Attribute>;

/// Payload of one attribute node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attribute {
    type_tag: Option<TypeTag>,
    cardinality: Option<Cardinality>,
    value: Option<Value>,
}

impl Attribute {
    /// Untyped, empty payload, as carried by structural nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A NULL leaf. Its cardinality is left undeclared so it fits a schema
    /// leaf of any cardinality.
    pub fn null() -> Self {
        Self {
            type_tag: Some(TypeTag::Null),
            cardinality: None,
            value: None,
        }
    }

    pub fn single(type_tag: TypeTag, value: impl Into<Value>) -> Result<Self> {
        let mut attribute = Self::new();
        attribute.set_payload(value.into(), type_tag, Cardinality::Single)?;
        Ok(attribute)
    }

    pub fn multiple<I, V>(type_tag: TypeTag, cardinality: Cardinality, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        let mut attribute = Self::new();
        attribute.set_payload(Value::Array(values), type_tag, cardinality)?;
        Ok(attribute)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::scalar(TypeTag::String, Value::String(s.into()))
    }

    pub fn number(n: impl Into<Value>) -> Self {
        Self::scalar(TypeTag::Number, n.into())
    }

    pub fn boolean(b: bool) -> Self {
        Self::scalar(TypeTag::Boolean, Value::Boolean(b))
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::scalar(TypeTag::Binary, Value::Binary(bytes.into()))
    }

    /// A DATE leaf from UTC epoch milliseconds (expected at midnight).
    pub fn date(epoch_millis: i64) -> Self {
        Self::scalar(TypeTag::Date, Value::Integer(epoch_millis))
    }

    pub fn time(epoch_millis: i64) -> Self {
        Self::scalar(TypeTag::Time, Value::Integer(epoch_millis))
    }

    fn scalar(type_tag: TypeTag, value: Value) -> Self {
        Self {
            type_tag: Some(type_tag),
            cardinality: Some(Cardinality::Single),
            value: Some(value),
        }
    }

    /// Type an untyped scalar by its shape; `None` when it cannot be guessed.
    pub fn guess(value: Value) -> Option<Self> {
        let type_tag = TypeTag::guess(&value)?;
        Some(Self::scalar(type_tag, value))
    }

    /// The leaf's type; OBJECT when none was ever assigned.
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag.unwrap_or(TypeTag::Object)
    }

    pub fn declared_type(&self) -> Option<TypeTag> {
        self.type_tag
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality.unwrap_or_default()
    }

    pub fn declared_cardinality(&self) -> Option<Cardinality> {
        self.cardinality
    }

    pub fn is_multiple(&self) -> bool {
        self.cardinality().is_multiple()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Elements of a multi-valued payload; empty for scalars.
    pub fn values(&self) -> &[Value] {
        self.value
            .as_ref()
            .and_then(Value::as_array)
            .unwrap_or_default()
    }

    /// Set value, type and cardinality together.
    ///
    /// Multi-valued cardinalities require an array, SINGLE forbids one. A
    /// NULL payload fits any cardinality and is stored as absent.
    pub fn set_payload(
        &mut self,
        value: Value,
        type_tag: TypeTag,
        cardinality: Cardinality,
    ) -> Result<()> {
        if value != Value::Null && cardinality.is_multiple() != value.is_array() {
            return Err(Error::InvalidOperation(format!(
                "payload `{value}` does not fit cardinality `{cardinality}`"
            )));
        }
        self.type_tag = Some(type_tag);
        self.cardinality = Some(cardinality);
        self.value = match value {
            Value::Null => None,
            other => Some(other),
        };
        Ok(())
    }

    pub fn copy_payload_from(&mut self, other: &Attribute) {
        self.type_tag = other.type_tag;
        self.cardinality = other.cardinality;
        self.value = other.value.clone();
    }

    pub fn type_description(&self) -> String {
        self.type_tag().describe(self.cardinality())
    }
}

impl Tree<Attribute> {
    pub fn attribute(&self, node: NodeId) -> Option<&Attribute> {
        self.payload(node)
    }

    pub fn attribute_mut(&mut self, node: NodeId) -> Option<&mut Attribute> {
        self.payload_mut(node)
    }

    /// Add a structural (payload-less) child.
    pub fn add_structure(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.add_child(parent, name, Attribute::new())
    }

    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        attribute: Attribute,
    ) -> Result<NodeId> {
        self.add_child(parent, name, attribute)
    }

    pub fn add_null(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.add_child(parent, name, Attribute::null())
    }

    /// Payload of the node at `path` below the root.
    pub fn value_at(&self, path: &Path) -> Option<&Value> {
        self.resolve(self.root(), path)
            .and_then(|node| self.attribute(node))
            .and_then(Attribute::value)
    }
}
