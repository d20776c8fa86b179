//! Coercion settings and, with the `serde` feature, loading schemas and
//! attribute trees from JSON documents.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::timezone::Timezone;

/// Settings for one coercion run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoercionConfig {
    /// Zone used for TIME leaves whose schema names none.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_timezone: Timezone,
}

impl CoercionConfig {
    pub fn with_default_timezone(default_timezone: Timezone) -> Self {
        Self { default_timezone }
    }
}

#[cfg(feature = "serde")]
pub use self::documents::SchemaSpec;

#[cfg(feature = "serde")]
mod documents {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Number};

    use super::CoercionConfig;
    use crate::attribute::{Attribute, AttributeTree};
    use crate::cardinality::Cardinality;
    use crate::error::{Error, Result};
    use crate::ids::NodeId;
    use crate::schema::{SchemaEntry, SchemaTree};
    use crate::tree::Tree;
    use crate::type_tag::TypeTag;
    use crate::value::Value;

    impl CoercionConfig {
        pub fn from_json_str(json: &str) -> Result<Self> {
            serde_json::from_str(json)
                .map_err(|e| Error::InvalidOperation(format!("invalid coercion config: {e}")))
        }
    }

    /// Serialized description of a schema tree.
    ///
    /// ```json
    /// { "name": "event", "children": [
    ///     { "name": "start", "type": "time", "options": { "timezone": "UTC" } },
    ///     { "name": "tags", "type": "string", "cardinality": "set" } ] }
    /// ```
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct SchemaSpec {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        pub type_tag: Option<TypeTag>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cardinality: Option<Cardinality>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        pub options: BTreeMap<String, Value>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub children: Vec<SchemaSpec>,
    }

    impl SchemaSpec {
        pub fn from_json_str(json: &str) -> Result<Self> {
            serde_json::from_str(json)
                .map_err(|e| Error::InvalidOperation(format!("invalid schema document: {e}")))
        }

        /// Build the schema tree and verify its options.
        pub fn into_tree(self) -> Result<SchemaTree> {
            let (name, entry, children) = self.split();
            let mut tree = SchemaTree::new(name, entry);
            let root = tree.root();
            for child in children {
                child.build_into(&mut tree, root)?;
            }
            tree.verify_options()?;
            Ok(tree)
        }

        fn build_into(self, tree: &mut SchemaTree, parent: NodeId) -> Result<()> {
            let (name, entry, children) = self.split();
            let name = name.ok_or_else(|| {
                Error::InvalidOperation("schema children must be named".into())
            })?;
            let node = tree.add_child(parent, name, entry)?;
            for child in children {
                child.build_into(tree, node)?;
            }
            Ok(())
        }

        fn split(self) -> (Option<String>, SchemaEntry, Vec<SchemaSpec>) {
            let mut entry = SchemaEntry::new();
            if let Some(type_tag) = self.type_tag {
                entry.set_type(type_tag);
            }
            if let Some(cardinality) = self.cardinality {
                entry.set_cardinality(cardinality);
            }
            for (key, value) in self.options {
                entry.set_option(key, value);
            }
            (self.name, entry, self.children)
        }

        /// Describe an existing schema tree.
        pub fn from_tree(tree: &SchemaTree) -> Self {
            Self::describe(tree, tree.root())
        }

        fn describe(tree: &SchemaTree, node: NodeId) -> Self {
            let entry = tree.entry(node).cloned().unwrap_or_default();
            Self {
                name: tree.name(node).map(str::to_string),
                type_tag: entry.type_tag(),
                cardinality: entry.declared_cardinality(),
                options: entry.options().clone(),
                children: tree
                    .children(node)
                    .iter()
                    .map(|child| Self::describe(tree, *child))
                    .collect(),
            }
        }
    }

    impl Tree<Attribute> {
        /// Build an attribute tree from raw request data.
        ///
        /// Objects become structural nodes, scalars become leaves typed by
        /// guessing, arrays become MULTISET leaves whose elements must all
        /// guess to the same type (an empty array is NULL-typed), and `null`
        /// becomes a NULL leaf.
        pub fn from_json(root_name: impl Into<String>, json: &serde_json::Value) -> Result<Self> {
            let mut tree = match leaf_attribute(json)? {
                Some(attribute) => AttributeTree::new(Some(root_name.into()), attribute),
                None => AttributeTree::named(root_name),
            };
            if let serde_json::Value::Object(fields) = json {
                let root = tree.root();
                fill(&mut tree, root, fields)?;
            }
            Ok(tree)
        }

        /// Render the tree below the root back to JSON.
        pub fn to_json(&self) -> serde_json::Value {
            render(self, self.root())
        }
    }

    fn fill(tree: &mut AttributeTree, parent: NodeId, fields: &Map<String, serde_json::Value>) -> Result<()> {
        for (name, json) in fields {
            match leaf_attribute(json)? {
                Some(attribute) => {
                    tree.add_leaf(parent, name.as_str(), attribute)?;
                }
                None => {
                    let node = tree.add_structure(parent, name.as_str())?;
                    if let serde_json::Value::Object(nested) = json {
                        fill(tree, node, nested)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// `None` for objects, which become structural nodes.
    fn leaf_attribute(json: &serde_json::Value) -> Result<Option<Attribute>> {
        match json {
            serde_json::Value::Object(_) => Ok(None),
            serde_json::Value::Null => Ok(Some(Attribute::null())),
            serde_json::Value::Array(items) => {
                let values = items.iter().map(scalar).collect::<Result<Vec<_>>>()?;
                let mut type_tag = None;
                for value in &values {
                    let guessed = TypeTag::guess(value).ok_or_else(|| {
                        Error::InvalidOperation(format!("cannot type array element `{value}`"))
                    })?;
                    match type_tag {
                        Some(seen) if seen != guessed => {
                            return Err(Error::InvalidOperation(format!(
                                "array mixes `{seen}` and `{guessed}` elements"
                            )))
                        }
                        _ => type_tag = Some(guessed),
                    }
                }
                Attribute::multiple(type_tag.unwrap_or(TypeTag::Null), Cardinality::Multiset, values)
                    .map(Some)
            }
            scalar_json => {
                let value = scalar(scalar_json)?;
                Attribute::guess(value.clone())
                    .map(Some)
                    .ok_or_else(|| Error::InvalidOperation(format!("cannot type value `{value}`")))
            }
        }
    }

    fn scalar(json: &serde_json::Value) -> Result<Value> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            serde_json::Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            other => Err(Error::InvalidOperation(format!(
                "nested structure `{other}` inside an array"
            ))),
        }
    }

    fn render(tree: &AttributeTree, node: NodeId) -> serde_json::Value {
        if tree.is_leaf(node) {
            return tree
                .attribute(node)
                .and_then(Attribute::value)
                .map(to_json_value)
                .unwrap_or(serde_json::Value::Null);
        }
        let mut fields = Map::new();
        for &child in tree.children(node) {
            fields.insert(
                tree.name(child).unwrap_or_default().to_string(),
                render(tree, child),
            );
        }
        serde_json::Value::Object(fields)
    }

    fn to_json_value(value: &Value) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(x) => Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Binary(bytes) => serde_json::Value::Array(
                bytes.iter().map(|b| serde_json::Value::Number((*b).into())).collect(),
            ),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json_value).collect()),
        }
    }

}
