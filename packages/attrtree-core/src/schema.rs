//! Schema trees describe the expected type, cardinality and options of the
//! attribute found at the same path.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cardinality::Cardinality;
use crate::copier::copy_tree;
use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::path::Path;
use crate::timezone::Timezone;
use crate::tree::Tree;
use crate::type_tag::TypeTag;
use crate::value::Value;

/// The only option key any type understands, and only TIME does.
pub const TIMEZONE_OPTION: &str = "timezone";

pub type SchemaTree = Tree<SchemaEntry>;

/// Payload of one schema node. Leaves must have a type before they are
/// verified or merged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaEntry {
    type_tag: Option<TypeTag>,
    cardinality: Option<Cardinality>,
    options: BTreeMap<String, Value>,
}

impl SchemaEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(type_tag: TypeTag) -> Self {
        Self {
            type_tag: Some(type_tag),
            ..Self::default()
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_option(key, value);
        self
    }

    pub fn type_tag(&self) -> Option<TypeTag> {
        self.type_tag
    }

    pub fn set_type(&mut self, type_tag: TypeTag) {
        self.type_tag = Some(type_tag);
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality.unwrap_or_default()
    }

    pub fn declared_cardinality(&self) -> Option<Cardinality> {
        self.cardinality
    }

    pub fn set_cardinality(&mut self, cardinality: Cardinality) {
        self.cardinality = Some(cardinality);
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    /// The timezone configured for a TIME leaf, if any.
    pub fn timezone(&self) -> Result<Option<Timezone>> {
        match self.option(TIMEZONE_OPTION) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .and_then(Timezone::resolve)
                .map(Some)
                .ok_or_else(|| Error::IllegalOption {
                    value: value.to_string(),
                    option: TIMEZONE_OPTION.to_string(),
                }),
        }
    }

    /// `"<TYPE> <CARDINALITY>"`; an untyped entry reads as `UNTYPED`.
    pub fn type_description(&self) -> String {
        match self.type_tag {
            Some(type_tag) => type_tag.describe(self.cardinality()),
            None => format!(
                "UNTYPED {}",
                self.cardinality().keyword().to_ascii_uppercase()
            ),
        }
    }

    /// Check the option map against what the leaf's type allows.
    pub fn verify_options(&self) -> Result<()> {
        let type_tag = self.type_tag.ok_or_else(|| {
            Error::InvalidOperation("schema leaf has no type to verify options against".into())
        })?;
        match type_tag {
            TypeTag::Object
            | TypeTag::String
            | TypeTag::Date
            | TypeTag::Binary
            | TypeTag::Boolean
            | TypeTag::Number
            | TypeTag::Null => {
                if self.options.is_empty() {
                    Ok(())
                } else {
                    Err(Error::NoOptions(type_tag))
                }
            }
            TypeTag::Time => {
                if let Some(key) = self.options.keys().find(|k| *k != TIMEZONE_OPTION) {
                    debug!(option = %key, "unknown option on time leaf");
                    return Err(Error::UnknownOption {
                        type_tag,
                        allowed: TIMEZONE_OPTION.to_string(),
                    });
                }
                self.timezone().map(|_| ())
            }
        }
    }

    fn same_shape(&self, other: &SchemaEntry) -> bool {
        self.type_tag == other.type_tag && self.cardinality() == other.cardinality()
    }
}

impl Tree<SchemaEntry> {
    pub fn entry(&self, node: NodeId) -> Option<&SchemaEntry> {
        self.payload(node)
    }

    pub fn entry_mut(&mut self, node: NodeId) -> Option<&mut SchemaEntry> {
        self.payload_mut(node)
    }

    /// Add a structural child that only groups other schema nodes.
    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.add_child(parent, name, SchemaEntry::new())
    }

    pub fn add_entry(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        entry: SchemaEntry,
    ) -> Result<NodeId> {
        self.add_child(parent, name, entry)
    }

    /// Verify the options of every leaf. Inner nodes carry no checks.
    pub fn verify_options(&self) -> Result<()> {
        for node in self.descendants(self.root()) {
            if !self.is_leaf(node) {
                continue;
            }
            if let Some(entry) = self.entry(node) {
                entry.verify_options().map_err(|err| {
                    debug!(path = %self.path(node), error = %err, "schema option check failed");
                    err
                })?;
            }
        }
        Ok(())
    }

    /// Structural union of two schemas.
    ///
    /// Children present on both sides merge recursively; two leaves at the
    /// same path must agree on type and cardinality. Anything present on only
    /// one side is copied over. The result keeps `self`'s root name.
    pub fn merge(&self, other: &SchemaTree) -> Result<SchemaTree> {
        let root = self.root();
        let mut merged = SchemaTree::new(
            self.name(root).map(str::to_string),
            self.entry(root).cloned().unwrap_or_default(),
        );
        let merged_root = merged.root();
        self.merge_children(root, other, other.root(), &mut merged, merged_root, &Path::empty())?;
        Ok(merged)
    }

    fn merge_children(
        &self,
        node: NodeId,
        other: &SchemaTree,
        other_node: NodeId,
        merged: &mut SchemaTree,
        merged_node: NodeId,
        at: &Path,
    ) -> Result<()> {
        let mut consumed = Vec::new();
        for &child in self.children(node) {
            let name = self.name(child).unwrap_or_default();
            let path = at.append(name);
            let Some(counterpart) = other.child_by_name(other_node, name) else {
                merged.graft(merged_node, copy_tree(self, child))?;
                continue;
            };
            consumed.push(counterpart);

            let ours = self.entry(child).cloned().unwrap_or_default();
            let theirs = other.entry(counterpart).cloned().unwrap_or_default();
            match (self.is_leaf(child), other.is_leaf(counterpart)) {
                (true, true) => {
                    if ours.type_tag.is_none() || theirs.type_tag.is_none() {
                        return Err(Error::InvalidOperation(format!(
                            "schema leaf `{path}` has no type"
                        )));
                    }
                    if !ours.same_shape(&theirs) {
                        debug!(%path, "schema merge conflict");
                        return Err(Error::WrongTypes {
                            path,
                            found: ours.type_description(),
                            expected: theirs.type_description(),
                        });
                    }
                    merged.add_child(merged_node, name, ours)?;
                }
                (false, false) => {
                    let merged_child = merged.add_child(merged_node, name, ours)?;
                    self.merge_children(child, other, counterpart, merged, merged_child, &path)?;
                }
                _ => {
                    debug!(%path, "schema merge conflict between leaf and group");
                    return Err(Error::WrongTypes {
                        path,
                        found: ours.type_description(),
                        expected: theirs.type_description(),
                    });
                }
            }
        }
        for &child in other.children(other_node) {
            if !consumed.contains(&child) {
                merged.graft(merged_node, copy_tree(other, child))?;
            }
        }
        Ok(())
    }
}
