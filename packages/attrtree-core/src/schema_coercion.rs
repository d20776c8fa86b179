//! Reconciles an attribute tree against a schema tree.

use tracing::{debug, trace};

use crate::attribute::{Attribute, AttributeTree};
use crate::coercion::coerce;
use crate::config::CoercionConfig;
use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::schema::SchemaTree;
use crate::timezone::Timezone;
use crate::traits::{Visit, VisitorMut};
use crate::value::Value;

/// Downward visitor that coerces each attribute leaf to the type its schema
/// counterpart expects.
///
/// Leaves without a counterpart are left alone. The first failure is kept
/// and aborts the walk; leaves visited before it stay coerced.
pub struct SchemaCoercionVisitor<'a> {
    schema: &'a SchemaTree,
    default_timezone: &'a Timezone,
    error: Option<Error>,
    coerced: usize,
}

impl<'a> SchemaCoercionVisitor<'a> {
    pub fn new(schema: &'a SchemaTree, default_timezone: &'a Timezone) -> Self {
        Self {
            schema,
            default_timezone,
            error: None,
            coerced: 0,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Number of leaves rewritten so far.
    pub fn coerced(&self) -> usize {
        self.coerced
    }

    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn coerce_leaf(&mut self, tree: &mut AttributeTree, node: NodeId) -> Result<()> {
        let Some(path) = tree.path_from(tree.root(), node) else {
            return Ok(());
        };
        let Some(entry) = self
            .schema
            .resolve(self.schema.root(), &path)
            .and_then(|schema_node| self.schema.entry(schema_node))
        else {
            return Ok(());
        };
        let Some(attribute) = tree.attribute(node) else {
            return Ok(());
        };

        if let (Some(found), Some(expected)) = (
            attribute.declared_cardinality(),
            entry.declared_cardinality(),
        ) {
            if found.is_multiple() != expected.is_multiple() {
                return Err(Error::WrongTypes {
                    path,
                    found: attribute.type_description(),
                    expected: entry.type_description(),
                });
            }
        }

        let source = attribute.type_tag();
        let target = entry.type_tag().unwrap_or(source);
        target.check_coercible_from(source)?;

        let convert = |value: &Value| -> Result<Value> {
            let converted = coerce(source, target, value, entry, self.default_timezone)?;
            target.validate(&converted)?;
            Ok(converted)
        };

        let (value, cardinality) = if attribute.is_multiple() {
            let cardinality = entry
                .declared_cardinality()
                .unwrap_or_else(|| attribute.cardinality());
            let values = attribute.values();
            let mut converted = if values.is_empty() {
                Vec::new()
            } else {
                target.new_array(values.len())?
            };
            for value in values {
                converted.push(convert(value)?);
            }
            (
                Value::Array(cardinality.apply_restrictions(converted)),
                cardinality,
            )
        } else {
            match attribute.value() {
                Some(value) => (convert(value)?, attribute.cardinality()),
                None => (
                    Value::Null,
                    entry
                        .declared_cardinality()
                        .unwrap_or_else(|| attribute.cardinality()),
                ),
            }
        };

        trace!(%path, from = %source, to = %target, "coerced attribute");
        tree.attribute_mut(node)
            .ok_or_else(|| Error::InvalidOperation(format!("attribute `{path}` vanished")))?
            .set_payload(value, target, cardinality)?;
        self.coerced += 1;
        Ok(())
    }
}

impl VisitorMut<Attribute> for SchemaCoercionVisitor<'_> {
    fn visit(&mut self, tree: &mut AttributeTree, node: NodeId, _depth: usize) -> Visit {
        if !tree.is_leaf(node) {
            return Visit::Continue;
        }
        match self.coerce_leaf(tree, node) {
            Ok(()) => Visit::Continue,
            Err(err) => {
                debug!(path = %tree.path(node), error = %err, "attribute coercion aborted");
                self.error = Some(err);
                Visit::Abort
            }
        }
    }
}

/// Entry point binding a schema to a coercion configuration.
pub struct SchemaCoercion<'a> {
    schema: &'a SchemaTree,
    config: &'a CoercionConfig,
}

impl<'a> SchemaCoercion<'a> {
    pub fn new(schema: &'a SchemaTree, config: &'a CoercionConfig) -> Self {
        Self { schema, config }
    }

    /// Coerce a copy of `tree` and replace `tree` with it only if every leaf
    /// succeeded. On error `tree` is untouched. Node ids stay valid.
    pub fn apply(&self, tree: &mut AttributeTree) -> Result<()> {
        let mut working = tree.clone();
        self.apply_in_place(&mut working)?;
        *tree = working;
        Ok(())
    }

    /// Coerce `tree` directly. On error, leaves visited before the failing
    /// one remain coerced.
    pub fn apply_in_place(&self, tree: &mut AttributeTree) -> Result<()> {
        let mut visitor = SchemaCoercionVisitor::new(self.schema, &self.config.default_timezone);
        let root = tree.root();
        tree.visit_mut(root, &mut visitor);
        debug!(coerced = visitor.coerced(), "schema coercion finished");
        visitor.into_result()
    }
}
