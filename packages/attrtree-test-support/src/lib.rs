//! Fixture builders shared by the attrtree conformance suites.

use attrtree_core::{
    Attribute, AttributeTree, Cardinality, NodeId, Path, SchemaEntry, SchemaTree, Tree, TypeTag,
    TIMEZONE_OPTION,
};

pub const HOUR: i64 = 3_600_000;
pub const DAY: i64 = 24 * HOUR;

/// Node at `path` below the root, creating missing inner nodes with default
/// payloads.
pub fn ensure_path<P: Default>(tree: &mut Tree<P>, path: &Path) -> NodeId {
    let mut node = tree.root();
    for segment in path.segments() {
        node = match tree.child_by_name(node, segment) {
            Some(existing) => existing,
            None => tree
                .add_child(node, segment.as_str(), P::default())
                .expect("parent exists"),
        };
    }
    node
}

/// Insert `payload` as a leaf at the slash-separated `path`.
pub fn put<P: Default>(tree: &mut Tree<P>, path: &str, payload: P) -> NodeId {
    let path = Path::parse(path);
    let name = path.last().expect("leaf path must not be empty").to_string();
    let parent = ensure_path(tree, &path.parent().unwrap_or_default());
    tree.add_child(parent, name, payload).expect("parent exists")
}

pub fn schema<'a>(root: &str, leaves: impl IntoIterator<Item = (&'a str, SchemaEntry)>) -> SchemaTree {
    let mut tree = SchemaTree::named(root);
    for (path, entry) in leaves {
        put(&mut tree, path, entry);
    }
    tree
}

pub fn attributes<'a>(
    root: &str,
    leaves: impl IntoIterator<Item = (&'a str, Attribute)>,
) -> AttributeTree {
    let mut tree = AttributeTree::named(root);
    for (path, attribute) in leaves {
        put(&mut tree, path, attribute);
    }
    tree
}

/// A calendar-entry schema exercising every conversion the engine performs.
pub fn event_schema() -> SchemaTree {
    schema(
        "event",
        [
            ("when/day", SchemaEntry::typed(TypeTag::Date)),
            (
                "when/start",
                SchemaEntry::typed(TypeTag::Time).with_option(TIMEZONE_OPTION, "GMT+02:00"),
            ),
            ("when/end", SchemaEntry::typed(TypeTag::Time)),
            ("title", SchemaEntry::typed(TypeTag::String)),
            ("attachment", SchemaEntry::typed(TypeTag::Binary)),
            (
                "labels",
                SchemaEntry::typed(TypeTag::String).with_cardinality(Cardinality::Set),
            ),
            (
                "reminders",
                SchemaEntry::typed(TypeTag::Time).with_cardinality(Cardinality::Multiset),
            ),
        ],
    )
}

/// Raw request data matching [`event_schema`] before coercion.
pub fn event_request(day: i64) -> AttributeTree {
    attributes(
        "event",
        [
            ("when/day", Attribute::number(day)),
            ("when/start", Attribute::number(day + 9 * HOUR)),
            ("when/end", Attribute::number(day + 10 * HOUR)),
            ("title", Attribute::string("standup")),
            ("attachment", Attribute::string("agenda")),
            (
                "labels",
                Attribute::multiple(TypeTag::String, Cardinality::Multiset, ["work", "daily", "work"])
                    .expect("array payload"),
            ),
            (
                "reminders",
                Attribute::multiple(TypeTag::Number, Cardinality::Multiset, [day, day])
                    .expect("array payload"),
            ),
            ("extra/free", Attribute::boolean(true)),
        ],
    )
}

/// Assert two trees have the same names, shape and payloads, node by node.
pub fn assert_same_tree<P: PartialEq + std::fmt::Debug>(a: &Tree<P>, b: &Tree<P>) {
    assert_same_node(a, a.root(), b, b.root());
}

fn assert_same_node<P: PartialEq + std::fmt::Debug>(
    a: &Tree<P>,
    a_node: NodeId,
    b: &Tree<P>,
    b_node: NodeId,
) {
    assert_eq!(a.name(a_node), b.name(b_node), "names differ at {}", a.path(a_node));
    assert_eq!(
        a.payload(a_node),
        b.payload(b_node),
        "payloads differ at {}",
        a.path(a_node)
    );
    let (a_children, b_children) = (a.children(a_node), b.children(b_node));
    assert_eq!(
        a_children.len(),
        b_children.len(),
        "child counts differ at {}",
        a.path(a_node)
    );
    for (ac, bc) in a_children.iter().zip(b_children) {
        assert_same_node(a, *ac, b, *bc);
    }
}
