use attrtree_core::{Cardinality, Error, ErrorCode, Path, SchemaEntry, TypeTag, TIMEZONE_OPTION};
use attrtree_test_support::{assert_same_tree, event_schema, schema};

#[test]
fn conflicting_leaves_report_their_path() {
    let left = schema("r", [("a/b", SchemaEntry::typed(TypeTag::String))]);
    let right = schema("r", [("a/b", SchemaEntry::typed(TypeTag::Number))]);
    let err = left.merge(&right).unwrap_err();
    assert_eq!(
        err,
        Error::WrongTypes {
            path: Path::parse("a/b"),
            found: "STRING SINGLE".into(),
            expected: "NUMBER SINGLE".into(),
        }
    );
}

#[test]
fn cardinality_mismatch_is_a_conflict() {
    let left = schema("r", [("tags", SchemaEntry::typed(TypeTag::String))]);
    let right = schema(
        "r",
        [(
            "tags",
            SchemaEntry::typed(TypeTag::String).with_cardinality(Cardinality::Set),
        )],
    );
    assert_eq!(left.merge(&right).unwrap_err().code(), ErrorCode::WrongTypes);
}

#[test]
fn leaf_against_group_is_a_conflict() {
    let left = schema("r", [("a", SchemaEntry::typed(TypeTag::String))]);
    let right = schema("r", [("a/b", SchemaEntry::typed(TypeTag::String))]);
    let err = left.merge(&right).unwrap_err();
    assert_eq!(err.args()[0], "a");
}

#[test]
fn one_sided_subtrees_are_copied() {
    let left = schema("r", [("a/x", SchemaEntry::typed(TypeTag::Date))]);
    let right = schema(
        "r",
        [
            ("a/y", SchemaEntry::typed(TypeTag::Boolean)),
            ("b/c/d", SchemaEntry::typed(TypeTag::Binary)),
        ],
    );
    let merged = left.merge(&right).unwrap();
    merged.validate_invariants().unwrap();

    let root = merged.root();
    for (path, expected) in [
        ("a/x", TypeTag::Date),
        ("a/y", TypeTag::Boolean),
        ("b/c/d", TypeTag::Binary),
    ] {
        let node = merged.resolve(root, &Path::parse(path)).unwrap();
        assert_eq!(merged.entry(node).unwrap().type_tag(), Some(expected), "{path}");
    }
    // inputs are untouched
    assert!(left.resolve(left.root(), &Path::parse("a/y")).is_none());
}

#[test]
fn merging_with_itself_changes_nothing() {
    let event = event_schema();
    let merged = event.merge(&event).unwrap();
    assert_same_tree(&merged, &event);
}

#[test]
fn equal_leaves_keep_left_options() {
    let left = schema(
        "r",
        [(
            "t",
            SchemaEntry::typed(TypeTag::Time).with_option(TIMEZONE_OPTION, "UTC"),
        )],
    );
    let right = schema(
        "r",
        [(
            "t",
            SchemaEntry::typed(TypeTag::Time).with_option(TIMEZONE_OPTION, "Asia/Tokyo"),
        )],
    );
    let merged = left.merge(&right).unwrap();
    let t = merged.resolve(merged.root(), &Path::parse("t")).unwrap();
    assert_eq!(
        merged.entry(t).unwrap().timezone().unwrap().unwrap().id(),
        "UTC"
    );
}

#[test]
fn option_verification_on_whole_schema() {
    event_schema().verify_options().unwrap();

    let unknown = schema(
        "r",
        [(
            "t",
            SchemaEntry::typed(TypeTag::Time).with_option("foo", "bar"),
        )],
    );
    assert_eq!(
        unknown.verify_options().unwrap_err().code(),
        ErrorCode::UnknownOption
    );

    let no_options = schema(
        "r",
        [(
            "s",
            SchemaEntry::typed(TypeTag::String).with_option(TIMEZONE_OPTION, "UTC"),
        )],
    );
    assert_eq!(
        no_options.verify_options().unwrap_err(),
        Error::NoOptions(TypeTag::String)
    );
}
