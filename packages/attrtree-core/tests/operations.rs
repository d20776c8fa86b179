use attrtree_core::{
    Attribute, AttributeTree, Cardinality, CoercionConfig, Error, ErrorCode, Path, SchemaCoercion,
    SchemaEntry, SchemaTree, Timezone, TypeTag, Value, TIMEZONE_OPTION,
};
use attrtree_test_support::{attributes, event_request, event_schema, schema, DAY, HOUR};

fn leaf<'t>(tree: &'t AttributeTree, path: &str) -> &'t Attribute {
    let node = tree
        .resolve(tree.root(), &Path::parse(path))
        .unwrap_or_else(|| panic!("no node at {path}"));
    tree.attribute(node).unwrap()
}

fn run(schema: &SchemaTree, tree: &mut AttributeTree) -> Result<(), Error> {
    SchemaCoercion::new(schema, &CoercionConfig::default()).apply(tree)
}

#[test]
fn event_request_is_fully_coerced() {
    let schema = event_schema();
    let config = CoercionConfig::with_default_timezone(Timezone::resolve("GMT-05:00").unwrap());
    let mut tree = event_request(10 * DAY);
    SchemaCoercion::new(&schema, &config).apply(&mut tree).unwrap();

    let day = leaf(&tree, "when/day");
    assert_eq!(day.type_tag(), TypeTag::Date);
    assert_eq!(day.value(), Some(&Value::Integer(10 * DAY)));

    // schema zone GMT+02:00
    assert_eq!(
        leaf(&tree, "when/start").value(),
        Some(&Value::Integer(10 * DAY + 7 * HOUR))
    );
    // default zone GMT-05:00
    assert_eq!(
        leaf(&tree, "when/end").value(),
        Some(&Value::Integer(10 * DAY + 15 * HOUR))
    );

    let attachment = leaf(&tree, "attachment");
    assert_eq!(attachment.type_tag(), TypeTag::Binary);
    assert_eq!(attachment.value(), Some(&Value::from("agenda")));

    let labels = leaf(&tree, "labels");
    assert_eq!(labels.cardinality(), Cardinality::Set);
    assert_eq!(labels.values().len(), 2);

    let reminders = leaf(&tree, "reminders");
    assert_eq!(reminders.type_tag(), TypeTag::Time);
    assert_eq!(reminders.cardinality(), Cardinality::Multiset);
    assert_eq!(
        reminders.values(),
        &[Value::Integer(10 * DAY + 5 * HOUR), Value::Integer(10 * DAY + 5 * HOUR)]
    );

    // no schema counterpart
    assert_eq!(leaf(&tree, "extra/free"), &Attribute::boolean(true));
}

#[test]
fn midnight_number_becomes_date() {
    let schema = schema("r", [("d", SchemaEntry::typed(TypeTag::Date))]);
    let mut tree = attributes("r", [("d", Attribute::number(0i64))]);
    run(&schema, &mut tree).unwrap();
    assert_eq!(leaf(&tree, "d").type_tag(), TypeTag::Date);
}

#[test]
fn non_midnight_number_is_illegal_date() {
    let schema = schema("r", [("d", SchemaEntry::typed(TypeTag::Date))]);
    let mut tree = attributes("r", [("d", Attribute::number(3_600_000i64))]);
    let err = run(&schema, &mut tree).unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalValue);
    assert_eq!(err.args(), vec!["3600000".to_string(), "date".to_string()]);
}

#[test]
fn time_shift_subtracts_offset() {
    let schema = schema(
        "r",
        [(
            "t",
            SchemaEntry::typed(TypeTag::Time).with_option(TIMEZONE_OPTION, "GMT+02:00"),
        )],
    );
    let mut tree = attributes("r", [("t", Attribute::number(0i64))]);
    run(&schema, &mut tree).unwrap();
    assert_eq!(leaf(&tree, "t").value(), Some(&Value::Integer(-7_200_000)));
}

#[test]
fn time_uses_named_zone_offset_at_instant() {
    let schema = schema(
        "r",
        [(
            "t",
            SchemaEntry::typed(TypeTag::Time).with_option(TIMEZONE_OPTION, "Europe/Berlin"),
        )],
    );
    // 2024-07-01T00:00:00Z, Berlin is on summer time
    let summer = 1_719_792_000_000i64;
    let mut tree = attributes("r", [("t", Attribute::number(summer))]);
    run(&schema, &mut tree).unwrap();
    assert_eq!(leaf(&tree, "t").value(), Some(&Value::Integer(summer - 2 * HOUR)));
}

#[test]
fn incompatible_source_type_is_reported() {
    let schema = schema("r", [("flag", SchemaEntry::typed(TypeTag::Boolean))]);
    let mut tree = attributes("r", [("flag", Attribute::string("yes"))]);
    let err = run(&schema, &mut tree).unwrap_err();
    assert_eq!(
        err,
        Error::IncompatibleTypes {
            from: TypeTag::String,
            to: TypeTag::Boolean
        }
    );
    assert_eq!(err.to_string(), "cannot coerce from `string` to `boolean`");
}

#[test]
fn single_value_against_set_schema_is_wrong_types() {
    let schema = schema(
        "r",
        [(
            "grp/tags",
            SchemaEntry::typed(TypeTag::String).with_cardinality(Cardinality::Set),
        )],
    );
    let mut tree = attributes("r", [("grp/tags", Attribute::string("solo"))]);
    let err = run(&schema, &mut tree).unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongTypes);
    assert_eq!(
        err.args(),
        vec![
            "grp/tags".to_string(),
            "STRING SINGLE".to_string(),
            "STRING SET".to_string()
        ]
    );
}

#[test]
fn schema_without_type_keeps_node_type() {
    let mut schema = SchemaTree::named("r");
    let root = schema.root();
    schema
        .add_entry(root, "n", SchemaEntry::new().with_cardinality(Cardinality::Set))
        .unwrap();
    let mut tree = attributes(
        "r",
        [(
            "n",
            Attribute::multiple(TypeTag::Number, Cardinality::Multiset, [1i64, 2, 2, 3]).unwrap(),
        )],
    );
    run(&schema, &mut tree).unwrap();
    let n = leaf(&tree, "n");
    assert_eq!(n.type_tag(), TypeTag::Number);
    assert_eq!(n.cardinality(), Cardinality::Set);
    assert_eq!(n.values().len(), 3);
}

#[test]
fn failed_apply_leaves_request_unchanged() {
    let schema = event_schema();
    let mut tree = event_request(10 * DAY + 1);
    let before = tree.clone();
    let err = run(&schema, &mut tree).unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalValue);
    attrtree_test_support::assert_same_tree(&tree, &before);
}

#[test]
fn apply_in_place_stops_at_first_error() {
    let schema = schema(
        "r",
        [
            ("a", SchemaEntry::typed(TypeTag::Time)),
            ("b", SchemaEntry::typed(TypeTag::Boolean)),
            ("c", SchemaEntry::typed(TypeTag::Date)),
        ],
    );
    let mut tree = attributes(
        "r",
        [
            ("a", Attribute::number(5i64)),
            ("b", Attribute::number(1i64)),
            ("c", Attribute::number(0i64)),
        ],
    );
    let err = SchemaCoercion::new(&schema, &CoercionConfig::default())
        .apply_in_place(&mut tree)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IncompatibleTypes);
    assert_eq!(leaf(&tree, "a").type_tag(), TypeTag::Time);
    // never reached
    assert_eq!(leaf(&tree, "c").type_tag(), TypeTag::Number);
}
