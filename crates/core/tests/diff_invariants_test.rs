//! Quantified invariants and concrete scenarios from SPEC_FULL.md §8,
//! exercised against bare fixtures (no live connection or persisted file).

use ddlsync_core::{
    Change, ChangeState, Column, Domain, Exception, IndexDef, IndexField, IndexKind, KindTag,
    Role, Schema, SchemaObject, Table, Trigger, diff_schemas, table_internal_changes,
};

const ALL_KINDS: &[KindTag] = &[
    KindTag::Table,
    KindTag::View,
    KindTag::Routine,
    KindTag::Trigger,
    KindTag::Index,
    KindTag::Domain,
    KindTag::Exception,
    KindTag::Sequence,
    KindTag::Role,
];

fn engines(columns: &[(&str, &str)]) -> SchemaObject {
    let table = Table::new("engines").with_columns(
        columns
            .iter()
            .enumerate()
            .map(|(i, (name, ty))| Column::new(*name, *ty, i as u32))
            .collect(),
    );
    SchemaObject::Table(table)
}

fn schema_of(objects: Vec<SchemaObject>) -> Schema {
    let mut schema = Schema::new();
    for object in objects {
        schema.add(object);
    }
    schema
}

fn changes_of_kind(changes: &[Change], kind: KindTag) -> Vec<&Change> {
    changes.iter().filter(|c| c.kind == kind).collect()
}

#[test]
fn diff_of_identical_schemas_is_empty() {
    let schema = schema_of(vec![engines(&[("id", "int")])]);
    assert!(diff_schemas(&schema, &schema, ALL_KINDS).is_empty());
}

#[test]
fn element_equals_itself() {
    let table = Table::new("engines").with_columns(vec![Column::new("id", "int", 0)]);
    assert!(table.equals(&table));
}

#[test]
fn equals_is_symmetric() {
    let a = Table::new("engines").with_columns(vec![Column::new("id", "int", 0)]);
    let mut b = a.clone();
    b.columns.push(Column::new("volume", "int", 1));
    assert_eq!(a.equals(&b), b.equals(&a));
    assert!(!a.equals(&b));
}

#[test]
fn changes_are_sorted_by_priority_descending() {
    let source = schema_of(vec![engines(&[("id", "int")]), SchemaObject::Role(Role::new("admin"))]);
    let target = Schema::new();
    let changes = diff_schemas(&source, &target, ALL_KINDS);
    let priorities: Vec<i32> = changes.iter().map(|c| c.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
}

#[test]
fn scenario_1_add_column_is_a_single_table_update() {
    let source = schema_of(vec![engines(&[("id", "int"), ("volume", "int")])]);
    let target = schema_of(vec![engines(&[("id", "int")])]);

    let changes = diff_schemas(&source, &target, ALL_KINDS);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].state, ChangeState::Update);
    assert_eq!(changes[0].kind, KindTag::Table);

    let target_table = target.get(KindTag::Table, "engines").unwrap().as_table().unwrap();
    let source_table = source.get(KindTag::Table, "engines").unwrap().as_table().unwrap();
    let sub_changes = table_internal_changes(target_table, source_table);
    assert_eq!(sub_changes.len(), 1);
    match &sub_changes[0] {
        ddlsync_core::TableSubChange::Column { state, to, .. } => {
            assert_eq!(*state, ChangeState::Create);
            assert_eq!(to.as_ref().unwrap().name, "volume");
        }
        other => panic!("expected a column change, got {other:?}"),
    }
}

#[test]
fn scenario_2_drop_table() {
    let source = Schema::new();
    let target = schema_of(vec![engines(&[("id", "int")])]);

    let changes = diff_schemas(&source, &target, ALL_KINDS);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].state, ChangeState::Drop);
    assert_eq!(changes[0].kind, KindTag::Table);
    assert_eq!(changes[0].name(), "engines");
}

#[test]
fn scenario_3_create_table_with_secondary_index_is_two_changes() {
    let mut cars = Table::new("cars").with_columns(vec![
        Column::new("id", "int", 0),
        Column::new("name", "varchar(64)", 1),
        Column::new("id_category", "int", 2),
    ]);
    cars.add_index(IndexDef::new("pk_cars", IndexKind::PrimaryKey, "cars").with_fields(vec![
        IndexField {
            name: "id".to_string(),
            position: 0,
        },
    ]));
    cars.add_index(IndexDef::new("idx_1", IndexKind::Index, "cars").with_fields(vec![
        IndexField {
            name: "name".to_string(),
            position: 0,
        },
    ]));

    let source = schema_of(vec![SchemaObject::Table(cars)]);
    let target = Schema::new();

    let changes = diff_schemas(&source, &target, ALL_KINDS);
    assert_eq!(changes.len(), 2, "expected exactly table-create + index-create, got {changes:?}");
    assert!(changes[0].priority >= changes[1].priority);
    assert_eq!(changes[0].kind, KindTag::Table);
    assert_eq!(changes[0].state, ChangeState::Create);
    assert_eq!(changes[1].kind, KindTag::Index);
    assert_eq!(changes[1].state, ChangeState::Create);
    assert_eq!(changes[1].name(), "idx_1");
}

#[test]
fn scenario_4_foreign_key_drop_precedes_table_drop() {
    let mut cars_with_fk = Table::new("cars").with_columns(vec![Column::new("id", "int", 0)]);
    cars_with_fk.add_index(IndexDef::new("fk_category", IndexKind::ForeignKey, "cars"));

    let cars_without_fk = Table::new("cars").with_columns(vec![Column::new("id", "int", 0)]);
    let categories = Table::new("categories").with_columns(vec![Column::new("id", "int", 0)]);

    let source = schema_of(vec![SchemaObject::Table(cars_without_fk)]);
    let target = schema_of(vec![SchemaObject::Table(cars_with_fk), SchemaObject::Table(categories)]);

    let changes = diff_schemas(&source, &target, ALL_KINDS);

    let table_drop = changes
        .iter()
        .find(|c| c.kind == KindTag::Table && c.state == ChangeState::Drop)
        .expect("categories table drop");
    let fk_drop = changes
        .iter()
        .find(|c| c.kind == KindTag::Index && c.state == ChangeState::Drop)
        .expect("foreign key drop");

    assert!(fk_drop.priority > table_drop.priority);
    let fk_index = changes_of_kind(&changes, KindTag::Index);
    assert_eq!(fk_index.len(), 1, "cars's own unrelated attributes must not also change");
}

#[test]
fn scenario_5_comment_only_change_on_exception() {
    let mut commented = Exception::new("bad_input", 1, "bad input");
    commented.comment = "needs review".to_string();

    let source = schema_of(vec![SchemaObject::Exception(commented)]);
    let target = schema_of(vec![SchemaObject::Exception(Exception::new("bad_input", 1, "bad input"))]);

    let changes = diff_schemas(&source, &target, ALL_KINDS);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].state, ChangeState::Update);
    assert_eq!(changes[0].kind, KindTag::Exception);
}

#[test]
fn column_position_change_alone_is_an_update() {
    let a = Column::new("id", "int", 0);
    let mut b = a.clone();
    b.position = 1;
    assert_ne!(a, b);
}

#[test]
fn domain_is_closed_per_dialect_via_kinds_slice() {
    let source = schema_of(vec![SchemaObject::Domain(Domain::new("money", "decimal(10,2)"))]);
    let target = Schema::new();
    let mysql_kinds: &[KindTag] = &[KindTag::Table, KindTag::View, KindTag::Routine, KindTag::Trigger, KindTag::Index];
    assert!(diff_schemas(&source, &target, mysql_kinds).is_empty());

    let firebird_kinds: &[KindTag] = &[KindTag::Domain];
    let changes = diff_schemas(&source, &target, firebird_kinds);
    assert_eq!(changes.len(), 1);
}

#[test]
fn trigger_on_unchanged_table_diffs_independently() {
    let mut with_trigger = Table::new("orders").with_columns(vec![Column::new("id", "int", 0)]);
    with_trigger.add_trigger(Trigger::new("trg_audit", "orders", "AFTER INSERT", "BEGIN END"));
    let without_trigger = Table::new("orders").with_columns(vec![Column::new("id", "int", 0)]);

    let source = schema_of(vec![SchemaObject::Table(with_trigger)]);
    let target = schema_of(vec![SchemaObject::Table(without_trigger)]);

    let changes = diff_schemas(&source, &target, ALL_KINDS);
    let table_changes = changes_of_kind(&changes, KindTag::Table);
    let trigger_changes = changes_of_kind(&changes, KindTag::Trigger);
    assert_eq!(table_changes.len(), 0, "the table itself is unchanged, only its trigger is new");
    assert_eq!(trigger_changes.len(), 1);
    assert_eq!(trigger_changes[0].state, ChangeState::Create);
}
