//! End-to-end diff-then-render checks against the concrete fixtures every
//! dialect crate shares, exercising `ddlsync_firebird::render` the way the
//! CLI's `diff` command does.

use ddlsync_core::{ChangeState, Column, IndexDef, IndexField, IndexKind, KindTag, diff_schemas};
use ddlsync_testkit::{
    assert_priority_descending, cars_table_with_category_fk, cars_table_with_name_index, categories_table,
    engines_table, engines_table_with_volume, schema_of,
};

const KINDS: &[KindTag] = &[
    KindTag::Domain,
    KindTag::Exception,
    KindTag::Sequence,
    KindTag::Role,
    KindTag::Routine,
    KindTag::View,
    KindTag::Table,
    KindTag::Trigger,
    KindTag::Index,
];

#[test]
fn add_column_emits_alter_table_add() {
    let source = schema_of(vec![engines_table_with_volume()]);
    let target = schema_of(vec![engines_table()]);

    let changes = diff_schemas(&source, &target, KINDS);
    assert_eq!(changes.len(), 1);

    let statements = ddlsync_firebird::render(&changes, ";");
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].as_str(), "ALTER TABLE engines ADD volume INTEGER;");
}

#[test]
fn missing_table_in_source_drops_it_unquoted() {
    let source = schema_of(vec![]);
    let target = schema_of(vec![engines_table()]);

    let changes = diff_schemas(&source, &target, KINDS);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].state, ChangeState::Drop);

    let statements = ddlsync_firebird::render(&changes, ";");
    assert_eq!(statements[0].as_str(), "DROP TABLE engines;");
}

#[test]
fn new_table_cascades_its_secondary_index() {
    let source = schema_of(vec![cars_table_with_name_index()]);
    let target = schema_of(vec![]);

    let changes = diff_schemas(&source, &target, KINDS);
    assert_eq!(changes.len(), 2, "table create plus the cascaded secondary index create");
    assert_priority_descending(&changes);

    let statements = ddlsync_firebird::render(&changes, ";");
    assert_eq!(statements.len(), 2);
    assert!(statements[0].as_str().contains("CREATE TABLE cars ("), "{}", statements[0].as_str());
    assert!(statements[0].as_str().contains("PRIMARY KEY (id)"), "{}", statements[0].as_str());
    assert_eq!(statements[1].as_str(), "CREATE INDEX idx_1 ON cars (name);");
}

#[test]
fn foreign_key_drop_outranks_the_table_it_references() {
    let target = schema_of(vec![cars_table_with_category_fk(), categories_table()]);
    let source = schema_of(vec![cars_table_with_name_index()]);

    let changes = diff_schemas(&source, &target, KINDS);
    assert_priority_descending(&changes);

    let fk_drop_position = changes
        .iter()
        .position(|c| c.kind == KindTag::Index && c.state == ChangeState::Drop)
        .expect("a standalone foreign-key drop change");
    let table_drop_position = changes
        .iter()
        .position(|c| c.kind == KindTag::Table && c.state == ChangeState::Drop)
        .expect("the categories table drop change");
    assert!(
        fk_drop_position < table_drop_position,
        "foreign-key drop must precede the drop of the table it references"
    );

    let fk_statement = &ddlsync_firebird::render(&[changes[fk_drop_position].clone()], ";")[0];
    assert_eq!(fk_statement.as_str(), "DROP INDEX fk_cars_category;");
}

/// A table that both gains a column (forcing a `Table`-kind `Update`) and
/// gains a secondary index (forcing its own standalone `Index`-kind
/// `Create`) must render each exactly once when the whole change list is
/// rendered together.
#[test]
fn table_update_and_sibling_index_create_render_without_duplication() {
    let mut cars_with_weight_and_index = cars_table_with_name_index();
    cars_with_weight_and_index.columns.push(Column::new("weight", "INTEGER", 3));
    let mut idx_2 = IndexDef::new("idx_2", IndexKind::Index, "cars");
    idx_2.fields.push(IndexField {
        name: "id_category".to_string(),
        position: 0,
    });
    cars_with_weight_and_index.add_index(idx_2);

    let source = schema_of(vec![cars_with_weight_and_index]);
    let target = schema_of(vec![cars_table_with_name_index()]);

    let changes = diff_schemas(&source, &target, KINDS);
    assert_eq!(changes.len(), 2, "table update plus the sibling index create, got {changes:?}");

    let statements = ddlsync_firebird::render(&changes, ";");
    assert_eq!(statements.len(), 2, "no statement should be rendered twice: {statements:?}");
    assert_eq!(
        statements.iter().filter(|s| s.as_str().contains("idx_2")).count(),
        1,
        "the new index must appear exactly once: {statements:?}"
    );
    assert!(statements.iter().any(|s| s.as_str() == "ALTER TABLE cars ADD weight INTEGER;"));
    assert!(statements.iter().any(|s| s.as_str() == "CREATE INDEX idx_2 ON cars (id_category);"));
}

#[test]
fn unchanged_schemas_produce_no_changes() {
    let schema = schema_of(vec![engines_table()]);
    let changes = diff_schemas(&schema, &schema, KINDS);
    assert!(changes.is_empty());
}
