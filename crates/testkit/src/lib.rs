//! Fixture and assertion helpers shared by the dialect crates' `tests/`
//! integration suites (SPEC_FULL.md §1 ambient test tooling). Fixtures build
//! plain `ddlsync-core` values, so the same helpers serve every dialect —
//! only the rendered DDL text differs, and that's what each dialect's own
//! tests assert on.

use ddlsync_core::{Change, Column, IndexDef, IndexField, IndexKind, Schema, SchemaObject, Statement, Table};

/// A minimal `engines(id INTEGER PRIMARY KEY, name VARCHAR(64))` table — the
/// baseline fixture most dialect tests diff against.
#[must_use]
pub fn engines_table() -> Table {
    let mut table = Table::new("engines");
    table.columns.push(Column::new("id", "INTEGER", 0).not_null(true));
    table.columns.push(Column::new("name", "VARCHAR(64)", 1));
    let mut pk = IndexDef::new("pk_engines", IndexKind::PrimaryKey, "engines");
    pk.fields.push(IndexField {
        name: "id".to_string(),
        position: 0,
    });
    table.add_index(pk);
    table
}

/// `engines` plus a `volume` column — the "add column" scenario (SPEC_FULL.md §8.1).
#[must_use]
pub fn engines_table_with_volume() -> Table {
    let mut table = engines_table();
    table.columns.push(Column::new("volume", "INTEGER", 2));
    table
}

/// `cars(id INTEGER PRIMARY KEY, name VARCHAR(64), id_category INTEGER)` with
/// a secondary index on `name` — the "create table + secondary index"
/// scenario (SPEC_FULL.md §8.3).
#[must_use]
pub fn cars_table_with_name_index() -> Table {
    let mut table = Table::new("cars");
    table.columns.push(Column::new("id", "INTEGER", 0).not_null(true));
    table.columns.push(Column::new("name", "VARCHAR(64)", 1));
    table.columns.push(Column::new("id_category", "INTEGER", 2));
    let mut pk = IndexDef::new("pk_cars", IndexKind::PrimaryKey, "cars");
    pk.fields.push(IndexField {
        name: "id".to_string(),
        position: 0,
    });
    table.add_index(pk);
    let mut idx = IndexDef::new("idx_1", IndexKind::Index, "cars");
    idx.fields.push(IndexField {
        name: "name".to_string(),
        position: 0,
    });
    table.add_index(idx);
    table
}

/// `cars` plus a foreign key referencing `categories(id)` — paired with
/// `categories_table()` for the "foreign-key drop ordering" scenario
/// (SPEC_FULL.md §8.4).
#[must_use]
pub fn cars_table_with_category_fk() -> Table {
    let mut table = cars_table_with_name_index();
    let mut fk = IndexDef::new("fk_cars_category", IndexKind::ForeignKey, "cars");
    fk.fields.push(IndexField {
        name: "id_category".to_string(),
        position: 0,
    });
    fk.source_table = "categories".to_string();
    fk.source_fields.push(IndexField {
        name: "id".to_string(),
        position: 0,
    });
    table.add_index(fk);
    table
}

#[must_use]
pub fn categories_table() -> Table {
    let mut table = Table::new("categories");
    table.columns.push(Column::new("id", "INTEGER", 0).not_null(true));
    let mut pk = IndexDef::new("pk_categories", IndexKind::PrimaryKey, "categories");
    pk.fields.push(IndexField {
        name: "id".to_string(),
        position: 0,
    });
    table.add_index(pk);
    table
}

/// Assembles a `Schema` out of whole tables, the common case for dialect
/// fixture setup.
#[must_use]
pub fn schema_of(tables: Vec<Table>) -> Schema {
    let mut schema = Schema::new();
    for table in tables {
        schema.add(SchemaObject::Table(table));
    }
    schema
}

/// Renders `changes` through a dialect's `render` entry point and joins the
/// resulting statements into one string, for substring assertions in tests.
pub fn render_joined(changes: &[Change], render: impl Fn(&[Change], &str) -> Vec<Statement>, sep: &str) -> String {
    render(changes, sep)
        .iter()
        .map(Statement::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asserts `changes` is sorted by priority descending — the invariant
/// SPEC_FULL.md §4.D promises and §8 asks tests to assert on buckets rather
/// than exact within-bucket order.
pub fn assert_priority_descending(changes: &[Change]) {
    for pair in changes.windows(2) {
        assert!(
            pair[0].priority >= pair[1].priority,
            "changes must be sorted by priority descending: {} appears before {}",
            pair[0].priority,
            pair[1].priority
        );
    }
}
