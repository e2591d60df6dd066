use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use crate::change::{Change, ChangeState};
use crate::ir::{Column, KindTag, SchemaObject, Table};
use crate::ordering::{drop_priority, priority_for, table_priority};
use crate::schema::Schema;

/// `el.diff(other)`: an `Update` when the two elements aren't structurally
/// equal, otherwise `None`. Never recurses into a composite diff — that is
/// `table_internal_changes`'s job, invoked separately by the emitter.
///
/// `from` is the element's existing (target) state, `to` its desired
/// (source) state — the same convention `Change::create`/`Change::drop`
/// already carry (`to` is always the new content, `from` the content being
/// acted on).
#[must_use]
pub fn diff_elements(from: &SchemaObject, to: &SchemaObject) -> Option<Change> {
    if from.equals(to) {
        None
    } else {
        Some(Change::update(from.clone(), to.clone(), priority_for(to)))
    }
}

/// `el.diffs_on_create(el)`: a single `Create` at `priority()`, except tables,
/// which additionally enqueue `Create` changes for every non-primary-key
/// index and every trigger (primary keys are inlined in `CREATE TABLE`).
#[must_use]
pub fn diffs_on_create(el: &SchemaObject) -> Vec<Change> {
    let mut changes = vec![Change::create(el.clone(), priority_for(el))];
    if let SchemaObject::Table(table) = el {
        for index in table.non_primary_indexes() {
            let obj = SchemaObject::Index(index.clone());
            let priority = priority_for(&obj);
            changes.push(Change::create(obj, priority));
        }
        for trigger in table.ordered_triggers() {
            let obj = SchemaObject::Trigger(trigger.clone());
            let priority = priority_for(&obj);
            changes.push(Change::create(obj, priority));
        }
    }
    changes
}

/// `el.diffs_on_drop(el)`: a single `Drop`. Foreign-key indexes pick up the
/// drop-priority boost automatically via `ordering::drop_priority`.
#[must_use]
pub fn diffs_on_drop(el: &SchemaObject) -> Vec<Change> {
    vec![Change::drop(el.clone(), drop_priority(el))]
}

/// Computes the set-difference between `source` and `target` over the
/// dialect's declared kinds (SPEC_FULL.md §4.D), then sorts by priority
/// descending (stable — within-bucket order is unspecified).
///
/// `Index` and `Trigger` are flattened top-level kinds (see
/// [`Schema::kind_elements`]), but a whole new or wholly dropped table
/// already accounts for its own indexes and triggers — `Table`'s overridden
/// `diffs_on_create` cascades non-primary-key index/trigger creates, and a
/// real `DROP TABLE` cascades away everything nested in it. So the
/// independent top-level walk over `Index`/`Trigger` is restricted to
/// elements whose owning table exists in *both* schemas; that's exactly the
/// case that matters anyway (e.g. a foreign key on an unrelated, unchanged
/// table that must be dropped before the table it references).
#[must_use]
pub fn diff_schemas(source: &Schema, target: &Schema, kinds: &[KindTag]) -> Vec<Change> {
    let common_tables: BTreeSet<&str> = source
        .tables()
        .map(|(name, _)| name)
        .filter(|name| target.tables().any(|(other, _)| other == *name))
        .collect();

    let mut changes = Vec::new();
    for &kind in kinds {
        let mut source_elements = source.kind_elements(kind);
        let mut target_elements = target.kind_elements(kind);
        if matches!(kind, KindTag::Index | KindTag::Trigger) {
            source_elements = Cow::Owned(retain_owned_by_common_table(&source_elements, &common_tables));
            target_elements = Cow::Owned(retain_owned_by_common_table(&target_elements, &common_tables));
        }
        for (name, element) in source_elements.iter() {
            match target_elements.get(name) {
                None => changes.extend(diffs_on_create(element)),
                Some(other) => changes.extend(diff_elements(other, element)),
            }
        }
        for (name, element) in target_elements.iter() {
            if !source_elements.contains_key(name) {
                changes.extend(diffs_on_drop(element));
            }
        }
    }
    changes.sort_by(|a, b| b.priority.cmp(&a.priority));
    changes
}

fn owning_table(element: &SchemaObject) -> Option<&str> {
    match element {
        SchemaObject::Index(index) => Some(index.table_name.as_str()),
        SchemaObject::Trigger(trigger) => Some(trigger.table_name.as_str()),
        _ => None,
    }
}

fn retain_owned_by_common_table(
    elements: &BTreeMap<String, SchemaObject>,
    common_tables: &BTreeSet<&str>,
) -> BTreeMap<String, SchemaObject> {
    elements
        .iter()
        .filter(|(_, element)| owning_table(element).is_some_and(|table| common_tables.contains(table)))
        .map(|(name, element)| (name.clone(), element.clone()))
        .collect()
}

/// One entry of a table's internal composite diff: a column change, routed
/// by dialects to a specialized ADD/DROP/CHANGE COLUMN formatter. Indexes and
/// triggers are *not* represented here — they're flattened top-level kinds in
/// their own right, already diffed independently by `diff_schemas` for any
/// table common to both schemas, so folding them into a table's own update
/// would emit the same index/trigger change twice.
#[derive(Debug, Clone)]
pub enum TableSubChange {
    Column {
        state: ChangeState,
        from: Option<Column>,
        to: Option<Column>,
    },
}

impl TableSubChange {
    #[must_use]
    pub fn priority(&self) -> i32 {
        match self {
            Self::Column { .. } => table_priority(),
        }
    }
}

/// `Table::alter_ddl`'s internal column diff, sorted by priority descending.
/// Shared by every dialect so column reconciliation logic is written once.
///
/// `from` is the table's current (target) state, `to` its desired (source)
/// state — the same convention as [`Change`]: columns only in `to` are
/// created, columns only in `from` are dropped, changed columns are updated.
#[must_use]
pub fn table_internal_changes(from: &Table, to: &Table) -> Vec<TableSubChange> {
    let mut changes = Vec::new();

    let from_columns: std::collections::BTreeMap<&str, &Column> =
        from.columns.iter().map(|c| (c.name.as_str(), c)).collect();
    let to_columns: std::collections::BTreeMap<&str, &Column> =
        to.columns.iter().map(|c| (c.name.as_str(), c)).collect();
    for (name, column) in &to_columns {
        match from_columns.get(name) {
            None => changes.push(TableSubChange::Column {
                state: ChangeState::Create,
                from: None,
                to: Some((**column).clone()),
            }),
            Some(other) => {
                if *other != *column {
                    changes.push(TableSubChange::Column {
                        state: ChangeState::Update,
                        from: Some((**other).clone()),
                        to: Some((**column).clone()),
                    });
                }
            }
        }
    }
    for (name, column) in &from_columns {
        if !to_columns.contains_key(name) {
            changes.push(TableSubChange::Column {
                state: ChangeState::Drop,
                from: Some((**column).clone()),
                to: None,
            });
        }
    }

    changes.sort_by(|a, b| b.priority().cmp(&a.priority()));
    changes
}
