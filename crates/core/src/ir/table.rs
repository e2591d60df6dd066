use std::collections::BTreeMap;

use super::column::Column;
use super::index::IndexDef;
use super::kind::IndexKind;
use super::trigger::Trigger;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TableOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// Keyed by index kind, then by index name.
    #[serde(default)]
    pub indexes: BTreeMap<IndexKind, BTreeMap<String, IndexDef>>,
    #[serde(default)]
    pub triggers: BTreeMap<String, Trigger>,
    #[serde(default)]
    pub options: TableOptions,
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: BTreeMap::new(),
            triggers: BTreeMap::new(),
            options: TableOptions::default(),
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn add_index(&mut self, index: IndexDef) {
        self.indexes
            .entry(index.kind)
            .or_default()
            .insert(index.name.clone(), index);
    }

    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.insert(trigger.name.clone(), trigger);
    }

    #[must_use]
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut out: Vec<&Column> = self.columns.iter().collect();
        out.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        out
    }

    #[must_use]
    pub fn primary_key(&self) -> Option<&IndexDef> {
        self.indexes
            .get(&IndexKind::PrimaryKey)
            .and_then(|m| m.values().next())
    }

    /// Every index nested in this table, regardless of kind, flattened and
    /// ordered deterministically (name ascending) for rendering follow-up
    /// `CREATE`/`DROP` statements.
    #[must_use]
    pub fn non_primary_indexes(&self) -> Vec<&IndexDef> {
        let mut out: Vec<&IndexDef> = self
            .indexes
            .iter()
            .filter(|(kind, _)| **kind != IndexKind::PrimaryKey)
            .flat_map(|(_, by_name)| by_name.values())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    #[must_use]
    pub fn all_indexes(&self) -> Vec<&IndexDef> {
        let mut out: Vec<&IndexDef> = self.indexes.values().flat_map(|m| m.values()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    #[must_use]
    pub fn ordered_triggers(&self) -> Vec<&Trigger> {
        let mut out: Vec<&Trigger> = self.triggers.values().collect();
        out.sort_by(|a, b| match (a.position, b.position) {
            (Some(pa), Some(pb)) => pa.cmp(&pb).then_with(|| a.name.cmp(&b.name)),
            _ => a.name.cmp(&b.name),
        });
        out
    }

    fn columns_by_name(&self) -> BTreeMap<&str, &Column> {
        self.columns.iter().map(|c| (c.name.as_str(), c)).collect()
    }

    /// Structural equality of the table *as a unit* — columns only, compared
    /// as a name-keyed set (order-insensitive). This is the equality the
    /// differ's per-kind loop uses; it intentionally does *not* produce a
    /// column-by-column diff (that's `alter_ddl`'s job), and it deliberately
    /// excludes indexes and triggers: those are flattened top-level kinds in
    /// their own right, so `diff_schemas` already diffs them independently
    /// for any table common to both schemas. Folding them into table-level
    /// equality too would make the same index/trigger change surface twice —
    /// once as its own top-level `Change`, once nested inside a `Table`
    /// `Update` that `table_internal_changes` would re-derive when rendered.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        if self.name != other.name || self.options != other.options {
            return false;
        }
        let mine = self.columns_by_name();
        let theirs = other.columns_by_name();
        if mine.len() != theirs.len() {
            return false;
        }
        mine.iter().all(|(name, column)| {
            theirs
                .get(name)
                .is_some_and(|other_column| *column == *other_column)
        })
    }
}
