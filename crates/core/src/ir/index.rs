use std::collections::BTreeMap;

use super::kind::IndexKind;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexField {
    pub name: String,
    pub position: u32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub kind: IndexKind,
    pub unique: bool,
    pub table_name: String,
    pub fields: Vec<IndexField>,
    pub source_table: String,
    pub source_fields: Vec<IndexField>,
    pub on_delete: String,
    pub on_update: String,
    pub ascending: bool,
    pub active: bool,
    pub computed: bool,
    pub expression: String,
    pub comment: String,
}

impl IndexDef {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: IndexKind, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            unique: matches!(kind, IndexKind::PrimaryKey | IndexKind::Unique),
            table_name: table_name.into(),
            fields: Vec::new(),
            source_table: String::new(),
            source_fields: Vec::new(),
            on_delete: String::new(),
            on_update: String::new(),
            ascending: true,
            active: true,
            computed: false,
            expression: String::new(),
            comment: String::new(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<IndexField>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn fields_by_position(&self) -> Vec<&str> {
        ordered_field_names(&self.fields)
    }

    #[must_use]
    pub fn source_fields_by_position(&self) -> Vec<&str> {
        ordered_field_names(&self.source_fields)
    }

    /// Structural equality: field sets (and source-field sets) compare by
    /// `(name, position)` regardless of insertion order; everything else is
    /// plain attribute equality.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.unique == other.unique
            && self.table_name == other.table_name
            && self.source_table == other.source_table
            && self.on_delete == other.on_delete
            && self.on_update == other.on_update
            && self.ascending == other.ascending
            && self.active == other.active
            && self.computed == other.computed
            && self.expression == other.expression
            && self.comment == other.comment
            && field_sets_equal(&self.fields, &other.fields)
            && field_sets_equal(&self.source_fields, &other.source_fields)
    }
}

fn ordered_field_names(fields: &[IndexField]) -> Vec<&str> {
    let mut ordered: Vec<&IndexField> = fields.iter().collect();
    ordered.sort_by_key(|f| f.position);
    ordered.iter().map(|f| f.name.as_str()).collect()
}

fn field_sets_equal(a: &[IndexField], b: &[IndexField]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let by_name: BTreeMap<&str, u32> = a.iter().map(|f| (f.name.as_str(), f.position)).collect();
    b.iter()
        .all(|f| by_name.get(f.name.as_str()) == Some(&f.position))
}
