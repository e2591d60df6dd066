//! The unified priority table described in SPEC_FULL.md §4.D. Both dialects
//! share these numbers; there is deliberately no per-dialect variance beyond
//! which kinds a dialect actually populates (`Dialect::kinds()`).

use crate::ir::{IndexKind, SchemaObject};

const TABLE: i32 = 10;
const PRIMARY_KEY: i32 = 9;
const UNIQUE_OR_INDEX: i32 = 8;
const FOREIGN_KEY: i32 = 7;
const FOREIGN_KEY_DROP_BOOST: i32 = 10;
const VIEW: i32 = 6;
const TRIGGER: i32 = 5;
const ROUTINE: i32 = 4;
const DOMAIN: i32 = 11;
const EXCEPTION: i32 = 12;
const SEQUENCE: i32 = 13;
const ROLE: i32 = 14;

/// Base priority for a change whose element is `obj`. For `Index` elements
/// this is the sub-kind priority (primary key / unique / plain index /
/// foreign key); callers drop-boost foreign keys separately via
/// [`drop_priority`].
#[must_use]
pub fn priority_for(obj: &SchemaObject) -> i32 {
    match obj {
        SchemaObject::Table(_) => TABLE,
        SchemaObject::View(_) => VIEW,
        SchemaObject::Routine(_) => ROUTINE,
        SchemaObject::Trigger(_) => TRIGGER,
        SchemaObject::Index(index) => match index.kind {
            IndexKind::PrimaryKey => PRIMARY_KEY,
            IndexKind::ForeignKey => FOREIGN_KEY,
            IndexKind::Unique | IndexKind::Index => UNIQUE_OR_INDEX,
        },
        SchemaObject::Domain(_) => DOMAIN,
        SchemaObject::Exception(_) => EXCEPTION,
        SchemaObject::Sequence(_) => SEQUENCE,
        SchemaObject::Role(_) => ROLE,
    }
}

/// Priority shared by a table's own create/drop and by its internal
/// column-change entries when folded into `table_internal_changes`'s sort.
#[must_use]
pub fn table_priority() -> i32 {
    TABLE
}

/// Priority to use when `obj` is being dropped. Foreign-key indexes are
/// boosted so their `DROP` statement is ordered ahead of the table-drop (or
/// any other lower-priority drop) that would otherwise leave a dangling
/// reference.
#[must_use]
pub fn drop_priority(obj: &SchemaObject) -> i32 {
    match obj {
        SchemaObject::Index(index) if index.kind == IndexKind::ForeignKey => {
            FOREIGN_KEY + FOREIGN_KEY_DROP_BOOST
        }
        other => priority_for(other),
    }
}
