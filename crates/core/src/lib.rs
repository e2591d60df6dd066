//! Dialect-agnostic schema model, differ, and DDL-emission pipeline.
//!
//! `ddlsync-core` owns the element model (§3), the per-kind differ and
//! priority ordering (§4.D), the emitter contract (§4.E), and the
//! project/persistence primitives (§4.F, §6) that every dialect crate
//! (`ddlsync-mysql`, `ddlsync-firebird`) and reader/writer crate
//! (`ddlsync-yaml`) builds on. It never talks to a database or the
//! filesystem directly — those are dialect and reader/writer concerns.

mod change;
mod dialect;
mod diff;
mod error;
mod ir;
mod ordering;
mod orchestrator;
mod persistence;
mod project;
mod registry;
mod schema;
mod statement;

pub use change::{Change, ChangeState};
pub use dialect::Dialect;
pub use diff::{TableSubChange, diff_elements, diff_schemas, diffs_on_create, diffs_on_drop, table_internal_changes};
pub use error::{Error, Result};
pub use ir::{
    Column, Domain, Exception, IndexDef, IndexField, IndexKind, KindTag, Parameter, Role, Routine,
    RoutineKind, Sequence, SchemaObject, Table, TableOptions, Trigger, View,
};
pub use ordering::{drop_priority, priority_for, table_priority};
pub use orchestrator::Orchestrator;
pub use persistence::{ObjectReader, ObjectWriter, delete_element, element_dir, element_path, load_project_schema, project_root, save_element};
pub use project::{ConnectionParams, DefaultConnectionParams, ProjectConfig, ProjectKind, ProjectsConfig};
pub use registry::DialectRegistry;
pub use schema::Schema;
pub use statement::Statement;
