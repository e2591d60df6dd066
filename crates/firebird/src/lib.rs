//! Firebird 2.5 dialect adapter: live fetcher, DDL renderer, and execution,
//! grounded in the engine's `internal/firebird2.5` and `pkg/firebird2.5`
//! packages.

mod connection;
mod ddl;
mod fetch;

use ddlsync_core::{
    Change, ChangeState, ConnectionParams, Dialect, DefaultConnectionParams, DialectRegistry,
    KindTag, ObjectReader, ObjectWriter, ProjectConfig, ProjectKind, Result, Schema, Statement,
    delete_element, load_project_schema, save_element,
};

const REQUIRED_PARAMS: &[&str] = &["host", "port", "database", "user", "password"];
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

pub struct FirebirdDialect;

impl Dialect for FirebirdDialect {
    fn name(&self) -> &str {
        "Firebird 2.5"
    }

    fn alias(&self) -> &str {
        "fb2.5"
    }

    fn kinds(&self) -> &'static [KindTag] {
        KINDS
    }

    fn new_params(&self) -> Box<dyn ConnectionParams> {
        Box::new(DefaultConnectionParams::new(REQUIRED_PARAMS))
    }

    fn load_schema(&self, config: &ProjectConfig, reader: &dyn ObjectReader) -> Result<Schema> {
        match config.kind {
            ProjectKind::Connection => {
                config.validate_params(REQUIRED_PARAMS)?;
                let mut conn = connection::connect(config)?;
                fetch::fetch_schema(&mut conn, &config.project_name)
            }
            ProjectKind::File => load_project_schema(&config.project_name, KINDS, reader),
        }
    }

    fn execute_sql(&self, config: &ProjectConfig, statements: &[Statement]) -> Result<()> {
        let mut conn = connection::connect(config)?;
        for statement in statements {
            connection::execute(&mut conn, &config.project_name, statement.as_str())?;
        }
        Ok(())
    }

    fn apply_diffs(&self, config: &ProjectConfig, changes: &[Change], sep: &str, writer: &dyn ObjectWriter) -> Result<()> {
        match config.kind {
            ProjectKind::Connection => {
                let mut conn = connection::connect(config)?;
                for change in changes {
                    for statement in ddl::render_change(change, sep) {
                        connection::execute(&mut conn, &config.project_name, statement.as_str())?;
                    }
                }
                Ok(())
            }
            ProjectKind::File => {
                for change in changes {
                    match change.state {
                        ChangeState::Create | ChangeState::Update => {
                            let object = change.to.as_ref().expect("create/update change carries `to`");
                            save_element(&config.project_name, object, writer)?;
                        }
                        ChangeState::Drop => {
                            let object = change.from.as_ref().expect("drop change carries `from`");
                            delete_element(&config.project_name, object.kind(), object.name(), writer)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn render_changes(&self, changes: &[Change], sep: &str) -> Vec<Statement> {
        render(changes, sep)
    }
}

/// Registers the Firebird 2.5 dialect under its `fb2.5` alias.
pub fn register(registry: &mut DialectRegistry) {
    registry.register(Box::new(FirebirdDialect));
}

/// Renders `changes` into DDL statements without touching a connection or
/// the filesystem (SPEC_FULL.md §4.E) — the pure emission step integration
/// tests exercise directly.
#[must_use]
pub fn render(changes: &[Change], sep: &str) -> Vec<Statement> {
    changes.iter().flat_map(|change| ddl::render_change(change, sep)).collect()
}
