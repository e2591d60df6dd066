use crate::change::Change;
use crate::diff::diff_schemas;
use crate::error::Result;
use crate::ir::KindTag;
use crate::persistence::{ObjectReader, ObjectWriter};
use crate::project::{ConnectionParams, ProjectConfig};
use crate::schema::Schema;
use crate::statement::Statement;

/// Per-engine adapter (SPEC_FULL.md §4.C): declares which element kinds the
/// engine supports, fetches and persists its schema, and renders/executes
/// its DDL. Registered process-wide by alias rather than resolved through a
/// type tag at each call site.
pub trait Dialect: Send + Sync {
    /// A human-readable name, e.g. `"MySQL 5.6"`.
    fn name(&self) -> &str;

    /// The user-facing engine identifier used in project config and the
    /// registry, e.g. `"mysql5.6"`, `"fb2.5"`.
    fn alias(&self) -> &str;

    /// The declared top-level element kinds, in the fixed order the differ
    /// walks them.
    fn kinds(&self) -> &'static [KindTag];

    /// An empty, typed connection-parameter record for this engine.
    fn new_params(&self) -> Box<dyn ConnectionParams>;

    /// Loads a schema from `config`, branching on `config.kind`: a live
    /// fetch for a `Connection` project, a file-tree read (via `reader`) for
    /// a `File` project.
    fn load_schema(&self, config: &ProjectConfig, reader: &dyn ObjectReader) -> Result<Schema>;

    /// Delegates to the differ over this dialect's declared kinds. Already
    /// sorted by priority descending.
    fn schema_diff(&self, source: &Schema, target: &Schema) -> Vec<Change> {
        diff_schemas(source, target, self.kinds())
    }

    /// Opens a connection and runs each statement in order; the first error
    /// aborts without rollback.
    fn execute_sql(&self, config: &ProjectConfig, statements: &[Statement]) -> Result<()>;

    /// Renders and applies every change (SPEC_FULL.md §4.E). Against a
    /// `Connection` target this executes DDL; against a `File` target it
    /// writes/removes element files via `writer` and never touches SQL.
    fn apply_diffs(&self, config: &ProjectConfig, changes: &[Change], sep: &str, writer: &dyn ObjectWriter) -> Result<()>;

    /// Renders `changes` into the DDL statements this dialect would execute,
    /// without touching a connection or the filesystem. Used by the CLI's
    /// `diff` preview and by each dialect's own `tests/` integration suites.
    fn render_changes(&self, changes: &[Change], sep: &str) -> Vec<Statement>;
}
