use std::thread;

use crate::change::Change;
use crate::error::{Error, Result};
use crate::persistence::{ObjectReader, ObjectWriter, save_element};
use crate::project::{ProjectConfig, ProjectKind, ProjectsConfig};
use crate::registry::DialectRegistry;

/// The high-level operations a front-end drives: registering projects,
/// listing them, and diffing/applying one against another. This is the
/// surface `ddlsync-cli` calls into; it holds no state of its own beyond the
/// registry it's handed.
pub struct Orchestrator<'a> {
    registry: &'a DialectRegistry,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(registry: &'a DialectRegistry) -> Self {
        Self { registry }
    }

    /// Registers `config`. For a `File` project this also initializes the
    /// on-disk tree by loading its `source` connection's schema and writing
    /// each element via `writer` (SPEC_FULL.md §4.C).
    pub fn add_project(
        &self,
        projects: &mut ProjectsConfig,
        config: ProjectConfig,
        reader: &dyn ObjectReader,
        writer: &dyn ObjectWriter,
    ) -> Result<()> {
        if projects.projects.contains_key(&config.project_name) {
            return Err(Error::ProjectExists {
                name: config.project_name,
            });
        }

        let dialect = self.registry.get(&config.engine)?;
        match config.kind {
            ProjectKind::Connection => {
                config.validate_params(dialect.new_params().required_keys())?;
            }
            ProjectKind::File => {
                config.validate_params(&["source"])?;
                let source_name = &config.params["source"];
                let source = projects.get(source_name)?;
                if source.engine != config.engine {
                    return Err(Error::EngineMismatch {
                        source_engine: source.engine.clone(),
                        target_engine: config.engine.clone(),
                    });
                }
                let schema = dialect.load_schema(source, reader)?;
                for element in schema.children() {
                    save_element(&config.project_name, element, writer)?;
                }
            }
        }

        projects.insert(config)
    }

    /// Registered projects, in name order.
    pub fn show_projects<'p>(&self, projects: &'p ProjectsConfig) -> impl Iterator<Item = &'p ProjectConfig> {
        projects.projects.values()
    }

    /// Fetches `source` and `target` in parallel (one `std::thread` worker
    /// per side, mirroring the CLI's dual fetch — SPEC_FULL.md §5), then
    /// diffs them. Both projects must share an engine.
    pub fn diff_projects(
        &self,
        projects: &ProjectsConfig,
        source_name: &str,
        target_name: &str,
        reader: &(dyn ObjectReader + Sync),
    ) -> Result<Vec<Change>> {
        let source_config = projects.get(source_name)?;
        let target_config = projects.get(target_name)?;
        if source_config.engine != target_config.engine {
            return Err(Error::EngineMismatch {
                source_engine: source_config.engine.clone(),
                target_engine: target_config.engine.clone(),
            });
        }
        let dialect = self.registry.get(&source_config.engine)?;

        tracing::info!(source = source_name, target = target_name, "fetching schemas");
        let (source_schema, target_schema) = thread::scope(|scope| {
            let source_handle = scope.spawn(|| dialect.load_schema(source_config, reader));
            let target_handle = scope.spawn(|| dialect.load_schema(target_config, reader));
            (
                source_handle.join().expect("source fetch thread panicked"),
                target_handle.join().expect("target fetch thread panicked"),
            )
        });
        let source_schema = source_schema?;
        let target_schema = target_schema?;
        tracing::debug!(
            source_elements = source_schema.children().count(),
            target_elements = target_schema.children().count(),
            "fetched schemas"
        );

        Ok(dialect.schema_diff(&source_schema, &target_schema))
    }

    /// Renders and applies `changes` against `target` (a live connection or a
    /// file tree, depending on `target.kind`).
    pub fn apply_diffs(&self, target: &ProjectConfig, changes: &[Change], sep: &str, writer: &dyn ObjectWriter) -> Result<()> {
        let dialect = self.registry.get(&target.engine)?;
        tracing::info!(project = target.project_name.as_str(), changes = changes.len(), "applying changes");
        dialect.apply_diffs(target, changes, sep, writer)
    }
}
