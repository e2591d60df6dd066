//! `ddlsync`: the CLI front-end over `ddlsync-core`'s project registry,
//! differ, and emitter. Registers the MySQL and Firebird dialects, then
//! dispatches to `add`/`show`/`diff` (SPEC_FULL.md §6).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;

use ddlsync_core::{Change, ChangeState, Dialect, DialectRegistry, Orchestrator, ProjectConfig, ProjectKind, ProjectsConfig};
use ddlsync_yaml::{YamlReader, YamlWriter};

const DEFAULT_CONFIG: &str = "config.yml";
const STATEMENT_SEPARATOR: &str = ";";

#[derive(Parser)]
#[command(name = "ddlsync", about = "Schema differencing and synchronization across live databases and file projects.")]
struct Cli {
    /// Path to the project registry file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Registers a project. File projects load their initial schema from `--source`.
    Add(AddArgs),
    /// Lists registered projects.
    Show,
    /// Compares `--source` to `--target` and previews the resulting changes.
    Diff(DiffArgs),
}

#[derive(ValueEnum, Clone, Copy)]
enum ProjectKindArg {
    Connection,
    File,
}

impl From<ProjectKindArg> for ProjectKind {
    fn from(value: ProjectKindArg) -> Self {
        match value {
            ProjectKindArg::Connection => ProjectKind::Connection,
            ProjectKindArg::File => ProjectKind::File,
        }
    }
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    /// Engine alias, e.g. `mysql5.6` or `fb2.5`.
    #[arg(long)]
    engine: String,
    #[arg(long = "type", value_enum)]
    kind: ProjectKindArg,
    /// For a file project, the connection project its schema is derived from.
    #[arg(long)]
    source: Option<String>,
    #[arg(long, default_value = "yml")]
    readertype: String,
    /// Connection parameters as `key=value` pairs (host=... port=... etc).
    #[arg(value_name = "KEY=VALUE")]
    params: Vec<String>,
}

#[derive(Args)]
struct DiffArgs {
    #[arg(long)]
    source: String,
    #[arg(long)]
    target: String,
    /// Restrict the preview (and any `--apply`) to changes whose element name
    /// contains this text (case-insensitive).
    #[arg(long)]
    filter: Option<String>,
    /// Apply the diff to `--target` instead of only previewing it.
    #[arg(long)]
    apply: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut registry = DialectRegistry::new();
    ddlsync_mysql::register(&mut registry);
    ddlsync_firebird::register(&mut registry);
    let orchestrator = Orchestrator::new(&registry);

    match cli.command {
        Command::Add(args) => add(&orchestrator, &cli.config, args),
        Command::Show => show(&orchestrator, &cli.config),
        Command::Diff(args) => diff(&orchestrator, &registry, &cli.config, args),
    }
}

fn add(orchestrator: &Orchestrator, config_path: &Path, args: AddArgs) -> anyhow::Result<()> {
    let mut projects = ProjectsConfig::load(config_path).context("loading project registry")?;

    let mut config = ProjectConfig::new(args.name.clone(), args.engine, ProjectKind::from(args.kind)).with_param("filetype", args.readertype);
    if let Some(source) = args.source {
        config = config.with_param("source", source);
    }
    for pair in &args.params {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("malformed parameter `{pair}`, expected key=value"))?;
        config = config.with_param(key, value);
    }

    orchestrator.add_project(&mut projects, config, &YamlReader, &YamlWriter)?;
    projects.save(config_path).context("saving project registry")?;

    println!("added project `{}`", args.name);
    Ok(())
}

fn show(orchestrator: &Orchestrator, config_path: &Path) -> anyhow::Result<()> {
    let projects = ProjectsConfig::load(config_path).context("loading project registry")?;
    for project in orchestrator.show_projects(&projects) {
        println!("{}\t{}\t{:?}", project.project_name, project.engine, project.kind);
    }
    Ok(())
}

fn diff(orchestrator: &Orchestrator, registry: &DialectRegistry, config_path: &Path, args: DiffArgs) -> anyhow::Result<()> {
    let projects = ProjectsConfig::load(config_path).context("loading project registry")?;
    let mut changes = orchestrator.diff_projects(&projects, &args.source, &args.target, &YamlReader)?;
    if let Some(filter) = &args.filter {
        let filter = filter.to_uppercase();
        changes.retain(|change| change.name().to_uppercase().contains(&filter));
    }

    let engine = &projects.get(&args.source)?.engine;
    let dialect = registry.get(engine)?;
    for change in &changes {
        print_change(dialect, change);
    }

    if args.apply {
        let target = projects.get(&args.target)?;
        orchestrator.apply_diffs(target, &changes, STATEMENT_SEPARATOR, &YamlWriter)?;
        println!("applied {} change(s)", changes.len());
    }

    Ok(())
}

fn print_change(dialect: &dyn Dialect, change: &Change) {
    let statements = dialect.render_changes(std::slice::from_ref(change), STATEMENT_SEPARATOR);
    let rendered = statements.iter().map(ddlsync_core::Statement::as_str).collect::<Vec<_>>().join(" ");
    let line = format!("{:?} {} {}: {rendered}", change.state, change.kind, change.name());
    match change.state {
        ChangeState::Create => println!("{}", line.green()),
        ChangeState::Update => println!("{}", line.yellow()),
        ChangeState::Drop => println!("{}", line.red()),
    }
}
