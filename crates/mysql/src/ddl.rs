//! DDL rendering: turns a [`Change`] into the `CREATE`/`ALTER`/`DROP`
//! statements that mutate a target schema into the source one, grounded in
//! the engine's original text-template formatters.

use ddlsync_core::{
    Change, ChangeState, Column, IndexDef, IndexKind, Routine, RoutineKind, Statement, Table,
    TableSubChange, Trigger, View, table_internal_changes,
};

use crate::connection::quote_identifier;

pub(crate) fn render_change(change: &Change, sep: &str) -> Vec<Statement> {
    match change.state {
        ChangeState::Create => create_ddl(change.to.as_ref().expect("create change carries `to`"), sep),
        ChangeState::Drop => drop_ddl(change.from.as_ref().expect("drop change carries `from`"), sep),
        ChangeState::Update => alter_ddl(
            change.from.as_ref().expect("update change carries `from`"),
            change.to.as_ref().expect("update change carries `to`"),
            sep,
        ),
    }
}

fn create_ddl(object: &ddlsync_core::SchemaObject, sep: &str) -> Vec<Statement> {
    use ddlsync_core::SchemaObject::*;
    match object {
        Table(table) => vec![Statement::new(format!("{}{sep}", create_table(table)))],
        Index(index) => vec![Statement::new(format!("{}{sep}", create_index(index)))],
        View(view) => vec![Statement::new(format!("{}{sep}", create_view(view)))],
        Trigger(trigger) => vec![Statement::new(format!("{}{sep}", create_trigger(trigger)))],
        Routine(routine) => vec![Statement::new(format!("{}{sep}", create_routine(routine)))],
        other => panic!("mysql5.6 does not support kind {:?}", other.kind()),
    }
}

fn drop_ddl(object: &ddlsync_core::SchemaObject, sep: &str) -> Vec<Statement> {
    use ddlsync_core::SchemaObject::*;
    match object {
        Table(table) => vec![Statement::new(format!("DROP TABLE {}{sep}", quote_identifier(&table.name)))],
        Index(index) => vec![Statement::new(format!("{}{sep}", drop_index(index)))],
        View(view) => vec![Statement::new(format!("DROP VIEW IF EXISTS {}{sep}", quote_identifier(&view.name)))],
        Trigger(trigger) => vec![Statement::new(format!("DROP TRIGGER IF EXISTS {}{sep}", quote_identifier(&trigger.name)))],
        Routine(routine) => vec![Statement::new(format!("{}{sep}", drop_routine(routine)))],
        other => panic!("mysql5.6 does not support kind {:?}", other.kind()),
    }
}

/// Tables get a real column/index/trigger diff; every other kind has no
/// partial-update syntax worth using, so it's drop-then-recreate — except
/// views, which MySQL lets us replace in place.
fn alter_ddl(from: &ddlsync_core::SchemaObject, to: &ddlsync_core::SchemaObject, sep: &str) -> Vec<Statement> {
    use ddlsync_core::SchemaObject::*;
    match (from, to) {
        (Table(from_table), Table(to_table)) => alter_table(from_table, to_table, sep),
        (View(_), View(to_view)) => vec![Statement::new(format!("{}{sep}", create_view(to_view)))],
        (Index(from_index), Index(to_index)) => {
            let mut statements = vec![Statement::new(format!("{}{sep}", drop_index(from_index)))];
            statements.push(Statement::new(format!("{}{sep}", create_index(to_index))));
            statements
        }
        (Trigger(from_trigger), Trigger(to_trigger)) => vec![
            Statement::new(format!("DROP TRIGGER IF EXISTS {}{sep}", quote_identifier(&from_trigger.name))),
            Statement::new(format!("{}{sep}", create_trigger(to_trigger))),
        ],
        (Routine(from_routine), Routine(to_routine)) => vec![
            Statement::new(format!("{}{sep}", drop_routine(from_routine))),
            Statement::new(format!("{}{sep}", create_routine(to_routine))),
        ],
        (a, _) => panic!("mysql5.6 does not support kind {:?}", a.kind()),
    }
}

fn alter_table(from: &Table, to: &Table, sep: &str) -> Vec<Statement> {
    let table_name = quote_identifier(&to.name);
    let mut statements = Vec::new();
    for sub in table_internal_changes(from, to) {
        match sub {
            TableSubChange::Column { state, from, to } => {
                let clause = alter_column_clause(state, from.as_ref(), to.as_ref());
                statements.push(Statement::new(format!("ALTER TABLE {table_name} {clause}{sep}")));
            }
        }
    }
    statements
}

fn alter_column_clause(state: ChangeState, from: Option<&Column>, to: Option<&Column>) -> String {
    match state {
        ChangeState::Create => {
            let column = to.expect("create column carries `to`");
            format!("ADD COLUMN {}", column_definition(column))
        }
        ChangeState::Drop => {
            let column = from.expect("drop column carries `from`");
            format!("DROP COLUMN {}", quote_identifier(&column.name))
        }
        ChangeState::Update => {
            let old = from.expect("update column carries `from`");
            let new = to.expect("update column carries `to`");
            format!("CHANGE COLUMN {} {}", quote_identifier(&old.name), column_definition(new))
        }
    }
}

fn column_definition(column: &Column) -> String {
    let mut parts = vec![quote_identifier(&column.name), column.type_name.clone()];
    if !column.charset.is_empty() {
        parts.push(format!("CHARACTER SET {}", column.charset));
    }
    if !column.collate.is_empty() {
        parts.push(format!("COLLATE {}", column.collate));
    }
    parts.push(if column.not_null { "NOT NULL".to_string() } else { "NULL".to_string() });
    if column.has_default {
        parts.push(format!("DEFAULT {}", column.default));
    }
    if !column.comment.is_empty() {
        parts.push(format!("COMMENT '{}'", column.comment.replace('\'', "''")));
    }
    parts.join(" ")
}

fn create_table(table: &Table) -> String {
    let mut definitions: Vec<String> = table.ordered_columns().iter().map(|c| column_definition(c)).collect();
    if let Some(pk) = table.primary_key() {
        definitions.push(format!("PRIMARY KEY ({})", quoted_field_list(pk.fields_by_position())));
    }

    let mut ddl = format!(
        "CREATE TABLE {} (\n  {}\n)",
        quote_identifier(&table.name),
        definitions.join(",\n  ")
    );
    if let Some(engine) = &table.options.engine {
        ddl.push_str(&format!(" ENGINE={engine}"));
    }
    if let Some(charset) = &table.options.charset {
        ddl.push_str(&format!(" DEFAULT CHARSET={charset}"));
    }
    if let Some(collation) = &table.options.collation {
        ddl.push_str(&format!(" COLLATE={collation}"));
    }
    ddl
}

fn quoted_field_list(fields: Vec<&str>) -> String {
    fields.iter().map(|f| quote_identifier(f)).collect::<Vec<_>>().join(", ")
}

fn create_index(index: &IndexDef) -> String {
    let table = quote_identifier(&index.table_name);
    let fields = quoted_field_list(index.fields_by_position());
    match index.kind {
        IndexKind::PrimaryKey => format!("ALTER TABLE {table} ADD PRIMARY KEY ({fields})"),
        IndexKind::Unique => format!(
            "ALTER TABLE {table} ADD CONSTRAINT {} UNIQUE ({fields})",
            quote_identifier(&index.name)
        ),
        IndexKind::ForeignKey => {
            let source_table = quote_identifier(&index.source_table);
            let source_fields = quoted_field_list(index.source_fields_by_position());
            let mut ddl = format!(
                "ALTER TABLE {table} ADD CONSTRAINT {} FOREIGN KEY ({fields}) REFERENCES {source_table} ({source_fields})",
                quote_identifier(&index.name)
            );
            if !index.on_delete.is_empty() {
                ddl.push_str(&format!(" ON DELETE {}", index.on_delete));
            }
            if !index.on_update.is_empty() {
                ddl.push_str(&format!(" ON UPDATE {}", index.on_update));
            }
            ddl
        }
        IndexKind::Index => format!("CREATE INDEX {} ON {table} ({fields})", quote_identifier(&index.name)),
    }
}

fn drop_index(index: &IndexDef) -> String {
    let table = quote_identifier(&index.table_name);
    match index.kind {
        IndexKind::PrimaryKey => format!("ALTER TABLE {table} DROP PRIMARY KEY"),
        IndexKind::ForeignKey => format!("ALTER TABLE {table} DROP FOREIGN KEY {}", quote_identifier(&index.name)),
        IndexKind::Unique | IndexKind::Index => format!("DROP INDEX {} ON {table}", quote_identifier(&index.name)),
    }
}

fn create_view(view: &View) -> String {
    format!("CREATE OR REPLACE VIEW {} AS {}", quote_identifier(&view.name), view.source)
}

fn create_trigger(trigger: &Trigger) -> String {
    format!(
        "CREATE TRIGGER {} {} ON {} FOR EACH ROW {}",
        quote_identifier(&trigger.name),
        trigger.type_name,
        quote_identifier(&trigger.table_name),
        trigger.source
    )
}

fn create_routine(routine: &Routine) -> String {
    let params = routine_parameter_list(routine);
    match routine.routine_kind {
        RoutineKind::Procedure => format!(
            "CREATE PROCEDURE {}({params}) {}",
            quote_identifier(&routine.name),
            routine.source
        ),
        RoutineKind::Function => {
            let output_type = routine.output_type.as_deref().unwrap_or("INT");
            let charset = if routine.output_charset.is_empty() {
                String::new()
            } else {
                format!(" CHARSET {}", routine.output_charset)
            };
            let deterministic = if routine.deterministic { " DETERMINISTIC" } else { "" };
            format!(
                "CREATE FUNCTION {}({params}) RETURNS {output_type}{charset}{deterministic} {}",
                quote_identifier(&routine.name),
                routine.source
            )
        }
    }
}

fn routine_parameter_list(routine: &Routine) -> String {
    let mut inputs: Vec<&ddlsync_core::Parameter> = routine.input_parameters.iter().collect();
    inputs.sort_by_key(|p| p.position);
    let mut outputs: Vec<&ddlsync_core::Parameter> = routine.output_parameters.iter().collect();
    outputs.sort_by_key(|p| p.position);

    let mut parts: Vec<String> = inputs
        .iter()
        .map(|p| format!("IN {} {}", quote_identifier(&p.name), p.type_name))
        .collect();
    parts.extend(outputs.iter().map(|p| format!("OUT {} {}", quote_identifier(&p.name), p.type_name)));
    parts.join(", ")
}

fn drop_routine(routine: &Routine) -> String {
    match routine.routine_kind {
        RoutineKind::Procedure => format!("DROP PROCEDURE IF EXISTS {}", quote_identifier(&routine.name)),
        RoutineKind::Function => format!("DROP FUNCTION IF EXISTS {}", quote_identifier(&routine.name)),
    }
}

#[cfg(test)]
mod tests {
    use ddlsync_core::{Column, IndexDef, IndexField, IndexKind, SchemaObject};

    use super::*;

    fn engines_table() -> Table {
        Table::new("engines").with_columns(vec![Column::new("id", "int(11)", 0).not_null(true)])
    }

    #[test]
    fn create_table_inlines_primary_key() {
        let mut table = engines_table();
        table.add_index(IndexDef::new("PRIMARY", IndexKind::PrimaryKey, "engines").with_fields(vec![IndexField {
            name: "id".to_string(),
            position: 0,
        }]));
        let change = Change::create(SchemaObject::Table(table), 10);
        let statements = render_change(&change, ";");
        assert_eq!(statements.len(), 1);
        let sql = statements[0].as_str();
        assert!(sql.contains("CREATE TABLE `engines`"), "{sql}");
        assert!(sql.contains("PRIMARY KEY (`id`)"), "{sql}");
        assert!(sql.ends_with(';'));
    }

    #[test]
    fn drop_table_is_unconditional() {
        let change = Change::drop(SchemaObject::Table(engines_table()), 10);
        let statements = render_change(&change, ";");
        assert_eq!(statements[0].as_str(), "DROP TABLE `engines`;");
    }

    #[test]
    fn add_column_renders_alter_table_add_column() {
        let from = engines_table();
        let mut to = engines_table();
        to.columns.push(Column::new("volume", "int(11)", 1));
        let change = Change::update(SchemaObject::Table(from), SchemaObject::Table(to), 10);
        let statements = render_change(&change, ";");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].as_str(), "ALTER TABLE `engines` ADD COLUMN `volume` int(11) NULL;");
    }

    #[test]
    fn drop_column_renders_alter_table_drop_column() {
        let mut from = engines_table();
        from.columns.push(Column::new("volume", "int(11)", 1));
        let to = engines_table();
        let change = Change::update(SchemaObject::Table(from), SchemaObject::Table(to), 10);
        let statements = render_change(&change, ";");
        assert_eq!(statements[0].as_str(), "ALTER TABLE `engines` DROP COLUMN `volume`;");
    }

    #[test]
    fn foreign_key_create_references_source_table() {
        let mut fk = IndexDef::new("fk_category", IndexKind::ForeignKey, "cars");
        fk.fields = vec![IndexField {
            name: "id_category".to_string(),
            position: 0,
        }];
        fk.source_table = "categories".to_string();
        fk.source_fields = vec![IndexField {
            name: "id".to_string(),
            position: 0,
        }];
        fk.on_delete = "CASCADE".to_string();
        let change = Change::create(SchemaObject::Index(fk), 7);
        let statements = render_change(&change, ";");
        let sql = statements[0].as_str();
        assert!(sql.contains("ADD CONSTRAINT `fk_category` FOREIGN KEY (`id_category`) REFERENCES `categories` (`id`)"), "{sql}");
        assert!(sql.contains("ON DELETE CASCADE"), "{sql}");
    }

    #[test]
    fn foreign_key_drop_uses_drop_foreign_key_clause() {
        let fk = IndexDef::new("fk_category", IndexKind::ForeignKey, "cars");
        let change = Change::drop(SchemaObject::Index(fk), 17);
        let statements = render_change(&change, ";");
        assert_eq!(statements[0].as_str(), "ALTER TABLE `cars` DROP FOREIGN KEY `fk_category`;");
    }

    #[test]
    fn view_update_uses_create_or_replace() {
        let from = View::new("active_engines", "SELECT * FROM engines WHERE active = 1");
        let to = View::new("active_engines", "SELECT * FROM engines WHERE active = 0");
        let change = Change::update(SchemaObject::View(from), SchemaObject::View(to), 6);
        let statements = render_change(&change, ";");
        assert_eq!(
            statements[0].as_str(),
            "CREATE OR REPLACE VIEW `active_engines` AS SELECT * FROM engines WHERE active = 0;"
        );
    }

    #[test]
    fn trigger_update_drops_then_recreates() {
        let from = Trigger::new("trg_audit", "orders", "AFTER INSERT", "BEGIN END");
        let to = Trigger::new("trg_audit", "orders", "AFTER INSERT", "BEGIN INSERT INTO log VALUES (1); END");
        let change = Change::update(SchemaObject::Trigger(from), SchemaObject::Trigger(to), 5);
        let statements = render_change(&change, ";");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].as_str(), "DROP TRIGGER IF EXISTS `trg_audit`;");
        assert!(statements[1].as_str().starts_with("CREATE TRIGGER `trg_audit`"));
    }

    #[test]
    fn function_create_renders_returns_clause() {
        let function = Routine::function("total_volume", "BEGIN RETURN 1; END", "int");
        let change = Change::create(SchemaObject::Routine(function), 4);
        let statements = render_change(&change, ";");
        assert_eq!(
            statements[0].as_str(),
            "CREATE FUNCTION `total_volume`() RETURNS int BEGIN RETURN 1; END;"
        );
    }
}
