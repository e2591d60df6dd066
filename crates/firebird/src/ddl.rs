//! DDL rendering for Firebird 2.5. Unlike MySQL, views, triggers, procedures,
//! domains, exceptions, and sequences all support a real in-place `ALTER` —
//! only indexes (and constraints, which are a kind of index here) and roles
//! fall back to drop-then-create.

use ddlsync_core::{
    Change, ChangeState, Column, Domain, Exception, IndexDef, IndexKind, Parameter, Role, Routine,
    RoutineKind, SchemaObject, Sequence, Statement, Table, TableSubChange, Trigger, View,
    table_internal_changes,
};

pub(crate) fn render_change(change: &Change, sep: &str) -> Vec<Statement> {
    match change.state {
        ChangeState::Create => create_ddl(change.to.as_ref().expect("create change carries `to`"), sep),
        ChangeState::Drop => vec![drop_ddl(change.from.as_ref().expect("drop change carries `from`"), sep)],
        ChangeState::Update => alter_ddl(
            change.from.as_ref().expect("update change carries `from`"),
            change.to.as_ref().expect("update change carries `to`"),
            sep,
        ),
    }
}

fn create_ddl(object: &SchemaObject, sep: &str) -> Vec<Statement> {
    match object {
        SchemaObject::Table(table) => vec![Statement::new(format!("{}{sep}", create_table(table)))],
        SchemaObject::View(view) => vec![create_view(view, sep)],
        SchemaObject::Routine(routine) => vec![create_routine(routine, sep)],
        SchemaObject::Trigger(trigger) => vec![create_trigger(trigger, sep)],
        SchemaObject::Index(index) => create_index(index, sep),
        SchemaObject::Domain(domain) => create_domain(domain, sep),
        SchemaObject::Exception(exception) => create_exception(exception, sep),
        SchemaObject::Sequence(sequence) => create_sequence(sequence, sep),
        SchemaObject::Role(role) => vec![create_role(role, sep)],
    }
}

fn drop_ddl(object: &SchemaObject, sep: &str) -> Statement {
    match object {
        SchemaObject::Table(table) => Statement::new(format!("DROP TABLE {}{sep}", table.name)),
        SchemaObject::View(view) => drop_view(view, sep),
        SchemaObject::Routine(routine) => drop_routine(routine, sep),
        SchemaObject::Trigger(trigger) => drop_trigger(trigger, sep),
        SchemaObject::Index(index) => drop_index(index, sep),
        SchemaObject::Domain(domain) => drop_domain(domain, sep),
        SchemaObject::Exception(exception) => drop_exception(exception, sep),
        SchemaObject::Sequence(sequence) => drop_sequence(sequence, sep),
        SchemaObject::Role(role) => drop_role(role, sep),
    }
}

fn alter_ddl(from: &SchemaObject, to: &SchemaObject, sep: &str) -> Vec<Statement> {
    match (from, to) {
        (SchemaObject::Table(from), SchemaObject::Table(to)) => alter_table(from, to, sep),
        (SchemaObject::View(_), SchemaObject::View(to)) => vec![alter_view(to, sep)],
        (SchemaObject::Routine(_), SchemaObject::Routine(to)) => vec![alter_routine(to, sep)],
        (SchemaObject::Trigger(_), SchemaObject::Trigger(to)) => vec![alter_trigger(to, sep)],
        (SchemaObject::Index(from), SchemaObject::Index(to)) => {
            let mut statements = vec![drop_index(from, sep)];
            statements.extend(create_index(to, sep));
            statements
        }
        (SchemaObject::Domain(_), SchemaObject::Domain(to)) => alter_domain(to, sep),
        (SchemaObject::Exception(_), SchemaObject::Exception(to)) => alter_exception(to, sep),
        (SchemaObject::Sequence(_), SchemaObject::Sequence(to)) => alter_sequence(to, sep),
        (SchemaObject::Role(from), SchemaObject::Role(to)) => vec![drop_role(from, sep), create_role(to, sep)],
        (other, _) => panic!("fb2.5 does not support kind {:?}", other.kind()),
    }
}

// --- table / column -------------------------------------------------------

fn create_table(table: &Table) -> String {
    let mut definitions: Vec<String> = table.ordered_columns().iter().map(|c| column_definition(c)).collect();
    if let Some(pk) = table.primary_key() {
        definitions.push(format!("PRIMARY KEY ({})", pk.fields_by_position().join(", ")));
    }
    format!("CREATE TABLE {} (\n\t{}\n)", table.name, definitions.join(",\n\t"))
}

fn column_definition(column: &Column) -> String {
    let domain = column.extra.get("domain").map(String::as_str).unwrap_or("");
    let type_or_domain = if domain.is_empty() { column.type_name.as_str() } else { domain };
    let mut def = format!("{} {type_or_domain}", column.name);
    if !column.charset.is_empty() {
        def.push_str(&format!(" CHARACTER SET {}", column.charset));
    }
    if column.has_default {
        def.push_str(&format!(" DEFAULT {}", column.default));
    }
    if column.not_null {
        def.push_str(" NOT NULL");
    }
    if !column.collate.is_empty() {
        def.push_str(&format!(" COLLATE {}", column.collate));
    }
    def
}

fn alter_table(from: &Table, to: &Table, sep: &str) -> Vec<Statement> {
    let table_name = to.name.clone();
    let mut statements = Vec::new();
    for sub in table_internal_changes(from, to) {
        match sub {
            TableSubChange::Column { state, from, to } => {
                for stmt in alter_column_statements(&table_name, state, from.as_ref(), to.as_ref(), sep) {
                    statements.push(Statement::new(stmt));
                }
            }
        }
    }
    statements
}

fn alter_column_statements(
    table_name: &str,
    state: ChangeState,
    from: Option<&Column>,
    to: Option<&Column>,
    sep: &str,
) -> Vec<String> {
    match state {
        ChangeState::Create => {
            let column = to.expect("create column carries `to`");
            let domain = column.extra.get("domain").map(String::as_str).unwrap_or("");
            let mut def = format!("ALTER TABLE {table_name} ADD {}", column.name);
            if domain.is_empty() {
                def.push_str(&format!(" {}", column.type_name));
                if !column.charset.is_empty() {
                    def.push_str(&format!(" CHARACTER SET {}", column.charset));
                }
            } else {
                def.push_str(&format!(" {domain}"));
            }
            if !column.collate.is_empty() {
                def.push_str(&format!(" COLLATE {}", column.collate));
            }
            if column.not_null {
                def.push_str(" NOT NULL");
            }
            if column.has_default {
                def.push_str(&format!(" DEFAULT {}", column.default));
            }
            let mut statements = vec![format!("{def}{sep}")];
            if !column.comment.is_empty() {
                statements.push(comment_on_column(table_name, column, sep));
            }
            statements
        }
        ChangeState::Drop => {
            let column = from.expect("drop column carries `from`");
            vec![format!("ALTER TABLE {table_name} DROP {}{sep}", column.name)]
        }
        ChangeState::Update => {
            let from_column = from.expect("update column carries `from`");
            let to_column = to.expect("update column carries `to`");
            let mut statements = Vec::new();

            if from_column.not_null != to_column.not_null {
                let flag = if to_column.not_null { "1" } else { "NULL" };
                statements.push(format!(
                    "UPDATE RDB$RELATION_FIELDS SET RDB$NULL_FLAG = {flag} WHERE RDB$FIELD_NAME = '{}' AND RDB$RELATION_NAME = '{table_name}'{sep}",
                    to_column.name
                ));
            }

            let from_domain = from_column.extra.get("domain").map(String::as_str).unwrap_or("");
            let to_domain = to_column.extra.get("domain").map(String::as_str).unwrap_or("");
            if from_domain != to_domain {
                if !to_domain.is_empty() {
                    statements.push(format!(
                        "UPDATE RDB$RELATION_FIELDS SET RDB$FIELD_SOURCE = '{to_domain}' WHERE RDB$FIELD_NAME = '{}' AND RDB$RELATION_NAME = '{table_name}'{sep}",
                        to_column.name
                    ));
                }
            } else if from_column.type_name != to_column.type_name {
                statements.push(format!(
                    "ALTER TABLE {table_name} ALTER COLUMN {} TYPE {}{sep}",
                    to_column.name, to_column.type_name
                ));
            }

            if to_column.has_default && (from_column.default != to_column.default || !from_column.has_default) {
                statements.push(format!(
                    "ALTER TABLE {table_name} ALTER COLUMN {} SET DEFAULT {}{sep}",
                    to_column.name, to_column.default
                ));
            }

            if from_column.charset != to_column.charset {
                let field_source = to_column.extra.get("field_source").map(String::as_str).unwrap_or(&to_column.name);
                statements.push(format!(
                    "UPDATE RDB$FIELDS SET RDB$CHARACTER_SET_ID = (SELECT FIRST 1 RDB$CHARACTER_SET_ID FROM RDB$COLLATIONS WHERE RDB$COLLATION_NAME = '{}') WHERE RDB$FIELD_NAME = '{field_source}'{sep}",
                    to_column.charset
                ));
            }

            if from_column.collate != to_column.collate {
                statements.push(format!(
                    "UPDATE RDB$RELATION_FIELDS SET RDB$COLLATION_ID = (SELECT FIRST 1 RDB$COLLATION_ID FROM RDB$COLLATIONS WHERE RDB$COLLATION_NAME = '{}') WHERE RDB$FIELD_NAME = '{}' AND RDB$RELATION_NAME = '{table_name}'{sep}",
                    to_column.collate, to_column.name
                ));
            }

            if from_column.comment != to_column.comment {
                statements.push(comment_on_column(table_name, to_column, sep));
            }

            if from_column.position != to_column.position {
                statements.push(format!(
                    "ALTER TABLE {table_name} ALTER {} POSITION {}{sep}",
                    to_column.name, to_column.position
                ));
            }

            statements
        }
    }
}

fn comment_on_column(table_name: &str, column: &Column, sep: &str) -> String {
    format!(
        "COMMENT ON COLUMN {table_name}.{} IS '{}'{sep}",
        column.name,
        column.comment.replace('\'', "''")
    )
}

// --- indexes ----------------------------------------------------------------

fn index_definition(index: &IndexDef) -> String {
    let fields = index.fields_by_position().join(", ");
    match index.kind {
        IndexKind::PrimaryKey => {
            format!("ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({fields})", index.table_name, index.name)
        }
        IndexKind::Unique => {
            format!("ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({fields})", index.table_name, index.name)
        }
        IndexKind::ForeignKey => {
            let source_fields = index.source_fields_by_position().join(", ");
            let mut ddl = format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({fields}) REFERENCES {} ({source_fields})",
                index.table_name, index.name, index.source_table
            );
            if !index.on_delete.is_empty() {
                ddl.push_str(&format!(" ON DELETE {}", index.on_delete));
            }
            if !index.on_update.is_empty() {
                ddl.push_str(&format!(" ON UPDATE {}", index.on_update));
            }
            ddl
        }
        IndexKind::Index => {
            let unique = if index.unique { " UNIQUE" } else { "" };
            let order = if index.ascending { "" } else { " DESCENDING" };
            if index.computed && index.expression.len() > 1 {
                format!(
                    "CREATE{unique}{order} INDEX {} ON {} COMPUTED BY ({})",
                    index.name, index.table_name, index.expression
                )
            } else {
                format!("CREATE{unique}{order} INDEX {} ON {} ({fields})", index.name, index.table_name)
            }
        }
    }
}

fn create_index(index: &IndexDef, sep: &str) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!("{}{sep}", index_definition(index)))];
    if !index.active {
        statements.push(Statement::new(format!("ALTER INDEX {} INACTIVE{sep}", index.name)));
    }
    statements
}

fn drop_index(index: &IndexDef, sep: &str) -> Statement {
    Statement::new(format!("DROP INDEX {}{sep}", index.name))
}

// --- trigger / view / routine: real ALTER ----------------------------------

fn trigger_definition(trigger: &Trigger) -> String {
    let active = if trigger.active.unwrap_or(true) { "ACTIVE" } else { "INACTIVE" };
    let position = trigger.position.unwrap_or(0);
    format!(
        "TRIGGER {} FOR {}\n{active} {} POSITION {position}\n{}",
        trigger.name, trigger.table_name, trigger.type_name, trigger.source
    )
}

fn create_trigger(trigger: &Trigger, sep: &str) -> Statement {
    Statement::new(format!("CREATE {}{sep}", trigger_definition(trigger)))
}

fn alter_trigger(trigger: &Trigger, sep: &str) -> Statement {
    Statement::new(format!("ALTER {}{sep}", trigger_definition(trigger)))
}

fn drop_trigger(trigger: &Trigger, sep: &str) -> Statement {
    Statement::new(format!("DROP TRIGGER {}{sep}", trigger.name))
}

fn view_definition(view: &View) -> String {
    format!("VIEW {} \nas {}", view.name, view.source)
}

fn create_view(view: &View, sep: &str) -> Statement {
    Statement::new(format!("CREATE {}{sep}", view_definition(view)))
}

fn alter_view(view: &View, sep: &str) -> Statement {
    Statement::new(format!("ALTER {}{sep}", view_definition(view)))
}

fn drop_view(view: &View, sep: &str) -> Statement {
    Statement::new(format!("DROP VIEW {}{sep}", view.name))
}

fn procedure_definition(routine: &Routine) -> String {
    if routine.routine_kind != RoutineKind::Procedure {
        panic!("fb2.5 does not support function routines");
    }
    let mut inputs: Vec<&Parameter> = routine.input_parameters.iter().collect();
    inputs.sort_by_key(|p| p.position);
    let mut outputs: Vec<&Parameter> = routine.output_parameters.iter().collect();
    outputs.sort_by_key(|p| p.position);

    let mut def = format!("PROCEDURE {} ", routine.name);
    if !inputs.is_empty() {
        let params = inputs
            .iter()
            .map(|p| format!("{} {}", p.name, p.type_name))
            .collect::<Vec<_>>()
            .join(",\n\t");
        def.push_str(&format!("(\n\t{params}) "));
    }
    if !outputs.is_empty() {
        let params = outputs
            .iter()
            .map(|p| format!("{} {}", p.name, p.type_name))
            .collect::<Vec<_>>()
            .join(",\n\t");
        def.push_str(&format!("\nreturns (\n\t{params})"));
    }
    def.push_str(&format!("\nas\n{}", routine.source));
    def
}

fn create_routine(routine: &Routine, sep: &str) -> Statement {
    Statement::new(format!("CREATE {}{sep}\n", procedure_definition(routine)))
}

fn alter_routine(routine: &Routine, sep: &str) -> Statement {
    Statement::new(format!("ALTER {}{sep}\n", procedure_definition(routine)))
}

fn drop_routine(routine: &Routine, sep: &str) -> Statement {
    Statement::new(format!("DROP PROCEDURE {}{sep}", routine.name))
}

// --- domain / exception / sequence / role ----------------------------------

fn domain_definition(domain: &Domain) -> String {
    let mut def = format!("DOMAIN {} AS {}", domain.name, domain.type_name);
    if domain.has_default {
        def.push_str(&format!(" DEFAULT {}", domain.default));
    }
    if domain.not_null {
        def.push_str(" NOT NULL");
    }
    def
}

fn comment_on_domain(domain: &Domain, sep: &str) -> Option<Statement> {
    (!domain.comment.is_empty()).then(|| {
        Statement::new(format!(
            "COMMENT ON DOMAIN {} IS '{}'{sep}",
            domain.name,
            domain.comment.replace('\'', "''")
        ))
    })
}

fn create_domain(domain: &Domain, sep: &str) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!("CREATE {}{sep}", domain_definition(domain)))];
    statements.extend(comment_on_domain(domain, sep));
    statements
}

fn alter_domain(domain: &Domain, sep: &str) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!("ALTER {}{sep}", domain_definition(domain)))];
    statements.extend(comment_on_domain(domain, sep));
    statements
}

fn drop_domain(domain: &Domain, sep: &str) -> Statement {
    Statement::new(format!("DROP DOMAIN {}{sep}", domain.name))
}

fn exception_definition(exception: &Exception) -> String {
    format!("EXCEPTION {} '{}'", exception.name, exception.message.replace('\'', "''"))
}

fn comment_on_exception(exception: &Exception, sep: &str) -> Option<Statement> {
    (!exception.comment.is_empty()).then(|| {
        Statement::new(format!(
            "COMMENT ON EXCEPTION {} IS '{}'{sep}",
            exception.name,
            exception.comment.replace('\'', "''")
        ))
    })
}

fn create_exception(exception: &Exception, sep: &str) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!("CREATE {}{sep}", exception_definition(exception)))];
    statements.extend(comment_on_exception(exception, sep));
    statements
}

fn alter_exception(exception: &Exception, sep: &str) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!("ALTER {}{sep}", exception_definition(exception)))];
    statements.extend(comment_on_exception(exception, sep));
    statements
}

fn drop_exception(exception: &Exception, sep: &str) -> Statement {
    Statement::new(format!("DROP EXCEPTION {}{sep}", exception.name))
}

fn sequence_definition(sequence: &Sequence) -> String {
    format!("SEQUENCE {}", sequence.name)
}

fn comment_on_sequence(sequence: &Sequence, sep: &str) -> Option<Statement> {
    (!sequence.comment.is_empty()).then(|| {
        Statement::new(format!(
            "COMMENT ON SEQUENCE {} IS '{}'{sep}",
            sequence.name,
            sequence.comment.replace('\'', "''")
        ))
    })
}

fn create_sequence(sequence: &Sequence, sep: &str) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!("CREATE {}{sep}", sequence_definition(sequence)))];
    statements.extend(comment_on_sequence(sequence, sep));
    statements
}

fn alter_sequence(sequence: &Sequence, sep: &str) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!("ALTER {}{sep}", sequence_definition(sequence)))];
    statements.extend(comment_on_sequence(sequence, sep));
    statements
}

fn drop_sequence(sequence: &Sequence, sep: &str) -> Statement {
    Statement::new(format!("DROP {}{sep}", sequence_definition(sequence)))
}

fn role_definition(role: &Role) -> String {
    format!("ROLE {}", role.name)
}

fn create_role(role: &Role, sep: &str) -> Statement {
    Statement::new(format!("CREATE {}{sep}", role_definition(role)))
}

fn drop_role(role: &Role, sep: &str) -> Statement {
    Statement::new(format!("DROP {}{sep}", role_definition(role)))
}

#[cfg(test)]
mod tests {
    use ddlsync_core::{Change, IndexField, priority_for};

    use super::*;

    fn pk(table: &str, column: &str) -> IndexDef {
        let mut index = IndexDef::new(format!("pk_{table}"), IndexKind::PrimaryKey, table);
        index.fields.push(IndexField { name: column.to_string(), position: 0 });
        index
    }

    #[test]
    fn create_table_inlines_primary_key() {
        let mut table = Table::new("engines");
        table.columns.push(Column::new("id", "INTEGER", 0).not_null(true));
        table.add_index(pk("engines", "id"));

        let def = create_table(&table);
        assert!(def.contains("CREATE TABLE engines ("));
        assert!(def.contains("PRIMARY KEY (id)"));
    }

    #[test]
    fn column_definition_prefers_domain_over_type() {
        let mut column = Column::new("status", "VARCHAR(20)", 1);
        column.extra.insert("domain".to_string(), "D_STATUS".to_string());

        assert_eq!(column_definition(&column), "status D_STATUS");
    }

    #[test]
    fn column_create_statement_uses_alter_table_add() {
        let column = Column::new("archived_at", "TIMESTAMP", 5);
        let statements = alter_column_statements("engines", ChangeState::Create, None, Some(&column), ";");
        assert_eq!(statements, vec!["ALTER TABLE engines ADD archived_at TIMESTAMP;".to_string()]);
    }

    #[test]
    fn column_not_null_change_updates_relation_fields() {
        let from = Column::new("status", "VARCHAR(20)", 1);
        let to = Column::new("status", "VARCHAR(20)", 1).not_null(true);
        let statements = alter_column_statements("engines", ChangeState::Update, Some(&from), Some(&to), ";");
        assert!(statements[0].starts_with("UPDATE RDB$RELATION_FIELDS SET RDB$NULL_FLAG = 1"));
    }

    #[test]
    fn foreign_key_create_references_source_table() {
        let mut index = IndexDef::new("fk_orders_engine", IndexKind::ForeignKey, "orders");
        index.fields.push(IndexField { name: "engine_id".to_string(), position: 0 });
        index.source_table = "engines".to_string();
        index.source_fields.push(IndexField { name: "id".to_string(), position: 0 });
        index.on_delete = "CASCADE".to_string();

        let statements = create_index(&index, ";");
        assert_eq!(statements.len(), 1);
        assert!(statements[0].as_str().contains("REFERENCES engines (id)"));
        assert!(statements[0].as_str().contains("ON DELETE CASCADE"));
    }

    #[test]
    fn inactive_index_emits_activity_statement() {
        let mut index = IndexDef::new("idx_orders_status", IndexKind::Index, "orders");
        index.fields.push(IndexField { name: "status".to_string(), position: 0 });
        index.active = false;

        let statements = create_index(&index, ";");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].as_str(), "ALTER INDEX idx_orders_status INACTIVE;");
    }

    #[test]
    fn view_update_renders_real_alter() {
        let view = View::new("active_orders", "select * from orders where active");
        assert!(alter_view(&view, ";").as_str().starts_with("ALTER VIEW active_orders"));
    }

    #[test]
    fn trigger_update_renders_real_alter() {
        let mut trigger = Trigger::new("trg_orders_bi", "orders", "before insert", "begin end");
        trigger.active = Some(true);
        trigger.position = Some(0);

        let statement = alter_trigger(&trigger, ";");
        assert!(statement.as_str().starts_with("ALTER TRIGGER trg_orders_bi FOR orders"));
        assert!(!statement.as_str().contains("DROP TRIGGER"));
    }

    #[test]
    fn procedure_update_renders_real_alter() {
        let routine = Routine::procedure("recalc_totals", "begin end");
        assert!(alter_routine(&routine, ";").as_str().starts_with("ALTER PROCEDURE recalc_totals"));
    }

    #[test]
    fn domain_create_appends_comment_statement() {
        let mut domain = Domain::new("d_money", "NUMERIC(15, 2)");
        domain.comment = "currency amount".to_string();

        let statements = create_domain(&domain, ";");
        assert_eq!(statements.len(), 2);
        assert!(statements[1].as_str().starts_with("COMMENT ON DOMAIN d_money"));
    }

    #[test]
    fn role_update_is_drop_then_create() {
        let from = Role::new("old_role");
        let to = Role::new("new_role");
        let change = Change::update(SchemaObject::Role(from), SchemaObject::Role(to), priority_for(&SchemaObject::Role(Role::new("x"))));

        let statements = render_change(&change, ";");
        assert_eq!(statements.len(), 2);
        assert!(statements[0].as_str().starts_with("DROP ROLE old_role"));
        assert!(statements[1].as_str().starts_with("CREATE ROLE new_role"));
    }
}
