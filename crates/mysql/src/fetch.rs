//! Live-connection fetcher: populates a [`Schema`] from `information_schema`,
//! grounded in the engine's original `SHOW`/`information_schema` queries.

use std::collections::BTreeMap;

use mysql::prelude::Queryable;
use mysql::{PooledConn, Row};
use tracing::debug;

use ddlsync_core::{
    Column, Error, IndexDef, IndexField, IndexKind, Parameter, Result, Routine, Schema,
    SchemaObject, Table, TableOptions, Trigger, View,
};

const TABLES_QUERY: &str = "
    SELECT t.table_name, t.engine, t.table_collation, c.character_set_name
    FROM INFORMATION_SCHEMA.TABLES t
    LEFT JOIN INFORMATION_SCHEMA.COLLATION_CHARACTER_SET_APPLICABILITY c
        ON c.collation_name = t.table_collation
    WHERE t.table_schema = schema() AND t.table_type = 'BASE TABLE'
    ORDER BY t.table_name";

const COLUMNS_QUERY: &str = "
    SELECT t.table_name, c.column_name, c.column_type, c.is_nullable,
        CASE WHEN c.column_default IS NULL THEN 0 ELSE 1 END, COALESCE(c.column_default, ''),
        c.column_key, c.extra, COALESCE(c.character_set_name, ''), COALESCE(c.collation_name, ''),
        c.column_comment, c.ordinal_position
    FROM INFORMATION_SCHEMA.TABLES t
    JOIN INFORMATION_SCHEMA.COLUMNS c ON t.table_schema = c.table_schema AND t.table_name = c.table_name
    WHERE t.table_schema = schema() AND t.table_type = 'BASE TABLE'
    ORDER BY c.ordinal_position";

const INDEXES_QUERY: &str = "
    SELECT i.table_name, i.index_name, i.non_unique,
        i.seq_in_index AS position, i.column_name, i.index_type,
        COALESCE(c.constraint_type, 'INDEX'), '', '', 0, '', ''
    FROM INFORMATION_SCHEMA.STATISTICS i
    LEFT JOIN INFORMATION_SCHEMA.TABLE_CONSTRAINTS c
        ON i.index_name = c.constraint_name AND i.table_schema = c.constraint_schema
    WHERE i.table_schema = schema()
    UNION ALL
    SELECT c.table_name, c.constraint_name, 1,
        k.ordinal_position, k.column_name, '',
        c.constraint_type, r.update_rule, r.delete_rule, k.position_in_unique_constraint,
        k.referenced_table_name, k.referenced_column_name
    FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS c
    JOIN INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS r
        ON r.constraint_schema = c.constraint_schema AND r.constraint_name = c.constraint_name
    JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k
        ON k.constraint_schema = c.constraint_schema AND k.constraint_name = c.constraint_name
    WHERE c.constraint_schema = schema() AND c.constraint_type = 'FOREIGN KEY'";

const TRIGGERS_QUERY: &str = "
    SELECT event_object_table, trigger_name, CONCAT(action_timing, ' ', event_manipulation), action_statement
    FROM information_schema.triggers
    WHERE trigger_schema = schema()";

const VIEWS_QUERY: &str = "
    SELECT table_name, view_definition
    FROM INFORMATION_SCHEMA.VIEWS
    WHERE table_schema = schema()
    ORDER BY table_name";

const PROCEDURES_QUERY: &str = "
    SELECT specific_name, routine_definition, is_deterministic
    FROM information_schema.routines
    WHERE routine_schema = schema() AND routine_type = 'PROCEDURE'
    ORDER BY specific_name";

const PROCEDURE_PARAMETERS_QUERY: &str = "
    SELECT specific_name, parameter_name, parameter_mode, dtd_identifier,
        COALESCE(character_set_name, ''), COALESCE(collation_name, ''), ordinal_position
    FROM information_schema.parameters
    WHERE specific_schema = schema() AND routine_type = 'PROCEDURE'";

const FUNCTIONS_QUERY: &str = "
    SELECT r.specific_name, r.routine_definition, p.dtd_identifier, COALESCE(p.character_set_name, ''), r.is_deterministic
    FROM information_schema.routines r
    JOIN information_schema.parameters p ON p.specific_name = r.specific_name AND p.parameter_mode IS NULL
    WHERE r.routine_schema = schema() AND r.routine_type = 'FUNCTION'
    ORDER BY r.specific_name";

const FUNCTION_PARAMETERS_QUERY: &str = "
    SELECT specific_name, parameter_name, parameter_mode, dtd_identifier, ordinal_position, COALESCE(character_set_name, '')
    FROM information_schema.parameters
    WHERE specific_schema = schema() AND routine_type = 'FUNCTION' AND parameter_mode = 'IN'";

pub(crate) fn fetch_schema(conn: &mut PooledConn, project_name: &str) -> Result<Schema> {
    debug!(project = project_name, "fetching live schema from information_schema");
    let mut tables = fetch_tables(conn, project_name)?;

    for (name, columns) in fetch_columns(conn, project_name)? {
        if let Some(table) = tables.get_mut(&name) {
            table.columns = columns;
        }
    }
    for (name, indexes) in fetch_indexes(conn, project_name)? {
        if let Some(table) = tables.get_mut(&name) {
            for index in indexes {
                table.add_index(index);
            }
        }
    }
    for (name, triggers) in fetch_triggers(conn, project_name)? {
        if let Some(table) = tables.get_mut(&name) {
            for trigger in triggers {
                table.add_trigger(trigger);
            }
        }
    }

    let mut schema = Schema::new();
    for (_, table) in tables {
        schema.add(SchemaObject::Table(table));
    }
    for view in fetch_views(conn, project_name)? {
        schema.add(SchemaObject::View(view));
    }
    for routine in fetch_procedures(conn, project_name)? {
        schema.add(SchemaObject::Routine(routine));
    }
    for routine in fetch_functions(conn, project_name)? {
        schema.add(SchemaObject::Routine(routine));
    }
    Ok(schema)
}

fn fetch_tables(conn: &mut PooledConn, project_name: &str) -> Result<BTreeMap<String, Table>> {
    let rows = run(conn, project_name, TABLES_QUERY)?;
    let mut tables = BTreeMap::new();
    for row in &rows {
        let name = trimmed_string(row, 0, project_name, TABLES_QUERY)?;
        let engine = optional_string(row, 1);
        let collation = optional_string(row, 2);
        let charset = optional_string(row, 3);
        let mut table = Table::new(&name);
        table.options = TableOptions {
            engine,
            charset,
            collation,
        };
        tables.insert(name, table);
    }
    Ok(tables)
}

fn fetch_columns(conn: &mut PooledConn, project_name: &str) -> Result<BTreeMap<String, Vec<Column>>> {
    let rows = run(conn, project_name, COLUMNS_QUERY)?;
    let mut by_table: BTreeMap<String, Vec<Column>> = BTreeMap::new();
    for row in &rows {
        let table_name = trimmed_string(row, 0, project_name, COLUMNS_QUERY)?;
        let name = trimmed_string(row, 1, project_name, COLUMNS_QUERY)?;
        let type_name = trimmed_string(row, 2, project_name, COLUMNS_QUERY)?;
        let nullable = trimmed_string(row, 3, project_name, COLUMNS_QUERY)?;
        let has_default: i64 = row.get(4).unwrap_or(0);
        let default = trimmed_string(row, 5, project_name, COLUMNS_QUERY)?;
        let key = trimmed_string(row, 6, project_name, COLUMNS_QUERY)?;
        let extra = trimmed_string(row, 7, project_name, COLUMNS_QUERY)?;
        let charset = trimmed_string(row, 8, project_name, COLUMNS_QUERY)?;
        let collate = trimmed_string(row, 9, project_name, COLUMNS_QUERY)?;
        let comment = trimmed_string(row, 10, project_name, COLUMNS_QUERY)?;
        let position: u32 = row.get(11).unwrap_or(0);

        let mut column = Column::new(name, type_name, position)
            .not_null(nullable == "NO")
            .with_comment(comment);
        if has_default == 1 {
            column = column.with_default(default);
        }
        column.charset = charset;
        column.collate = collate;
        column.extra.insert("key".to_string(), key);
        column.extra.insert("extra".to_string(), extra);

        by_table.entry(table_name).or_default().push(column);
    }
    Ok(by_table)
}

fn fetch_indexes(conn: &mut PooledConn, project_name: &str) -> Result<BTreeMap<String, Vec<IndexDef>>> {
    let rows = run(conn, project_name, INDEXES_QUERY)?;
    let mut indexes: BTreeMap<(String, String), IndexDef> = BTreeMap::new();
    for row in &rows {
        let table_name = trimmed_string(row, 0, project_name, INDEXES_QUERY)?;
        let index_name = trimmed_string(row, 1, project_name, INDEXES_QUERY)?;
        let non_unique: i64 = row.get(2).unwrap_or(1);
        let position: u32 = row.get(3).unwrap_or(0);
        let column_name = trimmed_string(row, 4, project_name, INDEXES_QUERY)?;
        let constraint_type = trimmed_string(row, 6, project_name, INDEXES_QUERY)?;
        let on_update = trimmed_string(row, 7, project_name, INDEXES_QUERY)?;
        let on_delete = trimmed_string(row, 8, project_name, INDEXES_QUERY)?;
        let source_position: u32 = row.get(9).unwrap_or(0);
        let source_table = trimmed_string(row, 10, project_name, INDEXES_QUERY)?;
        let source_column = trimmed_string(row, 11, project_name, INDEXES_QUERY)?;

        let kind = match constraint_type.as_str() {
            "PRIMARY KEY" => IndexKind::PrimaryKey,
            "FOREIGN KEY" => IndexKind::ForeignKey,
            "UNIQUE" => IndexKind::Unique,
            _ => IndexKind::Index,
        };

        let key = (table_name.clone(), index_name.clone());
        let index = indexes.entry(key).or_insert_with(|| {
            let mut index = IndexDef::new(index_name.clone(), kind, table_name.clone());
            index.unique = non_unique == 0;
            index.on_update = on_update.clone();
            index.on_delete = on_delete.clone();
            index.source_table = source_table.clone();
            index
        });
        if !column_name.is_empty() {
            index.fields.push(IndexField {
                name: column_name,
                position,
            });
        }
        if kind == IndexKind::ForeignKey && !source_column.is_empty() {
            index.source_fields.push(IndexField {
                name: source_column,
                position: source_position,
            });
        }
    }

    let mut by_table: BTreeMap<String, Vec<IndexDef>> = BTreeMap::new();
    for ((table_name, _), index) in indexes {
        by_table.entry(table_name).or_default().push(index);
    }
    Ok(by_table)
}

fn fetch_triggers(conn: &mut PooledConn, project_name: &str) -> Result<BTreeMap<String, Vec<Trigger>>> {
    let rows = run(conn, project_name, TRIGGERS_QUERY)?;
    let mut by_table: BTreeMap<String, Vec<Trigger>> = BTreeMap::new();
    for row in &rows {
        let table_name = trimmed_string(row, 0, project_name, TRIGGERS_QUERY)?;
        let name = trimmed_string(row, 1, project_name, TRIGGERS_QUERY)?;
        let type_name = trimmed_string(row, 2, project_name, TRIGGERS_QUERY)?;
        let source = trimmed_string(row, 3, project_name, TRIGGERS_QUERY)?;
        let trigger = Trigger::new(name, table_name.clone(), type_name, source);
        by_table.entry(table_name).or_default().push(trigger);
    }
    Ok(by_table)
}

fn fetch_views(conn: &mut PooledConn, project_name: &str) -> Result<Vec<View>> {
    let rows = run(conn, project_name, VIEWS_QUERY)?;
    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = trimmed_string(row, 0, project_name, VIEWS_QUERY)?;
        let source = trimmed_string(row, 1, project_name, VIEWS_QUERY)?;
        views.push(View::new(name, source));
    }
    Ok(views)
}

fn fetch_procedures(conn: &mut PooledConn, project_name: &str) -> Result<Vec<Routine>> {
    let param_rows = run(conn, project_name, PROCEDURE_PARAMETERS_QUERY)?;
    let mut input_params: BTreeMap<String, Vec<Parameter>> = BTreeMap::new();
    let mut output_params: BTreeMap<String, Vec<Parameter>> = BTreeMap::new();
    for row in &param_rows {
        let routine_name = trimmed_string(row, 0, project_name, PROCEDURE_PARAMETERS_QUERY)?;
        let name = trimmed_string(row, 1, project_name, PROCEDURE_PARAMETERS_QUERY)?;
        let mode = trimmed_string(row, 2, project_name, PROCEDURE_PARAMETERS_QUERY)?;
        let type_name = trimmed_string(row, 3, project_name, PROCEDURE_PARAMETERS_QUERY)?;
        let charset = trimmed_string(row, 4, project_name, PROCEDURE_PARAMETERS_QUERY)?;
        let collate = trimmed_string(row, 5, project_name, PROCEDURE_PARAMETERS_QUERY)?;
        let position: u32 = row.get(6).unwrap_or(0);

        let mut param = Parameter::new(name, type_name, position);
        param.charset = charset;
        param.collate = collate;
        match mode.as_str() {
            "IN" => input_params.entry(routine_name).or_default().push(param),
            "OUT" | "INOUT" => output_params.entry(routine_name).or_default().push(param),
            _ => {}
        }
    }

    let rows = run(conn, project_name, PROCEDURES_QUERY)?;
    let mut procedures = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = trimmed_string(row, 0, project_name, PROCEDURES_QUERY)?;
        let source = trimmed_string(row, 1, project_name, PROCEDURES_QUERY)?;
        let deterministic = trimmed_string(row, 2, project_name, PROCEDURES_QUERY)? == "YES";

        let mut procedure = Routine::procedure(&name, source);
        procedure.deterministic = deterministic;
        procedure.input_parameters = input_params.remove(&name).unwrap_or_default();
        procedure.output_parameters = output_params.remove(&name).unwrap_or_default();
        procedures.push(procedure);
    }
    Ok(procedures)
}

fn fetch_functions(conn: &mut PooledConn, project_name: &str) -> Result<Vec<Routine>> {
    let param_rows = run(conn, project_name, FUNCTION_PARAMETERS_QUERY)?;
    let mut input_params: BTreeMap<String, Vec<Parameter>> = BTreeMap::new();
    for row in &param_rows {
        let routine_name = trimmed_string(row, 0, project_name, FUNCTION_PARAMETERS_QUERY)?;
        let name = trimmed_string(row, 1, project_name, FUNCTION_PARAMETERS_QUERY)?;
        let type_name = trimmed_string(row, 3, project_name, FUNCTION_PARAMETERS_QUERY)?;
        let position: u32 = row.get(4).unwrap_or(0);
        let charset = trimmed_string(row, 5, project_name, FUNCTION_PARAMETERS_QUERY)?;

        let mut param = Parameter::new(name, type_name, position);
        param.charset = charset;
        input_params.entry(routine_name).or_default().push(param);
    }

    let rows = run(conn, project_name, FUNCTIONS_QUERY)?;
    let mut functions = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = trimmed_string(row, 0, project_name, FUNCTIONS_QUERY)?;
        let source = trimmed_string(row, 1, project_name, FUNCTIONS_QUERY)?;
        let output_type = trimmed_string(row, 2, project_name, FUNCTIONS_QUERY)?;
        let output_charset = trimmed_string(row, 3, project_name, FUNCTIONS_QUERY)?;
        let deterministic = trimmed_string(row, 4, project_name, FUNCTIONS_QUERY)? == "YES";

        let mut function = Routine::function(&name, source, output_type);
        function.output_charset = output_charset;
        function.deterministic = deterministic;
        function.input_parameters = input_params.remove(&name).unwrap_or_default();
        functions.push(function);
    }
    Ok(functions)
}

fn run(conn: &mut PooledConn, project_name: &str, query: &str) -> Result<Vec<Row>> {
    conn.query::<Row, _>(query).map_err(|source| Error::FetchError {
        project: project_name.to_string(),
        message: format!("{query}: {source}"),
    })
}

fn trimmed_string(row: &Row, index: usize, project_name: &str, query: &str) -> Result<String> {
    row.get::<String, usize>(index)
        .map(|value| value.trim().to_string())
        .ok_or_else(|| Error::FetchError {
            project: project_name.to_string(),
            message: format!("{query}: missing column at index {index}"),
        })
}

fn optional_string(row: &Row, index: usize) -> Option<String> {
    row.get::<String, usize>(index)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
