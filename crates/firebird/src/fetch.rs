//! Live-connection fetcher: populates a [`Schema`] from Firebird's `RDB$*`
//! system tables, grounded in the engine's original per-kind SQL queries.

use std::collections::BTreeMap;

use rsfbclient::{Queryable, SimpleConnection};
use tracing::debug;

use ddlsync_core::{
    Column, Domain, Error, Exception, IndexDef, IndexField, IndexKind, Parameter, Result, Role,
    Routine, Schema, SchemaObject, Sequence, Table, Trigger, View,
};

const TABLES_QUERY: &str = "
    select trim(rdb$relation_name)
    from rdb$relations
    where rdb$view_blr is null and (rdb$system_flag is null or rdb$system_flag = 0)
    order by rdb$relation_name";

const COLUMNS_QUERY: &str = "
    SELECT
      TRIM(RF.RDB$RELATION_NAME),
      TRIM(RF.RDB$FIELD_NAME),
      TRIM(RF.RDB$FIELD_SOURCE),
      TRIM(COALESCE((CASE F.RDB$FIELD_TYPE
        WHEN 7 THEN
          CASE F.RDB$FIELD_SUB_TYPE
            WHEN 0 THEN 'SMALLINT'
            WHEN 1 THEN 'NUMERIC(' || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
            WHEN 2 THEN 'DECIMAL'
          END
        WHEN 8 THEN
          CASE F.RDB$FIELD_SUB_TYPE
            WHEN 0 THEN 'INTEGER'
            WHEN 1 THEN 'NUMERIC('  || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
            WHEN 2 THEN 'DECIMAL'
          END
        WHEN 9 THEN 'QUAD'
        WHEN 10 THEN 'FLOAT'
        WHEN 12 THEN 'DATE'
        WHEN 13 THEN 'TIME'
        WHEN 14 THEN 'CHAR(' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ') '
        WHEN 16 THEN
          CASE F.RDB$FIELD_SUB_TYPE
            WHEN 0 THEN 'BIGINT'
            WHEN 1 THEN 'NUMERIC(' || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
            WHEN 2 THEN 'DECIMAL'
          END
        WHEN 27 THEN 'DOUBLE'
        WHEN 35 THEN 'TIMESTAMP'
        WHEN 37 THEN 'VARCHAR(' || F.RDB$FIELD_LENGTH || ')'
        WHEN 40 THEN 'CSTRING' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ')'
        WHEN 45 THEN 'BLOB_ID'
        WHEN 261 THEN 'BLOB SUB_TYPE ' || F.RDB$FIELD_SUB_TYPE
        ELSE 'RDB$FIELD_TYPE: ' || F.RDB$FIELD_TYPE || '?'
      END), '')),
      TRIM(CASE WHEN not (rf.rdb$field_source starting with 'RDB$') THEN rf.rdb$field_source ELSE '' END),
      COALESCE(RF.RDB$NULL_FLAG, 0),
      TRIM(COALESCE(NULLIF(CH.RDB$CHARACTER_SET_NAME, 'NONE'), '')),
      TRIM(COALESCE(NULLIF(DCO.RDB$COLLATION_NAME, 'NONE'), '')),
      TRIM(COALESCE(RF.RDB$DEFAULT_SOURCE, F.RDB$DEFAULT_SOURCE, '')),
      TRIM(COALESCE(RF.RDB$DESCRIPTION, '')),
      RF.RDB$FIELD_POSITION + 1
    FROM RDB$RELATION_FIELDS RF
    JOIN RDB$RELATIONS R ON R.RDB$RELATION_NAME = RF.RDB$RELATION_NAME
    JOIN RDB$FIELDS F ON (F.RDB$FIELD_NAME = RF.RDB$FIELD_SOURCE)
    LEFT OUTER JOIN RDB$CHARACTER_SETS CH ON (CH.RDB$CHARACTER_SET_ID = F.RDB$CHARACTER_SET_ID)
    LEFT OUTER JOIN RDB$COLLATIONS DCO ON ((DCO.RDB$COLLATION_ID = RF.RDB$COLLATION_ID) AND (DCO.RDB$CHARACTER_SET_ID = F.RDB$CHARACTER_SET_ID))
    WHERE COALESCE(RF.RDB$SYSTEM_FLAG, 0) = 0 AND R.rdb$view_blr is null
    ORDER BY RF.RDB$FIELD_POSITION";

const INDEXES_QUERY: &str = "
    select trim(i.rdb$relation_name), trim(coalesce(i.rdb$index_name, '')),
        trim(coalesce(i2.rdb$relation_name,'')), trim(coalesce(s2.rdb$field_name,'')),
        trim(coalesce(c.rdb$constraint_type, 'INDEX')),
        case i.rdb$segment_count when 0 then 1 else 0 end,
        trim(coalesce(i.rdb$expression_source, '')),
        trim(coalesce(i.rdb$description, '')),
        case i.rdb$index_type when 0 then 1 else 0 end,
        case coalesce(i.rdb$index_inactive, 0) when 0 then 1 else 0 end,
        trim(coalesce(s.rdb$field_name, '')),
        coalesce(s.rdb$field_position, 0),
        coalesce(s2.rdb$field_position, 0),
        case when trim(rf.rdb$update_rule) = 'RESTRICT' then '' else trim(coalesce(rf.rdb$update_rule, '')) end,
        case when trim(rf.rdb$delete_rule) = 'RESTRICT' then '' else trim(coalesce(rf.rdb$delete_rule, '')) end,
        coalesce(i.rdb$unique_flag, 0)
    from rdb$indices i
    left join rdb$index_segments s on s.rdb$index_name = i.rdb$index_name
    left join rdb$relation_constraints c on c.rdb$constraint_name = i.rdb$index_name
    left join rdb$indices i2 on i.rdb$foreign_key = i2.rdb$index_name
    left join rdb$index_segments s2 on s2.rdb$index_name = i.rdb$foreign_key
    left join rdb$ref_constraints rf on rf.rdb$constraint_name = i.rdb$index_name
    WHERE i.rdb$system_flag = 0
    ORDER BY i.rdb$index_name";

const TRIGGERS_QUERY: &str = "
    select
        trim(RDB$RELATION_NAME),
        trim(RDB$TRIGGER_NAME),
        case RDB$TRIGGER_INACTIVE when 1 then 0 else 1 end,
        trim(case RDB$TRIGGER_TYPE
            when 1 then 'before insert'
            when 2 then 'after insert'
            when 3 then 'before update'
            when 4 then 'after update'
            when 5 then 'before delete'
            when 6 then 'after delete'
            when 17 then 'before insert or update'
            when 18 then 'after insert or update'
            when 25 then 'before insert or delete'
            when 26 then 'after insert or delete'
            when 27 then 'before update or delete'
            when 28 then 'after update or delete'
            when 113 then 'before insert or update or delete'
            when 114 then 'after insert or update or delete'
            when 8192 then 'on connect'
            when 8193 then 'on disconnect'
            when 8194 then 'on transaction start'
            when 8195 then 'on transaction commit'
            when 8196 then 'on transaction rollback' end),
        RDB$TRIGGER_SEQUENCE, RDB$TRIGGER_SOURCE
    from RDB$TRIGGERS where RDB$TRIGGER_SOURCE is not null AND RDB$SYSTEM_FLAG = 0";

const VIEWS_QUERY: &str = "
    select trim(rdb$relation_name), trim(rdb$view_source)
    from rdb$relations
    where rdb$view_blr is not null and (rdb$system_flag is null or rdb$system_flag = 0)
    order by 1";

const DOMAINS_QUERY: &str = "
    select
     trim(F.RDB$FIELD_NAME),
     trim(CASE F.RDB$FIELD_TYPE
            WHEN 7 THEN
              CASE F.RDB$FIELD_SUB_TYPE
                WHEN 0 THEN 'SMALLINT'
                WHEN 1 THEN 'NUMERIC(' || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
                WHEN 2 THEN 'DECIMAL'
              END
            WHEN 8 THEN
              CASE F.RDB$FIELD_SUB_TYPE
                WHEN 0 THEN 'INTEGER'
                WHEN 1 THEN 'NUMERIC('  || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
                WHEN 2 THEN 'DECIMAL'
              END
            WHEN 9 THEN 'QUAD'
            WHEN 10 THEN 'FLOAT'
            WHEN 12 THEN 'DATE'
            WHEN 13 THEN 'TIME'
            WHEN 14 THEN 'CHAR(' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ') '
            WHEN 16 THEN
              CASE F.RDB$FIELD_SUB_TYPE
                WHEN 0 THEN 'BIGINT'
                WHEN 1 THEN 'NUMERIC(' || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
                WHEN 2 THEN 'DECIMAL'
              END
            WHEN 27 THEN 'DOUBLE'
            WHEN 35 THEN 'TIMESTAMP'
            WHEN 37 THEN 'VARCHAR(' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ')'
            WHEN 40 THEN 'CSTRING' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ')'
            WHEN 45 THEN 'BLOB_ID'
            WHEN 261 THEN 'BLOB SUB_TYPE ' || F.RDB$FIELD_SUB_TYPE
            ELSE 'RDB$FIELD_TYPE: ' || F.RDB$FIELD_TYPE || '?'
        end),
    trim(coalesce(F.rdb$default_source, '')),
    coalesce(F.rdb$null_flag, 0),
    trim(coalesce(F.rdb$description, ''))
    FROM RDB$FIELDS F
    LEFT OUTER JOIN RDB$CHARACTER_SETS CH ON (CH.RDB$CHARACTER_SET_ID = F.RDB$CHARACTER_SET_ID)
    WHERE COALESCE(F.rdb$system_flag, 0) = 0 AND NOT (F.rdb$field_name STARTING WITH 'RDB$')
    order by 1";

const EXCEPTIONS_QUERY: &str = "
    select trim(ex.rdb$exception_name), ex.rdb$exception_number, trim(coalesce(ex.rdb$message, '')), trim(coalesce(ex.rdb$description, ''))
    from rdb$exceptions ex
    where rdb$system_flag = 0
    order by 1";

const SEQUENCES_QUERY: &str = "
    select trim(rdb$generator_name), trim(coalesce(rdb$description, ''))
    from rdb$generators
    where rdb$system_flag = 0
    order by 1";

const ROLES_QUERY: &str = "SELECT trim(rdb$role_name) FROM RDB$ROLES WHERE rdb$system_flag = 0 order by 1";

const PROCEDURES_QUERY: &str = "
    select trim(rdb$procedure_name), rdb$procedure_source
    from rdb$procedures order by 1";

const PROCEDURE_PARAMETERS_QUERY: &str = "
    SELECT
      TRIM(rdb$procedure_name),
      rdb$parameter_type,
      TRIM(RF.RDB$PARAMETER_NAME),
      TRIM(CASE WHEN not (rf.rdb$field_source starting with 'RDB$') THEN rf.rdb$field_source ELSE
       CASE F.RDB$FIELD_TYPE
        WHEN 7 THEN
          CASE F.RDB$FIELD_SUB_TYPE
            WHEN 0 THEN 'SMALLINT'
            WHEN 1 THEN 'NUMERIC(' || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
            WHEN 2 THEN 'DECIMAL'
          END
        WHEN 8 THEN
          CASE F.RDB$FIELD_SUB_TYPE
            WHEN 0 THEN 'INTEGER'
            WHEN 1 THEN 'NUMERIC('  || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
            WHEN 2 THEN 'DECIMAL'
          END
        WHEN 9 THEN 'QUAD'
        WHEN 10 THEN 'FLOAT'
        WHEN 12 THEN 'DATE'
        WHEN 13 THEN 'TIME'
        WHEN 14 THEN 'CHAR(' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ') '
        WHEN 16 THEN
          CASE F.RDB$FIELD_SUB_TYPE
            WHEN 0 THEN 'BIGINT'
            WHEN 1 THEN 'NUMERIC(' || F.RDB$FIELD_PRECISION || ', ' || (-F.RDB$FIELD_SCALE) || ')'
            WHEN 2 THEN 'DECIMAL'
          END
        WHEN 27 THEN 'DOUBLE'
        WHEN 35 THEN 'TIMESTAMP'
        WHEN 37 THEN 'VARCHAR(' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ')'
        WHEN 40 THEN 'CSTRING' || (TRUNC(F.RDB$FIELD_LENGTH / CH.RDB$BYTES_PER_CHARACTER)) || ')'
        WHEN 45 THEN 'BLOB_ID'
        WHEN 261 THEN 'BLOB SUB_TYPE ' || F.RDB$FIELD_SUB_TYPE
        ELSE 'RDB$FIELD_TYPE: ' || F.RDB$FIELD_TYPE || '?'
      END END),
      RF.RDB$PARAMETER_NUMBER
    FROM RDB$PROCEDURE_PARAMETERS RF
    JOIN RDB$FIELDS F ON (F.RDB$FIELD_NAME = RF.RDB$FIELD_SOURCE)
    LEFT OUTER JOIN RDB$CHARACTER_SETS CH ON (CH.RDB$CHARACTER_SET_ID = F.RDB$CHARACTER_SET_ID)
    LEFT OUTER JOIN RDB$COLLATIONS DCO ON ((DCO.RDB$COLLATION_ID = F.RDB$COLLATION_ID) AND (DCO.RDB$CHARACTER_SET_ID = F.RDB$CHARACTER_SET_ID))
    WHERE COALESCE(RF.RDB$SYSTEM_FLAG, 0) = 0
    ORDER BY RF.RDB$PARAMETER_NUMBER";

pub(crate) fn fetch_schema(conn: &mut SimpleConnection, project_name: &str) -> Result<Schema> {
    debug!(project = project_name, "fetching live schema from RDB$ system tables");
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
    for domain in fetch_domains(conn, project_name)? {
        schema.add(SchemaObject::Domain(domain));
    }
    for exception in fetch_exceptions(conn, project_name)? {
        schema.add(SchemaObject::Exception(exception));
    }
    for sequence in fetch_sequences(conn, project_name)? {
        schema.add(SchemaObject::Sequence(sequence));
    }
    for role in fetch_roles(conn, project_name)? {
        schema.add(SchemaObject::Role(role));
    }
    Ok(schema)
}

/// Strips a leading `DEFAULT` keyword from a raw `RDB$DEFAULT_SOURCE` value so
/// every default is stored as a bare expression; callers re-attach the
/// keyword when rendering, so it is never duplicated.
fn bare_default(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("DEFAULT ")
        .or_else(|| trimmed.strip_prefix("default "))
        .unwrap_or(trimmed)
        .to_string()
}

fn fetch_tables(conn: &mut SimpleConnection, project_name: &str) -> Result<BTreeMap<String, Table>> {
    let rows: Vec<(String,)> = run(conn, project_name, TABLES_QUERY)?;
    Ok(rows.into_iter().map(|(name,)| (name.clone(), Table::new(name))).collect())
}

#[allow(clippy::type_complexity)]
fn fetch_columns(conn: &mut SimpleConnection, project_name: &str) -> Result<BTreeMap<String, Vec<Column>>> {
    let rows: Vec<(String, String, String, String, String, i32, String, String, String, String, i32)> =
        run(conn, project_name, COLUMNS_QUERY)?;
    let mut by_table: BTreeMap<String, Vec<Column>> = BTreeMap::new();
    for (table_name, name, field_source, type_name, domain, not_null, charset, collate, default, comment, position) in rows {
        let mut column = Column::new(name, type_name, position.max(0) as u32)
            .not_null(not_null != 0)
            .with_comment(comment);
        column.charset = charset;
        column.collate = collate;
        if !default.is_empty() {
            column = column.with_default(bare_default(&default));
        }
        if !domain.is_empty() {
            column.extra.insert("domain".to_string(), domain);
        }
        column.extra.insert("field_source".to_string(), field_source);
        by_table.entry(table_name).or_default().push(column);
    }
    Ok(by_table)
}

#[allow(clippy::type_complexity)]
fn fetch_indexes(conn: &mut SimpleConnection, project_name: &str) -> Result<BTreeMap<String, Vec<IndexDef>>> {
    let rows: Vec<(
        String, String, String, String, String, i32, String, String, i32, i32, String, i32, i32, String, String, i32,
    )> = run(conn, project_name, INDEXES_QUERY)?;

    let mut indexes: BTreeMap<(String, String), IndexDef> = BTreeMap::new();
    for (
        table_name,
        index_name,
        source_table,
        source_field_name,
        constraint_type,
        computed,
        expression,
        comment,
        ascending,
        active,
        field_name,
        field_position,
        source_position,
        on_update,
        on_delete,
        unique_flag,
    ) in rows
    {
        let kind = match constraint_type.as_str() {
            "PRIMARY KEY" => IndexKind::PrimaryKey,
            "FOREIGN KEY" => IndexKind::ForeignKey,
            "UNIQUE" => IndexKind::Unique,
            _ => IndexKind::Index,
        };
        let key = (table_name.clone(), index_name.clone());
        let index = indexes.entry(key).or_insert_with(|| {
            let mut index = IndexDef::new(index_name.clone(), kind, table_name.clone());
            index.unique = unique_flag != 0;
            index.source_table = source_table.clone();
            index.on_update = on_update.clone();
            index.on_delete = on_delete.clone();
            index.ascending = ascending != 0;
            index.active = active != 0;
            index.computed = computed != 0;
            index.expression = expression.clone();
            index.comment = comment.clone();
            index
        });
        if !field_name.is_empty() {
            index.fields.push(IndexField {
                name: field_name,
                position: field_position.max(0) as u32,
            });
        }
        if kind == IndexKind::ForeignKey && !source_field_name.is_empty() {
            index.source_fields.push(IndexField {
                name: source_field_name,
                position: source_position.max(0) as u32,
            });
        }
    }

    let mut by_table: BTreeMap<String, Vec<IndexDef>> = BTreeMap::new();
    for ((table_name, _), index) in indexes {
        by_table.entry(table_name).or_default().push(index);
    }
    Ok(by_table)
}

fn fetch_triggers(conn: &mut SimpleConnection, project_name: &str) -> Result<BTreeMap<String, Vec<Trigger>>> {
    let rows: Vec<(String, String, i32, String, i32, String)> = run(conn, project_name, TRIGGERS_QUERY)?;
    let mut by_table: BTreeMap<String, Vec<Trigger>> = BTreeMap::new();
    for (table_name, name, active, type_name, position, source) in rows {
        let mut trigger = Trigger::new(name, table_name.clone(), type_name, source);
        trigger.active = Some(active != 0);
        trigger.position = Some(position);
        by_table.entry(table_name).or_default().push(trigger);
    }
    Ok(by_table)
}

fn fetch_views(conn: &mut SimpleConnection, project_name: &str) -> Result<Vec<View>> {
    let rows: Vec<(String, String)> = run(conn, project_name, VIEWS_QUERY)?;
    Ok(rows.into_iter().map(|(name, source)| View::new(name, source)).collect())
}

fn fetch_domains(conn: &mut SimpleConnection, project_name: &str) -> Result<Vec<Domain>> {
    let rows: Vec<(String, String, String, i32, String)> = run(conn, project_name, DOMAINS_QUERY)?;
    Ok(rows
        .into_iter()
        .map(|(name, type_name, default, null_flag, comment)| {
            let mut domain = Domain::new(name, type_name);
            domain.not_null = null_flag != 0;
            domain.comment = comment;
            if !default.is_empty() {
                domain.has_default = true;
                domain.default = bare_default(&default);
            }
            domain
        })
        .collect())
}

fn fetch_exceptions(conn: &mut SimpleConnection, project_name: &str) -> Result<Vec<Exception>> {
    let rows: Vec<(String, i32, String, String)> = run(conn, project_name, EXCEPTIONS_QUERY)?;
    Ok(rows
        .into_iter()
        .map(|(name, number, message, comment)| {
            let mut exception = Exception::new(name, number, message);
            exception.comment = comment;
            exception
        })
        .collect())
}

fn fetch_sequences(conn: &mut SimpleConnection, project_name: &str) -> Result<Vec<Sequence>> {
    let rows: Vec<(String, String)> = run(conn, project_name, SEQUENCES_QUERY)?;
    Ok(rows
        .into_iter()
        .map(|(name, comment)| {
            let mut sequence = Sequence::new(name);
            sequence.comment = comment;
            sequence
        })
        .collect())
}

fn fetch_roles(conn: &mut SimpleConnection, project_name: &str) -> Result<Vec<Role>> {
    let rows: Vec<(String,)> = run(conn, project_name, ROLES_QUERY)?;
    Ok(rows.into_iter().map(|(name,)| Role::new(name)).collect())
}

fn fetch_procedures(conn: &mut SimpleConnection, project_name: &str) -> Result<Vec<Routine>> {
    let param_rows: Vec<(String, i32, String, String, i32)> = run(conn, project_name, PROCEDURE_PARAMETERS_QUERY)?;
    let mut input_params: BTreeMap<String, Vec<Parameter>> = BTreeMap::new();
    let mut output_params: BTreeMap<String, Vec<Parameter>> = BTreeMap::new();
    for (procedure_name, param_type, name, type_name, position) in param_rows {
        let param = Parameter::new(name, type_name, position.max(0) as u32);
        if param_type == 0 {
            input_params.entry(procedure_name).or_default().push(param);
        } else {
            output_params.entry(procedure_name).or_default().push(param);
        }
    }

    let rows: Vec<(String, String)> = run(conn, project_name, PROCEDURES_QUERY)?;
    Ok(rows
        .into_iter()
        .map(|(name, source)| {
            let mut procedure = Routine::procedure(&name, source);
            procedure.input_parameters = input_params.remove(&name).unwrap_or_default();
            procedure.output_parameters = output_params.remove(&name).unwrap_or_default();
            procedure
        })
        .collect())
}

fn run<R>(conn: &mut SimpleConnection, project_name: &str, query: &str) -> Result<Vec<R>>
where
    R: rsfbclient::FromRow + 'static,
{
    conn.query(query, ()).map_err(|source| Error::FetchError {
        project: project_name.to_string(),
        message: format!("{query}: {source}"),
    })
}
