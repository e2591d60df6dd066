//! Connection handling: opens a pooled connection from a `ProjectConfig`'s
//! params and wraps `mysql` crate errors into `ddlsync_core::Error`.

use mysql::prelude::Queryable;
use mysql::{OptsBuilder, Pool, PooledConn};
use tracing::debug;

use ddlsync_core::{Error, ProjectConfig, Result};

pub(crate) fn connect(config: &ProjectConfig) -> Result<PooledConn> {
    debug!(project = %config.project_name, "opening mysql connection");
    let host = param(config, "host")?;
    let port: u16 = param(config, "port")?.parse().map_err(|_| Error::FetchError {
        project: config.project_name.clone(),
        message: format!("`port` is not a valid number: {}", config.params["port"]),
    })?;
    let database = param(config, "database")?;
    let user = param(config, "user")?;
    let password = param(config, "password")?;

    let opts = OptsBuilder::new()
        .ip_or_hostname(Some(host))
        .tcp_port(port)
        .db_name(Some(database))
        .user(Some(user))
        .pass(Some(password));

    let pool = Pool::new(opts).map_err(|source| connect_error(config, source))?;
    pool.get_conn().map_err(|source| connect_error(config, source))
}

pub(crate) fn execute(conn: &mut PooledConn, project_name: &str, sql: &str) -> Result<()> {
    debug!(project = project_name, %sql, "executing statement");
    conn.query_drop(sql).map_err(|source| Error::ExecError {
        project: project_name.to_string(),
        message: format!("{sql}: {source}"),
    })
}

fn param(config: &ProjectConfig, key: &str) -> Result<String> {
    config
        .params
        .get(key)
        .cloned()
        .ok_or_else(|| Error::MissingParam { name: key.to_string() })
}

fn connect_error(config: &ProjectConfig, source: mysql::Error) -> Error {
    Error::FetchError {
        project: config.project_name.clone(),
        message: source.to_string(),
    }
}

/// Backtick-quotes a MySQL identifier, doubling any embedded backtick.
pub(crate) fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
