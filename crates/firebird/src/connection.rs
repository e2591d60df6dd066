//! Connection handling: opens an `rsfbclient` connection from a
//! `ProjectConfig`'s params and wraps its errors into `ddlsync_core::Error`.

use rsfbclient::{Execute, FbError, SimpleConnection};
use tracing::debug;

use ddlsync_core::{Error, ProjectConfig, Result};

pub(crate) fn connect(config: &ProjectConfig) -> Result<SimpleConnection> {
    debug!(project = %config.project_name, "opening firebird connection");
    let host = param(config, "host")?;
    let port: u16 = param(config, "port")?.parse().map_err(|_| Error::FetchError {
        project: config.project_name.clone(),
        message: format!("`port` is not a valid number: {}", config.params["port"]),
    })?;
    let database = param(config, "database")?;
    let user = param(config, "user")?;
    let password = param(config, "password")?;

    rsfbclient::builder_pure_rust()
        .host(host)
        .port(port)
        .db_name(database)
        .user(user)
        .pass(password)
        .connect()
        .map(Into::into)
        .map_err(|source| connect_error(config, source))
}

pub(crate) fn execute(conn: &mut SimpleConnection, project_name: &str, sql: &str) -> Result<()> {
    debug!(project = project_name, %sql, "executing statement");
    conn.execute(sql, ())
        .map_err(|source| Error::ExecError {
            project: project_name.to_string(),
            message: format!("{sql}: {source}"),
        })
        .map(|_| ())
}

fn param(config: &ProjectConfig, key: &str) -> Result<String> {
    config
        .params
        .get(key)
        .cloned()
        .ok_or_else(|| Error::MissingParam { name: key.to_string() })
}

fn connect_error(config: &ProjectConfig, source: FbError) -> Error {
    Error::FetchError {
        project: config.project_name.clone(),
        message: source.to_string(),
    }
}
