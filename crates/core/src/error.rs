use thiserror::Error;

/// The ten named error kinds the core can surface. The CLI prints `Display`
/// and exits non-zero; nothing downstream recovers from any of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("config file `{path}` could not be parsed: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown engine `{alias}`")]
    UnknownEngine { alias: String },

    #[error("required parameter `{name}` is missing")]
    MissingParam { name: String },

    #[error("project `{name}` already exists")]
    ProjectExists { name: String },

    #[error("project `{name}` is not found")]
    ProjectMissing { name: String },

    #[error("source and target engines are not compatible: `{source_engine}` vs `{target_engine}`")]
    EngineMismatch {
        source_engine: String,
        target_engine: String,
    },

    #[error("project folder `{path}` does not exist")]
    ProjectFolderMissing { path: String },

    #[error("fetching schema from `{project}` failed: {message}")]
    FetchError { project: String, message: String },

    #[error("executing statement against `{project}` failed: {message}")]
    ExecError { project: String, message: String },

    #[error("I/O error on `{path}`: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not (de)serialize `{path}`: {source}")]
    SerializationError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
