// error.rs
// Failure taxonomy for an export run. Every variant is fatal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to list tables: {0}")]
    Metadata(#[source] sqlx::Error),

    #[error("Failed to read rows from table {table}: {source}")]
    Read {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Unsupported column type {type_name} for {table}.{column}")]
    UnsupportedType {
        table: String,
        column: String,
        type_name: String,
    },

    #[error("Failed to write export script: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to close database connection: {0}")]
    Close(#[source] sqlx::Error),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
