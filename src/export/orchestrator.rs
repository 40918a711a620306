// export/orchestrator.rs
// Drives one export run from table discovery to the closing COMMIT.

use super::exporter::ScriptWriter;
use super::literal::format_insert;
use crate::db::accessors::{DataSource, PostgresSource};
use crate::db::models::ConnectionParams;
use crate::error::ExportResult;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const DEFAULT_OUTPUT_FILE: &str = "pgdb_export.sql";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub tables: usize,
    pub rows: u64,
}

/// `pgdb_export.sql` in the current working directory.
pub fn default_output_path() -> io::Result<PathBuf> {
    Ok(std::env::current_dir()?.join(DEFAULT_OUTPUT_FILE))
}

/// Connects, then truncates `output`, then exports every public base table.
///
/// Nothing is written if the connection cannot be opened.
pub async fn export(params: &ConnectionParams, output: &Path) -> ExportResult<ExportSummary> {
    info!(source = %params, output = %output.display(), "Starting export");
    let mut source = PostgresSource::connect(params).await?;
    let writer = match ScriptWriter::create(output) {
        Ok(writer) => writer,
        Err(err) => {
            if let Err(close_err) = source.close().await {
                warn!(error = %close_err, "Failed to close connection after output error");
            }
            return Err(err.into());
        }
    };
    run_export(&mut source, writer).await
}

/// Writes every table of `source` through `writer`.
///
/// The source is closed on every path. The footer is only written when all
/// tables were exported; a failed run leaves the partial script on disk.
pub async fn run_export<S>(source: &mut S, mut writer: ScriptWriter) -> ExportResult<ExportSummary>
where
    S: DataSource + ?Sized,
{
    let body = write_tables(source, &mut writer).await;
    let closed = source.close().await;

    let summary = match body {
        Ok(summary) => summary,
        Err(err) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "Failed to close connection after export error");
            }
            error!(error = %err, output = %writer.path().display(), "Export aborted, script left without COMMIT");
            return Err(err);
        }
    };
    closed?;

    let path = writer.finish()?;
    info!(tables = summary.tables, rows = summary.rows, output = %path.display(), "Export complete");
    Ok(summary)
}

async fn write_tables<S>(source: &mut S, writer: &mut ScriptWriter) -> ExportResult<ExportSummary>
where
    S: DataSource + ?Sized,
{
    let tables = source.list_tables().await?;
    info!(count = tables.len(), "Found base tables");

    let mut summary = ExportSummary::default();
    for table in &tables {
        debug!(table = %table, "Writing delete statement");
        writer.write_delete_for(table)?;

        let rows = source.fetch_rows(table).await?;
        for row in &rows {
            writer.write_line(&format_insert(table, row))?;
        }
        info!(table = %table, rows = rows.len(), "Exported table");

        summary.tables += 1;
        summary.rows += rows.len() as u64;
    }
    Ok(summary)
}
