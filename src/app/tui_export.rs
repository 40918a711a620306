use crate::export::orchestrator::{default_output_path, export};
use anyhow::{Context, Result};

/// Runs the export for the connection details collected by the TUI.
/// Returns Ok(msg) on success, or Err(error) with context on failure.
pub async fn tui_export_flow(state: &super::tui::TuiState) -> Result<String> {
    let params = state.connection_config()?.resolve()?;
    let output_file = default_output_path().context("Failed to resolve working directory")?;

    let summary = export(&params, &output_file)
        .await
        .with_context(|| format!("Export from {} failed", params))?;

    Ok(format!(
        "Export completed! {} tables, {} rows written to {}",
        summary.tables,
        summary.rows,
        output_file.display()
    ))
}
