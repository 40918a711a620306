// export/exporter.rs
// Writes the replay script: header, per-table statements, footer.

use super::literal::format_delete;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SCRIPT_HEADER: &str = "PRAGMA foreign_keys=0;\nBEGIN;\n";
pub const SCRIPT_FOOTER: &str = "COMMIT;";

/// Owns the output file for one export run.
///
/// Creating a writer truncates the file and writes the header. Statements
/// are appended in call order. The footer is only written by `finish`, so
/// a writer dropped early leaves a script without `COMMIT;`.
pub struct ScriptWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl ScriptWriter {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = Self { path, out: BufWriter::new(file) };
        writer.write_header()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(&mut self) -> io::Result<()> {
        self.out.write_all(SCRIPT_HEADER.as_bytes())?;
        // header is on disk before any statement is attempted
        self.out.flush()
    }

    pub fn write_delete_for(&mut self, table: &str) -> io::Result<()> {
        self.write_line(&format_delete(table))
    }

    /// Appends pre-formatted statement text verbatim.
    pub fn write_line(&mut self, stmt: &str) -> io::Result<()> {
        self.out.write_all(stmt.as_bytes())
    }

    pub fn finish(mut self) -> io::Result<PathBuf> {
        self.out.write_all(SCRIPT_FOOTER.as_bytes())?;
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        Ok(self.path)
    }
}
