use crate::{FileExporter, PersistenceError, PersistenceResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes exported files into a directory (the terminal host's "download").
#[derive(Debug, Clone)]
pub struct DirectoryExporter {
    dir: PathBuf,
}

impl DirectoryExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileExporter for DirectoryExporter {
    fn export_text(&mut self, filename: &str, content: &str) -> PersistenceResult<()> {
        // A bare file name only; anything that would escape `dir` is refused.
        let name = Path::new(filename);
        if name.file_name().map(|n| n == name.as_os_str()) != Some(true) {
            return Err(PersistenceError::Unavailable(format!(
                "invalid export file name {filename:?}"
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, content.as_bytes())?;
        info!(target: "storage.export", path = %path.display(), size_bytes = content.len(), "export_written");
        Ok(())
    }
}

/// Records exports in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryExporter {
    exports: Vec<(String, String)>,
}

impl MemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(filename, content)` pairs in export order.
    pub fn exports(&self) -> &[(String, String)] {
        &self.exports
    }

    pub fn last(&self) -> Option<&(String, String)> {
        self.exports.last()
    }
}

impl FileExporter for MemoryExporter {
    fn export_text(&mut self, filename: &str, content: &str) -> PersistenceResult<()> {
        self.exports.push((filename.to_string(), content.to_string()));
        Ok(())
    }
}
