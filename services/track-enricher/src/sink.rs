use std::{fs, io::Write, path::{Path, PathBuf}};

use crate::errors::EnricherError;
use crate::types::Track;

/// Writes the finished catalog as one pretty printed json array
pub struct CatalogWriter {
    path: PathBuf
}

impl CatalogWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(tracks: &[Track]) -> Result<String, EnricherError> {
        let mut out = serde_json::to_string_pretty(tracks)
            .map_err(|e| EnricherError::Write(format!("serialize catalog: {e}")))?;
        out.push('\n');
        Ok(out)
    }

    /// Replaces whatever is at `path`. The file is staged next to the
    /// target so the site build never sees a half written catalog
    pub fn write(&self, tracks: &[Track]) -> Result<PathBuf, EnricherError> {
        let body = Self::render(tracks)?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from(".")
        };

        fs::create_dir_all(&parent).map_err(|e|
            EnricherError::Write(
                format!("create dir {}: {e}", parent.display())
        ))?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| EnricherError::Write(
                format!("tempfile in {}: {e}", parent.display())
            ))?;

        temp.write_all(body.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| EnricherError::Write(
                format!("write {}: {e}", temp.path().display())
            ))?;

        temp.persist(&self.path).map_err(|e|
            EnricherError::Write(format!("persist {}: {e}", self.path.display())))?;

        Ok(self.path.clone())
    }
}
