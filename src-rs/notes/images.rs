use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::utils::string_util::strip_data_uri_prefix;
use crate::notes::store::validate_note_id;

pub const COVER_FILE_NAME: &str = "cover.png";

/// Per-note image directories under a single root:
/// `<root>/<note_id>/<filename>`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn note_dir(&self, note_id: &str) -> Result<PathBuf> {
        validate_note_id(note_id)?;
        Ok(self.root.join(note_id))
    }

    pub fn cover_path(&self, note_id: &str) -> Result<PathBuf> {
        Ok(self.note_dir(note_id)?.join(COVER_FILE_NAME))
    }

    /// Decodes plain base64 or a data URI and writes it under the note's
    /// directory. Returns a `file:///` URL for the written file.
    pub fn save_base64(&self, note_id: &str, data: &str, filename: &str) -> Result<String> {
        validate_filename(filename)?;
        let dir = self.note_dir(note_id)?;

        let payload = strip_data_uri_prefix(data.trim());
        let bytes = STANDARD
            .decode(payload.trim())
            .context("invalid base64 image data")?;

        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(filename);
        fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Saved image {} ({} bytes)", path.display(), bytes.len());
        Ok(file_url(&path))
    }
}

pub fn file_url(path: &Path) -> String {
    let slashed = path.to_string_lossy().replace('\\', "/");
    format!("file:///{}", slashed.trim_start_matches('/'))
}

fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        anyhow::bail!("filename is empty");
    }
    if filename.len() > 255 {
        anyhow::bail!("filename too long");
    }
    if filename == "." || filename == ".." || filename.contains(['/', '\\', '\0']) {
        anyhow::bail!("invalid filename");
    }
    Ok(())
}
