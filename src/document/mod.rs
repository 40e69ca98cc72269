use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{error, info};

use crate::error::{Error, Result};

mod docx;
mod text;

/// One paragraph of plain text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextUnit {
    content: String,
}

impl TextUnit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    units: Vec<TextUnit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default();
        let reason = match ext.as_str() {
            "docx" => return Ok(DocumentFormat::Docx),
            "txt" | "text" | "md" => return Ok(DocumentFormat::PlainText),
            "" => "file has no extension".to_string(),
            other => format!("unsupported document type '.{}'", other),
        };
        error!("document: {}: {}", path.display(), reason);
        Err(Error::document(path, reason))
    }
}

impl Document {
    pub fn new(units: Vec<TextUnit>) -> Self {
        Self { units }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(TextUnit::new).collect())
    }

    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    pub fn texts(&self) -> Vec<&str> {
        self.units.iter().map(TextUnit::content).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Reads the document at `path`, picking the codec from its extension.
    pub fn read(path: &Path) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;
        let bytes = fs::read(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                Error::NotFound(path.to_path_buf())
            } else {
                Error::document(path, err)
            }
        })?;
        let document = match format {
            DocumentFormat::Docx => docx::parse(&bytes),
            DocumentFormat::PlainText => text::parse(&bytes),
        }
        .map_err(|err| {
            error!("document: failed to parse {}: {:#}", path.display(), err);
            Error::document(path, format!("{:#}", err))
        })?;
        info!(
            "document: loaded {} ({} paragraphs)",
            path.display(),
            document.len()
        );
        Ok(document)
    }

    /// Serializes the whole document in memory, then replaces `path` in one
    /// rename so readers never see a partially written file.
    pub fn write(&self, path: &Path, format: DocumentFormat) -> Result<()> {
        let bytes = match format {
            DocumentFormat::Docx => docx::render(self),
            DocumentFormat::PlainText => Ok(text::render(self)),
        }
        .map_err(|err| {
            error!("document: failed to render {}: {:#}", path.display(), err);
            Error::serialization(path, format!("{:#}", err))
        })?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let persist = || -> io::Result<()> {
            let mut file = staging_file(dir, path)?;
            file.write_all(&bytes)?;
            file.as_file().sync_all()?;
            file.persist(path).map_err(|err| err.error)?;
            Ok(())
        };
        persist().map_err(|err| {
            error!("document: failed to write {}: {}", path.display(), err);
            Error::serialization(path, err)
        })?;
        info!("document: saved {}", path.display());
        Ok(())
    }
}

/// Creates the temp file that will replace `path`. An existing destination
/// keeps its permissions; a new one gets the usual umask-filtered mode.
fn staging_file(dir: &Path, path: &Path) -> io::Result<NamedTempFile> {
    let existing = fs::metadata(path).ok().map(|metadata| metadata.permissions());
    let mut builder = tempfile::Builder::new();
    builder.prefix(".doc-translator-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let file = builder.tempfile_in(dir)?;
    if let Some(permissions) = existing {
        file.as_file().set_permissions(permissions)?;
    }
    Ok(file)
}
