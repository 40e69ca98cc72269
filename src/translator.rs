use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::document::{Document, DocumentFormat, TextUnit};
use crate::error::{Error, Result};
use crate::paths;
use crate::providers::{TextTranslator, TranslationRequest};

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub target_language: String,
    pub source_language: String,
}

impl TranslateOptions {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
        }
    }

    pub fn with_source(mut self, source_language: impl Into<String>) -> Self {
        self.source_language = source_language.into();
        self
    }
}

/// Translates documents paragraph by paragraph through a [`TextTranslator`].
#[derive(Debug, Clone)]
pub struct DocumentTranslator<T: TextTranslator> {
    oracle: T,
    concurrency: usize,
}

impl<T: TextTranslator> DocumentTranslator<T> {
    pub fn new(oracle: T) -> Self {
        Self {
            oracle,
            concurrency: 1,
        }
    }

    /// Allows up to `limit` paragraph translations in flight. Output order
    /// and the abort-on-first-failure policy are unaffected.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn oracle(&self) -> &T {
        &self.oracle
    }

    /// Translates `path` and writes the result to `output_path`, or to
    /// `<stem>_<target>.<ext>` beside the input. Nothing is written unless
    /// every paragraph translated successfully.
    pub async fn translate_document(
        &self,
        path: &Path,
        options: &TranslateOptions,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        ensure_input_file(path)?;
        let original = Document::read(path)?;
        let output = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| paths::default_output_path(path, &options.target_language));
        let output_format = DocumentFormat::from_path(&output)?;

        let translated = self.translate_units(&original, options).await?;
        translated.write(&output, output_format)?;
        info!(
            "translated {} paragraphs ({} -> {}): {}",
            translated.len(),
            options.source_language,
            options.target_language,
            output.display()
        );
        Ok(output)
    }

    /// Builds the translated document in memory. Blank units come back empty
    /// without reaching the oracle.
    pub async fn translate_units(
        &self,
        document: &Document,
        options: &TranslateOptions,
    ) -> Result<Document> {
        let requests = document
            .units()
            .iter()
            .map(|unit| {
                (!unit.is_blank()).then(|| {
                    TranslationRequest::new(
                        unit.content(),
                        options.source_language.as_str(),
                        options.target_language.as_str(),
                    )
                })
            })
            .collect::<Vec<_>>();

        let units = stream::iter(requests.iter().enumerate())
            .map(|(index, request)| async move {
                match request {
                    Some(request) => self.translate_unit(index, request).await,
                    None => Ok(TextUnit::empty()),
                }
            })
            .buffered(self.concurrency)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(Document::new(units))
    }

    async fn translate_unit(&self, index: usize, request: &TranslationRequest) -> Result<TextUnit> {
        match self.oracle.translate(request).await {
            Ok(text) => {
                debug!("paragraph {}: translated {} chars", index, text.chars().count());
                Ok(TextUnit::new(text))
            }
            Err(err) => {
                error!("paragraph {}: translation failed: {}", index, err);
                Err(Error::Oracle(err))
            }
        }
    }
}

fn ensure_input_file(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => {
            error!("document is not a file: {}", path.display());
            Err(Error::NotFound(path.to_path_buf()))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            error!("document not found: {}", path.display());
            Err(Error::NotFound(path.to_path_buf()))
        }
        Err(err) => {
            error!("document unreadable: {}: {}", path.display(), err);
            Err(Error::document(path, err))
        }
    }
}
