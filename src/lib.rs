use anyhow::{Result, anyhow};
use std::path::Path;

pub mod document;
mod error;
pub mod logging;
mod paths;
pub mod providers;
pub mod settings;
mod test_util;
mod translator;

pub use error::{Error, OracleError};
pub use paths::default_output_path;
pub use providers::{AzureConfig, AzureTranslator, TextTranslator, TranslationRequest};
pub use translator::{DEFAULT_SOURCE_LANGUAGE, DocumentTranslator, TranslateOptions};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub lang: String,
    pub source_lang: Option<String>,
    pub key: Option<String>,
    pub data: Option<String>,
    pub output: Option<String>,
    pub settings_path: Option<String>,
}

/// Translates the document named by `config.data`, or `input` as plain text
/// when no document is given. Returns the output path or the translation.
pub async fn run(config: Config, input: Option<String>) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    let lang = config.lang.trim();
    if lang.is_empty() {
        return Err(anyhow!("target language is empty"));
    }
    let source = config
        .source_lang
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(settings.source_language.as_str());
    let options = TranslateOptions::new(lang).with_source(source);

    if config.data.is_none() && config.output.is_some() {
        return Err(anyhow!("--output requires --data"));
    }
    if config.data.is_none() && input.as_deref().is_none_or(|text| text.trim().is_empty()) {
        return Err(anyhow!("stdin is empty"));
    }

    let azure = AzureConfig::from_settings(&settings, config.key.as_deref())?;
    let oracle = AzureTranslator::new(azure)?;

    if let Some(data) = config.data.as_deref() {
        let translator = DocumentTranslator::new(oracle).with_concurrency(settings.concurrency);
        let output = translator
            .translate_document(
                Path::new(data),
                &options,
                config.output.as_deref().map(Path::new),
            )
            .await?;
        return Ok(output.display().to_string());
    }

    let input = input.unwrap_or_default();
    let translated = oracle
        .translate_text(
            input.trim(),
            &options.target_language,
            &options.source_language,
        )
        .await?;
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime")
            .block_on(future)
    }

    fn config(home: &Path) -> Config {
        Config {
            lang: "pt-br".to_string(),
            key: Some("test-key".to_string()),
            settings_path: None,
            data: Some(home.join("missing.docx").display().to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn missing_document_is_reported_as_not_found() {
        with_temp_home(|home| {
            let err = block_on(run(config(home), None)).unwrap_err();
            assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
        });
    }

    #[test]
    fn empty_stdin_is_rejected() {
        with_temp_home(|home| {
            let mut config = config(home);
            config.data = None;
            let err = block_on(run(config, Some("  \n".to_string()))).unwrap_err();
            assert_eq!(err.to_string(), "stdin is empty");
        });
    }

    #[test]
    fn output_without_document_is_rejected() {
        with_temp_home(|home| {
            let mut config = config(home);
            config.data = None;
            config.output = Some("out.docx".to_string());
            let err = block_on(run(config, Some("Hello".to_string()))).unwrap_err();
            assert_eq!(err.to_string(), "--output requires --data");
        });
    }

    #[test]
    fn blank_target_language_is_rejected() {
        with_temp_home(|home| {
            let mut config = config(home);
            config.lang = " ".to_string();
            assert!(block_on(run(config, None)).is_err());
        });
    }
}
