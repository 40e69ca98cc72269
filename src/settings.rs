use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::error;

use crate::error::{Error, Result};
use crate::paths;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub region: String,
    pub api_version: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub source_language: String,
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cognitive.microsofttranslator.com".to_string(),
            region: "eastus2".to_string(),
            api_version: "3.0".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            source_language: "en".to_string(),
            concurrency: 1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    translator: Option<TranslatorSettings>,
    document: Option<DocumentSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslatorSettings {
    endpoint: Option<String>,
    region: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentSettings {
    source_language: Option<String>,
    concurrency: Option<usize>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    load_layers(extra_path).inspect_err(|err| error!("settings: {}", err))
}

fn load_layers(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];

    if let Some(home) = paths::settings_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(Error::Configuration(format!(
                "settings file not found: {}",
                extra.display()
            )));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|err| {
                Error::Configuration(format!(
                    "failed to read settings {}: {}",
                    path.display(),
                    err
                ))
            })?;
            settings.merge(parse_settings(&content, &path)?);
        }
    }

    Ok(settings)
}

fn parse_settings(content: &str, path: &Path) -> Result<SettingsFile> {
    toml::from_str(content).map_err(|err| {
        Error::Configuration(format!(
            "failed to parse settings {}: {}",
            path.display(),
            err
        ))
    })
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(translator) = incoming.translator {
            if let Some(endpoint) = non_blank(translator.endpoint) {
                self.endpoint = endpoint;
            }
            if let Some(region) = non_blank(translator.region) {
                self.region = region;
            }
            if let Some(version) = non_blank(translator.api_version) {
                self.api_version = version;
            }
            if let Some(secs) = translator.timeout_secs
                && secs > 0
            {
                self.timeout = Duration::from_secs(secs);
            }
            if let Some(retries) = translator.max_retries {
                self.max_retries = retries;
            }
        }
        if let Some(document) = incoming.document {
            if let Some(lang) = non_blank(document.source_language) {
                self.source_language = lang;
            }
            if let Some(limit) = document.concurrency
                && limit > 0
            {
                self.concurrency = limit;
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = paths::settings_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home).map_err(|err| {
        Error::Configuration(format!(
            "failed to create settings directory {}: {}",
            home.display(),
            err
        ))
    })?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML).map_err(|err| {
            Error::Configuration(format!(
                "failed to write settings {}: {}",
                path.display(),
                err
            ))
        })?;
    }
    Ok(())
}
