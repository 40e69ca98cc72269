use reqwest::Url;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use super::retry::{RATE_LIMIT_BASE_DELAY, is_rate_limited, retry_after, wait_with_backoff};
use super::{OracleFuture, TextTranslator, TranslationRequest};
use crate::error::{Error, OracleError, Result};
use crate::settings::Settings;

const KEY_ENV: &str = "AZURE_TRANSLATOR_KEY";
const REGION_ENV: &str = "AZURE_TRANSLATOR_REGION";
const ENDPOINT_ENV: &str = "AZURE_TRANSLATOR_ENDPOINT";
const PLACEHOLDER_KEY: &str = "YOUR_AZURE_SUBSCRIPTION_KEY";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const SUBSCRIPTION_REGION_HEADER: &str = "Ocp-Apim-Subscription-Region";
const TRACE_ID_HEADER: &str = "X-ClientTraceId";

#[derive(Clone)]
pub struct AzureConfig {
    pub subscription_key: String,
    pub endpoint: String,
    pub region: String,
    pub api_version: String,
    pub timeout: Duration,
    pub max_retries: usize,
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("subscription_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl AzureConfig {
    /// Resolves credentials from `key_override` or the environment and
    /// validates the result.
    pub fn from_settings(settings: &Settings, key_override: Option<&str>) -> Result<Self> {
        Self::resolve(settings, key_override)
            .inspect_err(|err| error!("translator configuration rejected: {}", err))
    }

    fn resolve(settings: &Settings, key_override: Option<&str>) -> Result<Self> {
        let subscription_key = key_override
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| get_env(KEY_ENV))
            .ok_or_else(|| {
                Error::Configuration(format!("set the {} environment variable", KEY_ENV))
            })?;
        let config = Self {
            subscription_key,
            endpoint: get_env(ENDPOINT_ENV).unwrap_or_else(|| settings.endpoint.clone()),
            region: get_env(REGION_ENV).unwrap_or_else(|| settings.region.clone()),
            api_version: settings.api_version.clone(),
            timeout: settings.timeout,
            max_retries: settings.max_retries,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let key = self.subscription_key.trim();
        if key.is_empty() || key == PLACEHOLDER_KEY {
            return Err(Error::Configuration(format!(
                "set the {} environment variable",
                KEY_ENV
            )));
        }
        if HeaderValue::from_str(key).is_err() {
            return Err(Error::Configuration(
                "subscription key contains invalid characters".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(Error::Configuration("translator region is empty".to_string()));
        }
        if HeaderValue::from_str(self.region.trim()).is_err() {
            return Err(Error::Configuration(format!(
                "translator region '{}' is invalid",
                self.region
            )));
        }
        if self.api_version.trim().is_empty() {
            return Err(Error::Configuration(
                "translator api_version is empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration(
                "translator timeout must be positive".to_string(),
            ));
        }
        self.translate_url()?;
        Ok(())
    }

    fn translate_url(&self) -> Result<Url> {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(Error::Configuration("translator endpoint is empty".to_string()));
        }
        Url::parse(&format!("{}/translate", endpoint)).map_err(|err| {
            Error::Configuration(format!(
                "invalid translator endpoint '{}': {}",
                self.endpoint, err
            ))
        })
    }
}

/// Client for the Azure Translator text API (v3).
#[derive(Debug, Clone)]
pub struct AzureTranslator {
    client: reqwest::Client,
    config: AzureConfig,
    translate_url: Url,
}

impl AzureTranslator {
    pub fn new(config: AzureConfig) -> Result<Self> {
        Self::build(config).inspect_err(|err| error!("translator setup failed: {}", err))
    }

    fn build(config: AzureConfig) -> Result<Self> {
        config.validate()?;
        let translate_url = config.translate_url()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Configuration(format!("failed to build HTTP client: {}", err)))?;
        Ok(Self {
            client,
            config,
            translate_url,
        })
    }

    pub fn config(&self) -> &AzureConfig {
        &self.config
    }

    /// Whitespace-only input is returned as is without calling the service.
    pub async fn translate_text(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let request = TranslationRequest::new(text, source_language, target_language);
        self.send(&request).await.map_err(|err| {
            error!("translation failed: {}", err);
            Error::Oracle(err)
        })
    }

    fn request_url(&self, request: &TranslationRequest) -> Url {
        let mut url = self.translate_url.clone();
        url.query_pairs_mut()
            .append_pair("api-version", self.config.api_version.trim())
            .append_pair("from", &request.source_language)
            .append_pair("to", &request.target_language);
        url
    }

    async fn send(&self, request: &TranslationRequest) -> std::result::Result<String, OracleError> {
        let url = self.request_url(request);
        let body = json!([{ "text": request.text }]);

        let mut attempt = 0usize;
        let mut delay = RATE_LIMIT_BASE_DELAY;
        loop {
            attempt += 1;
            let trace_id = Uuid::new_v4().to_string();
            debug!(
                "translator request {} ({} -> {}, {} chars)",
                trace_id,
                request.source_language,
                request.target_language,
                request.text.chars().count()
            );
            let response = self
                .client
                .post(url.clone())
                .header(SUBSCRIPTION_KEY_HEADER, self.config.subscription_key.trim())
                .header(SUBSCRIPTION_REGION_HEADER, self.config.region.trim())
                .header(TRACE_ID_HEADER, trace_id.as_str())
                .json(&body)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            let retry_after = retry_after(response.headers());
            let text = response.text().await.map_err(transport_error)?;
            if status.is_success() {
                return extract_translation(&text);
            }
            if is_rate_limited(status, &text) && attempt <= self.config.max_retries {
                delay = wait_with_backoff(attempt, self.config.max_retries, delay, retry_after)
                    .await;
                continue;
            }
            return Err(OracleError::Api {
                status: status.as_u16(),
                message: extract_azure_error(&text).unwrap_or(text),
            });
        }
    }
}

impl TextTranslator for AzureTranslator {
    fn translate<'a>(&'a self, request: &'a TranslationRequest) -> OracleFuture<'a> {
        Box::pin(self.send(request))
    }
}

fn transport_error(err: reqwest::Error) -> OracleError {
    if err.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Request(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TranslateItem {
    #[serde(default)]
    translations: Vec<TranslationEntry>,
}

#[derive(Debug, Deserialize)]
struct TranslationEntry {
    text: String,
}

fn extract_translation(body: &str) -> std::result::Result<String, OracleError> {
    let items: Vec<TranslateItem> = serde_json::from_str(body).map_err(|err| {
        OracleError::Malformed(format!("failed to parse translator response JSON: {}", err))
    })?;
    items
        .into_iter()
        .next()
        .and_then(|item| item.translations.into_iter().next())
        .map(|entry| entry.text)
        .ok_or_else(|| OracleError::Malformed("no translation returned".to_string()))
}

fn extract_azure_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<AzureError>,
    }

    #[derive(Deserialize)]
    struct AzureError {
        code: Option<serde_json::Value>,
        message: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let mut parts = Vec::new();
    if let Some(message) = error.message
        && !message.trim().is_empty()
    {
        parts.push(message);
    }
    match error.code {
        Some(serde_json::Value::Number(code)) => parts.push(format!("code: {}", code)),
        Some(serde_json::Value::String(code)) if !code.trim().is_empty() => {
            parts.push(format!("code: {}", code))
        }
        _ => {}
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
