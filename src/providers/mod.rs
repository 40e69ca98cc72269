use std::future::Future;
use std::pin::Pin;

use crate::error::OracleError;

mod azure;
mod retry;

pub use azure::{AzureConfig, AzureTranslator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

pub type OracleFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<String, OracleError>> + Send + 'a>>;

/// A remote text translation service.
///
/// Implementations translate `request.text` verbatim and must not trim or
/// skip input; callers decide which texts are worth sending.
pub trait TextTranslator: Send + Sync {
    fn translate<'a>(&'a self, request: &'a TranslationRequest) -> OracleFuture<'a>;
}

impl<T: TextTranslator + ?Sized> TextTranslator for &T {
    fn translate<'a>(&'a self, request: &'a TranslationRequest) -> OracleFuture<'a> {
        (**self).translate(request)
    }
}

impl<T: TextTranslator + ?Sized> TextTranslator for std::sync::Arc<T> {
    fn translate<'a>(&'a self, request: &'a TranslationRequest) -> OracleFuture<'a> {
        (**self).translate(request)
    }
}
