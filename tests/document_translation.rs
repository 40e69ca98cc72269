use doc_translator_rust::document::{Document, DocumentFormat};
use doc_translator_rust::providers::OracleFuture;
use doc_translator_rust::{
    DocumentTranslator, Error, OracleError, TextTranslator, TranslateOptions, TranslationRequest,
    default_output_path,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Default)]
struct Glossary {
    entries: HashMap<&'static str, &'static str>,
    calls: Arc<AtomicUsize>,
}

impl Glossary {
    fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
            calls: Arc::default(),
        }
    }
}

impl TextTranslator for Glossary {
    fn translate<'a>(&'a self, request: &'a TranslationRequest) -> OracleFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .entries
            .get(request.text.as_str())
            .map(|text| text.to_string())
            .ok_or_else(|| OracleError::Malformed(format!("no entry for '{}'", request.text)));
        Box::pin(async move { result })
    }
}

#[tokio::test]
async fn docx_paragraphs_are_translated_in_place() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("report.docx");
    Document::from_texts(["Hello", "", "World"])
        .write(&input, DocumentFormat::Docx)
        .expect("write input");

    let oracle = Glossary::new(&[("Hello", "Olá"), ("World", "Mundo")]);
    let calls = oracle.calls.clone();
    let translator = DocumentTranslator::new(oracle);

    let output = translator
        .translate_document(&input, &TranslateOptions::new("pt-br"), None)
        .await
        .expect("translate");

    assert_eq!(output, default_output_path(&input, "pt-br"));
    assert_eq!(output.file_name().unwrap(), "report_pt-br.docx");
    let translated = Document::read(&output).expect("read output");
    assert_eq!(translated.texts(), vec!["Olá", "", "Mundo"]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failing_paragraph_leaves_no_output_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("letter.txt");
    std::fs::write(&input, "Hello\nUnknown\nWorld\n").expect("write input");

    let oracle = Glossary::new(&[("Hello", "Hallo"), ("World", "Welt")]);
    let calls = oracle.calls.clone();
    let translator = DocumentTranslator::new(Arc::new(oracle));

    let err = translator
        .translate_document(&input, &TranslateOptions::new("de"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Oracle(OracleError::Malformed(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!default_output_path(&input, "de").exists());
}

#[tokio::test]
async fn unsupported_input_is_rejected_before_translation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("slides.pptx");
    std::fs::write(&input, b"PK").expect("write input");

    let oracle = Glossary::default();
    let calls = oracle.calls.clone();
    let err = DocumentTranslator::new(oracle)
        .translate_document(&input, &TranslateOptions::new("fr"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Document { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
