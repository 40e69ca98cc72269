use anyhow::{Context, Result, bail};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{Document, TextUnit};

const DOCUMENT_PART: &str = "word/document.xml";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const RELATIONSHIPS_PART: &str = "_rels/.rels";

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const RELATIONSHIPS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

pub(super) fn parse(bytes: &[u8]) -> Result<Document> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).with_context(|| "failed to read zip archive")?;
    let mut xml = Vec::new();
    archive
        .by_name(DOCUMENT_PART)
        .with_context(|| format!("missing {}", DOCUMENT_PART))?
        .read_to_end(&mut xml)
        .with_context(|| format!("failed to read {}", DOCUMENT_PART))?;
    parse_document_xml(&xml)
}

/// Collects the body-level paragraphs. Paragraphs inside tables, text boxes
/// and content controls are not units of their own.
fn parse_document_xml(xml: &[u8]) -> Result<Document> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut units = Vec::new();
    let mut current: Option<String> = None;
    let mut paragraph_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if name == b"w:p" {
                    if paragraph_depth == 0 && is_body_level(&stack) {
                        current = Some(String::new());
                    }
                    paragraph_depth += 1;
                } else if name == b"w:t" && paragraph_depth == 1 && current.is_some() {
                    in_text = true;
                }
                stack.push(name);
            }
            Ok(Event::End(e)) => {
                stack.pop();
                match e.name().as_ref() {
                    b"w:p" => {
                        paragraph_depth = paragraph_depth.saturating_sub(1);
                        if paragraph_depth == 0
                            && is_body_level(&stack)
                            && let Some(text) = current.take()
                        {
                            units.push(TextUnit::new(text));
                        }
                    }
                    b"w:t" => in_text = false,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let in_run = stack.last().map(|name| name.as_slice()) == Some(b"w:r".as_slice());
                match e.name().as_ref() {
                    b"w:p" if paragraph_depth == 0 && is_body_level(&stack) => {
                        units.push(TextUnit::empty());
                    }
                    b"w:tab" if in_run && paragraph_depth == 1 => {
                        if let Some(text) = current.as_mut() {
                            text.push('\t');
                        }
                    }
                    b"w:br" | b"w:cr" if in_run && paragraph_depth == 1 => {
                        if let Some(text) = current.as_mut() {
                            text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) if in_text => {
                let value = e.unescape()?;
                if let Some(text) = current.as_mut() {
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(e)) if in_text => {
                let raw = e.into_inner();
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(raw.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => bail!("failed to parse document xml: {}", err),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        bail!("document xml ended unexpectedly");
    }
    Ok(Document::new(units))
}

fn is_body_level(stack: &[Vec<u8>]) -> bool {
    stack.last().map(|name| name.as_slice()) == Some(b"w:body".as_slice())
}

/// Builds a minimal package holding plain paragraphs only.
pub(super) fn render(document: &Document) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let document_xml = render_document_xml(document)?;
    let parts: [(&str, &[u8]); 3] = [
        (CONTENT_TYPES_PART, CONTENT_TYPES_XML.as_bytes()),
        (RELATIONSHIPS_PART, RELATIONSHIPS_XML.as_bytes()),
        (DOCUMENT_PART, &document_xml),
    ];
    for (name, content) in parts {
        writer
            .start_file(name, options)
            .with_context(|| format!("failed to write zip entry {}", name))?;
        writer
            .write_all(content)
            .with_context(|| format!("failed to write zip content {}", name))?;
    }

    let bytes = writer
        .finish()
        .with_context(|| "failed to finalize zip output")?
        .into_inner();
    Ok(bytes)
}

fn render_document_xml(document: &Document) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("w:document").with_attributes([("xmlns:w", WORDML_NS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;
    for unit in document.units() {
        if unit.content().is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;
        writer.write_event(Event::Start(BytesStart::new("w:r")))?;
        write_run_content(&mut writer, unit.content())?;
        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner())
}

fn write_run_content(writer: &mut Writer<Vec<u8>>, content: &str) -> Result<()> {
    let mut pending = String::new();
    for ch in content.chars() {
        match ch {
            '\t' | '\n' => {
                flush_text(writer, &mut pending)?;
                let tag = if ch == '\t' { "w:tab" } else { "w:br" };
                writer.write_event(Event::Empty(BytesStart::new(tag)))?;
            }
            '\r' => {}
            _ => pending.push(ch),
        }
    }
    flush_text(writer, &mut pending)
}

fn flush_text(writer: &mut Writer<Vec<u8>>, pending: &mut String) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(
        BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(pending.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    pending.clear();
    Ok(())
}
