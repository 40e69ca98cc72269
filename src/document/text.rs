use anyhow::{Context, Result};
use std::borrow::Cow;

use super::{Document, TextUnit};

const BOM: char = '\u{feff}';

pub(super) fn parse(bytes: &[u8]) -> Result<Document> {
    let content = std::str::from_utf8(bytes).with_context(|| "document is not valid UTF-8")?;
    let content = content.strip_prefix(BOM).unwrap_or(content);
    Ok(Document::new(content.lines().map(TextUnit::new).collect()))
}

/// Writes one line per unit. Line breaks inside a unit are folded into a
/// single space so the file reads back with the same number of units.
pub(super) fn render(document: &Document) -> Vec<u8> {
    let mut output = String::new();
    for unit in document.units() {
        output.push_str(&single_line(unit.content()));
        output.push('\n');
    }
    output.into_bytes()
}

fn single_line(content: &str) -> Cow<'_, str> {
    if !content.contains(['\r', '\n']) {
        return Cow::Borrowed(content);
    }
    Cow::Owned(
        content
            .split(['\r', '\n'])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_unit_per_line() {
        let document = parse("\u{feff}Hello\r\n\r\n  \nWorld".as_bytes()).unwrap();
        assert_eq!(document.texts(), vec!["Hello", "", "  ", "World"]);
    }

    #[test]
    fn empty_file_has_no_units() {
        assert!(parse(b"").unwrap().is_empty());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(parse(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn render_terminates_every_line() {
        let document = Document::from_texts(["Olá", "", "Mundo"]);
        assert_eq!(render(&document), b"Ol\xc3\xa1\n\nMundo\n".to_vec());
    }

    #[test]
    fn embedded_line_breaks_keep_one_line_per_unit() {
        let document = Document::from_texts(["a\nb", "c\r\n\r\nd\re", "\n", "  "]);
        let rendered = render(&document);
        assert_eq!(rendered, b"a b\nc d e\n\n  \n".to_vec());

        let reread = parse(&rendered).unwrap();
        assert_eq!(reread.len(), document.len());
        assert_eq!(reread.texts(), vec!["a b", "c d e", "", "  "]);
    }
}
