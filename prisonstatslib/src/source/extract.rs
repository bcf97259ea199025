//! Text extraction from source documents.
//!
//! PDFs are read with `lopdf`, one page at a time, by walking the page's
//! content stream. Anything else is treated as plain text whose pages are
//! separated by form feeds, which is also what `pdftotext` produces and keeps
//! fixtures easy to write by hand.

use std::fs;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object};

use super::options::IngestOptions;
use crate::error::PrisonStatsError;
use crate::Result;

/// Page separator for plain-text sources.
pub const PAGE_BREAK: char = '\x0c';

/// Extract trimmed text lines from a document, skipping the first
/// `options.skip_pages` pages. Pages are concatenated in order.
pub fn extract_lines(path: impl AsRef<Path>, options: &IngestOptions) -> Result<Vec<String>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PrisonStatsError::SourceNotFound(path.to_path_buf()));
    }

    let pages = if is_pdf(path) {
        pdf_pages(path)?
    } else {
        text_pages(path)?
    };

    tracing::debug!(path = %path.display(), pages = pages.len(), "extracted pages");

    Ok(pages
        .iter()
        .skip(options.skip_pages)
        .flat_map(|page| page.lines().map(|line| line.trim().to_string()))
        .collect())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn pdf_pages(path: &Path) -> Result<Vec<String>> {
    let pdf_error = |message: String| PrisonStatsError::Pdf {
        path: path.to_path_buf(),
        message,
    };

    let document = Document::load(path).map_err(|e| pdf_error(e.to_string()))?;

    // get_pages is keyed by 1-based page number, so iteration is in page order
    document
        .get_pages()
        .into_iter()
        .map(|(number, page_id)| -> Result<String> {
            let content = document
                .get_page_content(page_id)
                .and_then(|bytes| Content::decode(&bytes))
                .map_err(|e| pdf_error(format!("page {}: {}", number, e)))?;
            Ok(page_text(&content))
        })
        .collect()
}

/// Render the text-showing operators of one content stream, one output line
/// per text line. Moves to a new line (`Td`/`TD` with a vertical offset,
/// `T*`, `Tm`, `'`, `"`) and the end of a text object break the line.
fn page_text(content: &Content) -> String {
    let mut text = String::new();
    let mut line = String::new();

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "Tj" => push_strings(&mut line, operands),
            "TJ" => {
                for operand in operands {
                    if let Object::Array(items) = operand {
                        push_strings(&mut line, items);
                    }
                }
            }
            "'" => {
                end_line(&mut text, &mut line);
                push_strings(&mut line, operands);
            }
            "\"" => {
                end_line(&mut text, &mut line);
                push_strings(&mut line, operands.get(2..).unwrap_or_default());
            }
            "Td" | "TD" => {
                let dy = operands.get(1).and_then(|o| o.as_float().ok()).unwrap_or(0.0);
                if dy != 0.0 {
                    end_line(&mut text, &mut line);
                }
            }
            "T*" | "Tm" | "ET" => end_line(&mut text, &mut line),
            _ => {}
        }
    }
    end_line(&mut text, &mut line);
    text
}

fn end_line(text: &mut String, line: &mut String) {
    if !line.is_empty() {
        text.push_str(line);
        text.push('\n');
        line.clear();
    }
}

fn push_strings(line: &mut String, operands: &[Object]) {
    for operand in operands {
        if let Object::String(bytes, _) = operand {
            line.push_str(&decode_pdf_string(bytes));
        }
    }
}

/// Text strings are UTF-16BE when they carry a byte order mark, otherwise
/// single-byte. Single bytes are mapped as Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn text_pages(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.split(PAGE_BREAK).map(str::to_string).collect())
}

/// Writes small text-only PDFs for tests. Each page's lines go into a single
/// text object, one `T*` apart.
#[cfg(test)]
pub(crate) fn write_test_pdf(path: &Path, pages: &[&[&str]]) {
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("TL", vec![12.into()]),
            Operation::new("Td", vec![40.into(), 800.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
