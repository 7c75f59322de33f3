use super::{Extraction, Metadata};
use lopdf::{Dictionary, Document, Object};
use std::path::Path;

/// Placeholder for info-dictionary entries the document leaves out
pub const MISSING_FIELD: &str = "N/A";

/// Sole entry returned for documents without an info dictionary
pub const NO_INFO_MESSAGE: &str = "Nenhum metadado encontrado";

const INFO_FIELDS: [&str; 4] = ["Author", "Title", "Creator", "Producer"];

/// Extract info-dictionary fields, page count and encryption flag from a PDF.
///
/// Parsing is all-or-nothing: on any failure the result holds only `"error"`.
pub fn extract_pdf_metadata(path: &Path) -> Extraction {
    match read_document(path) {
        Ok(fields) => Extraction::Complete(fields),
        Err(e) => {
            tracing::debug!("PDF parse failed for {}: {}", path.display(), e);
            Extraction::Failed(format!("Erro ao ler PDF: {e}"))
        }
    }
}

fn read_document(path: &Path) -> anyhow::Result<Metadata> {
    let bytes = std::fs::read(path)?;
    let doc = Document::load_mem(&bytes)?;

    let mut fields = Metadata::new();
    let Some(info) = info_dictionary(&doc)? else {
        fields.insert("Info".to_string(), NO_INFO_MESSAGE.into());
        return Ok(fields);
    };

    for key in INFO_FIELDS {
        let value = info
            .get(key.as_bytes())
            .ok()
            .and_then(|object| text_value(&doc, object))
            .unwrap_or_else(|| MISSING_FIELD.to_string());
        fields.insert(key.to_string(), value.into());
    }

    fields.insert("Pages".to_string(), page_count(&doc)?.into());
    fields.insert(
        "Encrypted".to_string(),
        (doc.is_encrypted() || declares_encryption(&bytes)).into(),
    );

    Ok(fields)
}

/// The trailer's /Info dictionary, `None` when missing or empty
fn info_dictionary(doc: &Document) -> anyhow::Result<Option<&Dictionary>> {
    let Ok(info) = doc.trailer.get(b"Info") else {
        return Ok(None);
    };

    let dict = match info {
        Object::Reference(id) => doc.get_object(*id)?.as_dict()?,
        Object::Null => return Ok(None),
        other => other.as_dict()?,
    };

    Ok((!dict.is_empty()).then_some(dict))
}

fn text_value(doc: &Document, object: &Object) -> Option<String> {
    let object = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };

    match object {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// PDF text strings are UTF-16BE when they open with a byte order mark
fn decode_text(bytes: &[u8]) -> String {
    match bytes.strip_prefix(b"\xFE\xFF") {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Page count from the page tree; the catalog must resolve to a /Pages root
fn page_count(doc: &Document) -> anyhow::Result<u64> {
    doc.catalog()?.get(b"Pages")?;
    Ok(doc.get_pages().len() as u64)
}

/// lopdf strips /Encrypt once it decrypts with the empty user password, so
/// look for the key in the raw trailers (classic and cross-reference stream)
fn declares_encryption(bytes: &[u8]) -> bool {
    let classic = find_all(bytes, b"trailer").filter_map(|pos| {
        let start = pos + b"trailer".len();
        let offset = bytes[start..].iter().position(|b| !is_whitespace(*b))?;
        dictionary_at(bytes, start + offset)
    });
    let streams =
        name_positions(bytes, b"/XRef").filter_map(|pos| enclosing_dictionary(bytes, pos));

    classic
        .chain(streams)
        .any(|dict| name_positions(dict, b"/Encrypt").next().is_some())
}

const DELIMITERS: &[u8] = b"()<>[]{}/%";

fn is_whitespace(byte: u8) -> bool {
    byte == 0 || byte.is_ascii_whitespace()
}

fn find_all<'a>(bytes: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    bytes
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, window)| *window == needle)
        .map(|(pos, _)| pos)
}

/// Occurrences of a whole name token (`/Encrypt` but not `/EncryptMetadata`)
fn name_positions<'a>(bytes: &'a [u8], name: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    find_all(bytes, name).filter(move |pos| {
        bytes
            .get(pos + name.len())
            .is_none_or(|b| is_whitespace(*b) || DELIMITERS.contains(b))
    })
}

/// The balanced `<< ... >>` starting at `start`
fn dictionary_at(bytes: &[u8], start: usize) -> Option<&[u8]> {
    if !bytes[start..].starts_with(b"<<") {
        return None;
    }

    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match &bytes[i..i + 2] {
            b"<<" => {
                depth += 1;
                i += 2;
            }
            b">>" => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(&bytes[start..i]);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// The innermost dictionary that contains `pos`
fn enclosing_dictionary(bytes: &[u8], pos: usize) -> Option<&[u8]> {
    let mut depth = 0usize;
    let mut i = pos;
    while i >= 2 {
        match &bytes[i - 2..i] {
            b">>" => {
                depth += 1;
                i -= 2;
            }
            b"<<" if depth == 0 => return dictionary_at(bytes, i - 2),
            b"<<" => {
                depth -= 1;
                i -= 2;
            }
            _ => i -= 1,
        }
    }
    None
}
