use std::path::Path;

use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::StateError;
use crate::media::MediaReference;

use super::URI_TAG;

pub fn parse_media_references(path: &Path) -> Result<Vec<MediaReference>, StateError> {
    let xml = std::fs::read_to_string(path).map_err(|e| StateError::ReadState {
        path: path.to_path_buf(),
        source: e,
    })?;

    let references = parse_media_references_from_str(&xml).map_err(|reason| {
        StateError::MalformedDocument {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    debug!("Found {} media references in {}", references.len(), path.display());
    Ok(references)
}

/// Collects the text of every `URI` element in document order. Errors are
/// returned as a reason string; the caller attaches the path.
pub fn parse_media_references_from_str(xml: &str) -> Result<Vec<MediaReference>, String> {
    let mut reader = Reader::from_str(xml);

    let mut references = Vec::new();
    let mut depth = 0usize;
    let mut saw_element = false;
    // Text of the URI element currently open, and how many elements deep
    // inside it the reader is. Only text before the first child counts.
    let mut current: Option<String> = None;
    let mut nested = 0usize;
    let mut text_done = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                saw_element = true;
                if current.is_some() {
                    nested += 1;
                    text_done = true;
                } else if e.name().as_ref() == URI_TAG {
                    current = Some(String::new());
                    text_done = false;
                }
            }
            Ok(Event::Empty(ref e)) => {
                saw_element = true;
                if current.is_some() {
                    text_done = true;
                } else if e.name().as_ref() == URI_TAG {
                    references.push(MediaReference::new(String::new()));
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if nested > 0 {
                    nested -= 1;
                } else if let Some(text) = current.take() {
                    references.push(MediaReference::new(text));
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(text) = current.as_mut().filter(|_| !text_done) {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(text) = current.as_mut().filter(|_| !text_done) {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some(text) = current.as_mut().filter(|_| !text_done) {
                    text.push_str(&resolve_reference(e)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML parsing error at position {}: {}",
                    reader.error_position(),
                    e
                ));
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unexpected end of document: unclosed element".to_string());
    }
    if !saw_element {
        return Err("no element found".to_string());
    }

    Ok(references)
}

/// Resolves a character reference or one of the five predefined entities.
pub(crate) fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, String> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| format!("invalid character reference: {}", e))?
    {
        return Ok(ch.to_string());
    }

    let name = reference
        .decode()
        .map_err(|e| format!("invalid entity reference: {}", e))?;
    quick_xml::escape::resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| format!("undefined entity '&{};'", name))
}
