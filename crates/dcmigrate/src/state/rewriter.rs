use std::path::Path;

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::error::StateError;
use crate::media;

use super::URI_TAG;

/// Points every `URI` element of the state file at `content_dir`, keeping the
/// element's base name, and overwrites the file in place. Returns the new
/// URIs in document order.
pub fn rewrite_state_file(path: &Path, content_dir: &Path) -> Result<Vec<String>, StateError> {
    let xml = std::fs::read_to_string(path).map_err(|e| StateError::ReadState {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (rewritten, uris) =
        rewrite_state_str(&xml, content_dir).map_err(|reason| StateError::MalformedDocument {
            path: path.to_path_buf(),
            reason,
        })?;

    std::fs::write(path, rewritten).map_err(|e| StateError::WriteError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!("Rewrote {} URIs in {}", uris.len(), path.display());
    Ok(uris)
}

/// Streams the document through a writer, replacing the direct text of each
/// `URI` element. The new text is written where the original text ended:
/// before the element's first child, or before its end tag. Child elements
/// and everything outside `URI` text are written back as read.
pub fn rewrite_state_str(xml: &str, content_dir: &Path) -> Result<(String, Vec<String>), String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut uris = Vec::new();
    let mut current: Option<OpenUri> = None;
    let mut nested = 0usize;
    let mut depth = 0usize;
    let mut saw_element = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            format!(
                "XML parsing error at position {}: {}",
                reader.error_position(),
                e
            )
        })?;

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                saw_element = true;
                if let Some(uri) = current.as_mut() {
                    uri.flush(&mut writer, content_dir, &mut uris)?;
                    nested += 1;
                    write(&mut writer, Event::Start(e))?;
                    continue;
                }
                let is_uri = e.name().as_ref() == URI_TAG;
                write(&mut writer, Event::Start(e))?;
                if is_uri {
                    current = Some(OpenUri::default());
                }
            }
            Event::Empty(e) => {
                saw_element = true;
                if let Some(uri) = current.as_mut() {
                    uri.flush(&mut writer, content_dir, &mut uris)?;
                    write(&mut writer, Event::Empty(e))?;
                } else if e.name().as_ref() == URI_TAG {
                    let end = e.to_end().into_owned();
                    write(&mut writer, Event::Start(e))?;
                    OpenUri::default().flush(&mut writer, content_dir, &mut uris)?;
                    write(&mut writer, Event::End(end))?;
                } else {
                    write(&mut writer, Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if current.is_some() && nested > 0 {
                    nested -= 1;
                } else if let Some(mut uri) = current.take() {
                    uri.flush(&mut writer, content_dir, &mut uris)?;
                }
                write(&mut writer, Event::End(e))?;
            }
            Event::Text(e) => match current.as_mut() {
                Some(uri) if uri.collecting(nested) => {
                    uri.text.push_str(&String::from_utf8_lossy(&e))
                }
                _ => write(&mut writer, Event::Text(e))?,
            },
            Event::CData(e) => match current.as_mut() {
                Some(uri) if uri.collecting(nested) => {
                    uri.text.push_str(&String::from_utf8_lossy(&e))
                }
                _ => write(&mut writer, Event::CData(e))?,
            },
            Event::GeneralRef(e) => match current.as_mut() {
                Some(uri) if uri.collecting(nested) => {
                    uri.text.push_str(&super::parser::resolve_reference(&e)?)
                }
                _ => write(&mut writer, Event::GeneralRef(e))?,
            },
            other => write(&mut writer, other)?,
        }
    }

    if depth != 0 {
        return Err("unexpected end of document: unclosed element".to_string());
    }
    if !saw_element {
        return Err("no element found".to_string());
    }

    let output = String::from_utf8(writer.into_inner())
        .map_err(|e| format!("rewritten document is not UTF-8: {}", e))?;
    Ok((output, uris))
}

/// A `URI` element whose end tag has not been read yet.
#[derive(Default)]
struct OpenUri {
    text: String,
    replaced: bool,
}

impl OpenUri {
    /// Text belongs to the URI only until its first child element.
    fn collecting(&self, nested: usize) -> bool {
        nested == 0 && !self.replaced
    }

    fn flush(
        &mut self,
        writer: &mut Writer<Vec<u8>>,
        content_dir: &Path,
        uris: &mut Vec<String>,
    ) -> Result<(), String> {
        if self.replaced {
            return Ok(());
        }
        self.replaced = true;
        let uri = new_uri(content_dir, &self.text);
        write(writer, Event::Text(BytesText::new(&uri)))?;
        uris.push(uri);
        Ok(())
    }
}

fn new_uri(content_dir: &Path, original: &str) -> String {
    content_dir
        .join(media::base_name(original).unwrap_or(""))
        .to_string_lossy()
        .into_owned()
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer
        .write_event(event)
        .map_err(|e| format!("failed to serialize XML: {}", e))
}
