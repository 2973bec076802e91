//! XMP metadata cleaner for PDF documents
//!
//! Provides an editor view over an XMP packet: the properties of every
//! `rdf:Description` (child elements and property attributes) can be listed
//! and removed while the packet skeleton (`x:xmpmeta`, `rdf:RDF`, namespace
//! declarations, `xpacket` processing instructions) is kept intact.

use lopdf::{Object, ObjectId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::pdf_document::PdfDocument;
use crate::types::{object_ref, WarningCollector, WarningScope};

/// Parsed XMP packet
#[derive(Debug, Clone)]
pub struct XmpPacket {
    text: String,
}

impl XmpPacket {
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let text = std::str::from_utf8(bytes).map_err(|e| format!("XMP packet is not UTF-8: {}", e))?;
        let packet = Self { text: text.to_string() };
        // Validate once up front so later edits cannot fail half-way
        packet.rewrite(false)?;
        Ok(packet)
    }

    /// Qualified names of all properties, in document order
    pub fn property_names(&self) -> Vec<String> {
        self.rewrite(false).map(|(_, names)| names).unwrap_or_default()
    }

    /// Remove every property; returns the names that were removed
    pub fn remove_all(&mut self) -> Result<Vec<String>, String> {
        let (bytes, removed) = self.rewrite(true)?;
        self.text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
        Ok(removed)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Single pass over the packet. With `strip` set, properties are dropped
    /// from the output; the names found are returned either way.
    fn rewrite(&self, strip: bool) -> Result<(Vec<u8>, Vec<String>), String> {
        let mut reader = Reader::from_str(&self.text);
        let mut writer = Writer::new(Vec::new());
        let mut names = Vec::new();
        // Depth below the innermost open rdf:Description, if inside one
        let mut description_depth: Option<usize> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("malformed XMP at byte {}: {}", reader.buffer_position(), e))?;

            let mut emit = true;
            match (&event, description_depth) {
                (Event::Eof, _) => break,
                (Event::Start(e), None) if is_description(e) => {
                    let kept = split_description(e, &mut names);
                    description_depth = Some(0);
                    if strip {
                        write(&mut writer, Event::Start(kept))?;
                        emit = false;
                    }
                }
                (Event::Empty(e), None) if is_description(e) => {
                    let kept = split_description(e, &mut names);
                    if strip {
                        write(&mut writer, Event::Empty(kept))?;
                        emit = false;
                    }
                }
                (Event::Start(e), Some(depth)) => {
                    if depth == 0 {
                        names.push(qualified(e));
                    }
                    description_depth = Some(depth + 1);
                    emit = !strip;
                }
                (Event::Empty(e), Some(depth)) => {
                    if depth == 0 {
                        names.push(qualified(e));
                    }
                    emit = !strip;
                }
                (Event::End(_), Some(0)) => {
                    description_depth = None;
                }
                (Event::End(_), Some(depth)) => {
                    description_depth = Some(depth - 1);
                    emit = !strip;
                }
                (Event::Text(_) | Event::CData(_) | Event::Comment(_), Some(depth)) if depth > 0 => {
                    emit = !strip;
                }
                (Event::Text(t), Some(0)) if strip && is_whitespace(t) => {
                    emit = false;
                }
                _ => {}
            }

            if emit {
                write(&mut writer, event)?;
            }
        }

        Ok((writer.into_inner(), names))
    }
}

fn is_description(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"Description"
}

fn qualified(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn is_whitespace(t: &quick_xml::events::BytesText<'_>) -> bool {
    t.iter().all(u8::is_ascii_whitespace)
}

/// Keep namespace declarations and `rdf:about`; every other attribute on a
/// description is a property in abbreviated form.
fn split_description(e: &BytesStart<'_>, names: &mut Vec<String>) -> BytesStart<'static> {
    let attributes: Vec<(Vec<u8>, Vec<u8>)> = e
        .attributes()
        .filter_map(Result::ok)
        .map(|a| (a.key.as_ref().to_vec(), a.value.into_owned()))
        .collect();

    let mut kept = e.clone().into_owned();
    kept.clear_attributes();
    for (key, value) in &attributes {
        let structural = key == b"xmlns"
            || key.starts_with(b"xmlns:")
            || key == b"about"
            || key.ends_with(b":about");
        if structural {
            kept.push_attribute((key.as_slice(), value.as_slice()));
        } else {
            names.push(String::from_utf8_lossy(key).into_owned());
        }
    }
    kept
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

/// Removes every property from the XMP packets of a document
#[derive(Debug, Default, Clone)]
pub struct XmpCleaner;

impl XmpCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Empty the XMP packet stored in stream `id`. Returns the number of
    /// properties removed; a missing or non-stream object counts as zero.
    pub fn clear_stream(&self, document: &mut PdfDocument, id: ObjectId, warnings: &mut WarningCollector) -> usize {
        let stream = match document.document_mut().get_object_mut(id) {
            Ok(Object::Stream(stream)) => stream,
            Ok(_) | Err(_) => return 0,
        };

        let content = if stream.dict.has(b"Filter") {
            match stream.decompressed_content() {
                Ok(content) => content,
                Err(e) => {
                    warnings.push(WarningScope::Xmp, object_ref(id), format!("cannot decode XMP stream: {}", e));
                    return 0;
                }
            }
        } else {
            stream.content.clone()
        };

        let mut packet = match XmpPacket::parse(&content) {
            Ok(packet) => packet,
            Err(e) => {
                warnings.push(WarningScope::Xmp, object_ref(id), e);
                return 0;
            }
        };

        match packet.remove_all() {
            Ok(removed) => {
                stream.dict.remove(b"Filter");
                stream.dict.remove(b"DecodeParms");
                stream.set_content(packet.as_bytes().to_vec());
                debug!("Removed {} XMP properties from {}", removed.len(), object_ref(id));
                removed.len()
            }
            Err(e) => {
                warnings.push(WarningScope::Xmp, object_ref(id), e);
                0
            }
        }
    }
}
