//! XML parsing into [`Element`] trees.
//!
//! Comments, processing instructions and the doctype are dropped. CDATA
//! sections are folded into ordinary text. Whitespace is kept verbatim,
//! since tails carry the document's layout.

use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::{Attribute, Element, QName};
use crate::error::{Error, Result};
use crate::util::line_at;

/// Parse a complete XML document and return its root element.
///
/// `origin` only names the source in error messages.
pub fn parse_document(source: &str, origin: &Path) -> Result<Element> {
    let malformed = |offset: usize, message: String| Error::MalformedDocument {
        path: origin.to_path_buf(),
        line: Some(line_at(source, offset)),
        message,
    };

    let mut reader = NsReader::from_str(source);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(e) => return Err(malformed(reader.error_position() as usize, e.to_string())),
        };
        let namespace = match resolved {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(malformed(
                    offset,
                    format!("unbound prefix `{}`", String::from_utf8_lossy(&prefix)),
                ));
            }
        };

        match event {
            Event::Start(e) => {
                let mut element = start_element(&e, namespace).map_err(|m| malformed(offset, m))?;
                element.line = Some(line_at(source, offset));
                stack.push(element);
            }
            Event::Empty(e) => {
                let mut element = start_element(&e, namespace).map_err(|m| malformed(offset, m))?;
                element.line = Some(line_at(source, offset));
                attach(&mut stack, &mut root, element).map_err(|m| malformed(offset, m))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed(offset, "unexpected end tag".to_string()))?;
                attach(&mut stack, &mut root, element).map_err(|m| malformed(offset, m))?;
            }
            Event::Text(e) => {
                push_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Event::CData(e) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let c = resolve_entity(&entity)
                    .ok_or_else(|| malformed(offset, format!("undefined entity `&{entity};`")))?;
                push_text(&mut stack, c.encode_utf8(&mut [0; 4]));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            source.len(),
            format!("unclosed element <{}>", open.name.local),
        ));
    }

    root.ok_or_else(|| malformed(0, "no root element".to_string()))
}

fn start_element(
    e: &BytesStart<'_>,
    namespace: Option<String>,
) -> std::result::Result<Element, String> {
    let name = e.name();
    let prefix = name
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

    let mut element = Element::new(QName::new(namespace, prefix, local));
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)
            .map_err(|e| format!("bad value for attribute `{name}`: {e}"))?
            .into_owned();
        element.attrs.push(Attribute { name, value });
    }
    Ok(element)
}

/// Hang a finished element under the open parent, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(format!("second root element <{}>", element.name.local)),
    }
}

/// Append character data as text of the open element, or as the tail of
/// its last child. Data outside the root element is dropped.
fn push_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    let slot = match parent.children.last_mut() {
        Some(last) => &mut last.tail,
        None => &mut parent.text,
    };
    slot.get_or_insert_with(String::new).push_str(text);
}

/// Resolve the predefined XML entities and character references.
fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => return Some('\''),
        "quot" => return Some('"'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "amp" => return Some('&'),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
