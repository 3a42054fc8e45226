//! Serialization of [`Element`] trees.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::{Element, XHTML_NS};
use crate::error::Result;

/// Serialize a document: XML declaration, then the root element.
///
/// A root in the XHTML namespace always carries the default namespace
/// declaration, so unprefixed XHTML names stay valid.
pub fn write_document(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;

    let needs_xmlns = root.name.namespace.as_deref() == Some(XHTML_NS) && root.attr("xmlns").is_none();
    write_element(&mut writer, root, needs_xmlns)?;

    Ok(writer.into_inner())
}

/// Serialize a single element (no declaration) to a string.
pub fn write_to_string(element: &Element) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element, false)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element, declare_xhtml: bool) -> Result<()> {
    let name = element_name(element);

    let mut start = BytesStart::new(&*name);
    if declare_xhtml {
        start.push_attribute(("xmlns", XHTML_NS));
    }
    for attr in &element.attrs {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &element.text {
            write_text(writer, text)?;
        }
        for child in &element.children {
            write_element(writer, child, false)?;
        }
        writer.write_event(Event::End(BytesEnd::new(&*name)))?;
    }

    if let Some(tail) = &element.tail {
        write_text(writer, tail)?;
    }
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    Ok(())
}

/// XHTML elements are written unprefixed, everything else as parsed.
fn element_name(element: &Element) -> Cow<'_, str> {
    let name = &element.name;
    match &name.prefix {
        Some(prefix) if name.namespace.as_deref() != Some(XHTML_NS) => {
            Cow::Owned(format!("{prefix}:{}", name.local))
        }
        _ => Cow::Borrowed(name.local.as_str()),
    }
}
