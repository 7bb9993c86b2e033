//! Minimal XML DOM used by the GraphML importer.
//!
//! GraphML slipback (writing adopted identifiers back into the source file)
//! needs to mutate specific `<data>` elements while leaving the rest of the
//! document intact, so the importer parses into this small owned tree
//! rather than streaming straight into the domain model.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::ImportError;

#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct XmlElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value;
        } else {
            self.attrs.push((name.to_string(), value));
        }
    }

    /// Local name: the part after a namespace prefix (`y:ShapeNode` -> `ShapeNode`).
    pub fn local_name(&self) -> &str {
        self.tag.rsplit(':').next().unwrap_or(&self.tag)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn find_child(&self, local_name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.local_name() == local_name)
    }

    pub fn find_children<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.child_elements().filter(move |e| e.local_name() == local_name)
    }

    /// Depth-first search for all descendants (not including self) with a
    /// given local name.
    pub fn find_descendants<'a>(&'a self, local_name: &'a str, out: &mut Vec<&'a XmlElement>) {
        for child in self.child_elements() {
            if child.local_name() == local_name {
                out.push(child);
            }
            child.find_descendants(local_name, out);
        }
    }

    pub fn find_descendant<'a>(&'a self, local_name: &'a str) -> Option<&'a XmlElement> {
        let mut out = Vec::new();
        self.find_descendants(local_name, &mut out);
        out.into_iter().next()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|c| !matches!(c, XmlNode::Text(_)));
        self.children.push(XmlNode::Text(text.into()));
    }
}

/// Parse a full XML document into its root element.
pub fn parse(xml: &str) -> Result<XmlElement, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ImportError::ParseError(e.to_string()))?
        {
            Event::Start(start) => {
                let element = parse_element(&mut reader, start)?;
                return Ok(element);
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {
                buf.clear();
                continue;
            }
            Event::Eof => {
                return Err(ImportError::ParseError("empty xml document".to_string()))
            }
            _ => {
                buf.clear();
                continue;
            }
        }
    }
}

fn parse_element(reader: &mut Reader<&[u8]>, start: BytesStart) -> Result<XmlElement, ImportError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let attrs = start
        .attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).to_string();
            let value = a.unescape_value().unwrap_or_default().to_string();
            (key, value)
        })
        .collect();
    let mut children = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ImportError::ParseError(e.to_string()))?
        {
            Event::Start(child_start) => {
                children.push(XmlNode::Element(parse_element(reader, child_start)?));
            }
            Event::Empty(child_start) => {
                let tag = String::from_utf8_lossy(child_start.name().as_ref()).to_string();
                let attrs = child_start
                    .attributes()
                    .filter_map(|a| a.ok())
                    .map(|a| {
                        let key = String::from_utf8_lossy(a.key.as_ref()).to_string();
                        let value = a.unescape_value().unwrap_or_default().to_string();
                        (key, value)
                    })
                    .collect();
                children.push(XmlNode::Element(XmlElement { tag, attrs, children: Vec::new() }));
            }
            Event::Text(text) => {
                let decoded = text.unescape().unwrap_or_default().to_string();
                if !decoded.trim().is_empty() {
                    children.push(XmlNode::Text(decoded));
                }
            }
            Event::CData(cdata) => {
                children.push(XmlNode::Text(String::from_utf8_lossy(cdata.as_ref()).to_string()));
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(ImportError::ParseError(format!("unexpected eof inside <{tag}>")))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(XmlElement { tag, attrs, children })
}

/// Serialize an element tree back to an XML string, for slipback.
pub fn to_string(root: &XmlElement) -> Result<String, ImportError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, root)?;
    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| ImportError::ParseError(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), ImportError> {
    let map_err = |e: quick_xml::Error| ImportError::ParseError(e.to_string());

    if element.children.is_empty() {
        let mut start = BytesStart::new(element.tag.as_str());
        for (k, v) in &element.attrs {
            start.push_attribute((k.as_str(), v.as_str()));
        }
        writer.write_event(Event::Empty(start)).map_err(map_err)?;
        return Ok(());
    }

    let mut start = BytesStart::new(element.tag.as_str());
    for (k, v) in &element.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    writer.write_event(Event::Start(start)).map_err(map_err)?;

    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => {
                writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(map_err)?;
            }
        }
    }

    writer
        .write_event(Event::End(quick_xml::events::BytesEnd::new(element.tag.as_str())))
        .map_err(map_err)?;
    Ok(())
}
