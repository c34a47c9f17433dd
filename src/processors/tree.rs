//! Owned XML element tree
//!
//! Mirrors the usual element-tree model: each element carries its leading
//! text, its attributes, its children and a `tail` (the text that follows its
//! end tag inside the parent). Comments, processing instructions and DOCTYPE
//! are dropped on parse; CDATA is folded into the surrounding text.

use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::core::errors::{Result, TranslationError};

/// A labeled node of the tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content if it holds anything besides whitespace
    pub fn translatable_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Indices of attributes whose values should be translated
    pub fn translatable_attributes(&self) -> Vec<usize> {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(_, (key, value))| !is_namespace_declaration(key) && !value.trim().is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of translatable units in this element alone
    pub fn own_units(&self) -> usize {
        usize::from(self.translatable_text().is_some()) + self.translatable_attributes().len()
    }

    /// Pre-order iterator over this element and its descendants
    pub fn iter(&self) -> ElementIter<'_> {
        ElementIter { stack: vec![self] }
    }

    /// Follow a path of child indices from this element
    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get_mut(index)?;
        }
        Some(current)
    }
}

/// `xmlns` and `xmlns:*` bind prefixes; they are structure, not content
fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

/// Depth-first, document-order traversal
pub struct ElementIter<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for ElementIter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// A parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse a document from a string
    pub fn parse_str(xml: &str) -> Result<Self> {
        parse(Reader::from_str(xml)).map_err(|message| TranslationError::ParseError {
            path: "<memory>".to_string(),
            message,
        })
    }

    /// Parse raw file contents, honouring the encoding the declaration names
    pub fn parse_bytes(xml: &[u8]) -> Result<Self> {
        parse(Reader::from_reader(xml)).map_err(|message| TranslationError::ParseError {
            path: "<memory>".to_string(),
            message,
        })
    }

    /// Count text and attribute values that would be translated
    pub fn count_units(&self) -> usize {
        self.root.iter().map(Element::own_units).sum()
    }

    /// Serialize with an XML declaration
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        writer
            .write_event(Event::Text(BytesText::new("\n")))
            .map_err(write_error)?;
        write_element(&mut writer, &self.root)?;

        String::from_utf8(writer.into_inner()).map_err(write_error)
    }
}

fn write_error(err: impl std::fmt::Display) -> TranslationError {
    TranslationError::WriteError {
        path: "<memory>".to_string(),
        message: err.to_string(),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;

    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }

    for child in &element.children {
        write_element(writer, child)?;
        if let Some(tail) = &child.tail {
            writer
                .write_event(Event::Text(BytesText::new(tail)))
                .map_err(write_error)?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)?;

    Ok(())
}

fn parse(mut reader: Reader<&[u8]>) -> std::result::Result<Document, String> {
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| format!("{} at position {}", e, position))?;
        // Switches to the declared encoding once the declaration is read.
        let decoder = reader.decoder();

        match event {
            Event::Start(start) => stack.push(element_from_start(&start, decoder)?),
            Event::Empty(start) => {
                let element = element_from_start(&start, decoder)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| format!("unexpected end tag at position {}", position))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = decode_content(decoder, &text, true)?;
                append_text(&text, &mut stack)?;
            }
            Event::CData(cdata) => {
                let text = decode_content(decoder, &cdata, false)?;
                append_text(&text, &mut stack)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }

    root.map(Document::new)
        .ok_or_else(|| "no root element found".to_string())
}

/// `\r\n` and lone `\r` become `\n`
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn decode_content(
    decoder: Decoder,
    raw: &[u8],
    resolve_references: bool,
) -> std::result::Result<String, String> {
    let decoded = decoder.decode(raw).map_err(|e| e.to_string())?;
    let normalized = normalize_line_endings(&decoded);
    if !resolve_references {
        return Ok(normalized);
    }
    unescape(&normalized)
        .map(|text| text.into_owned())
        .map_err(|e| e.to_string())
}

fn element_from_start(
    start: &BytesStart<'_>,
    decoder: Decoder,
) -> std::result::Result<Element, String> {
    let qname = start.name();
    let name = decoder
        .decode(qname.as_ref())
        .map_err(|e| e.to_string())?;
    let mut element = Element::new(name);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = decoder
            .decode(attribute.key.as_ref())
            .map_err(|e| e.to_string())?
            .into_owned();
        let raw = decoder
            .decode(&attribute.value)
            .map_err(|e| e.to_string())?;
        // Literal whitespace in a value is read as a space; character
        // references such as `&#10;` survive.
        let literal = normalize_line_endings(&raw).replace(['\n', '\t'], " ");
        let value = unescape(&literal).map_err(|e| e.to_string())?.into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> std::result::Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(format!("second root element <{}>", element.name));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(text: &str, stack: &mut [Element]) -> std::result::Result<(), String> {
    let Some(parent) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err("text outside the root element".to_string());
    };

    let slot = match parent.children.last_mut() {
        Some(last) => &mut last.tail,
        None => &mut parent.text,
    };
    slot.get_or_insert_with(String::new).push_str(text);
    Ok(())
}
