use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::InvoiceError;

/// Deepest element nesting accepted before a document is rejected.
pub const MAX_DEPTH: usize = 512;

fn malformed(msg: impl Into<String>) -> InvoiceError {
    InvoiceError::MalformedXml(msg.into())
}

fn utf8(bytes: &[u8]) -> Result<&str, InvoiceError> {
    std::str::from_utf8(bytes).map_err(|e| malformed(format!("invalid UTF-8: {e}")))
}

/// Local part of a possibly prefixed name (`cbc:ID` → `ID`).
fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// A parsed XML document: an owned element tree without schema knowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

/// One element with its attributes, direct text content and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse raw bytes. A leading UTF-8 byte order mark is ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, InvoiceError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        Self::parse_str(utf8(bytes)?)
    }

    pub fn parse_str(xml: &str) -> Result<Self, InvoiceError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(malformed(format!(
                            "element nesting exceeds {MAX_DEPTH} levels"
                        )));
                    }
                    stack.push(open_element(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = open_element(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed("closing tag without opening tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| malformed(format!("invalid text content: {e}")))?;
                    push_text(&mut stack, &text)?;
                }
                Ok(Event::CData(e)) => {
                    let raw = e.into_inner();
                    let text = Cow::Borrowed(utf8(&raw)?);
                    push_text(&mut stack, &text)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(malformed(format!(
                        "XML parse error at position {}: {e}",
                        reader.buffer_position()
                    )));
                }
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(format!("unclosed element <{}>", open.name)));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| malformed("document has no root element"))
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement, InvoiceError> {
    let name = utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(format!("invalid attribute on <{name}>: {e}")))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(format!("invalid attribute value on <{name}>: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), InvoiceError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("document has more than one root element")),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), InvoiceError> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(malformed("text outside the root element")),
    }
    Ok(())
}

impl XmlElement {
    /// Qualified name as written, e.g. `cbc:ID`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without namespace prefix, e.g. `ID`.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Whether this element matches a lookup step.
    ///
    /// Producers emit both prefixed and unprefixed names, so a step matches
    /// on the exact qualified name or on the local name.
    pub fn is(&self, step: &str) -> bool {
        self.name == step || self.local_name() == local_part(step)
    }

    /// Attribute value by qualified or local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name || local_part(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Values of the `xmlns` and `xmlns:*` declarations on this element.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(key, _)| key == "xmlns" || key.starts_with("xmlns:"))
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter()
    }

    pub fn children_named<'a>(&'a self, step: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.is(step))
    }

    /// First child matching `step`.
    pub fn child(&self, step: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(step))
    }

    /// Follow a slash-separated path of steps, taking the first match at
    /// each level.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('/')
            .filter(|step| !step.is_empty())
            .try_fold(self, |element, step| element.child(step))
    }

    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path)?.text()
    }

    /// All elements matching the last step under the first match of the
    /// preceding steps.
    pub fn find_all<'a>(&'a self, path: &'a str) -> Vec<&'a XmlElement> {
        let (parent, last) = match path.rsplit_once('/') {
            Some((parent, last)) => (self.find(parent), last),
            None => (Some(self), path),
        };
        parent
            .map(|p| p.children_named(last).collect())
            .unwrap_or_default()
    }
}
