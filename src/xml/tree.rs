use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::XmlError;

/// Deepest element nesting accepted before a document is rejected.
pub(crate) const MAX_DEPTH: usize = 1024;

/// Owned element with its direct character content.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// All direct children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First direct child with the given local name.
    pub fn child<'a>(&'a self, name: &'a str) -> Option<&'a Element> {
        self.children_named(name).next()
    }
}

fn local_name(e: &BytesStart) -> Result<String, XmlError> {
    Ok(std::str::from_utf8(e.local_name().as_ref())?.to_string())
}

/// Attach a finished element to its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // Trailing top-level elements after the first root are ignored.
        None if root.is_none() => *root = Some(element),
        None => {}
    }
}

/// Parse a complete document into an element tree.
pub(crate) fn parse_document(bytes: &[u8]) -> Result<Element, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(XmlError::TooDeep(MAX_DEPTH));
                }
                stack.push(Element::new(local_name(e)?));
            }
            Event::Empty(ref e) => {
                let element = Element::new(local_name(e)?);
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(ref t) => {
                if let Some(current) = stack.last_mut() {
                    let text = t.unescape().map_err(quick_xml::Error::from)?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(std::str::from_utf8(&t.into_inner())?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnclosedElement(open.name));
    }
    root.ok_or(XmlError::EmptyDocument)
}
