//! In-memory XML document tree.
//!
//! The tree follows the text/tail model: an element's `text` is the
//! character data before its first child, and its `tail` is the character
//! data after its end tag, up to the next sibling or the parent's end tag.
//! That keeps mixed content addressable per element, so a subtree can be
//! replaced without disturbing the text around it.

mod parser;
mod writer;

pub use parser::parse_document;
pub use writer::{write_document, write_to_string};

/// The XHTML namespace. Elements in it are written without a prefix.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// A namespace-qualified element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Resolved namespace URI, `None` when the element is in no namespace.
    pub namespace: Option<String>,
    /// Prefix as written in the source, if any.
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<String>, prefix: Option<String>, local: impl Into<String>) -> Self {
        Self {
            namespace,
            prefix,
            local: local.into(),
        }
    }

    /// Name in the XHTML namespace, unprefixed.
    pub fn xhtml(local: impl Into<String>) -> Self {
        Self::new(Some(XHTML_NS.to_string()), None, local)
    }

    /// Check namespace and local name.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }

    /// Check for an XHTML element with the given local name.
    pub fn is_xhtml(&self, local: &str) -> bool {
        self.is(XHTML_NS, local)
    }
}

/// An attribute as written in the source (namespace declarations included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attrs: Vec<Attribute>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
    /// 1-based line of the start tag, when parsed from a source file.
    pub line: Option<usize>,
}

impl Element {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            text: None,
            tail: None,
            children: Vec::new(),
            line: None,
        }
    }

    /// Create an unprefixed XHTML element.
    pub fn xhtml(local: impl Into<String>) -> Self {
        Self::new(QName::xhtml(local))
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
    }

    /// Check whether `class` appears in the whitespace-separated class list.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// First direct child in the XHTML namespace with the given local name.
    pub fn find_xhtml(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name.is_xhtml(local))
    }

    pub fn find_xhtml_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.name.is_xhtml(local))
    }

    /// Copy of this element without its children.
    pub fn shallow_clone(&self) -> Element {
        Element {
            name: self.name.clone(),
            attrs: self.attrs.clone(),
            text: self.text.clone(),
            tail: self.tail.clone(),
            children: Vec::new(),
            line: self.line,
        }
    }

    /// Pre-order iterator over this element and all of its descendants.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Concatenated text of this element and its descendants, tails of
    /// descendants included, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Slash-separated element path following child indices from `self`.
    ///
    /// Same-named siblings get a 1-based position suffix (`div[3]`).
    /// Indices that run off the tree end the path early.
    pub fn path_to(&self, indices: &[usize]) -> String {
        let mut path = format!("/{}", self.name.local);
        let mut current = self;
        for &index in indices {
            let Some(child) = current.children.get(index) else {
                break;
            };
            let same_name = current
                .children
                .iter()
                .filter(|c| c.name == child.name)
                .count();
            path.push('/');
            path.push_str(&child.name.local);
            if same_name > 1 {
                let position = current.children[..index]
                    .iter()
                    .filter(|c| c.name == child.name)
                    .count()
                    + 1;
                path.push_str(&format!("[{position}]"));
            }
            current = child;
        }
        path
    }
}

fn collect_text(element: &Element, out: &mut String) {
    if let Some(text) = &element.text {
        out.push_str(text);
    }
    for child in &element.children {
        collect_text(child, out);
        if let Some(tail) = &child.tail {
            out.push_str(tail);
        }
    }
}

/// Iterator returned by [`Element::iter`].
pub struct Iter<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}
