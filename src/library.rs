//! The fragment library: bog-standard paragraphs keyed by id.
//!
//! Every XHTML `div` in the library document is a container. Its `id`
//! names the fragment and its first `p` child is the fragment content:
//!
//! ```xml
//! <div id="bsp1"><p>Reusable paragraph.</p></div>
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::dom::{Element, parse_document};
use crate::error::{Error, Result};
use crate::util::read_input;

/// Fragments keyed by id. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct FragmentLibrary {
    fragments: BTreeMap<String, Element>,
}

impl FragmentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a library file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = read_input(path)?;
        Self::parse(&source, path)
    }

    /// Parse library source. `origin` names it in error messages.
    pub fn parse(source: &str, origin: &Path) -> Result<Self> {
        let root = parse_document(source, origin)?;
        Self::from_document(&root, origin)
    }

    /// Collect fragments from an already parsed library document.
    ///
    /// A container without an `id` is an error. A container without a
    /// paragraph is skipped, and a repeated id keeps the later definition.
    pub fn from_document(root: &Element, origin: &Path) -> Result<Self> {
        let mut library = Self::new();

        for container in root.iter().filter(|e| e.name.is_xhtml("div")) {
            let id = container.attr("id").ok_or_else(|| Error::MissingId {
                path: origin.to_path_buf(),
                line: container.line,
            })?;

            let Some(paragraph) = container.find_xhtml("p") else {
                warn!(id, line = container.line, "fragment container has no paragraph, skipping");
                continue;
            };

            if library.insert(id, paragraph.clone()).is_some() {
                warn!(id, line = container.line, "duplicate fragment id, later definition wins");
            }
        }

        debug!(count = library.len(), path = %origin.display(), "loaded fragment library");
        Ok(library)
    }

    /// Add a fragment, returning the one it replaced.
    pub fn insert(&mut self, id: impl Into<String>, fragment: Element) -> Option<Element> {
        self.fragments.insert(id.into(), fragment)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.fragments.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fragments.contains_key(id)
    }

    /// Fragment ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
  <body>
    <div id="bsp1"><p class="std">First <em>paragraph</em>.</p></div>
    <div id="bsp2">
      <p>Second.</p>
      <p>Ignored.</p>
    </div>
  </body>
</html>"#;

    fn parse(source: &str) -> Result<FragmentLibrary> {
        FragmentLibrary::parse(source, Path::new("bsps.xhtml"))
    }

    #[test]
    fn test_ids_are_ordered() {
        let mut library = FragmentLibrary::new();
        for id in ["bsp2", "bsp10", "appendix1"] {
            library.insert(id, Element::xhtml("p"));
        }
        assert_eq!(
            library.ids().collect::<Vec<_>>(),
            vec!["appendix1", "bsp10", "bsp2"]
        );
    }

    #[test]
    fn test_parse_library() {
        let library = parse(LIBRARY).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library.ids().collect::<Vec<_>>(), vec!["bsp1", "bsp2"]);

        let first = library.get("bsp1").unwrap();
        assert!(first.name.is_xhtml("p"));
        assert_eq!(first.attr("class"), Some("std"));
        assert_eq!(first.text_content(), "First paragraph.");
    }

    #[test]
    fn test_first_paragraph_wins() {
        let library = parse(LIBRARY).unwrap();
        assert_eq!(library.get("bsp2").unwrap().text_content(), "Second.");
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let source = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body>
<div id="bsp1"><p>a</p></div>
<div><p>b</p></div>
</body></html>"#;
        match parse(source).unwrap_err() {
            Error::MissingId { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_container_without_paragraph_is_skipped() {
        let source = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body>
<div id="bsp1"><span>a</span></div>
<div id="bsp2"><p>b</p></div>
</body></html>"#;
        let library = parse(source).unwrap();
        assert!(!library.contains("bsp1"));
        assert!(library.contains("bsp2"));
    }

    #[test]
    fn test_duplicate_id_keeps_last() {
        let source = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body>
<div id="bsp1"><p>old</p></div>
<div id="bsp1"><p>new</p></div>
</body></html>"#;
        let library = parse(source).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("bsp1").unwrap().text_content(), "new");
    }

    #[test]
    fn test_non_xhtml_divs_are_ignored() {
        let source = r#"<root><div><p>no namespace</p></div></root>"#;
        assert!(parse(source).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_library() {
        let err = parse("<html><div id=\"bsp1\"><p>x</div></html>").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }
}
