//! Title page generation from skeleton metadata.

use tracing::debug;

use crate::dom::Element;
use crate::error::{Error, Result};

/// `id` of the generated title page container.
pub const TITLE_PAGE_ID: &str = "title_page";

/// Title and author as read from the skeleton's `<head>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMetadata {
    pub title: String,
    pub author: String,
}

impl TitleMetadata {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }

    /// Read `head/title` and the first `head/meta[@name='author']`.
    pub fn from_document(root: &Element) -> Result<Self> {
        let head = root
            .find_xhtml("head")
            .ok_or_else(|| Error::MissingMetadata("document has no <head>".to_string()))?;

        let title = head
            .find_xhtml("title")
            .ok_or_else(|| Error::MissingMetadata("no <title> element".to_string()))?
            .text_content();

        let author_meta = head
            .children
            .iter()
            .find(|c| c.name.is_xhtml("meta") && c.attr("name") == Some("author"))
            .ok_or_else(|| Error::MissingMetadata("no <meta name=\"author\"> element".to_string()))?;
        let author = author_meta.attr("content").ok_or_else(|| {
            Error::MissingMetadata("author <meta> has no content attribute".to_string())
        })?;

        Ok(Self::new(title, author))
    }
}

/// Build the title page:
///
/// ```xml
/// <div id="title_page">
///   <h1><span class="title">TITLE</span><br/>
///   <span style="font-size:medium;">by</span><br/>
///   <span class="author">AUTHOR</span></h1>
/// </div>
/// ```
pub fn title_page(meta: &TitleMetadata) -> Element {
    let heading = Element::xhtml("h1")
        .with_child(
            Element::xhtml("span")
                .with_attr("class", "title")
                .with_text(meta.title.as_str()),
        )
        .with_child(Element::xhtml("br").with_tail("\n  "))
        .with_child(
            Element::xhtml("span")
                .with_attr("style", "font-size:medium;")
                .with_text("by"),
        )
        .with_child(Element::xhtml("br").with_tail("\n  "))
        .with_child(
            Element::xhtml("span")
                .with_attr("class", "author")
                .with_text(meta.author.as_str()),
        )
        .with_tail("\n");

    Element::xhtml("div")
        .with_attr("id", TITLE_PAGE_ID)
        .with_text("\n  ")
        .with_child(heading)
}

/// Insert `page` as the first child of `<body>`.
///
/// The page's tail repeats the body's leading whitespace so the original
/// first child keeps its indentation.
pub fn insert_title_page(root: &mut Element, mut page: Element) -> Result<()> {
    let body = root
        .find_xhtml_mut("body")
        .ok_or_else(|| Error::MissingElement("body".to_string()))?;

    if page.tail.is_none() {
        page.tail = body.text.clone();
    }
    body.children.insert(0, page);
    debug!("inserted title page");
    Ok(())
}
