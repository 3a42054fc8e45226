//! Skeleton + fragment library → merged document.
//!
//! The pipeline runs in this order:
//!
//! 1. parse the skeleton
//! 2. strip build-only metadata from `<head>`
//! 3. insert the title page (unless disabled)
//! 4. load the fragment library
//! 5. copy the skeleton, replacing every placeholder with its fragments
//! 6. serialize and write the output
//!
//! The output is only written once everything else has succeeded, and then
//! through a temporary file that replaces the output path when complete,
//! so a failed run leaves no output behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::dom::{Element, parse_document, write_document};
use crate::error::{Error, Location, Result};
use crate::library::FragmentLibrary;
use crate::reference::parse_reference;
use crate::title_page::{TitleMetadata, insert_title_page, title_page};
use crate::util::read_input;

/// Stylesheet href that only exists for authoring the skeleton.
pub const DEFAULT_STRIP_HREF: &str = "include/skel_styles.css";

/// Class that marks a `div` as a placeholder.
pub const DEFAULT_PLACEHOLDER_CLASS: &str = "bsp_block";

/// Settings for a recombination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecombineOptions {
    pub skeleton: PathBuf,
    pub library: PathBuf,
    pub output: PathBuf,
    /// Generate and insert a title page.
    pub title_page: bool,
    /// `href` of the stylesheet link removed from `<head>`.
    pub strip_href: String,
    pub placeholder_class: String,
}

impl Default for RecombineOptions {
    fn default() -> Self {
        Self {
            skeleton: PathBuf::from("skeleton.xhtml"),
            library: PathBuf::from("bsps.xhtml"),
            output: PathBuf::from("recombined.xhtml"),
            title_page: true,
            strip_href: DEFAULT_STRIP_HREF.to_string(),
            placeholder_class: DEFAULT_PLACEHOLDER_CLASS.to_string(),
        }
    }
}

impl RecombineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skeleton(mut self, path: impl Into<PathBuf>) -> Self {
        self.skeleton = path.into();
        self
    }

    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.library = path.into();
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn with_title_page(mut self, enabled: bool) -> Self {
        self.title_page = enabled;
        self
    }

    pub fn with_strip_href(mut self, href: impl Into<String>) -> Self {
        self.strip_href = href.into();
        self
    }

    pub fn with_placeholder_class(mut self, class: impl Into<String>) -> Self {
        self.placeholder_class = class.into();
        self
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecombineReport {
    /// `<head>` nodes removed as build-only metadata.
    pub stripped: usize,
    pub title_page: bool,
    pub placeholders: usize,
    /// Fragment nodes inserted, counting repeats.
    pub fragments: usize,
}

/// Run the whole pipeline described by `options`.
pub fn run(options: &RecombineOptions) -> Result<RecombineReport> {
    info!(skeleton = %options.skeleton.display(), "reading skeleton");
    let source = read_input(&options.skeleton)?;
    let mut skeleton = parse_document(&source, &options.skeleton)?;

    let mut report = prepare_skeleton(&mut skeleton, options)?;

    info!(library = %options.library.display(), "reading fragment library");
    let library = FragmentLibrary::load(&options.library)?;

    let mut recombiner = Recombiner::new(&library).with_placeholder_class(&options.placeholder_class);
    let merged = recombiner.recombine(&skeleton)?;
    report.placeholders = recombiner.placeholders();
    report.fragments = recombiner.fragments();

    write_output(&merged, &options.output)?;
    info!(
        output = %options.output.display(),
        placeholders = report.placeholders,
        fragments = report.fragments,
        "wrote recombined document"
    );
    Ok(report)
}

/// Strip build-only metadata and, if enabled, insert the title page.
///
/// The returned report has `stripped` and `title_page` filled in.
pub fn prepare_skeleton(skeleton: &mut Element, options: &RecombineOptions) -> Result<RecombineReport> {
    let stripped = strip_build_metadata(skeleton, &options.strip_href);

    let title_page_inserted = if options.title_page {
        let meta = TitleMetadata::from_document(skeleton)?;
        insert_title_page(skeleton, title_page(&meta))?;
        true
    } else {
        false
    };

    Ok(RecombineReport {
        stripped,
        title_page: title_page_inserted,
        ..RecombineReport::default()
    })
}

/// Remove every `<script>` and the `<link>` pointing at `strip_href` from
/// the document's `<head>`. Returns the number of removed nodes.
///
/// Removed nodes take their tail text with them.
pub fn strip_build_metadata(root: &mut Element, strip_href: &str) -> usize {
    let Some(head) = root.find_xhtml_mut("head") else {
        return 0;
    };

    let before = head.children.len();
    head.children.retain(|child| {
        let is_script = child.name.is_xhtml("script");
        let is_build_link = child.name.is_xhtml("link") && child.attr("href") == Some(strip_href);
        !(is_script || is_build_link)
    });

    let removed = before - head.children.len();
    debug!(removed, "stripped build-only head metadata");
    removed
}

/// Serialize `root` and write it to `path`.
///
/// The bytes go to a temporary file in the same directory, which is renamed
/// over `path` once complete. `path` is never left half-written.
pub fn write_output(root: &Element, path: &Path) -> Result<()> {
    let bytes = write_document(root)?;
    let write_error = |source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(&bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    set_output_permissions(&file).map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// Temporary files are created owner-only; outputs get the usual mode.
#[cfg(unix)]
fn set_output_permissions(file: &NamedTempFile) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.as_file().set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_output_permissions(_file: &NamedTempFile) -> std::io::Result<()> {
    Ok(())
}

/// Copies a skeleton tree, expanding placeholders from a fragment library.
pub struct Recombiner<'a> {
    library: &'a FragmentLibrary,
    placeholder_class: &'a str,
    /// Child indices from the root to the node being copied.
    trail: Vec<usize>,
    placeholders: usize,
    fragments: usize,
}

impl<'a> Recombiner<'a> {
    pub fn new(library: &'a FragmentLibrary) -> Self {
        Self {
            library,
            placeholder_class: DEFAULT_PLACEHOLDER_CLASS,
            trail: Vec::new(),
            placeholders: 0,
            fragments: 0,
        }
    }

    pub fn with_placeholder_class(mut self, class: &'a str) -> Self {
        self.placeholder_class = class;
        self
    }

    /// Placeholders expanded by the last [`recombine`](Self::recombine) call.
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    /// Fragments inserted by the last [`recombine`](Self::recombine) call.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Check whether `element` is a placeholder block.
    pub fn is_placeholder(&self, element: &Element) -> bool {
        element.name.is_xhtml("div") && element.has_class(self.placeholder_class)
    }

    /// Build a new tree equal to `root` except that each placeholder is
    /// replaced, in place, by clones of the fragments it references.
    ///
    /// The first resolution failure aborts the copy.
    pub fn recombine(&mut self, root: &Element) -> Result<Element> {
        self.trail.clear();
        self.placeholders = 0;
        self.fragments = 0;

        let mut out = root.shallow_clone();
        self.copy_children(root, root, &mut out)?;
        Ok(out)
    }

    fn copy_children(&mut self, root: &Element, source: &Element, out: &mut Element) -> Result<()> {
        out.children.reserve(source.children.len());

        for (index, child) in source.children.iter().enumerate() {
            self.trail.push(index);
            if self.is_placeholder(child) {
                let fragments = self.expand(root, child)?;
                out.children.extend(fragments);
            } else {
                let mut copy = child.shallow_clone();
                self.copy_children(root, child, &mut copy)?;
                out.children.push(copy);
            }
            self.trail.pop();
        }
        Ok(())
    }

    /// Resolve a placeholder to independent copies of its fragments.
    ///
    /// The last copy takes over the placeholder's tail so the text that
    /// followed the placeholder stays where it was.
    fn expand(&mut self, root: &Element, placeholder: &Element) -> Result<Vec<Element>> {
        let expression = placeholder.text.as_deref().unwrap_or_default().trim();

        let reference = parse_reference(expression).map_err(|e| Error::InvalidRangeExpression {
            expression: expression.to_string(),
            reason: e.to_string(),
            location: self.location(root, placeholder),
        })?;

        // Ids are looked up as they are generated, so a range reaching far
        // past the library fails at its first unknown member.
        let mut fragments = Vec::new();
        for id in reference.ids() {
            let Some(fragment) = self.library.get(&id) else {
                return Err(Error::UnknownFragmentId {
                    id,
                    location: self.location(root, placeholder),
                });
            };
            fragments.push(fragment.clone());
        }
        if let Some(last) = fragments.last_mut() {
            last.tail = placeholder.tail.clone();
        }

        debug!(expression, count = fragments.len(), line = placeholder.line, "expanded placeholder");
        self.placeholders += 1;
        self.fragments += fragments.len();
        Ok(fragments)
    }

    fn location(&self, root: &Element, placeholder: &Element) -> Location {
        Location {
            line: placeholder.line,
            path: root.path_to(&self.trail),
        }
    }
}
