//! # bsp-recombine
//!
//! Merge a skeleton XHTML document with a library of reusable
//! "bog-standard paragraphs" (BSPs).
//!
//! The skeleton marks where boilerplate goes with placeholder blocks:
//!
//! ```xml
//! <div class="bsp_block">bsp3…bsp6</div>
//! ```
//!
//! Each placeholder is replaced by the referenced paragraphs from the
//! library, and a title page built from the skeleton's `<title>` and
//! author `<meta>` can be inserted at the top of the body.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bsp_recombine::{RecombineOptions, run};
//!
//! let options = RecombineOptions::new()
//!     .with_skeleton("chapter1.skeleton.xhtml")
//!     .with_library("bsps.xhtml")
//!     .with_output("chapter1.xhtml");
//! let report = run(&options)?;
//! println!("expanded {} placeholders", report.placeholders);
//! # Ok::<(), bsp_recombine::Error>(())
//! ```
//!
//! ## In memory
//!
//! ```
//! use std::path::Path;
//! use bsp_recombine::{FragmentLibrary, Recombiner, parse_document, write_to_string};
//!
//! let library = FragmentLibrary::parse(
//!     r#"<html xmlns="http://www.w3.org/1999/xhtml"><div id="bsp1"><p>Hi.</p></div></html>"#,
//!     Path::new("bsps.xhtml"),
//! )?;
//! let skeleton = parse_document(
//!     r#"<body xmlns="http://www.w3.org/1999/xhtml"><div class="bsp_block">bsp1</div></body>"#,
//!     Path::new("skeleton.xhtml"),
//! )?;
//! let merged = Recombiner::new(&library).recombine(&skeleton)?;
//! assert!(write_to_string(&merged)?.contains("<p>Hi.</p>"));
//! # Ok::<(), bsp_recombine::Error>(())
//! ```

pub mod dom;
pub mod error;
pub mod library;
pub mod recombine;
pub mod reference;
pub mod title_page;
pub(crate) mod util;

pub use dom::{Element, QName, XHTML_NS, parse_document, write_document, write_to_string};
pub use error::{Error, Location, Result};
pub use library::FragmentLibrary;
pub use recombine::{RecombineOptions, RecombineReport, Recombiner, run};
pub use reference::{Reference, parse_reference};
pub use title_page::{TitleMetadata, title_page};
