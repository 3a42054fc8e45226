//! End-to-end recombination runs against the fixtures in `tests/fixtures`.

use std::fs;
use std::path::{Path, PathBuf};

use bsp_recombine::recombine::{DEFAULT_STRIP_HREF, strip_build_metadata};
use bsp_recombine::{Element, Error, RecombineOptions, parse_document, run, write_document};
use tempfile::TempDir;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn options(dir: &TempDir) -> RecombineOptions {
    RecombineOptions::new()
        .with_skeleton(fixture_path("skeleton.xhtml"))
        .with_library(fixture_path("bsps.xhtml"))
        .with_output(dir.path().join("recombined.xhtml"))
}

fn read_output(path: &Path) -> Element {
    let source = fs::read_to_string(path).expect("output should exist");
    parse_document(&source, path).expect("output should parse")
}

fn body(root: &Element) -> &Element {
    root.find_xhtml("body").expect("body")
}

/// Write a skeleton into the temp dir with the given body content.
fn write_skeleton(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("skeleton.xhtml");
    fs::write(
        &path,
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Example</title><meta name="author" content="Jane Doe"/></head>
<body>{body}</body>
</html>"#
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_full_run() {
    let dir = TempDir::new().unwrap();
    let options = options(&dir);

    let report = run(&options).expect("run should succeed");
    assert_eq!(report.stripped, 2);
    assert!(report.title_page);
    assert_eq!(report.placeholders, 3);
    assert_eq!(report.fragments, 7);

    let out = read_output(&options.output);
    let texts: Vec<String> = body(&out)
        .children
        .iter()
        .map(Element::text_content)
        .collect();
    assert_eq!(
        texts[1..],
        [
            "Chapter One",
            "An opening paragraph with mixed content & an entity.",
            "Keep all receipts.",
            "Lists",
            "Read the manual before calling.",
            "Keep all receipts.",
            "Ranges",
            "Third.",
            "Fourth.",
            "Fifth.",
            "Sixth.",
            "Closing words.",
        ]
    );
}

#[test]
fn test_output_has_declaration_and_default_namespace() {
    let dir = TempDir::new().unwrap();
    let options = options(&dir);
    run(&options).unwrap();

    let text = fs::read_to_string(&options.output).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html "));
    assert!(text.contains(r#"xmlns="http://www.w3.org/1999/xhtml""#));
    assert!(text.contains(r#"xml:lang="en""#));
    assert!(!text.contains("<html:"));
    assert!(!text.contains("bsp_block"));
    assert!(text.contains("&amp; an entity"));
}

#[test]
fn test_title_page_present() {
    let dir = TempDir::new().unwrap();
    let options = options(&dir);
    run(&options).unwrap();

    let out = read_output(&options.output);
    let first = &body(&out).children[0];
    assert_eq!(first.attr("id"), Some("title_page"));
    let text = first.text_content();
    assert!(text.contains("Example"));
    assert!(text.contains("Jane Doe"));
}

#[test]
fn test_title_page_suppressed() {
    let dir = TempDir::new().unwrap();
    let options = options(&dir).with_title_page(false);
    let report = run(&options).unwrap();
    assert!(!report.title_page);

    let out = read_output(&options.output);
    let first = &body(&out).children[0];
    assert!(first.name.is_xhtml("h2"));
    assert_eq!(first.text_content(), "Chapter One");
    assert!(out.iter().all(|e| e.attr("id") != Some("title_page")));
}

#[test]
fn test_stripping_invariant() {
    let dir = TempDir::new().unwrap();
    for title_page in [true, false] {
        let options = options(&dir).with_title_page(title_page);
        run(&options).unwrap();

        let out = read_output(&options.output);
        let head = out.find_xhtml("head").unwrap();
        assert!(head.children.iter().all(|c| !c.name.is_xhtml("script")));
        assert!(
            head.children
                .iter()
                .all(|c| c.attr("href") != Some(DEFAULT_STRIP_HREF))
        );
        assert!(
            head.children
                .iter()
                .any(|c| c.attr("href") == Some("css/book.css"))
        );
    }
}

#[test]
fn test_passthrough_is_identical_minus_stripped_nodes() {
    let dir = TempDir::new().unwrap();
    let skeleton = fixture_path("passthrough.xhtml");
    let options = options(&dir)
        .with_skeleton(&skeleton)
        .with_title_page(false);
    run(&options).unwrap();

    let source = fs::read_to_string(&skeleton).unwrap();
    let mut expected = parse_document(&source, &skeleton).unwrap();
    assert_eq!(strip_build_metadata(&mut expected, DEFAULT_STRIP_HREF), 2);

    assert_eq!(
        fs::read(&options.output).unwrap(),
        write_document(&expected).unwrap()
    );
}

#[test]
fn test_unknown_id_writes_no_output() {
    let dir = TempDir::new().unwrap();
    let skeleton = write_skeleton(
        &dir,
        r#"<div class="bsp_block">bsp1</div><div class="bsp_block">bsp99</div>"#,
    );
    let options = options(&dir).with_skeleton(skeleton);

    match run(&options).unwrap_err() {
        Error::UnknownFragmentId { id, location } => {
            assert_eq!(id, "bsp99");
            assert_eq!(location.line, Some(4));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!options.output.exists());
}

#[test]
fn test_invalid_range_writes_no_output() {
    let dir = TempDir::new().unwrap();
    let skeleton = write_skeleton(&dir, r#"<div class="bsp_block">bsp1…bsp2…bsp3</div>"#);
    let options = options(&dir).with_skeleton(skeleton);

    let err = run(&options).unwrap_err();
    assert!(matches!(err, Error::InvalidRangeExpression { .. }), "{err:?}");
    assert!(!options.output.exists());
}

#[test]
fn test_reused_fragment_instances_are_independent() {
    let dir = TempDir::new().unwrap();
    let skeleton = write_skeleton(
        &dir,
        r#"<div class="bsp_block">bsp1</div><div class="bsp_block">bsp1</div>"#,
    );
    let options = options(&dir).with_skeleton(skeleton).with_title_page(false);
    run(&options).unwrap();

    let mut out = read_output(&options.output);
    let body = out.find_xhtml_mut("body").unwrap();
    assert_eq!(body.children.len(), 2);
    body.children[0].set_attr("class", "edited");
    assert_eq!(body.children[1].attr("class"), Some("bsp"));
}

#[test]
fn test_missing_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skeleton.xhtml");
    fs::write(
        &path,
        r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head><body/></html>"#,
    )
    .unwrap();

    let options = options(&dir).with_skeleton(&path);
    assert!(matches!(run(&options), Err(Error::MissingMetadata(_))));
    assert!(!options.output.exists());

    run(&options.with_title_page(false)).expect("no metadata needed without a title page");
}

#[test]
fn test_missing_inputs() {
    let dir = TempDir::new().unwrap();

    let no_skeleton = options(&dir).with_skeleton(dir.path().join("nope.xhtml"));
    match run(&no_skeleton).unwrap_err() {
        Error::InputNotFound { path } => assert!(path.ends_with("nope.xhtml")),
        other => panic!("unexpected error: {other:?}"),
    }

    let no_library = options(&dir).with_library(dir.path().join("missing-bsps.xhtml"));
    assert!(matches!(run(&no_library), Err(Error::InputNotFound { .. })));
    assert!(!no_library.output.exists());
}

#[test]
fn test_malformed_inputs() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.xhtml");
    fs::write(&broken, "<html xmlns=\"http://www.w3.org/1999/xhtml\"><body></html>").unwrap();

    let err = run(&options(&dir).with_skeleton(&broken)).unwrap_err();
    match err {
        Error::MalformedDocument { path, .. } => assert_eq!(path, broken),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = run(&options(&dir).with_library(&broken)).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { .. }));
}

#[test]
fn test_output_into_missing_directory_names_the_path() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("no_such_dir").join("out.xhtml");
    let options = options(&dir).with_output(&output);

    let err = run(&options).unwrap_err();
    assert!(matches!(err, Error::WriteOutput { .. }), "{err:?}");
    assert!(err.to_string().contains("out.xhtml"), "{err}");
    assert!(!output.exists());
}

#[test]
fn test_huge_range_reports_first_unknown_id() {
    let dir = TempDir::new().unwrap();
    let skeleton = write_skeleton(&dir, r#"<div class="bsp_block">bsp1…bsp99999999999</div>"#);
    let options = options(&dir).with_skeleton(skeleton);

    match run(&options).unwrap_err() {
        Error::UnknownFragmentId { id, .. } => assert_eq!(id, "bsp7"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!options.output.exists());
}
