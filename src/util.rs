//! Input decoding and source-position helpers.

use std::borrow::Cow;
use std::io;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use memchr::{memchr, memchr_iter, memmem};

use crate::error::{Error, Result};

/// Read an input file and decode it to a string.
///
/// A missing file is reported as [`Error::InputNotFound`] so the CLI can
/// tell the operator which input is absent.
pub fn read_input(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::ReadInput {
            path: path.to_path_buf(),
            source,
        },
    })?;

    Ok(decode_input(&bytes).into_owned())
}

/// Decode an input document.
///
/// A byte order mark wins, then the encoding named in the XML declaration.
/// Undeclared input is UTF-8, read as Windows-1252 when it is not valid
/// UTF-8 (hand-edited skeletons are often saved that way).
fn decode_input(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return encoding.decode_without_bom_handling(&bytes[bom_len..]).0;
    }
    if let Some(encoding) = declared_encoding(bytes).filter(|&e| e != UTF_8) {
        return encoding.decode_without_bom_handling(bytes).0;
    }
    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text,
        None => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

/// The encoding named by a leading `<?xml ... encoding="..."?>`.
///
/// A UTF-16 label in an ASCII-readable declaration is treated as UTF-8.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    let decl = &decl[..memmem::find(decl, b"?>")?];

    let at = memmem::find(decl, b"encoding")?;
    let value = decl[at + b"encoding".len()..]
        .trim_ascii_start()
        .strip_prefix(b"=")?
        .trim_ascii_start();
    let (&quote, rest) = value.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let label = &rest[..memchr(quote, rest)?];

    Encoding::for_label(label).map(Encoding::output_encoding)
}

/// 1-based line number of a byte offset in `source`.
///
/// Offsets past the end clamp to the last line.
pub fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    memchr_iter(b'\n', &source.as_bytes()[..end]).count() + 1
}
