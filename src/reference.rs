//! Placeholder reference expressions.
//!
//! A placeholder's text names the fragments that replace it:
//!
//! - `bsp12`: a single fragment
//! - `bsp1 bsp4, bsp9`: explicit ids, separated by whitespace or commas
//! - `bsp3…bsp6`: the inclusive range `bsp3 bsp4 bsp5 bsp6`
//!
//! Explicit ids may sit on either side of a range (`bsp1 bsp3…bsp6 bsp9`).
//! An id's number is its trailing run of ASCII digits and everything before
//! it is the prefix; both ends of a range must share the prefix.

use thiserror::Error;

/// Separator between the two ends of a range.
pub const RANGE_SEPARATOR: char = '…';

/// Why a reference expression could not be resolved to ids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("no fragment ids given")]
    Empty,

    #[error("more than one `…` range separator")]
    TooManyRanges,

    #[error("range has no {0} id")]
    MissingBound(&'static str),

    #[error("`{0}` does not end in a number")]
    NotNumbered(String),

    #[error("range ends `{start}` and `{end}` have different prefixes")]
    PrefixMismatch { start: String, end: String },

    #[error("range end {end} is below its start {start}")]
    Descending { start: u64, end: u64 },

    #[error("number in `{0}` is too large")]
    NumberTooLarge(String),
}

/// A parsed reference expression.
///
/// Range members are produced on demand by [`ids`](Self::ids), so a
/// range is never materialized up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    leading: Vec<String>,
    range: Option<IdRange>,
    trailing: Vec<String>,
}

/// `start…end` with both ends split into prefix and number.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IdRange {
    start: String,
    prefix: String,
    first: u64,
    last: u64,
}

impl Reference {
    /// Fragment ids in the order they replace the placeholder.
    pub fn ids(&self) -> impl Iterator<Item = String> + '_ {
        let range = self.range.iter().flat_map(|range| range.ids());
        self.leading
            .iter()
            .cloned()
            .chain(range)
            .chain(self.trailing.iter().cloned())
    }
}

impl IdRange {
    /// The start id exactly as written, then prefix + number up to `last`.
    fn ids(&self) -> impl Iterator<Item = String> + '_ {
        let rest = (self.first..self.last).map(|n| format!("{}{}", self.prefix, n + 1));
        std::iter::once(self.start.clone()).chain(rest)
    }
}

/// Parse a reference expression.
pub fn parse_reference(expression: &str) -> Result<Reference, ReferenceError> {
    let parts: Vec<&str> = expression.trim().split(RANGE_SEPARATOR).collect();

    match parts.as_slice() {
        [list] => {
            let leading: Vec<String> = tokens(list).map(str::to_string).collect();
            if leading.is_empty() {
                return Err(ReferenceError::Empty);
            }
            Ok(Reference {
                leading,
                range: None,
                trailing: Vec::new(),
            })
        }
        [before, after] => {
            let before: Vec<&str> = tokens(before).collect();
            let after: Vec<&str> = tokens(after).collect();
            let (start, leading) = before
                .split_last()
                .ok_or(ReferenceError::MissingBound("start"))?;
            let (end, trailing) = after
                .split_first()
                .ok_or(ReferenceError::MissingBound("end"))?;

            Ok(Reference {
                leading: leading.iter().map(|s| s.to_string()).collect(),
                range: Some(id_range(start, end)?),
                trailing: trailing.iter().map(|s| s.to_string()).collect(),
            })
        }
        _ => Err(ReferenceError::TooManyRanges),
    }
}

fn id_range(start: &str, end: &str) -> Result<IdRange, ReferenceError> {
    let (start_prefix, first) = split_numbered(start)?;
    let (end_prefix, last) = split_numbered(end)?;

    if start_prefix != end_prefix {
        return Err(ReferenceError::PrefixMismatch {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    if last < first {
        return Err(ReferenceError::Descending {
            start: first,
            end: last,
        });
    }

    Ok(IdRange {
        start: start.to_string(),
        prefix: start_prefix.to_string(),
        first,
        last,
    })
}

/// Split an id into its non-numeric prefix and trailing number.
fn split_numbered(id: &str) -> Result<(&str, u64), ReferenceError> {
    let prefix = id.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &id[prefix.len()..];
    if digits.is_empty() {
        return Err(ReferenceError::NotNumbered(id.to_string()));
    }
    let number = digits
        .parse()
        .map_err(|_| ReferenceError::NumberTooLarge(id.to_string()))?;
    Ok((prefix, number))
}

fn tokens(list: &str) -> impl Iterator<Item = &str> {
    list.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}
