use serde::{Deserialize, Serialize};

/// A date argument: a signed day index or an ISO `YYYY-MM-DD` literal.
///
/// Negative indexes count back from the last day, so `-1` is the last date
/// in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum DateToken {
    /// Relative position in the date-ordered sequence.
    Index(i64),
    /// Literal calendar date.
    Iso(String),
}

impl DateToken {
    /// Parse a date token.
    ///
    /// Ten-character strings must have the `YYYY-MM-DD` shape; anything of
    /// length 1–3 must be an integer (three characters only with a leading
    /// minus, as in `-10`).
    pub fn parse(text: &str) -> Option<Self> {
        match text.len() {
            10 if is_iso_date(text) => Some(DateToken::Iso(text.to_string())),
            1 | 2 => text.parse().ok().map(DateToken::Index),
            3 if text.starts_with('-') => text.parse().ok().map(DateToken::Index),
            _ => None,
        }
    }

    /// Position of this date in a sequence of `dates`.
    pub fn position(&self, dates: &[String]) -> Option<usize> {
        match self {
            DateToken::Index(i) => relative_index(*i, dates.len()),
            DateToken::Iso(d) => dates.iter().position(|x| x == d),
        }
    }
}

impl std::fmt::Display for DateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateToken::Index(i) => write!(f, "{i}"),
            DateToken::Iso(d) => f.write_str(d),
        }
    }
}

/// Map a signed index into `0..len`, counting negatives from the end.
pub fn relative_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let abs = if index < 0 { len + index } else { index };
    (0..len).contains(&abs).then(|| abs as usize)
}

/// Whether `s` has the `YYYY-MM-DD` shape (digits and dashes only, no
/// calendar check).
pub fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}
