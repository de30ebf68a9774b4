use weather_query_diagnostics::Span;

/// An argument token that borrows its text from the query line.
///
/// `text` is always exactly `&line[start..end]`. A quoted argument keeps its
/// quote characters and inner spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Borrowed slice of the line.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token<'_> {
    /// Source span of this token.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Split a query line into argument tokens.
///
/// The line is split on single spaces. A segment starting with `"` opens a
/// quoted run and a segment ending with `"` closes it (both checks apply to
/// the same segment, in that order); while a run is open the following
/// segments are joined to the current token. Empty tokens are dropped.
/// Embedded quotes cannot be escaped.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut toks: Vec<Token<'_>> = Vec::new();
    let mut open = false;
    let mut start = 0usize;
    for seg in line.split(' ') {
        let end = start + seg.len();
        if open && let Some(last) = toks.last_mut() {
            last.end = end;
            last.text = &line[last.start..end];
        } else {
            toks.push(Token {
                text: seg,
                start,
                end,
            });
        }
        if seg.starts_with('"') {
            open = true;
        }
        if seg.ends_with('"') {
            open = false;
        }
        start = end + 1;
    }
    toks.retain(|t| !t.text.is_empty());
    toks
}

/// Whether the line ends in a separator, i.e. the last token is complete.
pub fn ends_with_separator(line: &str) -> bool {
    line.ends_with(' ')
}

/// Whether a double-quoted argument is still open (odd number of `"`).
pub fn has_open_quote(line: &str) -> bool {
    line.bytes().filter(|&b| b == b'"').count() % 2 == 1
}
