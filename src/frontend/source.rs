use std::borrow::Cow;

/// A half-open byte range `[begin, end)` into one [`Source`].
///
/// Ranges are plain values: tokens carry them as their content and errors
/// carry them as their location. Ordering follows the underlying positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceRange {
    pub begin: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end);
        SourceRange { begin, end }
    }

    /// Empty range at `at`, used for end-of-file.
    pub fn point(at: usize) -> Self {
        SourceRange { begin: at, end: at }
    }

}

/// Decodes raw file contents.
///
/// Bytes that are not valid UTF-8 become U+FFFD, which the scanner turns into
/// an invalid-character token at that position.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        log::warn!("source is not valid UTF-8, invalid bytes were replaced");
    }
    text
}

/// Immutable view over the text being compiled.
///
/// Keeps the byte offsets of every line start so that diagnostics and the
/// token dumper can turn a position into `line:col` without rescanning.
#[derive(Debug, Clone)]
pub struct Source<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0usize];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Source { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// The text covered by `range`.
    ///
    /// Ranges produced by the scanner always fall on character boundaries;
    /// anything else yields an empty string rather than a panic.
    pub fn slice(&self, range: SourceRange) -> &'a str {
        self.text.get(range.begin..range.end).unwrap_or("")
    }

    /// 0-based index of the line containing `pos`.
    ///
    /// Equal to the number of newline characters in front of `pos`.
    pub fn line_index(&self, pos: usize) -> usize {
        let pos = pos.min(self.text.len());
        match self.line_starts.binary_search(&pos) {
            Ok(i) => i,
            Err(i) => i - 1,
        }
    }

    /// Byte range of the physical line containing `pos`, without its newline.
    pub fn line_bounds(&self, pos: usize) -> SourceRange {
        let index = self.line_index(pos);
        let begin = self.line_starts[index];
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        SourceRange::new(begin, end)
    }

    /// 1-based `(line, col)` of `pos`; columns count bytes.
    pub fn line_col(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.text.len());
        let index = self.line_index(pos);
        (index + 1, pos - self.line_starts[index] + 1)
    }

    /// Whether a newline lies in `[from, to)`.
    pub fn has_newline_between(&self, from: usize, to: usize) -> bool {
        let to = to.min(self.text.len());
        from < to && self.text.as_bytes()[from..to].contains(&b'\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_counts_newlines() {
        let source = Source::new("var a = 1\nreturn a\n");
        assert_eq!(source.line_index(0), 0);
        assert_eq!(source.line_index(9), 0);
        assert_eq!(source.line_index(10), 1);
        assert_eq!(source.line_index(source.len()), 2);
    }

    #[test]
    fn test_line_bounds_exclude_newline() {
        let source = Source::new("ab\ncde\nf");
        assert_eq!(source.line_bounds(4), SourceRange::new(3, 6));
        assert_eq!(source.line_bounds(0), SourceRange::new(0, 2));
        assert_eq!(source.line_bounds(7), SourceRange::new(7, 8));
    }

    #[test]
    fn test_line_col_is_one_based() {
        let source = Source::new("x\n  y");
        assert_eq!(source.line_col(0), (1, 1));
        assert_eq!(source.line_col(4), (2, 3));
    }

    #[test]
    fn test_slice_and_ordering() {
        let source = Source::new("return value");
        let range = SourceRange::new(7, 12);
        assert_eq!(source.slice(range), "value");
        assert!(SourceRange::new(0, 6) < range);
        assert_eq!(SourceRange::point(3), SourceRange::new(3, 3));
    }

    #[test]
    fn test_decode_replaces_invalid_bytes() {
        assert!(matches!(decode(b"var a = 1"), Cow::Borrowed("var a = 1")));
        let text = decode(b"var a = \xff");
        assert_eq!(text, "var a = \u{fffd}");
    }

    #[test]
    fn test_has_newline_between() {
        let source = Source::new("a\nb");
        assert!(source.has_newline_between(0, 3));
        assert!(!source.has_newline_between(2, 3));
        assert!(!source.has_newline_between(3, 3));
    }
}
