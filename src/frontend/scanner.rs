use crate::frontend::source::{Source, SourceRange};
use crate::frontend::token::{Token, TokenKind};

/// Lazy tokenizer over a [`Source`].
///
/// Tokens are produced one at a time by [`Scanner::next_token`]. The scanner
/// never fails: characters outside the vocabulary come out as
/// `TokenKind::Invalid` and it is up to the parser to report them. Once the
/// input is exhausted every further call yields the same `EndOfFile` token.
pub struct Scanner<'s> {
    source: &'s Source<'s>,
    pos: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s Source<'s>) -> Self {
        Scanner { source, pos: 0 }
    }

    pub fn source(&self) -> &'s Source<'s> {
        self.source
    }

    fn bytes(&self) -> &'s [u8] {
        self.source.text().as_bytes()
    }

    fn current(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn eat_while(&mut self, accept: impl Fn(u8) -> bool) {
        while let Some(ch) = self.current() {
            if accept(ch) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token_from(&self, kind: TokenKind, begin: usize) -> Token {
        Token::new(kind, SourceRange::new(begin, self.pos))
    }

    fn read_word(&mut self, begin: usize) -> Token {
        self.eat_while(|ch| ch.is_ascii_alphanumeric() || ch == b'_');
        let word = &self.source.text()[begin..self.pos];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        self.token_from(kind, begin)
    }

    fn read_integer(&mut self, begin: usize) -> Token {
        self.eat_while(|ch| ch.is_ascii_digit());
        self.token_from(TokenKind::Integer10, begin)
    }

    fn read_invalid(&mut self, begin: usize) -> Token {
        // Swallow the whole character so ranges stay on UTF-8 boundaries.
        let width = self.source.text()[begin..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1);
        self.pos += width;
        self.token_from(TokenKind::Invalid, begin)
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let begin = self.pos;

        let Some(ch) = self.current() else {
            return Token::new(TokenKind::EndOfFile, SourceRange::point(self.bytes().len()));
        };

        if ch.is_ascii_alphabetic() || ch == b'_' {
            return self.read_word(begin);
        }
        if ch.is_ascii_digit() {
            return self.read_integer(begin);
        }

        let kind = match ch {
            b'(' => TokenKind::ParenthesisLeft,
            b')' => TokenKind::ParenthesisRight,
            b'{' => TokenKind::BraceLeft,
            b'}' => TokenKind::BraceRight,
            b'[' => TokenKind::BracketLeft,
            b']' => TokenKind::BracketRight,
            b'=' => TokenKind::Assign,
            b',' => TokenKind::Comma,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'.' => TokenKind::Dot,
            b'!' => TokenKind::ExclamationMark,
            b'~' => TokenKind::Tilde,
            _ => return self.read_invalid(begin),
        };
        self.pos += 1;
        self.token_from(kind, begin)
    }

    /// Discards input up to and including the next newline, or to the end.
    ///
    /// Only used to resynchronize after a syntax error.
    pub fn skip_line(&mut self) {
        let rest = &self.bytes()[self.pos..];
        let skipped = match rest.iter().position(|&b| b == b'\n') {
            Some(newline) => newline + 1,
            None => rest.len(),
        };
        log::trace!("scanner skips {} bytes at offset {}", skipped, self.pos);
        self.pos += skipped;
    }
}
