use crate::frontend::scanner::Scanner;
use crate::frontend::source::Source;
use crate::frontend::token::{Token, TokenKind};

pub struct TokenDumper {
    pub color: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self { color: true }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const RED: &'static str = "\x1b[31m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn dump(&self, source: &Source<'_>) {
        print!("{}", self.format_tokens(source));
    }

    /// Scans the whole source, end-of-file token included, one line per token.
    pub fn format_tokens(&self, source: &Source<'_>) -> String {
        let mut scanner = Scanner::new(source);
        let mut output = String::new();
        loop {
            let token = scanner.next_token();
            output.push_str(&self.format_one(source, &token));
            output.push('\n');
            if token.kind == TokenKind::EndOfFile {
                break;
            }
        }
        output
    }

    fn format_one(&self, source: &Source<'_>, token: &Token) -> String {
        let (line, col) = source.line_col(token.content.begin);

        let kind = self.kind(token.kind);
        let colr = if self.color { self.color(token.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        format!(
            "[{:02}:{:02}] {}{:<8} '{}'{}",
            line,
            col,
            colr,
            kind,
            source.slice(token.content),
            reset
        )
    }

    fn kind(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            EndOfFile => "EOF",
            Invalid => "INVALID",

            Integer10 => "INT",
            Identifier => "IDENT",

            ParenthesisLeft | ParenthesisRight => "PAREN",
            BracketLeft | BracketRight => "BRACKET",
            BraceLeft | BraceRight => "BRACE",

            Assign | Comma | Plus | Minus | Star | Slash | Dot | ExclamationMark | Tilde => "OP",

            // everything else = keyword
            Var | Function | Return | Null | If | Else | While | Break | Continue | Call => {
                "KEYWORD"
            }
        }
    }

    fn color(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            EndOfFile => Self::DIM,
            Invalid => Self::RED,
            Integer10 | Null => Self::CYN,
            Identifier => Self::YEL,
            Assign | Comma | Plus | Minus | Star | Slash | Dot | ExclamationMark | Tilde => Self::MAG,
            _ => Self::RESET,
        }
    }
}
