use crate::frontend::source::SourceRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,

    // Keywords
    Var,
    Function,
    Return,
    Null,
    If,
    Else,
    While,
    Break,
    Continue,
    Call,

    // Literals
    Integer10,

    // Delimiters
    ParenthesisLeft,
    ParenthesisRight,
    BraceLeft,
    BraceRight,
    BracketLeft,
    BracketRight,

    // Operators
    Assign,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Dot,
    ExclamationMark,
    Tilde,

    // Special
    /// A character outside the vocabulary. The parser reports it when consumed.
    Invalid,
    EndOfFile,
}

impl TokenKind {
    /// Maps an identifier-shaped word to its keyword, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "null" => TokenKind::Null,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "call" => TokenKind::Call,
            _ => return None,
        })
    }

    /// Whether a statement can begin with this kind of token.
    pub fn starts_statement(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Var | Return
                | Identifier
                | Integer10
                | Null
                | Call
                | Function
                | ParenthesisLeft
                | Minus
                | ExclamationMark
                | Tilde
        ) || self.is_control_flow()
    }

    /// Keywords reserved for control flow that the grammar does not accept yet.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            TokenKind::If | TokenKind::Else | TokenKind::While | TokenKind::Break | TokenKind::Continue
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Var => "var",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Null => "null",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Call => "call",
            TokenKind::Integer10 => "integer",
            TokenKind::ParenthesisLeft => "(",
            TokenKind::ParenthesisRight => ")",
            TokenKind::BraceLeft => "{",
            TokenKind::BraceRight => "}",
            TokenKind::BracketLeft => "[",
            TokenKind::BracketRight => "]",
            TokenKind::Assign => "=",
            TokenKind::Comma => ",",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Dot => ".",
            TokenKind::ExclamationMark => "!",
            TokenKind::Tilde => "~",
            TokenKind::Invalid => "invalid character",
            TokenKind::EndOfFile => "EOF",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: SourceRange,
}

impl Token {
    pub fn new(kind: TokenKind, content: SourceRange) -> Self {
        Token { kind, content }
    }
}
