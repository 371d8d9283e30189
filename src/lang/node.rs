use super::function::FunctionTree;
use crate::frontend::source::SourceRange;

/// Expression node.
///
/// Every child is owned by exactly one parent; recursion goes through `Box`
/// or `Vec`, so trees never share nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // ───────────────────────────── Leaves ─────────────────────────────
    /// Reference to a variable: `a`.
    Name { range: SourceRange },

    /// Base-10 integer literal: `42`. The digits are kept unparsed.
    IntegerLiteral { digits: SourceRange },

    /// `null`.
    Null { range: SourceRange },

    // ─────────────────────────── Compound ─────────────────────────────
    /// Function application: `call f(a, b)`.
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// Prefix operator: `-a`, `!a`, `~a`.
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        location: SourceRange,
    },

    /// Infix arithmetic: `a + b`. `location` is the operator token.
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        location: SourceRange,
    },

    /// Function literal: `function (a, b) { return a }`.
    Function {
        function: FunctionTree,
        location: SourceRange,
    },
}

impl Expression {
    /// Where to point diagnostics about this expression.
    pub fn location(&self) -> SourceRange {
        match self {
            Expression::Name { range } => *range,
            Expression::IntegerLiteral { digits } => *digits,
            Expression::Null { range } => *range,
            Expression::Call { callee, .. } => callee.location(),
            Expression::Unary { location, .. } => *location,
            Expression::Binary { location, .. } => *location,
            Expression::Function { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `-`
    Negate,
    /// `!`
    Not,
    /// `~`
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `var name = initializer`
    Declaration {
        name: String,
        initializer: Expression,
    },

    /// `return value`
    Return { value: Expression },

    /// `target = value`
    Assignment { target: Expression, value: Expression },

    /// An expression evaluated for its effect, typically a `call`.
    Expression { value: Expression },
}
