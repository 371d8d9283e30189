use super::node::Statement;

/// Source form of a function: named parameters and an ordered body.
///
/// A compiled source file is one parameterless `FunctionTree`; function
/// literals nest further trees inside expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionTree {
    pub parameters: Vec<String>,
    pub body: Vec<Statement>,
}

impl FunctionTree {
    pub fn new(parameters: Vec<String>, body: Vec<Statement>) -> Self {
        FunctionTree { parameters, body }
    }
}
