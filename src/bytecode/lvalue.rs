use crate::bytecode::local_frame::{LocalFrame, Slot};
use crate::frontend::source::Source;
use crate::lang::node::Expression;

/// Where an assignment can store its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Local(Slot),
    NotAddressable,
}

/// Resolves `expression` as an assignment target.
///
/// Only names that are bound in `frame` are addressable. Never touches the
/// frame or the tree.
pub fn resolve(expression: &Expression, frame: &LocalFrame, source: &Source<'_>) -> Reference {
    match expression {
        Expression::Name { range } => match frame.lookup(source.slice(*range)) {
            Some(slot) => Reference::Local(slot),
            None => Reference::NotAddressable,
        },
        Expression::IntegerLiteral { .. }
        | Expression::Null { .. }
        | Expression::Call { .. }
        | Expression::Unary { .. }
        | Expression::Binary { .. }
        | Expression::Function { .. } => Reference::NotAddressable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::source::SourceRange;
    use crate::lang::function::FunctionTree;

    #[test]
    fn test_bound_name_is_local() {
        let source = Source::new("a b");
        let mut frame = LocalFrame::new();
        frame.allocate("x");
        frame.allocate("b");
        let name = Expression::Name {
            range: SourceRange::new(2, 3),
        };
        assert_eq!(resolve(&name, &frame, &source), Reference::Local(1));
    }

    #[test]
    fn test_unbound_name_is_not_addressable() {
        let source = Source::new("a");
        let frame = LocalFrame::new();
        let name = Expression::Name {
            range: SourceRange::new(0, 1),
        };
        assert_eq!(resolve(&name, &frame, &source), Reference::NotAddressable);
    }

    #[test]
    fn test_other_expressions_are_not_addressable() {
        let source = Source::new("f 1 null");
        let mut frame = LocalFrame::new();
        frame.allocate("f");
        let callee = Expression::Name {
            range: SourceRange::new(0, 1),
        };
        let cases = vec![
            Expression::IntegerLiteral {
                digits: SourceRange::new(2, 3),
            },
            Expression::Null {
                range: SourceRange::new(4, 8),
            },
            Expression::Call {
                callee: Box::new(callee.clone()),
                arguments: Vec::new(),
            },
            Expression::Function {
                function: FunctionTree::default(),
                location: SourceRange::new(0, 1),
            },
        ];
        for expression in &cases {
            assert_eq!(resolve(expression, &frame, &source), Reference::NotAddressable);
        }
        assert_eq!(frame.slot_count(), 1);
    }
}
