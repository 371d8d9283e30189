use crate::{
    bytecode::{
        CompiledFunction, Instruction, Opcode, Unit,
        local_frame::{LocalFrame, Slot},
        lvalue::{self, Reference},
        op::Argument,
    },
    compile_error::CompileError,
    frontend::source::{Source, SourceRange},
    lang::{
        function::FunctionTree,
        node::{BinaryOperator, Expression, Statement, UnaryOperator},
    },
};

/// Lowers a parsed [`FunctionTree`] to a [`Unit`].
///
/// Every function, the top-level one included, is laid out as
/// `allocate N`, body, `deallocate N` where `N` is the final size of its
/// [`LocalFrame`]. Expressions are evaluated into an explicit destination
/// slot; temporaries are fresh slots.
pub struct Compiler<'s> {
    source: &'s Source<'s>,

    /// Output functions, indexed as referenced by `set_function`.
    functions: Vec<CompiledFunction>,
}

/// Per-function generation state, dropped once the function is emitted.
struct FunctionState {
    frame: LocalFrame,
    body: Vec<Instruction>,
}

impl FunctionState {
    fn new() -> Self {
        Self {
            frame: LocalFrame::new(),
            body: Vec::new(),
        }
    }

    fn emit(&mut self, opcode: Opcode, arguments: &[Argument]) {
        self.body.push(Instruction::new(opcode, arguments));
    }
}

impl<'s> Compiler<'s> {
    pub fn new(source: &'s Source<'s>) -> Self {
        Self {
            source,
            functions: Vec::new(),
        }
    }

    pub fn compile_unit(mut self, tree: &FunctionTree) -> Result<Unit, CompileError> {
        self.compile_function(tree)?;
        Ok(Unit::new(self.functions))
    }

    /// Compiles `tree` into the next free function index and returns it.
    ///
    /// The index is reserved before the body is generated, so nested
    /// function literals are numbered after their parent.
    fn compile_function(&mut self, tree: &FunctionTree) -> Result<Argument, CompileError> {
        let index = self.functions.len();
        self.functions.push(CompiledFunction::default());

        let mut state = FunctionState::new();
        for parameter in &tree.parameters {
            state.frame.allocate(parameter);
        }

        for statement in &tree.body {
            self.compile_statement(statement, &mut state)?;
        }

        let slot_count = state.frame.slot_count();
        let mut instructions = Vec::with_capacity(state.body.len() + 2);
        instructions.push(Instruction::new(Opcode::Allocate, &[slot_count]));
        instructions.extend(state.body);
        instructions.push(Instruction::new(Opcode::Deallocate, &[slot_count]));

        log::debug!(
            "function {}: {} slots, {} instructions",
            index,
            slot_count,
            instructions.len()
        );
        self.functions[index] = CompiledFunction::new(slot_count, instructions);
        Ok(index as Argument)
    }

    fn compile_statement(
        &mut self,
        statement: &Statement,
        state: &mut FunctionState,
    ) -> Result<(), CompileError> {
        match statement {
            Statement::Declaration { name, initializer } => {
                // The initializer still sees any earlier binding of `name`.
                let slot = state.frame.allocate_temporary();
                self.compile_expression(initializer, slot, state)?;
                state.frame.bind(name, slot);
                Ok(())
            }

            Statement::Return { value } => {
                let scratch = state.frame.allocate_temporary();
                self.compile_expression(value, scratch, state)?;
                state.emit(Opcode::Return, &[scratch]);
                Ok(())
            }

            Statement::Assignment { target, value } => {
                let slot = match lvalue::resolve(target, &state.frame, self.source) {
                    Reference::Local(slot) => slot,
                    Reference::NotAddressable => return Err(self.not_assignable(target)),
                };
                // The target may be read by `value`, so it is overwritten last.
                let scratch = state.frame.allocate_temporary();
                self.compile_expression(value, scratch, state)?;
                state.emit(Opcode::Copy, &[slot, scratch]);
                Ok(())
            }

            Statement::Expression { value } => {
                let scratch = state.frame.allocate_temporary();
                self.compile_expression(value, scratch, state)
            }
        }
    }

    fn not_assignable(&self, target: &Expression) -> CompileError {
        match target {
            Expression::Name { range } => self.unknown_identifier(*range),
            _ => CompileError::new("Expression is not assignable", target.location()),
        }
    }

    fn unknown_identifier(&self, range: SourceRange) -> CompileError {
        CompileError::new(
            format!("Unknown identifier '{}'", self.source.slice(range)),
            range,
        )
    }

    /// Emits code leaving the value of `expression` in `destination`.
    fn compile_expression(
        &mut self,
        expression: &Expression,
        destination: Slot,
        state: &mut FunctionState,
    ) -> Result<(), CompileError> {
        match expression {
            Expression::Name { range } => {
                let slot = state
                    .frame
                    .lookup(self.source.slice(*range))
                    .ok_or_else(|| self.unknown_identifier(*range))?;
                state.emit(Opcode::Copy, &[destination, slot]);
            }

            Expression::IntegerLiteral { digits } => {
                let value: u64 = self.source.slice(*digits).parse().map_err(|_| {
                    CompileError::new("Integer literal out of range", *digits)
                })?;
                state.emit(Opcode::SetFromConstant, &[destination, value]);
            }

            Expression::Null { .. } => {
                state.emit(Opcode::SetNull, &[destination]);
            }

            Expression::Call { callee, arguments } => {
                // Callee and arguments sit in consecutive slots: f, f+1 ..= f+n.
                let count = arguments.len() as Argument;
                let base = state.frame.allocate_temporaries(1 + count);
                self.compile_expression(callee, base, state)?;
                for (offset, argument) in (1..).zip(arguments) {
                    self.compile_expression(argument, base + offset, state)?;
                }
                state.emit(Opcode::Call, &[base, count]);
                state.emit(Opcode::Copy, &[destination, base]);
            }

            Expression::Unary {
                operator, operand, ..
            } => {
                self.compile_expression(operand, destination, state)?;
                match operator {
                    UnaryOperator::Negate => state.emit(Opcode::Negate, &[destination]),
                    UnaryOperator::Not => state.emit(Opcode::Not, &[destination]),
                    UnaryOperator::Invert => {
                        let mask = state.frame.allocate_temporary();
                        state.emit(Opcode::SetFromConstant, &[mask, u64::MAX]);
                        state.emit(Opcode::Xor, &[destination, mask]);
                    }
                }
            }

            Expression::Binary {
                operator,
                left,
                right,
                ..
            } => {
                self.compile_expression(left, destination, state)?;
                let rhs = state.frame.allocate_temporary();
                self.compile_expression(right, rhs, state)?;
                match operator {
                    BinaryOperator::Add => state.emit(Opcode::Add, &[destination, rhs]),
                    BinaryOperator::Subtract => {
                        state.emit(Opcode::Negate, &[rhs]);
                        state.emit(Opcode::Add, &[destination, rhs]);
                    }
                    BinaryOperator::Multiply => state.emit(Opcode::Mul, &[destination, rhs]),
                    BinaryOperator::Divide => state.emit(Opcode::Div, &[destination, rhs]),
                }
            }

            Expression::Function { function, .. } => {
                let index = self.compile_function(function)?;
                state.emit(Opcode::SetFunction, &[destination, index]);
            }
        }

        Ok(())
    }
}
