pub mod compile;
pub mod disasm;
pub mod ir;
pub mod local_frame;
pub mod lvalue;
pub mod op;
pub mod serialize;

pub use ir::{CompiledFunction, Unit};
pub use op::{Instruction, Opcode};
