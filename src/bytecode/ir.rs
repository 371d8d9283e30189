use crate::bytecode::op::Instruction;
use serde::{Deserialize, Serialize};

/// A compiled bytecode unit: the compiler's final artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Convention: `functions[0]` is the top-level function of the source
    /// file; function literals follow in pre-order.
    pub functions: Vec<CompiledFunction>,
}

impl Unit {
    pub fn new(functions: Vec<CompiledFunction>) -> Self {
        Self { functions }
    }
}

/// A single compiled function: its instruction stream and frame size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledFunction {
    #[serde(with = "postcard::fixint::le")]
    pub slot_count: u64,
    pub instructions: Vec<Instruction>,
}

impl CompiledFunction {
    pub fn new(slot_count: u64, instructions: Vec<Instruction>) -> Self {
        Self {
            slot_count,
            instructions,
        }
    }
}
