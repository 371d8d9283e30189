use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// =============================================================================
// OPCODE - instruction kinds and their static metadata
// =============================================================================

/// Instruction argument word.
pub type Argument = u64;

/// Most arguments any opcode takes.
pub const MAX_ARGUMENTS: usize = 2;

/// Instruction kinds. The discriminant is the opcode's wire identifier.
///
/// Operands are frame slots unless noted. Binary operations are two-address:
/// `add d s` leaves `d + s` in `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Nothing = 0,
    /// `return s`: leave the function yielding slot `s`.
    Return = 1,
    /// `allocate n`: reserve `n` local slots.
    Allocate = 2,
    /// `deallocate n`: release `n` local slots.
    Deallocate = 3,
    /// `set_from_constant d value`: `value` is an immediate word.
    SetFromConstant = 4,
    SetNull = 5,
    /// `set_function d index`: `index` into the unit's function list.
    SetFunction = 6,
    Copy = 7,
    Add = 8,
    Mul = 9,
    Div = 10,
    Negate = 11,
    Not = 12,
    And = 13,
    Or = 14,
    Xor = 15,
    Equal = 16,
    Less = 17,
    Greater = 18,
    /// `call f n`: callee in `f`, arguments in `f+1 ..= f+n`, result in `f`.
    Call = 19,
}

/// Name and argument count of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub arity: usize,
}

const fn info(name: &'static str, arity: usize) -> OpcodeInfo {
    OpcodeInfo { name, arity }
}

/// Indexed by discriminant.
static OPCODE_INFO: [OpcodeInfo; Opcode::COUNT] = [
    info("nothing", 0),
    info("return", 1),
    info("allocate", 1),
    info("deallocate", 1),
    info("set_from_constant", 2),
    info("set_null", 1),
    info("set_function", 2),
    info("copy", 2),
    info("add", 2),
    info("mul", 2),
    info("div", 2),
    info("negate", 1),
    info("not", 1),
    info("and", 2),
    info("or", 2),
    info("xor", 2),
    info("equal", 2),
    info("less", 2),
    info("greater", 2),
    info("call", 2),
];

impl Opcode {
    pub const COUNT: usize = 20;

    pub const ALL: [Opcode; Opcode::COUNT] = [
        Opcode::Nothing,
        Opcode::Return,
        Opcode::Allocate,
        Opcode::Deallocate,
        Opcode::SetFromConstant,
        Opcode::SetNull,
        Opcode::SetFunction,
        Opcode::Copy,
        Opcode::Add,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Negate,
        Opcode::Not,
        Opcode::And,
        Opcode::Or,
        Opcode::Xor,
        Opcode::Equal,
        Opcode::Less,
        Opcode::Greater,
        Opcode::Call,
    ];

    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODE_INFO[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn arity(self) -> usize {
        self.info().arity
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Opcode> {
        Opcode::ALL.get(id as usize).copied()
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// INSTRUCTION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("opcode '{opcode}' takes {expected} argument(s), got {actual}")]
pub struct ArityError {
    pub opcode: Opcode,
    pub expected: usize,
    pub actual: usize,
}

/// One instruction: an opcode plus exactly `opcode.arity()` arguments.
///
/// Fields are private so the arity invariant holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    opcode: Opcode,
    arguments: [Argument; MAX_ARGUMENTS],
}

impl Instruction {
    /// Builds an instruction, rejecting a wrong argument count.
    pub fn try_new(opcode: Opcode, arguments: &[Argument]) -> Result<Self, ArityError> {
        if arguments.len() != opcode.arity() {
            return Err(ArityError {
                opcode,
                expected: opcode.arity(),
                actual: arguments.len(),
            });
        }
        let mut stored = [0; MAX_ARGUMENTS];
        stored[..arguments.len()].copy_from_slice(arguments);
        Ok(Instruction {
            opcode,
            arguments: stored,
        })
    }

    /// Builds an instruction from generator-side code.
    ///
    /// # Panics
    /// On an arity mismatch. That is a bug in the caller, never bad input.
    pub fn new(opcode: Opcode, arguments: &[Argument]) -> Self {
        match Instruction::try_new(opcode, arguments) {
            Ok(instruction) => instruction,
            Err(e) => panic!("malformed instruction: {}", e),
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments[..self.opcode.arity()]
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for argument in self.arguments() {
            write!(f, " {}", argument)?;
        }
        Ok(())
    }
}

// Wire form: the opcode id byte, then one fixed-width little-endian word per
// argument. Encoded as a postcard tuple, so nothing else is written.

#[derive(Serialize, Deserialize)]
struct Word(#[serde(with = "postcard::fixint::le")] Argument);

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let arguments = self.arguments();
        let mut tuple = serializer.serialize_tuple(1 + arguments.len())?;
        tuple.serialize_element(&self.opcode.id())?;
        for &argument in arguments {
            tuple.serialize_element(&Word(argument))?;
        }
        tuple.end()
    }
}

struct InstructionVisitor;

impl<'de> Visitor<'de> for InstructionVisitor {
    type Value = Instruction;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "an opcode id followed by its arguments")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Instruction, A::Error> {
        let id: u8 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let opcode = Opcode::from_id(id)
            .ok_or_else(|| de::Error::custom(format!("unknown opcode id {}", id)))?;

        let mut arguments = [0; MAX_ARGUMENTS];
        for (i, slot) in arguments.iter_mut().take(opcode.arity()).enumerate() {
            let Word(word) = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i + 1, &self))?;
            *slot = word;
        }

        Instruction::try_new(opcode, &arguments[..opcode.arity()]).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Instruction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The real length depends on the opcode; the visitor stops early.
        deserializer.deserialize_tuple(1 + MAX_ARGUMENTS, InstructionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_table_matches_discriminants() {
        for (i, opcode) in Opcode::ALL.iter().enumerate() {
            assert_eq!(opcode.id() as usize, i);
            assert_eq!(Opcode::from_id(i as u8), Some(*opcode));
        }
        assert_eq!(Opcode::from_id(Opcode::COUNT as u8), None);
    }

    #[test]
    fn test_arities() {
        assert_eq!(Opcode::Nothing.arity(), 0);
        assert_eq!(Opcode::Return.arity(), 1);
        assert_eq!(Opcode::Allocate.arity(), 1);
        assert_eq!(Opcode::SetFromConstant.arity(), 2);
        assert_eq!(Opcode::SetNull.arity(), 1);
        assert_eq!(Opcode::Negate.arity(), 1);
        assert_eq!(Opcode::Call.arity(), 2);
        assert!(Opcode::ALL.iter().all(|op| op.arity() <= MAX_ARGUMENTS));
    }

    #[test]
    fn test_every_opcode_accepts_exactly_its_arity() {
        let words = [7, 9, 11];
        for opcode in Opcode::ALL {
            for count in 0..=words.len() {
                let result = Instruction::try_new(opcode, &words[..count]);
                if count == opcode.arity() {
                    let instruction = result.unwrap();
                    assert_eq!(instruction.arguments(), &words[..count]);
                    assert_eq!(instruction.opcode(), opcode);
                } else {
                    let err = result.unwrap_err();
                    assert_eq!(err.expected, opcode.arity());
                    assert_eq!(err.actual, count);
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "malformed instruction")]
    fn test_new_panics_on_wrong_arity() {
        Instruction::new(Opcode::Copy, &[1]);
    }

    #[test]
    fn test_arity_error_display() {
        let err = Instruction::try_new(Opcode::Return, &[]).unwrap_err();
        assert_eq!(err.to_string(), "opcode 'return' takes 1 argument(s), got 0");
    }

    #[test]
    fn test_display() {
        let instruction = Instruction::new(Opcode::SetFromConstant, &[0, 42]);
        assert_eq!(instruction.to_string(), "set_from_constant 0 42");
        assert_eq!(Instruction::new(Opcode::Nothing, &[]).to_string(), "nothing");
    }

    #[test]
    fn test_wire_form_is_id_then_fixed_words() {
        let instruction = Instruction::new(Opcode::Copy, &[1, 258]);
        let bytes = postcard::to_allocvec(&instruction).unwrap();
        assert_eq!(
            bytes,
            vec![7, 1, 0, 0, 0, 0, 0, 0, 0, 2, 1, 0, 0, 0, 0, 0, 0]
        );

        let nothing = postcard::to_allocvec(&Instruction::new(Opcode::Nothing, &[])).unwrap();
        assert_eq!(nothing, vec![0]);
    }

    #[test]
    fn test_unknown_opcode_is_rejected() {
        let result: Result<Instruction, _> = postcard::from_bytes(&[200]);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_arguments_are_rejected() {
        let result: Result<Instruction, _> = postcard::from_bytes(&[1, 5, 0]);
        assert!(result.is_err());
    }
}
