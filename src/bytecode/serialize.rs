use crate::bytecode::Unit;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

/// "CNDR" when read as little-endian bytes.
pub const MAGIC: u32 = 0x5244_4E43;
pub const VERSION: u32 = 1;

/// Leading bytes of every unit file, both fields fixed-width little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Header {
    #[serde(with = "postcard::fixint::le")]
    magic: u32,
    #[serde(with = "postcard::fixint::le")]
    version: u32,
}

impl Header {
    const CURRENT: Header = Header {
        magic: MAGIC,
        version: VERSION,
    };
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not encode unit: {0}")]
    Encode(postcard::Error),

    #[error("could not write unit")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("not a unit file (magic {found:#010x})")]
    BadMagic { found: u32 },

    #[error("unsupported unit version {found}, expected {}", VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("malformed unit: {0}")]
    Decode(postcard::Error),

    #[error("{count} trailing byte(s) after unit")]
    TrailingBytes { count: usize },
}

/// Encodes `unit` with its header. Equal units give identical bytes.
pub fn encode_unit(unit: &Unit) -> Result<Vec<u8>, SaveError> {
    postcard::to_allocvec(&(Header::CURRENT, unit)).map_err(SaveError::Encode)
}

/// Writes the encoded unit to `writer`.
pub fn save_unit<W: Write>(writer: &mut W, unit: &Unit) -> Result<(), SaveError> {
    let bytes = encode_unit(unit)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    log::debug!("wrote unit: {} bytes", bytes.len());
    Ok(())
}

/// Decodes a unit previously written by [`save_unit`].
pub fn load_unit(bytes: &[u8]) -> Result<Unit, LoadError> {
    let (header, rest) = postcard::take_from_bytes::<Header>(bytes).map_err(LoadError::Decode)?;
    if header.magic != MAGIC {
        return Err(LoadError::BadMagic {
            found: header.magic,
        });
    }
    if header.version != VERSION {
        return Err(LoadError::UnsupportedVersion {
            found: header.version,
        });
    }

    let (unit, rest) = postcard::take_from_bytes::<Unit>(rest).map_err(LoadError::Decode)?;
    if !rest.is_empty() {
        return Err(LoadError::TrailingBytes { count: rest.len() });
    }
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{CompiledFunction, Instruction, Opcode};

    fn return_one() -> Unit {
        Unit::new(vec![CompiledFunction::new(
            1,
            vec![
                Instruction::new(Opcode::Allocate, &[1]),
                Instruction::new(Opcode::SetFromConstant, &[0, 1]),
                Instruction::new(Opcode::Return, &[0]),
                Instruction::new(Opcode::Deallocate, &[1]),
            ],
        )])
    }

    fn word(value: u64) -> [u8; 8] {
        value.to_le_bytes()
    }

    #[test]
    fn test_header_bytes() {
        let bytes = encode_unit(&Unit::default()).unwrap();
        assert_eq!(bytes, vec![b'C', b'N', b'D', b'R', 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_exact_layout() {
        let mut expected = vec![b'C', b'N', b'D', b'R', 1, 0, 0, 0];
        expected.push(1); // function count
        expected.extend(word(1)); // slot count
        expected.push(4); // instruction count
        expected.push(Opcode::Allocate.id());
        expected.extend(word(1));
        expected.push(Opcode::SetFromConstant.id());
        expected.extend(word(0));
        expected.extend(word(1));
        expected.push(Opcode::Return.id());
        expected.extend(word(0));
        expected.push(Opcode::Deallocate.id());
        expected.extend(word(1));

        assert_eq!(encode_unit(&return_one()).unwrap(), expected);
    }

    #[test]
    fn test_save_then_load() {
        let mut out = Vec::new();
        save_unit(&mut out, &return_one()).unwrap();
        assert_eq!(load_unit(&out).unwrap(), return_one());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(
            encode_unit(&return_one()).unwrap(),
            encode_unit(&return_one()).unwrap()
        );
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode_unit(&return_one()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(load_unit(&bytes), Err(LoadError::BadMagic { .. })));
    }

    #[test]
    fn test_wrong_version() {
        let mut bytes = encode_unit(&return_one()).unwrap();
        bytes[4] = 2;
        assert_eq!(
            load_unit(&bytes),
            Err(LoadError::UnsupportedVersion { found: 2 })
        );
    }

    #[test]
    fn test_truncated() {
        let bytes = encode_unit(&return_one()).unwrap();
        for len in [0, 3, 8, 12, bytes.len() - 1] {
            assert!(
                matches!(load_unit(&bytes[..len]), Err(LoadError::Decode(_))),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_unknown_opcode() {
        let mut bytes = encode_unit(&return_one()).unwrap();
        // first opcode byte: header, function count, slot count, instruction count
        bytes[8 + 1 + 8 + 1] = 99;
        assert!(matches!(load_unit(&bytes), Err(LoadError::Decode(_))));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode_unit(&return_one()).unwrap();
        bytes.extend([0, 0]);
        assert_eq!(load_unit(&bytes), Err(LoadError::TrailingBytes { count: 2 }));
    }

    #[test]
    fn test_save_error_from_writer() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        assert!(matches!(
            save_unit(&mut Broken, &return_one()),
            Err(SaveError::Io(_))
        ));
    }
}
