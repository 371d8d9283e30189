use crate::bytecode::{CompiledFunction, Instruction, Opcode, Unit};
use std::fmt::Write;

/// Print disassembly of a compiled unit
pub fn print_unit(unit: &Unit) {
    print!("{}", disassemble(unit));
}

/// Return disassembly of every function in the unit as a String
pub fn disassemble(unit: &Unit) -> String {
    let mut output = String::new();
    for (index, function) in unit.functions.iter().enumerate() {
        let label = if index == 0 {
            format!("function[{}] (main)", index)
        } else {
            format!("function[{}]", index)
        };
        write_function(&mut output, &label, function);
    }
    output
}

fn write_function(output: &mut String, label: &str, function: &CompiledFunction) {
    // Writing into a String cannot fail.
    let _ = writeln!(output, "════════════════════════════════════════");
    let _ = writeln!(output, " {}", label);
    let _ = writeln!(
        output,
        " {} slots, {} instructions",
        function.slot_count,
        function.instructions.len()
    );
    let _ = writeln!(output, "════════════════════════════════════════");
    for (ip, instruction) in function.instructions.iter().enumerate() {
        let _ = writeln!(output, "{:04}  {}", ip, format_instruction(instruction));
    }
    output.push('\n');
}

fn format_instruction(instruction: &Instruction) -> String {
    let arguments: Vec<String> = instruction
        .arguments()
        .iter()
        .map(|argument| argument.to_string())
        .collect();
    let text = format!("{:<18}{}", instruction.opcode().name(), arguments.join(" "));
    let text = text.trim_end().to_string();

    match instruction.opcode() {
        Opcode::Call => {
            let [callee, count] = [instruction.arguments()[0], instruction.arguments()[1]];
            if count == 0 {
                format!("{:<30}; r{} = r{}()", text, callee, callee)
            } else {
                format!(
                    "{:<30}; r{} = r{}(r{}..=r{})",
                    text,
                    callee,
                    callee,
                    callee.saturating_add(1),
                    callee.saturating_add(count)
                )
            }
        }
        Opcode::SetFunction => {
            format!("{:<30}; -> function[{}]", text, instruction.arguments()[1])
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Unit {
        Unit::new(vec![
            CompiledFunction::new(
                1,
                vec![
                    Instruction::new(Opcode::Allocate, &[1]),
                    Instruction::new(Opcode::SetFunction, &[0, 1]),
                    Instruction::new(Opcode::Call, &[0, 0]),
                    Instruction::new(Opcode::Return, &[0]),
                    Instruction::new(Opcode::Deallocate, &[1]),
                ],
            ),
            CompiledFunction::new(
                0,
                vec![
                    Instruction::new(Opcode::Allocate, &[0]),
                    Instruction::new(Opcode::Deallocate, &[0]),
                ],
            ),
        ])
    }

    #[test]
    fn test_lists_every_function() {
        let output = disassemble(&sample());
        assert!(output.contains(" function[0] (main)\n"));
        assert!(output.contains(" function[1]\n"));
        assert!(output.contains(" 1 slots, 5 instructions\n"));
        assert!(output.contains(" 0 slots, 2 instructions\n"));
    }

    #[test]
    fn test_instruction_lines() {
        let output = disassemble(&sample());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[4], "0000  allocate          1");
        assert!(lines[5].starts_with("0001  set_function      0 1"));
        assert!(lines[5].ends_with("; -> function[1]"));
        assert!(lines[6].ends_with("; r0 = r0()"));
        assert_eq!(lines[7], "0003  return            0");
    }

    #[test]
    fn test_call_with_arguments_comment() {
        let text = format_instruction(&Instruction::new(Opcode::Call, &[3, 2]));
        assert!(text.starts_with("call              3 2"));
        assert!(text.ends_with("; r3 = r3(r4..=r5)"));
    }

    #[test]
    fn test_call_comment_near_word_limit() {
        let text = format_instruction(&Instruction::new(Opcode::Call, &[u64::MAX, 2]));
        assert!(text.ends_with(&format!("; r{0} = r{0}(r{0}..=r{0})", u64::MAX)));
    }

    #[test]
    fn test_zero_arity_has_no_trailing_space() {
        assert_eq!(format_instruction(&Instruction::new(Opcode::Nothing, &[])), "nothing");
    }

    #[test]
    fn test_empty_unit() {
        assert_eq!(disassemble(&Unit::default()), "");
    }
}
