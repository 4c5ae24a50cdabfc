//! Lowers a compiled [`Program`] to the line protocol the microcontroller
//! reads off its serial port.
//!
//! ```text
//! c!            begin batch: commit zero steps, execution pauses
//! s!+1,2        step 0: 1 + 2
//! s"Sv!         step 1: sin(step 0)
//! c#            commit two steps
//! ```

use super::program::{Instruction, Operand, Program, MAX_STEPS};

/// Step ids start at the first printable, non-space character.
pub const ID_BASE: u8 = b'!';

/// Marks an operand that reads another step's value.
pub const STEP_REF: char = 'v';

// Program::push never lets an index or count past MAX_STEPS.
pub(crate) fn step_id(index: usize) -> char {
    debug_assert!(index <= MAX_STEPS, "step index {} out of range", index);
    (ID_BASE + index as u8) as char
}

pub(crate) fn begin_batch() -> String {
    commit(0)
}

pub(crate) fn commit(count: usize) -> String {
    format!("c{}", step_id(count))
}

fn operand(arg: &Operand) -> String {
    match arg {
        Operand::Literal(n) => n.to_string(),
        Operand::StepRef(i) => format!("{}{}", STEP_REF, step_id(*i)),
        Operand::Special(v) => v.wire_name(),
    }
}

pub(crate) fn instruction(index: usize, step: &Instruction) -> String {
    let used = step
        .args
        .iter()
        .rposition(|arg| !arg.is_default())
        .map_or(0, |last| last + 1);

    let args: Vec<String> = step.args[..used].iter().map(operand).collect();
    format!(
        "s{}{}{}",
        step_id(index),
        step.operation.wire_code(),
        args.join(",")
    )
}

/// The whole batch, framing included, in send order.
pub fn serialize(program: &Program) -> Vec<String> {
    let mut lines = Vec::with_capacity(program.len() + 2);
    lines.push(begin_batch());
    lines.extend(
        program
            .instructions()
            .iter()
            .enumerate()
            .map(|(i, step)| instruction(i, step)),
    );
    lines.push(commit(program.len()));
    lines
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::registry::{Operation, SpecialVar};
    use crate::toplevel::compile;

    #[test]
    fn test_step_id() {
        assert_eq!(step_id(0), '!');
        assert_eq!(step_id(1), '"');
        assert_eq!(step_id(MAX_STEPS), '~');
    }

    #[test]
    fn test_instruction() {
        let step = Instruction {
            operation: Operation::Le,
            args: [
                Operand::StepRef(2),
                Operand::Literal(0.25),
                Operand::Literal(0.0),
            ],
        };
        assert_eq!(instruction(3, &step), "s${v#,0.25");
    }

    #[test]
    fn test_trailing_zeros_only() {
        let step = Instruction {
            operation: Operation::Lerp,
            args: [
                Operand::Literal(0.0),
                Operand::Literal(0.0),
                Operand::Special(SpecialVar::Ratio),
            ],
        };
        assert_eq!(instruction(0, &step), "s!l0,0,P_");

        let step = Instruction {
            operation: Operation::Sin,
            args: [Operand::Literal(0.0); 3],
        };
        assert_eq!(instruction(0, &step), "s!S");
    }

    #[test]
    fn test_step_zero_is_not_default() {
        let step = Instruction {
            operation: Operation::Abs,
            args: [
                Operand::StepRef(0),
                Operand::Literal(0.0),
                Operand::Literal(0.0),
            ],
        };
        assert_eq!(instruction(1, &step), "s\"|v!");
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_step_id_out_of_range() {
        step_id(MAX_STEPS + 1);
    }

    #[test]
    fn test_literal_text() {
        for src in &[
            "99999999999999999999999",
            ".00000000000000000000001",
            "0.1000000000000000055511",
            "123456789012345678901234",
            ".5",
            "7.",
        ] {
            let p = compile(&format!("x = {} * T", src), &CompilerConfig::default()).unwrap();
            let line = instruction(0, &p.instructions()[0]);
            let text = &line[3..line.len() - 3];
            assert!(!text.contains("inf") && !text.contains('e'), "{}", line);
            assert!(text.len() <= src.len() + 1, "{} -> {}", src, text);
        }
    }

    #[test]
    fn test_serialize_empty() {
        assert_eq!(serialize(&Program::default()), vec!["c!", "c!"]);
    }
}
