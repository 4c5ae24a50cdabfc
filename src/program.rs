use super::error::{ErrorKind, Result};
use super::registry::{Operation, SpecialVar};
use std::collections::HashMap;
use std::fmt;

/// Step ids are `'!' + index`; beyond this the ids leave printable ASCII.
pub const MAX_STEPS: usize = 93;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Literal(f64),
    StepRef(usize),
    Special(SpecialVar),
}

impl Operand {
    pub(crate) fn is_default(&self) -> bool {
        *self == Operand::Literal(0.0)
    }
}

impl Default for Operand {
    fn default() -> Self {
        Operand::Literal(0.0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(n) => write!(f, "{}", n),
            Operand::StepRef(i) => write!(f, "step_{}", i),
            Operand::Special(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    pub operation: Operation,
    pub args: [Operand; 3],
}

#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    symbols: HashMap<String, Operand>,
    max_steps: usize,
}

impl Default for Program {
    fn default() -> Self {
        Program::new(MAX_STEPS)
    }
}

impl Program {
    pub fn new(max_steps: usize) -> Self {
        Program {
            instructions: Vec::new(),
            symbols: HashMap::new(),
            max_steps: max_steps.min(MAX_STEPS),
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn lookup(&self, name: &str) -> Option<Operand> {
        self.symbols.get(name).copied()
    }

    /// Bindings sorted by name.
    pub fn symbols(&self) -> Vec<(&str, Operand)> {
        let mut v: Vec<_> = self
            .symbols
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        v.sort_by(|a, b| a.0.cmp(b.0));
        v
    }

    pub(crate) fn bind(&mut self, name: &str, operand: Operand) {
        self.symbols.insert(name.to_owned(), operand);
    }

    /// Appends a step and returns a reference to it. `args` may be shorter
    /// than three; the rest are zero.
    pub(crate) fn push(&mut self, operation: Operation, args: &[Operand]) -> Result<Operand> {
        debug_assert_eq!(args.len(), operation.arity());

        if self.instructions.len() >= self.max_steps {
            return Err(ErrorKind::StepBudgetExceeded {
                limit: self.max_steps,
            }
            .into());
        }

        let mut slots = [Operand::default(); 3];
        slots[..args.len()].copy_from_slice(args);

        let index = self.instructions.len();
        self.instructions.push(Instruction {
            operation,
            args: slots,
        });
        Ok(Operand::StepRef(index))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<9}{:<10}args . . .", "", "op")?;
        for (i, step) in self.instructions.iter().enumerate() {
            write!(f, "{:<9}{:<10}", format!("step_{}", i), step.operation)?;
            for arg in step.args.iter() {
                write!(f, "{:<10}", arg.to_string())?;
            }
            writeln!(f)?;
        }
        for (name, operand) in self.symbols() {
            writeln!(f, "{} => {}", name, operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_push() {
        let mut p = Program::default();
        let r = p
            .push(Operation::Add, &[Operand::Literal(1.0), Operand::Literal(2.0)])
            .unwrap();
        assert_eq!(r, Operand::StepRef(0));

        let r = p.push(Operation::Sin, &[r]).unwrap();
        assert_eq!(r, Operand::StepRef(1));
        assert_eq!(
            p.instructions()[1].args,
            [
                Operand::StepRef(0),
                Operand::Literal(0.0),
                Operand::Literal(0.0)
            ]
        );
    }

    #[test]
    fn test_budget() {
        let mut p = Program::new(2);
        let one = [Operand::Literal(1.0)];
        p.push(Operation::Sin, &one).unwrap();
        p.push(Operation::Sin, &one).unwrap();
        let e = p.push(Operation::Sin, &one).unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::StepBudgetExceeded { limit: 2 });
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_ceiling() {
        assert_eq!(Program::new(500).max_steps(), MAX_STEPS);
    }

    #[test]
    fn test_rebind() {
        let mut p = Program::default();
        p.bind("x", Operand::Literal(1.0));
        p.bind("x", Operand::Special(SpecialVar::Time));
        assert_eq!(p.lookup("x"), Some(Operand::Special(SpecialVar::Time)));
        assert_eq!(p.lookup("y"), None);
    }

    #[test]
    fn test_listing() {
        let mut p = Program::default();
        let r = p
            .push(Operation::Mul, &[Operand::Special(SpecialVar::Time), Operand::Literal(2.5)])
            .unwrap();
        p.bind("x", r);
        let listing = p.to_string();
        let row: Vec<&str> = listing.lines().nth(1).unwrap().split_whitespace().collect();
        assert_eq!(row, ["step_0", "*", "T", "2.5", "0", "0"]);
        assert!(listing.ends_with("x => step_0\n"));
    }
}
