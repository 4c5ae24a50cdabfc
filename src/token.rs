use super::registry::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    Infix(Operation),
    Then,
    Else,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Operator(Symbol),
    Ident(String),
    ParenGroup(String),
    Call { operation: Operation, args: Vec<String> },
}
