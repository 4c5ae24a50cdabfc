use super::error::{ErrorKind, Result};
use super::lexer::{is_identifier, Lexer};
use super::program::{Operand, Program};
use super::registry::{Operation, SpecialVar};
use super::token::{Symbol, Token};
use combine::error::ParseError;
use combine::parser::char::char as chr;
use combine::parser::repeat::take_until;
use combine::parser::Parser;
use combine::stream::Stream;
use combine::{any, attempt, many, one_of, optional};
use std::borrow::Cow;
use tracing::trace;

/// Binary operator levels, tightest first. Within a level operators
/// associate to the left. The ternary binds loosest of all.
const PRECEDENCE: &[&[Operation]] = &[
    &[Operation::Mul, Operation::Div, Operation::Rem],
    &[Operation::Add, Operation::Sub],
    &[Operation::Lt, Operation::Le, Operation::Gt, Operation::Ge],
    &[Operation::Eq, Operation::Ne],
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Item {
    Value(Operand),
    Op(Symbol),
}

/// How deep parenthesised groups and call arguments may nest.
pub(crate) const MAX_NESTING: usize = 32;

/// Compiles one expression, emitting steps into `program`, and returns the
/// operand holding its value.
pub(crate) fn compile_expression(program: &mut Program, text: &str) -> Result<Operand> {
    expression(program, text, 0)
}

fn expression(program: &mut Program, text: &str, depth: usize) -> Result<Operand> {
    if depth > MAX_NESTING {
        return Err(ErrorKind::NestingTooDeep {
            limit: MAX_NESTING,
            fragment: text.to_owned(),
        }
        .into());
    }

    let mut lexer = Lexer::new(text);
    let mut items = Vec::new();

    while let Some(token) = lexer.next_token()? {
        let item = match token {
            Token::Number(n) => Item::Value(Operand::Literal(n)),
            Token::Operator(symbol) => Item::Op(symbol),
            Token::Ident(name) => Item::Value(resolve(program, &name, lexer.fragment())?),
            Token::ParenGroup(inner) => Item::Value(expression(program, &inner, depth + 1)?),
            Token::Call { operation, args } => {
                Item::Value(call(program, operation, &args, depth + 1)?)
            }
        };
        items.push(item);
    }

    trace!(?items, "tokens for `{}`", text.trim());
    reduce(program, items, text)
}

fn resolve(program: &Program, name: &str, fragment: &str) -> Result<Operand> {
    if let Some(v) = SpecialVar::from_name(name) {
        return Ok(Operand::Special(v));
    }
    program.lookup(name).ok_or_else(|| {
        ErrorKind::UnknownVariable {
            name: name.to_owned(),
            fragment: fragment.to_owned(),
        }
        .into()
    })
}

fn call(
    program: &mut Program,
    operation: Operation,
    args: &[String],
    depth: usize,
) -> Result<Operand> {
    let expected = operation.arity();
    if args.len() != expected {
        return Err(ErrorKind::ArityMismatch {
            name: operation.name(),
            expected,
            actual: args.len(),
            fragment: args.join(","),
        }
        .into());
    }

    let operands = args
        .iter()
        .map(|arg| expression(program, arg, depth))
        .collect::<Result<Vec<_>>>()?;
    program.push(operation, &operands)
}

fn reduce(program: &mut Program, mut items: Vec<Item>, text: &str) -> Result<Operand> {
    if items.is_empty() {
        return Err(ErrorKind::EmptyExpression(text.to_owned()).into());
    }

    // operand (op operand)*
    let well_formed = items.len() % 2 == 1
        && items.iter().enumerate().all(|(i, item)| match item {
            Item::Value(_) => i % 2 == 0,
            Item::Op(_) => i % 2 == 1,
        });
    if !well_formed {
        return Err(ErrorKind::UnreducedExpression(text.to_owned()).into());
    }

    for level in PRECEDENCE {
        let mut i = 1;
        while i < items.len() {
            match items[i] {
                Item::Op(Symbol::Infix(op)) if level.contains(&op) => {
                    let step = program.push(op, &[value(&items[i - 1]), value(&items[i + 1])])?;
                    items[i - 1] = Item::Value(step);
                    items.drain(i..=i + 1);
                }
                _ => i += 2,
            }
        }
    }

    // cond ? then : else, innermost (rightmost) first
    while let Some(i) = items.iter().rposition(|item| *item == Item::Op(Symbol::Then)) {
        if items.get(i + 2) != Some(&Item::Op(Symbol::Else)) {
            return Err(ErrorKind::TernarySyntaxError(text.to_owned()).into());
        }
        let step = program.push(
            Operation::Ternary,
            &[value(&items[i - 1]), value(&items[i + 1]), value(&items[i + 3])],
        )?;
        items[i - 1] = Item::Value(step);
        items.drain(i..=i + 3);
    }

    match items.as_slice() {
        [Item::Value(v)] => Ok(*v),
        _ if items.contains(&Item::Op(Symbol::Else)) => {
            Err(ErrorKind::TernarySyntaxError(text.to_owned()).into())
        }
        _ => Err(ErrorKind::UnreducedExpression(text.to_owned()).into()),
    }
}

fn value(item: &Item) -> Operand {
    match item {
        Item::Value(v) => *v,
        // reduce() only hands over positions that hold operands
        Item::Op(_) => Operand::default(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assign {
    Plain,
    Compound(char),
}

fn assign_op<Input>() -> impl Parser<Input, Output = Assign>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (optional(one_of("+-*/%".chars())), chr('=')).map(|(op, _)| match op {
        Some(c) => Assign::Compound(c),
        None => Assign::Plain,
    })
}

/// `name [op]= rhs`, split at the first assignment symbol.
fn assignment<Input>() -> impl Parser<Input, Output = (String, Assign, String)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        take_until::<String, _, _>(attempt(assign_op())),
        assign_op(),
        many::<String, _, _>(any()),
    )
}

/// Compiles one `name = expr` statement and binds the result.
pub(crate) fn compile_statement(program: &mut Program, statement: &str) -> Result<()> {
    if statement.trim().is_empty() {
        return Ok(());
    }

    let (lhs, assign, rhs) = match assignment().parse(statement) {
        Ok((parts, _)) => parts,
        Err(_) => return Err(ErrorKind::MissingAssignment(statement.to_owned()).into()),
    };

    let name = lhs.trim();
    if SpecialVar::from_name(name).is_some() {
        return Err(ErrorKind::AssignToSpecialVar {
            name: name.to_owned(),
            statement: statement.to_owned(),
        }
        .into());
    }
    if !is_identifier(name) {
        return Err(ErrorKind::InvalidAssignmentTarget {
            name: name.to_owned(),
            statement: statement.to_owned(),
        }
        .into());
    }

    let rhs = match assign {
        Assign::Plain => Cow::Borrowed(rhs.as_str()),
        Assign::Compound(op) => Cow::Owned(format!("{} {} ({})", name, op, rhs)),
    };

    let operand = compile_expression(program, &rhs)?;
    trace!(%name, %operand, "bind");
    program.bind(name, operand);
    Ok(())
}
