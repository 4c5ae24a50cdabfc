use super::error::{ErrorKind, Result};
use super::registry::Operation;
use super::token::{Symbol, Token};
use combine::error::ParseError;
use combine::parser::char::{digit, string};
use combine::parser::Parser;
use combine::stream::Stream;
use combine::{attempt, choice, many, many1, satisfy, token};

/// Longest digit run accepted as a literal.
pub(crate) const MAX_LITERAL_LEN: usize = 24;

fn number<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1::<String, _, _>(choice((digit(), token('.'))))
}

fn ident<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        many::<String, _, _>(satisfy(|c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-'
        })),
    )
        .map(|(head, tail): (char, String)| {
            let mut id = String::with_capacity(tail.len() + 1);
            id.push(head);
            id.push_str(&tail);
            id
        })
}

// Two-character symbols come first so `<=` wins over `<`.
fn operator<Input>() -> impl Parser<Input, Output = Symbol>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    use Operation::*;
    let infix = |s: &'static str, op: Operation| attempt(string(s)).map(move |_| Symbol::Infix(op));

    choice((
        infix("<=", Le),
        infix(">=", Ge),
        infix("==", Eq),
        infix("!=", Ne),
        infix("*", Mul),
        infix("/", Div),
        infix("%", Rem),
        infix("+", Add),
        infix("-", Sub),
        infix("<", Lt),
        infix(">", Gt),
        token('?').map(|_| Symbol::Then),
        token(':').map(|_| Symbol::Else),
    ))
}

pub(crate) fn is_identifier(name: &str) -> bool {
    matches!(ident().parse(name), Ok((_, rest)) if rest.is_empty())
}

/// Splits `(...)rest` at the matching close paren. `text` must start with `(`.
fn paren_group(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[1..i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

//      "1, sin(2, 3), hi"   =>   ["1", "sin(2, 3)", "hi"]
fn split_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    args.push(current);
    args
}

/// Pulls tokens off the front of one expression, one at a time.
pub(crate) struct Lexer<'a> {
    rest: &'a str,
    start: &'a str,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Lexer {
            rest: text,
            start: text,
        }
    }

    /// Source from the start of the last token on.
    pub(crate) fn fragment(&self) -> &'a str {
        self.start
    }

    pub(crate) fn next_token(&mut self) -> Result<Option<Token>> {
        let input = self.rest.trim_start();
        self.start = input;
        self.rest = input;

        if input.is_empty() {
            return Ok(None);
        }

        if let Ok((digits, rest)) = number().parse(input) {
            let n = match digits.parse::<f64>() {
                Ok(n) if n.is_finite() && digits.len() <= MAX_LITERAL_LEN => n,
                _ => return Err(ErrorKind::UnparseableToken(input.to_owned()).into()),
            };
            self.rest = rest;
            return Ok(Some(Token::Number(n)));
        }

        if let Ok((symbol, rest)) = operator().parse(input) {
            self.rest = rest;
            return Ok(Some(Token::Operator(symbol)));
        }

        if let Ok((name, rest)) = ident().parse(input) {
            let after = rest.trim_start();
            if !after.starts_with('(') {
                self.rest = rest;
                return Ok(Some(Token::Ident(name)));
            }

            let operation = Operation::function(&name)
                .ok_or_else(|| ErrorKind::UnknownFunction(input.to_owned()))?;
            let (inner, rest) =
                paren_group(after).ok_or_else(|| ErrorKind::UnbalancedParens(input.to_owned()))?;
            self.rest = rest;
            return Ok(Some(Token::Call {
                operation,
                args: split_args(inner),
            }));
        }

        if input.starts_with('(') {
            let (inner, rest) =
                paren_group(input).ok_or_else(|| ErrorKind::UnbalancedParens(input.to_owned()))?;
            self.rest = rest;
            return Ok(Some(Token::ParenGroup(inner.to_owned())));
        }

        Err(ErrorKind::UnparseableToken(input.to_owned()).into())
    }
}

#[cfg(test)]
mod test {
    use super::super::token::Token::*;
    use super::*;
    use crate::registry::OPERATIONS;

    fn lex_tokens(s: &str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new(s);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    #[test]
    fn test_number() {
        assert_eq!(number().parse("1.25+x").map(|x| x.0), Ok("1.25".to_owned()));
        assert_eq!(lex_tokens("0.5").unwrap(), vec![Number(0.5)]);
        assert_eq!(lex_tokens(".5").unwrap(), vec![Number(0.5)]);
    }

    #[test]
    fn test_ident() {
        assert_eq!(ident().parse("x_1 + 2").map(|x| x.0), Ok("x_1".to_owned()));
        assert_eq!(ident().parse("a-b").map(|x| x.0), Ok("a-b".to_owned()));
        assert!(ident().parse("1x").is_err());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("x"));
        assert!(is_identifier("_a-1"));
        assert!(!is_identifier("x y"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1"));
    }

    #[test]
    fn test_operator_longest_first() {
        assert_eq!(
            lex_tokens("a <= b").unwrap(),
            vec![
                Ident("a".to_owned()),
                Operator(Symbol::Infix(Operation::Le)),
                Ident("b".to_owned())
            ]
        );
        assert_eq!(
            lex_tokens("1<2").unwrap(),
            vec![Number(1.0), Operator(Symbol::Infix(Operation::Lt)), Number(2.0)]
        );
    }

    #[test]
    fn test_every_infix_symbol() {
        for d in OPERATIONS.iter().filter(|d| d.infix) {
            assert_eq!(
                lex_tokens(d.name).unwrap(),
                vec![Operator(Symbol::Infix(d.operation))],
                "{}",
                d.name
            );
        }
    }

    #[test]
    fn test_ternary_symbols() {
        assert_eq!(
            lex_tokens("c ? 1 : 2").unwrap(),
            vec![
                Ident("c".to_owned()),
                Operator(Symbol::Then),
                Number(1.0),
                Operator(Symbol::Else),
                Number(2.0)
            ]
        );
    }

    #[test]
    fn test_call() {
        assert_eq!(
            lex_tokens("atan2(y, max(1, 2)) * 2").unwrap(),
            vec![
                Call {
                    operation: Operation::Atan2,
                    args: vec!["y".to_owned(), " max(1, 2)".to_owned()]
                },
                Operator(Symbol::Infix(Operation::Mul)),
                Number(2.0)
            ]
        );
        assert_eq!(
            lex_tokens("sin (T)").unwrap(),
            vec![Call {
                operation: Operation::Sin,
                args: vec!["T".to_owned()]
            }]
        );
    }

    #[test]
    fn test_paren_group() {
        assert_eq!(
            lex_tokens("(1 + (2)) * 3").unwrap(),
            vec![
                ParenGroup("1 + (2)".to_owned()),
                Operator(Symbol::Infix(Operation::Mul)),
                Number(3.0)
            ]
        );
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("1, sin(2, 3), hi"), vec!["1", " sin(2, 3)", " hi"]);
        assert_eq!(split_args(""), vec![""]);
    }

    #[test]
    fn test_errors() {
        let kind = |s: &str| lex_tokens(s).unwrap_err().kind().clone();

        assert_eq!(kind("foo(1)"), ErrorKind::UnknownFunction("foo(1)".to_owned()));
        assert_eq!(kind("1 + sin(2"), ErrorKind::UnbalancedParens("sin(2".to_owned()));
        assert_eq!(kind("(1 + 2"), ErrorKind::UnbalancedParens("(1 + 2".to_owned()));
        assert_eq!(kind("1 $ 2"), ErrorKind::UnparseableToken("$ 2".to_owned()));
        assert_eq!(kind("1.2.3"), ErrorKind::UnparseableToken("1.2.3".to_owned()));
        assert_eq!(kind("a = b"), ErrorKind::UnparseableToken("= b".to_owned()));
    }

    #[test]
    fn test_literal_bounds() {
        let longest = "9".repeat(MAX_LITERAL_LEN);
        assert_eq!(lex_tokens(&longest).unwrap().len(), 1);

        let kind = |s: &str| lex_tokens(s).unwrap_err().kind().clone();
        let too_long = format!("{}0 * T", "1".repeat(MAX_LITERAL_LEN));
        assert_eq!(kind(&too_long), ErrorKind::UnparseableToken(too_long.clone()));

        let overflow = format!("1{}", "0".repeat(400));
        assert_eq!(kind(&overflow), ErrorKind::UnparseableToken(overflow.clone()));
    }
}
