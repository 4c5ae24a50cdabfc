use failure::{Backtrace, Context, Fail};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Debug, PartialEq, Eq, Fail)]
pub enum ErrorKind {
    #[fail(display = "can't parse next token")]
    UnparseableToken(String),
    #[fail(display = "unmatched parens")]
    UnbalancedParens(String),
    #[fail(display = "invalid function name")]
    UnknownFunction(String),
    #[fail(
        display = "{}(): expected {} arg(s), got {}",
        name, expected, actual
    )]
    ArityMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
        fragment: String,
    },
    #[fail(display = "unknown var name `{}`", name)]
    UnknownVariable { name: String, fragment: String },
    #[fail(display = "cannot assign to special var `{}`", name)]
    AssignToSpecialVar { name: String, statement: String },
    #[fail(display = "cannot assign to `{}`", name)]
    InvalidAssignmentTarget { name: String, statement: String },
    #[fail(display = "expression needs '=' assignment")]
    MissingAssignment(String),
    #[fail(display = "ternary op syntax error")]
    TernarySyntaxError(String),
    #[fail(display = "expression did not reduce to a single value")]
    UnreducedExpression(String),
    #[fail(display = "empty expression")]
    EmptyExpression(String),
    #[fail(display = "nested too deeply (limit is {})", limit)]
    NestingTooDeep { limit: usize, fragment: String },
    #[fail(display = "too many steps (limit is {})", limit)]
    StepBudgetExceeded { limit: usize },
    #[fail(display = "invalid configuration: {}", _0)]
    Config(String),
    #[fail(display = "transport failure")]
    Transport,
}

impl ErrorKind {
    /// The smallest piece of source text the error is about.
    pub fn fragment(&self) -> &str {
        match self {
            ErrorKind::UnparseableToken(s)
            | ErrorKind::UnbalancedParens(s)
            | ErrorKind::UnknownFunction(s)
            | ErrorKind::MissingAssignment(s)
            | ErrorKind::TernarySyntaxError(s)
            | ErrorKind::UnreducedExpression(s)
            | ErrorKind::EmptyExpression(s) => s.as_str(),
            ErrorKind::ArityMismatch { fragment, .. }
            | ErrorKind::UnknownVariable { fragment, .. }
            | ErrorKind::NestingTooDeep { fragment, .. } => fragment.as_str(),
            ErrorKind::AssignToSpecialVar { statement, .. }
            | ErrorKind::InvalidAssignmentTarget { statement, .. } => statement.as_str(),
            ErrorKind::StepBudgetExceeded { .. } | ErrorKind::Config(_) | ErrorKind::Transport => "",
        }
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Error {
        Error { inner }
    }
}

/// What the user gets to see when a compilation pass fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub reason: String,
    pub fragment: String,
}

impl From<&Error> for Diagnostic {
    fn from(e: &Error) -> Diagnostic {
        Diagnostic {
            reason: e.kind().to_string(),
            fragment: e.kind().fragment().trim().to_owned(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragment.is_empty() {
            write!(f, "Error: {}", self.reason)
        } else {
            write!(f, "Error: {}\n    {}", self.reason, self.fragment)
        }
    }
}
