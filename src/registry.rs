//! The closed set of operations the microcontroller understands, and the
//! special variables it supplies at runtime.
//!
//! Every operation travels over the wire as a single character. Infix
//! operators whose symbol is already one character use it directly; the rest
//! are mapped here.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Ternary,
    Sin,
    Cos,
    Sin01,
    Cos01,
    SinQ,
    CosQ,
    Tan,
    Pow,
    Abs,
    Atan2,
    Floor,
    Ceil,
    Round,
    Frac,
    Sqrt,
    Log,
    LogBase,
    Rand,
    RandRange,
    Noise1,
    Noise2,
    Noise3,
    Noise1Q,
    Noise2Q,
    Noise3Q,
    Min,
    Max,
    Lerp,
    Clamp,
    Tri,
    Peak,
    U2b,
    B2u,
    Accum0,
    Rgb,
    Hsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub operation: Operation,
    pub name: &'static str,
    pub arity: usize,
    pub wire_code: char,
    pub infix: bool,
}

const fn infix(operation: Operation, name: &'static str, wire_code: char) -> OperationDescriptor {
    OperationDescriptor {
        operation,
        name,
        arity: 2,
        wire_code,
        infix: true,
    }
}

const fn func(
    operation: Operation,
    name: &'static str,
    arity: usize,
    wire_code: char,
) -> OperationDescriptor {
    OperationDescriptor {
        operation,
        name,
        arity,
        wire_code,
        infix: false,
    }
}

/// Indexed by `Operation as usize`.
pub static OPERATIONS: [OperationDescriptor; 48] = [
    infix(Operation::Mul, "*", '*'),
    infix(Operation::Div, "/", '/'),
    infix(Operation::Rem, "%", '%'),
    infix(Operation::Add, "+", '+'),
    infix(Operation::Sub, "-", '-'),
    infix(Operation::Lt, "<", '<'),
    infix(Operation::Le, "<=", '{'),
    infix(Operation::Gt, ">", '>'),
    infix(Operation::Ge, ">=", '}'),
    infix(Operation::Eq, "==", '='),
    infix(Operation::Ne, "!=", '!'),
    func(Operation::Ternary, "ternary", 3, '?'),
    func(Operation::Sin, "sin", 1, 'S'),
    func(Operation::Cos, "cos", 1, 'C'),
    func(Operation::Sin01, "sin01", 1, 's'),
    func(Operation::Cos01, "cos01", 1, 'c'),
    func(Operation::SinQ, "sinq", 1, 'q'),
    func(Operation::CosQ, "cosq", 1, 'Q'),
    func(Operation::Tan, "tan", 1, 'T'),
    func(Operation::Pow, "pow", 2, 'P'),
    func(Operation::Abs, "abs", 1, '|'),
    func(Operation::Atan2, "atan2", 2, 'A'),
    func(Operation::Floor, "floor", 1, '_'),
    func(Operation::Ceil, "ceil", 1, '`'),
    func(Operation::Round, "round", 1, 'R'),
    func(Operation::Frac, "frac", 1, '.'),
    func(Operation::Sqrt, "sqrt", 1, 'r'),
    func(Operation::Log, "log", 1, 'L'),
    func(Operation::LogBase, "logBase", 2, 'B'),
    func(Operation::Rand, "rand", 1, 'z'),
    func(Operation::RandRange, "randRange", 2, 'Z'),
    func(Operation::Noise1, "noise1", 1, '1'),
    func(Operation::Noise2, "noise2", 2, '2'),
    func(Operation::Noise3, "noise3", 3, '3'),
    func(Operation::Noise1Q, "noise1q", 1, '4'),
    func(Operation::Noise2Q, "noise2q", 2, '5'),
    func(Operation::Noise3Q, "noise3q", 3, '6'),
    func(Operation::Min, "min", 2, 'm'),
    func(Operation::Max, "max", 2, 'M'),
    func(Operation::Lerp, "lerp", 3, 'l'),
    func(Operation::Clamp, "clamp", 3, 'x'),
    func(Operation::Tri, "tri", 1, 't'),
    func(Operation::Peak, "peak", 1, 'p'),
    func(Operation::U2b, "u2b", 1, 'b'),
    func(Operation::B2u, "b2u", 1, 'u'),
    func(Operation::Accum0, "accum0", 1, '0'),
    func(Operation::Rgb, "rgb", 3, '['),
    func(Operation::Hsv, "hsv", 3, ']'),
];

impl Operation {
    pub fn descriptor(self) -> &'static OperationDescriptor {
        &OPERATIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn arity(self) -> usize {
        self.descriptor().arity
    }

    pub fn wire_code(self) -> char {
        self.descriptor().wire_code
    }

    /// Looks up a callable function. Infix operators are not callable by name.
    pub fn function(name: &str) -> Option<Operation> {
        OPERATIONS
            .iter()
            .find(|d| !d.infix && d.name == name)
            .map(|d| d.operation)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialVar {
    Time,
    Station,
    Index,
    Count,
    Ratio,
    X,
    Y,
    Angle,
    Ultrasonic,
    UltrasonicSquared,
    UltrasonicPow4,
    UltrasonicPow8,
}

pub static SPECIAL_VARS: [(SpecialVar, &str, &str); 12] = [
    (SpecialVar::Time, "T", "time, in seconds"),
    (SpecialVar::Station, "S", "station id: T=0, O=1, O=2, R=3, ..."),
    (SpecialVar::Index, "I", "index of LED on strand"),
    (SpecialVar::Count, "C", "number of LEDs on strand"),
    (SpecialVar::Ratio, "P", "ratio of LED on strand (==I/C)"),
    (SpecialVar::X, "X", "global X position"),
    (SpecialVar::Y, "Y", "global Y position"),
    (SpecialVar::Angle, "A", "global angle (from center of sign)"),
    (SpecialVar::Ultrasonic, "U", "ultrasonic sensor"),
    (SpecialVar::UltrasonicSquared, "UA", "pow(U, 2)"),
    (SpecialVar::UltrasonicPow4, "UB", "pow(U, 4)"),
    (SpecialVar::UltrasonicPow8, "UC", "pow(U, 8)"),
];

impl SpecialVar {
    pub fn from_name(name: &str) -> Option<SpecialVar> {
        SPECIAL_VARS
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(v, _, _)| *v)
    }

    pub fn name(self) -> &'static str {
        SPECIAL_VARS[self as usize].1
    }

    pub fn description(self) -> &'static str {
        SPECIAL_VARS[self as usize].2
    }

    /// Always two characters on the wire: `T` goes out as `T_`.
    pub fn wire_name(self) -> String {
        format!("{:_<2}", self.name())
    }
}

impl fmt::Display for SpecialVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

pub const OPERATOR_REF: &str = "* / % + - < <= > >= == != ?:";
pub const ASSIGN_REF: &str = "= += -= *= /= %=";

/// Quick reference of everything a program may use.
pub fn reference() -> String {
    let mut functions: Vec<&str> = OPERATIONS
        .iter()
        .filter(|d| !d.infix)
        .map(|d| d.name)
        .collect();
    functions.sort();

    let mut out = String::new();
    out.push_str(&format!("OPERATORS: {}\n", OPERATOR_REF));
    out.push_str(&format!("ASSIGNS: {}\n", ASSIGN_REF));
    out.push_str(&format!("FUNCTIONS: {}\n", functions.join(", ")));
    out.push_str("SPECIAL VARS\n");
    for (_, name, description) in SPECIAL_VARS.iter() {
        out.push_str(&format!("  {}: {}\n", name, description));
    }
    out
}
