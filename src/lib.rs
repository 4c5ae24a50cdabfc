//! Compiles little LED-sign programs like
//!
//! ```text
//! x = sin(T) * 2;
//! y = x > 0.5 ? A : X;
//! ```
//!
//! into a flat list of steps and the serial line protocol the sign's
//! microcontroller executes.

pub mod codegen;
pub mod config;
pub mod control;
pub mod error;
mod lexer;
mod parser;
pub mod program;
pub mod registry;
mod token;
pub mod toplevel;
pub mod transport;

pub use config::{CompilerConfig, LinkConfig};
pub use error::{Diagnostic, Error, ErrorKind, Result};
pub use program::{Instruction, Operand, Program, MAX_STEPS};
pub use registry::{Operation, SpecialVar};
pub use toplevel::{compile, Outcome, Session};
