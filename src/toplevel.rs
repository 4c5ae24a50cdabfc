use super::codegen;
use super::config::CompilerConfig;
use super::error::{Diagnostic, Result};
use super::parser;
use super::program::Program;
use super::transport::{Link, Transport};
use tracing::{debug, info, warn};

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| match line.find("//") {
            Some(at) => &line[..at],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiles a whole program. Statements are separated by `;` and run in
/// order; the first bad statement fails the pass.
pub fn compile(source: &str, config: &CompilerConfig) -> Result<Program> {
    let mut program = Program::new(config.max_steps);
    let source = strip_comments(source);

    for statement in source.split(';') {
        if let Err(e) = parser::compile_statement(&mut program, statement) {
            debug!("statement `{}` failed: {}", statement.trim(), e);
            return Err(e);
        }
    }

    debug!(
        steps = program.len(),
        vars = program.symbols().len(),
        "compiled"
    );
    Ok(program)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Same text as last time; nothing was done.
    Unchanged,
    Published { steps: usize },
    /// Compiled, but the link dropped the batch. Not remembered, so the same
    /// text goes out again once the link is back.
    Undelivered { steps: usize },
    /// The pass failed and the previous program stays active.
    Rejected(Diagnostic),
}

/// Recompiles on demand and pushes each good program out over a link.
pub struct Session<T: Transport> {
    config: CompilerConfig,
    link: Link<T>,
    last_input: Option<String>,
    active: Option<Program>,
}

impl<T: Transport> Session<T> {
    pub fn new(config: CompilerConfig, link: Link<T>) -> Self {
        Session {
            config,
            link,
            last_input: None,
            active: None,
        }
    }

    /// The last program that actually went out.
    pub fn active(&self) -> Option<&Program> {
        self.active.as_ref()
    }

    pub fn link(&self) -> &Link<T> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut Link<T> {
        &mut self.link
    }

    pub fn update(&mut self, source: &str) -> Result<Outcome> {
        if self.last_input.as_deref() == Some(source) {
            return Ok(Outcome::Unchanged);
        }

        let program = match compile(source, &self.config) {
            Ok(program) => program,
            Err(e) => {
                let diagnostic = Diagnostic::from(&e);
                warn!("{}", diagnostic);
                self.last_input = Some(source.to_owned());
                return Ok(Outcome::Rejected(diagnostic));
            }
        };

        let steps = program.len();
        let delivered = self.link.is_available();
        // A failed send leaves last_input alone so a retry resends.
        self.link.send_batch(&codegen::serialize(&program))?;
        if !delivered {
            return Ok(Outcome::Undelivered { steps });
        }

        info!(steps, "published program");
        self.last_input = Some(source.to_owned());
        self.active = Some(program);
        Ok(Outcome::Published { steps })
    }
}
