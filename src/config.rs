use super::error::{ErrorKind, Result};
use super::program::MAX_STEPS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    pub max_steps: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            max_steps: MAX_STEPS,
        }
    }
}

impl CompilerConfig {
    pub fn new(max_steps: usize) -> Result<Self> {
        if max_steps == 0 || max_steps > MAX_STEPS {
            return Err(ErrorKind::Config(format!(
                "max steps must be between 1 and {}, got {}",
                MAX_STEPS, max_steps
            ))
            .into());
        }
        Ok(CompilerConfig { max_steps })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Prefixed to every framed message.
    pub lifespan: char,
    pub enabled: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            lifespan: '2',
            enabled: true,
        }
    }
}

impl LinkConfig {
    pub fn new(lifespan: char, enabled: bool) -> Result<Self> {
        if !lifespan.is_ascii_graphic() {
            return Err(ErrorKind::Config(format!(
                "lifespan must be a printable ASCII character, got {:?}",
                lifespan
            ))
            .into());
        }
        Ok(LinkConfig { lifespan, enabled })
    }
}
