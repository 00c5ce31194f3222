use crate::domain::ports::CodeGenerator;
use rand::Rng;

/// Six-digit codes without a leading zero, so they survive being spoken as
/// a number.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn next_code(&self) -> String {
        rand::thread_rng().gen_range(100_000..1_000_000).to_string()
    }
}

/// Always hands out the same code. For demo scripts and tests.
#[derive(Debug, Clone)]
pub struct FixedCodeGenerator {
    code: String,
}

impl FixedCodeGenerator {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl CodeGenerator for FixedCodeGenerator {
    fn next_code(&self) -> String {
        self.code.clone()
    }
}
