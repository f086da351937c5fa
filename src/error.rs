//! Application error type.
//!
//! Every fallible operation in the crate returns `AppError`. The exit code is
//! carried alongside the message so `main` can map failures to process status
//! without matching on error kinds.

/// Bad arguments, malformed input files, or a broken caller contract.
pub const EXIT_INPUT: u8 = 2;
/// Input parsed fine but nothing usable remains.
pub const EXIT_NO_DATA: u8 = 3;
/// Write failures and other internal problems.
pub const EXIT_INTERNAL: u8 = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Paired sequences whose lengths disagree.
    pub fn length_mismatch(what: &str, left: usize, right: usize) -> Self {
        Self::new(
            EXIT_INPUT,
            format!("{what}: paired sequences differ in length ({left} vs {right})."),
        )
    }

    /// Decimal arithmetic left the representable range.
    pub fn amount_overflow(what: &str) -> Self {
        Self::new(EXIT_INPUT, format!("{what}: amount exceeds the supported decimal range."))
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
