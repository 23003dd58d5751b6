/// Convenience result type used across spiceweasel.
pub type WeaselResult<T> = Result<T, WeaselError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Script and resolution errors reject the whole script before any frame is touched. Everything
/// else is a runtime failure that aborts the run.
#[derive(thiserror::Error, Debug)]
pub enum WeaselError {
    /// Syntax or semantic violation in the processing script.
    #[error("script error at line {line}: {message}")]
    Script {
        /// 1-based line number of the offending script line.
        line: usize,
        /// Human readable description.
        message: String,
    },

    /// Target graph could not be compiled into a program.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Invalid user-provided options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while executing a compiled program against a frame window.
    #[error("execution error: {0}")]
    Execution(String),

    /// Broken handshake between pipeline stages.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Reading or decoding an input frame failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Encoding or persisting an output frame failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeaselError {
    /// Build a [`WeaselError::Script`] value.
    pub fn script(line: usize, msg: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: msg.into(),
        }
    }

    /// Build a [`WeaselError::Resolution`] value.
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Build a [`WeaselError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WeaselError::Execution`] value.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Build a [`WeaselError::Pipeline`] value.
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Build a [`WeaselError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`WeaselError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Script line number, when the error carries one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Script { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
