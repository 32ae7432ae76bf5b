use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CompileError {
    // File and I/O errors
    FileWriteError(String),
    IoError(io::Error),

    // Tree construction errors
    NotABlock {
        kind: String,
    },

    // Code generation errors
    UnsupportedNode {
        context: String,
        kind: String,
        line: usize,
    },
    InvalidTopLevel {
        kind: String,
        line: usize,
    },
    MissingOperand {
        kind: String,
        line: usize,
    },
    InvariantViolation {
        message: String,
        line: usize,
    },
    TooManyArguments {
        name: String,
        count: usize,
    },
    InvalidLabel(String),
    InvalidConvention(String),
    CodeGenError {
        message: String,
        line: Option<usize>,
    },

    // Assembly generation errors
    OutputError(String),

    // Compilation pipeline errors
    CompilationError {
        stage: String,
        message: String,
    },

    // Generic errors
    GenericError(String),
}

impl CompileError {
    /// Create a code generation error with line information
    pub fn codegen_error_with_line(message: impl Into<String>, line: usize) -> Self {
        CompileError::CodeGenError {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Report a construct the generator has no lowering rule for
    pub fn unsupported(context: impl Into<String>, kind: impl Into<String>, line: usize) -> Self {
        CompileError::UnsupportedNode {
            context: context.into(),
            kind: kind.into(),
            line,
        }
    }

    /// Create a compilation error for a specific stage
    pub fn compilation_error(stage: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::CompilationError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::FileWriteError(msg) => write!(f, "File write error: {}", msg),
            CompileError::IoError(err) => write!(f, "I/O error: {}", err),

            CompileError::NotABlock { kind } => {
                write!(f, "Cannot add a child to non-block node '{}'", kind)
            }

            CompileError::UnsupportedNode { context, kind, line } => {
                write!(f, "Unsupported type '{}' in {} at line {}", kind, context, line)
            }
            CompileError::InvalidTopLevel { kind, line } => {
                write!(f, "Top-level declaration at line {} must be a function, found '{}'", line, kind)
            }
            CompileError::MissingOperand { kind, line } => {
                write!(f, "Node '{}' at line {} is missing an operand", kind, line)
            }
            CompileError::InvariantViolation { message, line } => {
                write!(f, "Internal invariant violated at line {}: {}", line, message)
            }
            CompileError::TooManyArguments { name, count } => {
                write!(f, "Call to '{}' passes {} arguments, at most 6 are supported", name, count)
            }
            CompileError::InvalidLabel(label) => {
                write!(f, "'{}' is not a valid assembly label", label)
            }
            CompileError::InvalidConvention(msg) => {
                write!(f, "Unusable register convention: {}", msg)
            }
            CompileError::CodeGenError { message, line } => {
                if let Some(l) = line {
                    write!(f, "Code generation error at line {}: {}", l, message)
                } else {
                    write!(f, "Code generation error: {}", message)
                }
            }

            CompileError::OutputError(msg) => {
                write!(f, "Output error: {}", msg)
            }

            CompileError::CompilationError { stage, message } => {
                write!(f, "Compilation error in {}: {}", stage, message)
            }

            CompileError::GenericError(msg) => {
                write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CompileError {}

// Conversion implementations for common error types
impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        CompileError::IoError(err)
    }
}

impl From<fmt::Error> for CompileError {
    fn from(_: fmt::Error) -> Self {
        CompileError::OutputError("fmt error".to_string())
    }
}

impl From<String> for CompileError {
    fn from(err: String) -> Self {
        CompileError::GenericError(err)
    }
}

impl From<&str> for CompileError {
    fn from(err: &str) -> Self {
        CompileError::GenericError(err.to_string())
    }
}

// Type alias for Result with CompileError
pub type CompileResult<T> = Result<T, CompileError>;
