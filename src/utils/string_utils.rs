use crate::utils::errors::{CompileError, CompileResult};

/// Helper function for writing formatted strings to a buffer
/// Used by the instruction emitter and the tree printer
pub fn write_line(buf: &mut String, args: std::fmt::Arguments) -> CompileResult<()> {
    use std::fmt::Write;
    buf.write_fmt(args)
        .map_err(|_| CompileError::OutputError("fmt error".to_string()))
}
