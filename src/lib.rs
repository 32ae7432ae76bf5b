pub mod ast;
pub mod backend;
pub mod codegen;
pub mod demos;
pub mod driver;
pub mod utils;

pub const VERSION: &str = "0.1.0";

pub use utils::errors::{CompileError, CompileResult};
