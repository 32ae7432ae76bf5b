pub mod config;
pub mod errors;
pub mod string_utils;

pub use config::*;
pub use errors::*;
pub use string_utils::write_line;
