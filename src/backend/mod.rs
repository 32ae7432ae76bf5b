// OS-facing policy shared by the code generator and the driver
pub mod target_os;

pub use target_os::*;
