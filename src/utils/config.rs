// x86-64 Architecture Constants
pub mod x86_64 {
    // Stack and memory alignment
    pub const STACK_ALIGNMENT: usize = 16;
    // Bytes one pushed register occupies
    pub const TEMPORARY_SIZE: usize = 8;
}

// AST storage constants
pub mod ast {
    // Block children start with this many slots and double afterwards
    pub const INITIAL_CHILD_CAPACITY: usize = 8;
}

// Code generation constants
pub mod codegen {
    use super::x86_64::STACK_ALIGNMENT;

    // Alignment helpers
    pub fn align_to_16(size: usize) -> usize {
        size.div_ceil(STACK_ALIGNMENT) * STACK_ALIGNMENT
    }

    pub const LOCAL_LABEL_PREFIX: &str = ".L";
}

// Assembly generation constants
pub mod assembly {
    pub const INSTRUCTION_INDENT: &str = "    ";
    pub const LABEL_SUFFIX: &str = ":\n";
    pub const ENTRY_LABEL: &str = "_start";
    pub const MAIN_LABEL: &str = "main";
    pub const FILE_EXTENSION: &str = "asm";
    // Forces NASM to read a reserved word as an identifier
    pub const SYMBOL_PREFIX: &str = "$";
}
