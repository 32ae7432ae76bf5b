use std::fmt;

use crate::ast::Type;
use crate::utils::errors::{CompileError, CompileResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterName {
    RAX, RBX, RCX, RDX,
    RSI, RDI, RBP, RSP,
    R8, R9,
}

impl RegisterName {
    /// Name of the sub-register covering the low `width` bytes.
    pub fn sized(&self, width: Width) -> &'static str {
        match (self, width) {
            (RegisterName::RAX, Width::Byte) => "al",
            (RegisterName::RAX, Width::Word) => "ax",
            (RegisterName::RAX, Width::Dword) => "eax",
            (RegisterName::RAX, Width::Qword) => "rax",
            (RegisterName::RBX, Width::Byte) => "bl",
            (RegisterName::RBX, Width::Word) => "bx",
            (RegisterName::RBX, Width::Dword) => "ebx",
            (RegisterName::RBX, Width::Qword) => "rbx",
            (RegisterName::RCX, Width::Byte) => "cl",
            (RegisterName::RCX, Width::Word) => "cx",
            (RegisterName::RCX, Width::Dword) => "ecx",
            (RegisterName::RCX, Width::Qword) => "rcx",
            (RegisterName::RDX, Width::Byte) => "dl",
            (RegisterName::RDX, Width::Word) => "dx",
            (RegisterName::RDX, Width::Dword) => "edx",
            (RegisterName::RDX, Width::Qword) => "rdx",
            (RegisterName::RSI, Width::Byte) => "sil",
            (RegisterName::RSI, Width::Word) => "si",
            (RegisterName::RSI, Width::Dword) => "esi",
            (RegisterName::RSI, Width::Qword) => "rsi",
            (RegisterName::RDI, Width::Byte) => "dil",
            (RegisterName::RDI, Width::Word) => "di",
            (RegisterName::RDI, Width::Dword) => "edi",
            (RegisterName::RDI, Width::Qword) => "rdi",
            (RegisterName::RBP, Width::Byte) => "bpl",
            (RegisterName::RBP, Width::Word) => "bp",
            (RegisterName::RBP, Width::Dword) => "ebp",
            (RegisterName::RBP, Width::Qword) => "rbp",
            (RegisterName::RSP, Width::Byte) => "spl",
            (RegisterName::RSP, Width::Word) => "sp",
            (RegisterName::RSP, Width::Dword) => "esp",
            (RegisterName::RSP, Width::Qword) => "rsp",
            (RegisterName::R8, Width::Byte) => "r8b",
            (RegisterName::R8, Width::Word) => "r8w",
            (RegisterName::R8, Width::Dword) => "r8d",
            (RegisterName::R8, Width::Qword) => "r8",
            (RegisterName::R9, Width::Byte) => "r9b",
            (RegisterName::R9, Width::Word) => "r9w",
            (RegisterName::R9, Width::Dword) => "r9d",
            (RegisterName::R9, Width::Qword) => "r9",
        }
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sized(Width::Qword))
    }
}

/// Memory operand width of a load or store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Word,
    Dword,
    Qword,
}

impl Width {
    pub fn from_size(size: usize) -> Option<Width> {
        match size {
            1 => Some(Width::Byte),
            2 => Some(Width::Word),
            4 => Some(Width::Dword),
            8 => Some(Width::Qword),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Width::Byte => "BYTE",
            Width::Word => "WORD",
            Width::Dword => "DWORD",
            Width::Qword => "QWORD",
        }
    }

    /// Width used to access a variable of type `ty`.
    ///
    /// An unresolved type here means an upstream pass failed to run.
    pub fn for_type(ty: &Type, line: usize) -> CompileResult<Width> {
        if ty.is_unresolved() {
            return Err(CompileError::InvariantViolation {
                message: format!("unresolved type '{}' reached code generation", ty),
                line,
            });
        }
        ty.scalar_size()
            .and_then(Width::from_size)
            .ok_or_else(|| CompileError::unsupported("variable access", format!("value of type {}", ty), line))
    }
}

/// Where operands and results live during lowering.
///
/// Every expression leaves its value in the accumulator. A binary operator
/// parks its left value on the stack, evaluates the right one, then moves it
/// to the scratch register (or the shift-count register for shifts) and pops
/// the left value back into the accumulator.
pub trait RegisterConvention {
    fn accumulator(&self) -> RegisterName;
    fn scratch(&self) -> RegisterName;
    fn shift_count(&self) -> RegisterName;
    /// Holds the remainder after a signed divide.
    fn remainder(&self) -> RegisterName;
    fn frame_base(&self) -> RegisterName;
    fn stack_pointer(&self) -> RegisterName;
    fn argument_registers(&self) -> &'static [RegisterName];
    fn syscall_argument(&self) -> RegisterName;
}

/// Check that a convention fits the instructions the generator emits.
///
/// `cqo`/`idiv` hard-wire `rax` and `rdx`. Variable shifts read their count
/// from `cl`. The scratch register must not share a register with any of them.
pub fn check_convention(convention: &dyn RegisterConvention) -> CompileResult<()> {
    let fixed = [
        ("accumulator", convention.accumulator(), RegisterName::RAX),
        ("remainder", convention.remainder(), RegisterName::RDX),
        ("shift count", convention.shift_count(), RegisterName::RCX),
        ("frame base", convention.frame_base(), RegisterName::RBP),
        ("stack pointer", convention.stack_pointer(), RegisterName::RSP),
        ("syscall argument", convention.syscall_argument(), RegisterName::RDI),
    ];
    for (role, actual, expected) in fixed {
        if actual != expected {
            return Err(CompileError::InvalidConvention(format!(
                "{} must be {}, got {}",
                role, expected, actual
            )));
        }
    }

    let scratch = convention.scratch();
    if fixed.iter().any(|&(_, reg, _)| reg == scratch) {
        return Err(CompileError::InvalidConvention(format!(
            "scratch register {} is clobbered by another role",
            scratch
        )));
    }

    let arguments = convention.argument_registers();
    if arguments.len() > SYSV_ARGUMENT_REGISTERS.len() {
        return Err(CompileError::InvalidConvention(format!(
            "{} argument registers given, at most {} are supported",
            arguments.len(),
            SYSV_ARGUMENT_REGISTERS.len()
        )));
    }
    for (i, reg) in arguments.iter().enumerate() {
        let reserved = [RegisterName::RAX, RegisterName::RBP, RegisterName::RSP];
        if reserved.contains(reg) || arguments[..i].contains(reg) {
            return Err(CompileError::InvalidConvention(format!(
                "{} cannot carry an argument",
                reg
            )));
        }
    }
    Ok(())
}

const SYSV_ARGUMENT_REGISTERS: &[RegisterName] = &[
    RegisterName::RDI,
    RegisterName::RSI,
    RegisterName::RDX,
    RegisterName::RCX,
    RegisterName::R8,
    RegisterName::R9,
];

/// The single-accumulator convention: `rax` result, `rbx` scratch, `cl` shift count,
/// System V integer registers for arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccumulatorConvention;

impl RegisterConvention for AccumulatorConvention {
    fn accumulator(&self) -> RegisterName { RegisterName::RAX }
    fn scratch(&self) -> RegisterName { RegisterName::RBX }
    fn shift_count(&self) -> RegisterName { RegisterName::RCX }
    fn remainder(&self) -> RegisterName { RegisterName::RDX }
    fn frame_base(&self) -> RegisterName { RegisterName::RBP }
    fn stack_pointer(&self) -> RegisterName { RegisterName::RSP }
    fn argument_registers(&self) -> &'static [RegisterName] { SYSV_ARGUMENT_REGISTERS }
    fn syscall_argument(&self) -> RegisterName { RegisterName::RDI }
}
