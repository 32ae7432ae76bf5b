use once_cell::sync::Lazy;
use regex::Regex;

use super::convention::{RegisterName, Width};
use crate::utils::config::assembly::{INSTRUCTION_INDENT, LABEL_SUFFIX, SYMBOL_PREFIX};
use crate::utils::errors::{CompileError, CompileResult};
use crate::utils::string_utils::write_line;

static LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_.?][A-Za-z0-9_$#@~.?]*$").expect("label pattern is valid"));

/// Reject names that are not NASM identifiers.
pub fn validate_label(label: &str) -> CompileResult<()> {
    if !LABEL_PATTERN.is_match(label) {
        return Err(CompileError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

/// Spelling of a function symbol in the output.
///
/// The `$` prefix makes NASM read the name as an identifier even when it is a
/// register, mnemonic or size keyword (`add`, `div`, `rax`, `qword`). The
/// symbol in the object file is the bare name.
pub fn symbol(name: &str) -> CompileResult<String> {
    validate_label(name)?;
    Ok(format!("{}{}", SYMBOL_PREFIX, name))
}

pub trait CodeEmitter {
    // Generic instruction emission
    fn emit(&mut self, instruction: &str) -> CompileResult<()>;
    fn emit_label(&mut self, label: &str) -> CompileResult<()>;
    fn emit_function_label(&mut self, name: &str) -> CompileResult<()>;
    fn emit_global(&mut self, label: &str) -> CompileResult<()>;
    fn emit_extern(&mut self, label: &str) -> CompileResult<()>;

    // Data movement
    fn emit_mov(&mut self, dest: RegisterName, src: RegisterName) -> CompileResult<()>;
    fn emit_mov_imm(&mut self, dest: RegisterName, value: i64) -> CompileResult<()>;
    fn emit_push(&mut self, reg: RegisterName) -> CompileResult<()>;
    fn emit_pop(&mut self, reg: RegisterName) -> CompileResult<()>;
    fn emit_load(&mut self, dest: RegisterName, base: RegisterName, offset: usize, width: Width) -> CompileResult<()>;
    fn emit_store(&mut self, base: RegisterName, offset: usize, src: RegisterName, width: Width) -> CompileResult<()>;

    // Flags and control flow
    fn emit_set_flag(&mut self, condition: &str, dest: RegisterName) -> CompileResult<()>;
    fn emit_branch_if_zero(&mut self, src: RegisterName, label: &str) -> CompileResult<()>;
    fn emit_jump(&mut self, label: &str) -> CompileResult<()>;
    fn emit_call(&mut self, label: &str) -> CompileResult<()>;
    fn emit_ret(&mut self) -> CompileResult<()>;
    fn emit_syscall(&mut self) -> CompileResult<()>;
}

pub struct StringCodeEmitter<'a> {
    output: &'a mut String,
}

impl<'a> StringCodeEmitter<'a> {
    pub fn new(output: &'a mut String) -> Self {
        StringCodeEmitter { output }
    }
}

impl<'a> CodeEmitter for StringCodeEmitter<'a> {
    fn emit(&mut self, instruction: &str) -> CompileResult<()> {
        write_line(self.output, format_args!("{}{}\n", INSTRUCTION_INDENT, instruction))
    }

    fn emit_label(&mut self, label: &str) -> CompileResult<()> {
        validate_label(label)?;
        write_line(self.output, format_args!("{}{}", label, LABEL_SUFFIX))
    }

    fn emit_function_label(&mut self, name: &str) -> CompileResult<()> {
        let name = symbol(name)?;
        write_line(self.output, format_args!("{}{}", name, LABEL_SUFFIX))
    }

    fn emit_global(&mut self, label: &str) -> CompileResult<()> {
        let label = symbol(label)?;
        write_line(self.output, format_args!("global {}\n", label))
    }

    fn emit_extern(&mut self, label: &str) -> CompileResult<()> {
        let label = symbol(label)?;
        write_line(self.output, format_args!("extern {}\n", label))
    }

    fn emit_mov(&mut self, dest: RegisterName, src: RegisterName) -> CompileResult<()> {
        self.emit(&format!("mov {}, {}", dest, src))
    }

    fn emit_mov_imm(&mut self, dest: RegisterName, value: i64) -> CompileResult<()> {
        self.emit(&format!("mov {}, {}", dest, value))
    }

    fn emit_push(&mut self, reg: RegisterName) -> CompileResult<()> {
        self.emit(&format!("push {}", reg))
    }

    fn emit_pop(&mut self, reg: RegisterName) -> CompileResult<()> {
        self.emit(&format!("pop {}", reg))
    }

    fn emit_load(&mut self, dest: RegisterName, base: RegisterName, offset: usize, width: Width) -> CompileResult<()> {
        let op = match width {
            Width::Qword => "mov",
            Width::Dword => "movsxd",
            Width::Word | Width::Byte => "movsx",
        };
        self.emit(&format!("{} {}, {} [{}-{}]", op, dest, width.keyword(), base, offset))
    }

    fn emit_store(&mut self, base: RegisterName, offset: usize, src: RegisterName, width: Width) -> CompileResult<()> {
        self.emit(&format!("mov {} [{}-{}], {}", width.keyword(), base, offset, src.sized(width)))
    }

    fn emit_set_flag(&mut self, condition: &str, dest: RegisterName) -> CompileResult<()> {
        self.emit(&format!("set{} {}", condition, dest.sized(Width::Byte)))?;
        self.emit(&format!("movzx {}, {}", dest, dest.sized(Width::Byte)))
    }

    fn emit_branch_if_zero(&mut self, src: RegisterName, label: &str) -> CompileResult<()> {
        self.emit(&format!("test {}, {}", src, src))?;
        self.emit(&format!("jz {}", label))
    }

    fn emit_jump(&mut self, label: &str) -> CompileResult<()> {
        self.emit(&format!("jmp {}", label))
    }

    fn emit_call(&mut self, label: &str) -> CompileResult<()> {
        let label = symbol(label)?;
        self.emit(&format!("call {}", label))
    }

    fn emit_ret(&mut self) -> CompileResult<()> {
        self.emit("ret")
    }

    fn emit_syscall(&mut self) -> CompileResult<()> {
        self.emit("syscall")
    }
}
