pub mod convention;
pub mod emitter;
pub mod expression_handlers;
pub mod function_handlers;
pub mod statement_handlers;

use log::{debug, info};

use crate::{
    ast::{BlockKind, FunctionKind, Node, NodeData},
    backend::{Linux, TargetOS},
    utils::{
        config::{
            assembly::{ENTRY_LABEL, MAIN_LABEL},
            codegen::LOCAL_LABEL_PREFIX,
        },
        errors::{CompileError, CompileResult},
    },
};
use convention::{check_convention, AccumulatorConvention, RegisterConvention};
use emitter::{CodeEmitter, StringCodeEmitter};

/// Lowers a typed, laid-out tree to NASM x86-64 text.
///
/// Output is buffered; nothing is written anywhere until the whole tree has
/// been lowered without error.
pub struct CodeGenerator {
    pub(crate) code: String,
    pub(crate) label_counter: usize,
    pub(crate) convention: Box<dyn RegisterConvention>,
    pub(crate) target_os: Box<dyn TargetOS>,
    pub(crate) functions_emitted: usize,
    /// Accumulator values currently parked on the stack within the function.
    pub(crate) temporaries: usize,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::with_target(Box::new(Linux))
    }

    pub fn with_target(target_os: Box<dyn TargetOS>) -> Self {
        Self {
            code: String::with_capacity(4096),
            label_counter: 0,
            convention: Box::new(AccumulatorConvention),
            target_os,
            functions_emitted: 0,
            temporaries: 0,
        }
    }

    /// Swap the register policy. Conventions the fixed-register instructions
    /// cannot honour are rejected.
    pub fn with_convention(mut self, convention: Box<dyn RegisterConvention>) -> CompileResult<Self> {
        check_convention(convention.as_ref())?;
        self.convention = convention;
        Ok(self)
    }

    /// A fresh function-local label, unique within this generator.
    pub fn create_label(&mut self) -> String {
        let label = format!("{}{}", LOCAL_LABEL_PREFIX, self.label_counter);
        self.label_counter += 1;
        label
    }

    pub(crate) fn emitter(&mut self) -> StringCodeEmitter<'_> {
        StringCodeEmitter::new(&mut self.code)
    }

    pub fn get_output(&self) -> &str {
        &self.code
    }

    pub fn into_output(self) -> String {
        self.code
    }

    pub fn functions_emitted(&self) -> usize {
        self.functions_emitted
    }

    /// Lower a whole program: every top-level function, then the entry routine.
    pub fn generate_program(&mut self, root: &Node) -> CompileResult<()> {
        let children = match &root.data {
            NodeData::Block {
                kind: BlockKind::Program | BlockKind::Block,
                children,
            } => children,
            _ => {
                return Err(CompileError::InvalidTopLevel {
                    kind: root.kind().to_string(),
                    line: root.line(),
                })
            }
        };

        info!("Generating code for {} top-level declarations", children.len());
        for child in children {
            match &child.data {
                NodeData::Function {
                    kind: FunctionKind::Definition,
                    function,
                } => {
                    debug!("Lowering function '{}'", function.name);
                    function_handlers::handle_function(self, child, function)?;
                }
                _ => {
                    return Err(CompileError::InvalidTopLevel {
                        kind: child.kind().to_string(),
                        line: child.line(),
                    })
                }
            }
        }

        self.emit_entry()
    }

    /// `_start`: call `main` and hand its result to the exit system call.
    fn emit_entry(&mut self) -> CompileResult<()> {
        let acc = self.convention.accumulator();
        let arg0 = self.convention.syscall_argument();
        let exit = self.target_os.syscall_exit();
        debug!("Emitting entry routine for {}", self.target_os.name());

        let mut emitter = self.emitter();
        emitter.emit_global(ENTRY_LABEL)?;
        emitter.emit_function_label(ENTRY_LABEL)?;
        emitter.emit_call(MAIN_LABEL)?;
        emitter.emit_mov(arg0, acc)?;
        emitter.emit_mov_imm(acc, exit as i64)?;
        emitter.emit_syscall()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwrap an operand slot that the tree shape requires to be filled.
pub(crate) fn required<'a>(slot: &'a Option<Box<Node>>, owner: &Node) -> CompileResult<&'a Node> {
    slot.as_deref().ok_or_else(|| CompileError::MissingOperand {
        kind: owner.kind().to_string(),
        line: owner.line(),
    })
}

/// Generate assembly for `root` targeting Linux.
pub fn generate(root: &Node) -> CompileResult<String> {
    generate_for_target(root, Box::new(Linux))
}

pub fn generate_for_target(root: &Node, target_os: Box<dyn TargetOS>) -> CompileResult<String> {
    let mut generator = CodeGenerator::with_target(target_os);
    generator.generate_program(root)?;
    Ok(generator.into_output())
}
