use log::debug;

use super::{convention::Width, emitter::CodeEmitter, required, statement_handlers, CodeGenerator};
use crate::{
    ast::{Function, Node, NodeData, NodeKind, VariableKind},
    utils::{
        config::codegen::align_to_16,
        errors::{CompileError, CompileResult},
    },
};

pub fn handle_function(gen: &mut CodeGenerator, node: &Node, function: &Function) -> CompileResult<()> {
    if function.has_implicit_body {
        debug!("'{}' has no body, declaring it external", function.name);
        return gen.emitter().emit_extern(&function.name);
    }

    let registers = gen.convention.argument_registers();
    if function.arguments.len() > registers.len() {
        return Err(CompileError::TooManyArguments {
            name: function.name.clone(),
            count: function.arguments.len(),
        });
    }

    let body = required(&function.body, node)?;
    let frame = frame_size(node);
    let base = gen.convention.frame_base();
    let sp = gen.convention.stack_pointer();

    {
        let mut emitter = gen.emitter();
        emitter.emit_global(&function.name)?;
        emitter.emit_function_label(&function.name)?;
        emitter.emit_push(base)?;
        emitter.emit_mov(base, sp)?;
        if frame > 0 {
            emitter.emit(&format!("sub {}, {}", sp, frame))?;
        }
    }

    for (arg, &reg) in function.arguments.iter().zip(registers) {
        let var = match &arg.data {
            NodeData::Variable {
                kind: VariableKind::Define,
                variable,
            } => variable,
            _ => return Err(CompileError::unsupported("function arguments", arg.kind().to_string(), arg.line())),
        };
        check_offset(&var.name, var.stack_offset, arg)?;
        let width = Width::for_type(&var.ty, arg.line())?;
        gen.emitter().emit_store(base, var.stack_offset, reg, width)?;
    }

    statement_handlers::handle_statement(gen, body)?;

    if !ends_in_return(body) {
        emit_epilogue(gen)?;
    }

    gen.functions_emitted += 1;
    debug!("'{}' emitted with a {} byte frame", function.name, frame);
    Ok(())
}

/// Tear down the frame and return to the caller. The result stays in the accumulator.
pub fn emit_epilogue(gen: &mut CodeGenerator) -> CompileResult<()> {
    let base = gen.convention.frame_base();
    let sp = gen.convention.stack_pointer();
    let mut emitter = gen.emitter();
    emitter.emit_mov(sp, base)?;
    emitter.emit_pop(base)?;
    emitter.emit_ret()
}

/// Bytes to reserve below the frame base: the deepest local or argument
/// offset in the function, rounded up to the stack alignment.
pub fn frame_size(function: &Node) -> usize {
    fn deepest(node: &Node) -> usize {
        let own = match &node.data {
            NodeData::Variable {
                kind: VariableKind::Define,
                variable,
            } => variable.stack_offset,
            _ => 0,
        };
        node.subnodes().into_iter().map(deepest).fold(own, usize::max)
    }
    align_to_16(deepest(function))
}

/// A local at offset 0 would overwrite the saved frame base.
pub(crate) fn check_offset(name: &str, offset: usize, node: &Node) -> CompileResult<()> {
    if offset == 0 {
        return Err(CompileError::InvariantViolation {
            message: format!("variable '{}' has no frame offset", name),
            line: node.line(),
        });
    }
    Ok(())
}

fn ends_in_return(body: &Node) -> bool {
    match body.children().last() {
        Some(last) => last.kind() == NodeKind::Return,
        None => body.kind() == NodeKind::Return,
    }
}
