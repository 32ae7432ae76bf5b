use log::trace;

use super::{
    convention::Width, emitter::CodeEmitter, function_handlers::check_offset, required, CodeGenerator,
};
use crate::{
    ast::{BinaryOp, Function, FunctionKind, Literal, Node, NodeData, UnaryOp, VariableKind},
    utils::{
        config::x86_64::TEMPORARY_SIZE,
        errors::{CompileError, CompileResult},
    },
};

/// Lower `node`, leaving its value in the accumulator.
pub fn handle_expression(gen: &mut CodeGenerator, node: &Node) -> CompileResult<()> {
    trace!("expression '{}' at line {}", node.kind(), node.line());
    match &node.data {
        NodeData::Literal(Literal::Int(value)) | NodeData::Literal(Literal::Char(value)) => {
            handle_literal(gen, *value)
        }
        NodeData::Unary { op, operand } => handle_unary(gen, node, *op, required(operand, node)?),
        NodeData::Binary { op, lhs, rhs } => {
            handle_binary(gen, node, *op, required(lhs, node)?, required(rhs, node)?)
        }
        NodeData::Variable {
            kind: VariableKind::Access,
            ..
        } => handle_access_var(gen, node),
        NodeData::Variable {
            kind: VariableKind::Assign,
            ..
        } => handle_assign_var(gen, node),
        NodeData::Function {
            kind: FunctionKind::Call,
            function,
        } => handle_call(gen, function),
        _ => Err(unsupported(node)),
    }
}

fn unsupported(node: &Node) -> CompileError {
    CompileError::unsupported("expression", node.kind().to_string(), node.line())
}

pub fn handle_literal(gen: &mut CodeGenerator, value: i64) -> CompileResult<()> {
    let acc = gen.convention.accumulator();
    gen.emitter().emit_mov_imm(acc, value)
}

pub fn handle_unary(gen: &mut CodeGenerator, node: &Node, op: UnaryOp, operand: &Node) -> CompileResult<()> {
    if matches!(op, UnaryOp::AddrOf | UnaryOp::Deref) {
        return Err(unsupported(node));
    }
    handle_expression(gen, operand)?;

    let acc = gen.convention.accumulator();
    let mut emitter = gen.emitter();
    match op {
        UnaryOp::BwNot => emitter.emit(&format!("not {}", acc)),
        UnaryOp::Neg => emitter.emit(&format!("neg {}", acc)),
        UnaryOp::Not => {
            emitter.emit(&format!("test {}, {}", acc, acc))?;
            emitter.emit_set_flag("e", acc)
        }
        UnaryOp::AddrOf | UnaryOp::Deref => Err(unsupported(node)),
    }
}

/// Left operand first, parked on the stack while the right one is evaluated.
pub fn handle_binary(gen: &mut CodeGenerator, node: &Node, op: BinaryOp, lhs: &Node, rhs: &Node) -> CompileResult<()> {
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        return Err(unsupported(node));
    }
    let acc = gen.convention.accumulator();

    handle_expression(gen, lhs)?;
    gen.emitter().emit_push(acc)?;
    gen.temporaries += 1;
    handle_expression(gen, rhs)?;
    gen.temporaries -= 1;

    if op.is_shift() {
        return emit_shift(gen, op);
    }

    let scratch = gen.convention.scratch();
    let remainder = gen.convention.remainder();
    let mut emitter = gen.emitter();
    emitter.emit_mov(scratch, acc)?;
    emitter.emit_pop(acc)?;

    if op.is_comparison() {
        emitter.emit(&format!("cmp {}, {}", acc, scratch))?;
        return emitter.emit_set_flag(condition_code(op), acc);
    }

    match op {
        BinaryOp::Add => emitter.emit(&format!("add {}, {}", acc, scratch)),
        BinaryOp::Sub => emitter.emit(&format!("sub {}, {}", acc, scratch)),
        BinaryOp::Mul => emitter.emit(&format!("imul {}, {}", acc, scratch)),
        BinaryOp::BwAnd => emitter.emit(&format!("and {}, {}", acc, scratch)),
        BinaryOp::BwOr => emitter.emit(&format!("or {}, {}", acc, scratch)),
        BinaryOp::Xor => emitter.emit(&format!("xor {}, {}", acc, scratch)),
        BinaryOp::Div | BinaryOp::Mod => {
            emitter.emit("cqo")?;
            emitter.emit(&format!("idiv {}", scratch))?;
            if op == BinaryOp::Mod {
                emitter.emit_mov(acc, remainder)?;
            }
            Ok(())
        }
        _ => Err(unsupported(node)),
    }
}

// The count must sit in cl, so the right operand goes to the shift-count register.
fn emit_shift(gen: &mut CodeGenerator, op: BinaryOp) -> CompileResult<()> {
    let acc = gen.convention.accumulator();
    let count = gen.convention.shift_count();
    let mnemonic = if op == BinaryOp::Lsh { "sal" } else { "sar" };

    let mut emitter = gen.emitter();
    emitter.emit_mov(count, acc)?;
    emitter.emit_pop(acc)?;
    emitter.emit(&format!("{} {}, {}", mnemonic, acc, count.sized(Width::Byte)))
}

fn condition_code(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Equal => "e",
        BinaryOp::NotEqual => "ne",
        BinaryOp::Less => "l",
        BinaryOp::LessEq => "le",
        BinaryOp::Greater => "g",
        _ => "ge",
    }
}

pub fn handle_access_var(gen: &mut CodeGenerator, node: &Node) -> CompileResult<()> {
    let var = node.as_variable().ok_or_else(|| unsupported(node))?;
    check_offset(&var.name, var.stack_offset, node)?;
    let width = Width::for_type(&var.ty, node.line())?;

    let acc = gen.convention.accumulator();
    let base = gen.convention.frame_base();
    gen.emitter().emit_load(acc, base, var.stack_offset, width)
}

/// Store the value and leave it in the accumulator as the expression's result.
pub fn handle_assign_var(gen: &mut CodeGenerator, node: &Node) -> CompileResult<()> {
    let var = node.as_variable().ok_or_else(|| unsupported(node))?;
    check_offset(&var.name, var.stack_offset, node)?;
    let width = Width::for_type(&var.ty, node.line())?;

    handle_expression(gen, required(&var.value, node)?)?;
    let acc = gen.convention.accumulator();
    let base = gen.convention.frame_base();
    gen.emitter().emit_store(base, var.stack_offset, acc, width)
}

/// Arguments are evaluated left to right onto the stack, then popped into
/// the argument registers last to first. The call is padded when an enclosing
/// expression left an odd number of temporaries on the stack.
pub fn handle_call(gen: &mut CodeGenerator, call: &Function) -> CompileResult<()> {
    let registers = gen.convention.argument_registers();
    if call.arguments.len() > registers.len() {
        return Err(CompileError::TooManyArguments {
            name: call.name.clone(),
            count: call.arguments.len(),
        });
    }

    let acc = gen.convention.accumulator();
    for arg in &call.arguments {
        handle_expression(gen, arg)?;
        gen.emitter().emit_push(acc)?;
        gen.temporaries += 1;
    }
    gen.temporaries -= call.arguments.len();

    // The frame keeps rsp 16-byte aligned; each parked temporary moves it by 8.
    let sp = gen.convention.stack_pointer();
    let misaligned = gen.temporaries % 2 == 1;
    let mut emitter = gen.emitter();
    for &reg in registers[..call.arguments.len()].iter().rev() {
        emitter.emit_pop(reg)?;
    }
    if misaligned {
        emitter.emit(&format!("sub {}, {}", sp, TEMPORARY_SIZE))?;
    }
    emitter.emit_call(&call.name)?;
    if misaligned {
        emitter.emit(&format!("add {}, {}", sp, TEMPORARY_SIZE))?;
    }
    Ok(())
}
