use log::trace;

use super::{
    convention::Width, emitter::CodeEmitter, expression_handlers, function_handlers, required, CodeGenerator,
};
use crate::{
    ast::{BlockKind, Conditional, ConditionalKind, Loop, Node, NodeData, VariableKind, WrapperKind},
    utils::errors::{CompileError, CompileResult},
};

pub fn handle_statement(gen: &mut CodeGenerator, node: &Node) -> CompileResult<()> {
    trace!("statement '{}' at line {}", node.kind(), node.line());
    match &node.data {
        NodeData::Wrapper {
            kind: WrapperKind::Return,
            inner,
        } => handle_return(gen, inner.as_deref()),
        NodeData::Wrapper {
            kind: WrapperKind::ExprStmt,
            inner,
        } => expression_handlers::handle_expression(gen, required(inner, node)?),
        NodeData::Variable {
            kind: VariableKind::Define,
            ..
        } => handle_define_var(gen, node),
        NodeData::Block {
            kind: BlockKind::Block,
            children,
        } => handle_block(gen, children),
        NodeData::Conditional {
            kind: ConditionalKind::If,
            conditional,
        } => handle_if(gen, node, conditional),
        NodeData::Conditional {
            kind: ConditionalKind::While,
            conditional,
        } => handle_while(gen, node, conditional),
        NodeData::Loop(l) => handle_for(gen, node, l),
        _ => Err(CompileError::unsupported("statement", node.kind().to_string(), node.line())),
    }
}

pub fn handle_block(gen: &mut CodeGenerator, statements: &[Node]) -> CompileResult<()> {
    for stmt in statements {
        handle_statement(gen, stmt)?;
    }
    Ok(())
}

pub fn handle_return(gen: &mut CodeGenerator, value: Option<&Node>) -> CompileResult<()> {
    if let Some(value) = value {
        expression_handlers::handle_expression(gen, value)?;
    }
    function_handlers::emit_epilogue(gen)
}

/// Store the initializer, if any, at the local's frame offset.
pub fn handle_define_var(gen: &mut CodeGenerator, node: &Node) -> CompileResult<()> {
    let var = node
        .as_variable()
        .ok_or_else(|| CompileError::codegen_error_with_line("local definition without a variable", node.line()))?;
    let value = match &var.value {
        Some(value) => value,
        None => return Ok(()),
    };
    function_handlers::check_offset(&var.name, var.stack_offset, node)?;
    let width = Width::for_type(&var.ty, node.line())?;

    expression_handlers::handle_expression(gen, value)?;
    let base = gen.convention.frame_base();
    let acc = gen.convention.accumulator();
    gen.emitter().emit_store(base, var.stack_offset, acc, width)
}

pub fn handle_if(gen: &mut CodeGenerator, node: &Node, cond: &Conditional) -> CompileResult<()> {
    let else_label = gen.create_label();
    let end_label = gen.create_label();
    let acc = gen.convention.accumulator();

    expression_handlers::handle_expression(gen, required(&cond.condition, node)?)?;
    gen.emitter().emit_branch_if_zero(acc, &else_label)?;
    handle_statement(gen, required(&cond.do_true, node)?)?;

    match &cond.do_false {
        Some(do_false) => {
            gen.emitter().emit_jump(&end_label)?;
            gen.emitter().emit_label(&else_label)?;
            handle_statement(gen, do_false)?;
            gen.emitter().emit_label(&end_label)
        }
        None => gen.emitter().emit_label(&else_label),
    }
}

pub fn handle_while(gen: &mut CodeGenerator, node: &Node, cond: &Conditional) -> CompileResult<()> {
    let start_label = gen.create_label();
    let end_label = gen.create_label();
    let acc = gen.convention.accumulator();

    gen.emitter().emit_label(&start_label)?;
    expression_handlers::handle_expression(gen, required(&cond.condition, node)?)?;
    gen.emitter().emit_branch_if_zero(acc, &end_label)?;
    handle_statement(gen, required(&cond.do_true, node)?)?;
    gen.emitter().emit_jump(&start_label)?;
    gen.emitter().emit_label(&end_label)
}

/// `for (initial; condition; iteration) body`. A missing condition loops forever.
pub fn handle_for(gen: &mut CodeGenerator, node: &Node, l: &Loop) -> CompileResult<()> {
    let start_label = gen.create_label();
    let end_label = gen.create_label();
    let acc = gen.convention.accumulator();

    if let Some(initial) = &l.initial {
        handle_clause(gen, initial)?;
    }
    gen.emitter().emit_label(&start_label)?;
    if let Some(condition) = &l.condition {
        expression_handlers::handle_expression(gen, condition)?;
        gen.emitter().emit_branch_if_zero(acc, &end_label)?;
    }
    handle_statement(gen, required(&l.body, node)?)?;
    if let Some(iteration) = &l.iteration {
        handle_clause(gen, iteration)?;
    }
    gen.emitter().emit_jump(&start_label)?;
    gen.emitter().emit_label(&end_label)
}

// Loop clauses may be either a statement or a bare expression.
fn handle_clause(gen: &mut CodeGenerator, clause: &Node) -> CompileResult<()> {
    match &clause.data {
        NodeData::Wrapper {
            kind: WrapperKind::ExprStmt,
            ..
        }
        | NodeData::Variable {
            kind: VariableKind::Define,
            ..
        }
        | NodeData::Block {
            kind: BlockKind::Block,
            ..
        } => handle_statement(gen, clause),
        _ => expression_handlers::handle_expression(gen, clause),
    }
}
