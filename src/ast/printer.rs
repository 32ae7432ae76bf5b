use std::io;

use super::node::{
    BlockKind, ConditionalKind, FunctionKind, Literal, MemberKind, Node, NodeData, PairKind, VariableKind,
    WrapperKind,
};

/// Depth-indented textual dump of a tree, used for `--show-ast` and golden tests.
pub struct AstPrinter {
    output: String,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(1024),
        }
    }

    pub fn get_output(&self) -> &str {
        &self.output
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.output.push_str("  ");
        }
    }

    fn print_opt(&mut self, node: &Option<Box<Node>>, depth: usize) {
        match node {
            Some(node) => self.print(node, depth),
            None => {
                self.indent(depth);
                self.output.push_str("(none)");
            }
        }
    }

    pub fn print(&mut self, node: &Node, depth: usize) {
        self.indent(depth);

        match &node.data {
            NodeData::Unary { operand, .. } => {
                self.output.push_str(&format!("{}\n", node.kind()));
                self.print_opt(operand, depth + 1);
            }
            NodeData::Binary { lhs, rhs, .. } => {
                self.output.push_str(&format!("{}\n", node.kind()));
                self.print_opt(lhs, depth + 1);
                self.output.push('\n');
                self.print_opt(rhs, depth + 1);
            }
            NodeData::Block { kind, children } => match kind {
                BlockKind::Program => {
                    for child in children {
                        self.print(child, depth);
                    }
                }
                BlockKind::Block => {
                    self.output.push_str("{\n");
                    for child in children {
                        self.print(child, depth + 1);
                    }
                    self.indent(depth);
                    self.output.push_str("}\n");
                }
                BlockKind::ArrayInit => {
                    self.output.push_str("[\n");
                    for child in children {
                        self.print(child, depth + 1);
                        self.output.push('\n');
                    }
                    self.indent(depth + 1);
                    self.output.push_str("]\n");
                }
            },
            NodeData::Wrapper { kind, inner } => match kind {
                WrapperKind::ExprStmt => {
                    self.print_opt(inner, 0);
                    self.output.push('\n');
                }
                WrapperKind::Cast => {
                    self.output.push_str("cast\n");
                    self.print_opt(inner, depth);
                    self.output.push_str(&format!("\nas {}", node.ty));
                }
                WrapperKind::Return => {
                    self.output.push_str("return\n");
                    match inner {
                        Some(value) => self.print(value, depth + 1),
                        None => {
                            self.indent(depth + 1);
                            self.output.push_str("(void)");
                        }
                    }
                    self.output.push('\n');
                }
            },
            NodeData::Function { kind, function } => match kind {
                FunctionKind::Definition => {
                    self.output
                        .push_str(&format!("function {}: {}\n", function.name, function.return_type));
                    for arg in &function.arguments {
                        match arg.as_variable() {
                            Some(var) => self.output.push_str(&format!("({}: {}) ", var.name, var.ty)),
                            None => self.output.push_str(&format!("({}) ", arg.kind())),
                        }
                    }
                    if !function.has_implicit_body {
                        self.print_opt(&function.body, depth);
                    }
                }
                FunctionKind::Call | FunctionKind::CallMethod => {
                    self.output.push_str(&format!("(call {}", function.name));
                    for arg in &function.arguments {
                        self.output.push(' ');
                        self.print(arg, 0);
                    }
                    if *kind == FunctionKind::CallMethod {
                        self.output.push_str(") of\n");
                        self.print_opt(&function.parent, depth + 1);
                    } else {
                        self.output.push(')');
                    }
                }
            },
            NodeData::Conditional { kind, conditional } => match kind {
                ConditionalKind::If => {
                    self.output.push_str("if\n");
                    self.print_opt(&conditional.condition, depth + 1);
                    self.output.push('\n');
                    self.print_opt(&conditional.do_true, depth + 1);
                    self.output.push('\n');
                    if let Some(do_false) = &conditional.do_false {
                        self.indent(depth);
                        self.output.push_str("else\n");
                        self.print(do_false, depth + 1);
                        self.output.push('\n');
                    }
                }
                ConditionalKind::While => {
                    self.output.push_str("while\n");
                    self.print_opt(&conditional.condition, depth + 1);
                    self.output.push('\n');
                    self.print_opt(&conditional.do_true, depth + 1);
                    self.output.push('\n');
                }
                ConditionalKind::Ternary => {
                    self.output.push('(');
                    self.print_opt(&conditional.condition, 0);
                    self.output.push_str(") ?\n");
                    self.print_opt(&conditional.do_true, depth + 1);
                    self.output.push('\n');
                    self.print_opt(&conditional.do_false, depth + 1);
                }
            },
            NodeData::Loop(l) => {
                self.output.push_str("for\n");
                match &l.initial {
                    Some(initial) => self.print(initial, depth + 1),
                    None => {
                        self.indent(depth + 1);
                        self.output.push_str("(no initializer)\n");
                    }
                }
                match &l.condition {
                    Some(condition) => {
                        self.print(condition, depth + 1);
                        self.output.push('\n');
                    }
                    None => {
                        self.indent(depth + 1);
                        self.output.push_str("(no condition)\n");
                    }
                }
                match &l.iteration {
                    Some(iteration) => {
                        self.print(iteration, depth + 1);
                        self.output.push('\n');
                    }
                    None => {
                        self.indent(depth + 1);
                        self.output.push_str("(no iteration)\n");
                    }
                }
                self.print_opt(&l.body, depth + 1);
            }
            NodeData::Literal(literal) => match literal {
                Literal::Int(value) => self.output.push_str(&format!("(literal {})", value)),
                Literal::Char(value) => self.output.push_str(&format!("(literal '{}')", *value as u8 as char)),
                Literal::Str(bytes) => self
                    .output
                    .push_str(&format!("(literal \"{}\")", String::from_utf8_lossy(bytes))),
            },
            NodeData::Variable { kind, variable } => match kind {
                VariableKind::Define | VariableKind::DefineGlobal => {
                    self.output.push_str(&format!("var {}: {} ", variable.name, variable.ty));
                    if let Some(value) = &variable.value {
                        self.print(value, 0);
                    }
                    self.output.push('\n');
                }
                VariableKind::Access | VariableKind::AccessGlobal => {
                    self.output.push_str(&format!("(var {})", variable.name));
                }
                VariableKind::Assign | VariableKind::AssignGlobal => {
                    self.output.push_str(&format!("({} = ", variable.name));
                    self.print_opt(&variable.value, 0);
                    self.output.push(')');
                }
                VariableKind::Struct | VariableKind::Union => {
                    let keyword = if *kind == VariableKind::Struct { "struct" } else { "union" };
                    self.output.push_str(&format!("{} {}\n", keyword, variable.name));
                    for field in node.ty.fields() {
                        self.print(field, depth + 1);
                    }
                }
                VariableKind::Member => {
                    self.output.push_str(&format!("{}: {}\n", variable.name, variable.ty));
                }
            },
            NodeData::Constant(constant) => {
                self.output
                    .push_str(&format!("const {} = {}\n", constant.name, constant.value));
            }
            NodeData::Sizeof => {
                self.output.push_str(&format!("sizeof({})", node.ty));
            }
            NodeData::Pair { kind, lhs, rhs } => match kind {
                PairKind::AccessSubscript => {
                    self.output.push_str("subscript [\n");
                    self.print_opt(lhs, depth + 1);
                    self.output.push('\n');
                    self.print_opt(rhs, depth + 1);
                    self.output.push('\n');
                    self.indent(depth + 1);
                    self.output.push(']');
                }
                PairKind::AssignDeref => {
                    self.output.push_str("* =\n");
                    self.print_opt(lhs, depth + 1);
                    self.output.push('\n');
                    self.print_opt(rhs, depth + 1);
                }
            },
            NodeData::Ternary { lhs, mid, rhs } => {
                self.output.push_str("subscript = [\n");
                self.print_opt(lhs, depth + 1);
                self.output.push('\n');
                self.print_opt(mid, depth + 1);
                self.output.push('\n');
                self.print_opt(rhs, depth + 1);
                self.output.push('\n');
                self.indent(depth + 1);
                self.output.push(']');
            }
            NodeData::Member { kind, member } => {
                self.output.push_str(&format!(".{}\n", member.name));
                self.print_opt(&member.parent, depth + 1);
                if *kind == MemberKind::Assign {
                    self.output.push('\n');
                    self.print_opt(&member.value, depth + 1);
                }
            }
        }
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn print_ast(ast: &Node) -> String {
    let mut printer = AstPrinter::new();
    printer.print(ast, 0);
    printer.output
}

pub fn dump_ast(ast: &Node, out: &mut dyn io::Write) -> io::Result<()> {
    out.write_all(print_ast(ast).as_bytes())
}
