use std::fmt;

use super::position::Position;
use super::types::Type;
use crate::utils::config::ast::INITIAL_CHILD_CAPACITY;
use crate::utils::errors::{CompileError, CompileResult};

/// Every construct the parser can produce.
///
/// This is the flat tag view of a node; the payload shape lives in [`NodeData`]
/// and [`Node::kind`] derives the tag from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Block,
    ExprStmt,
    Cast,
    Function,
    If,
    For,
    While,
    Return,
    IntLiteral,
    CharLiteral,
    String,
    DefineVar,
    DefineGlobalVar,
    AccessVar,
    AccessGlobalVar,
    AssignVar,
    AssignGlobalVar,
    DefineConst,
    Call,
    CallMethod,
    ArrayInit,
    Union,
    Struct,
    Member,

    OpTernary,
    OpSizeof,
    OpAccessSubscript,
    OpAssignSubscript,
    OpAssignDeref,
    OpAccessMember,
    OpAssignMember,

    OpBwNot,
    OpNeg,
    OpNot,
    OpAddrOf,
    OpDeref,

    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
    OpMod,
    OpBwAnd,
    OpBwOr,
    OpXor,
    OpLsh,
    OpRsh,
    OpEqual,
    OpNotEqual,
    OpLess,
    OpLessEq,
    OpGreater,
    OpGreaterEq,
    OpOr,
    OpAnd,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Block => "block",
            NodeKind::ExprStmt => "expression statement",
            NodeKind::Cast => "cast",
            NodeKind::Function => "function",
            NodeKind::If => "if",
            NodeKind::For => "for",
            NodeKind::While => "while",
            NodeKind::Return => "return",
            NodeKind::IntLiteral => "int literal",
            NodeKind::CharLiteral => "char literal",
            NodeKind::String => "string",
            NodeKind::DefineVar => "define var",
            NodeKind::DefineGlobalVar => "define global var",
            NodeKind::AccessVar => "access var",
            NodeKind::AccessGlobalVar => "access global var",
            NodeKind::AssignVar => "assign var",
            NodeKind::AssignGlobalVar => "assign global var",
            NodeKind::DefineConst => "define const",
            NodeKind::Call => "call",
            NodeKind::CallMethod => "call method",
            NodeKind::ArrayInit => "array init",
            NodeKind::Union => "union",
            NodeKind::Struct => "struct",
            NodeKind::Member => "member",
            NodeKind::OpTernary => "?:",
            NodeKind::OpSizeof => "sizeof",
            NodeKind::OpAccessSubscript => "[]",
            NodeKind::OpAssignSubscript => "[]=",
            NodeKind::OpAssignDeref => "*=",
            NodeKind::OpAccessMember => ".",
            NodeKind::OpAssignMember => ".=",
            NodeKind::OpBwNot => "~",
            NodeKind::OpNeg => "neg",
            NodeKind::OpNot => "!",
            NodeKind::OpAddrOf => "addrof",
            NodeKind::OpDeref => "deref",
            NodeKind::OpAdd => "+",
            NodeKind::OpSub => "-",
            NodeKind::OpMul => "*",
            NodeKind::OpDiv => "/",
            NodeKind::OpMod => "%",
            NodeKind::OpBwAnd => "&",
            NodeKind::OpBwOr => "|",
            NodeKind::OpXor => "^",
            NodeKind::OpLsh => "<<",
            NodeKind::OpRsh => ">>",
            NodeKind::OpEqual => "==",
            NodeKind::OpNotEqual => "!=",
            NodeKind::OpLess => "<",
            NodeKind::OpLessEq => "<=",
            NodeKind::OpGreater => ">",
            NodeKind::OpGreaterEq => ">=",
            NodeKind::OpOr => "||",
            NodeKind::OpAnd => "&&",
        }
    }

    pub fn unary_op(&self) -> Option<UnaryOp> {
        match self {
            NodeKind::OpBwNot => Some(UnaryOp::BwNot),
            NodeKind::OpNeg => Some(UnaryOp::Neg),
            NodeKind::OpNot => Some(UnaryOp::Not),
            NodeKind::OpAddrOf => Some(UnaryOp::AddrOf),
            NodeKind::OpDeref => Some(UnaryOp::Deref),
            _ => None,
        }
    }

    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            NodeKind::OpAdd => Some(BinaryOp::Add),
            NodeKind::OpSub => Some(BinaryOp::Sub),
            NodeKind::OpMul => Some(BinaryOp::Mul),
            NodeKind::OpDiv => Some(BinaryOp::Div),
            NodeKind::OpMod => Some(BinaryOp::Mod),
            NodeKind::OpBwAnd => Some(BinaryOp::BwAnd),
            NodeKind::OpBwOr => Some(BinaryOp::BwOr),
            NodeKind::OpXor => Some(BinaryOp::Xor),
            NodeKind::OpLsh => Some(BinaryOp::Lsh),
            NodeKind::OpRsh => Some(BinaryOp::Rsh),
            NodeKind::OpEqual => Some(BinaryOp::Equal),
            NodeKind::OpNotEqual => Some(BinaryOp::NotEqual),
            NodeKind::OpLess => Some(BinaryOp::Less),
            NodeKind::OpLessEq => Some(BinaryOp::LessEq),
            NodeKind::OpGreater => Some(BinaryOp::Greater),
            NodeKind::OpGreaterEq => Some(BinaryOp::GreaterEq),
            NodeKind::OpOr => Some(BinaryOp::Or),
            NodeKind::OpAnd => Some(BinaryOp::And),
            _ => None,
        }
    }

    /// Kinds traversed as a generic one-operand operator.
    pub fn is_unary_op(&self) -> bool {
        self.unary_op().is_some()
    }

    /// Kinds traversed as a generic two-operand operator.
    pub fn is_binary_op(&self) -> bool {
        self.binary_op().is_some()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_unary_op(kind: NodeKind) -> bool {
    kind.is_unary_op()
}

pub fn is_binary_op(kind: NodeKind) -> bool {
    kind.is_binary_op()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    BwNot,
    Neg,
    Not,
    AddrOf,
    Deref,
}

impl UnaryOp {
    pub fn kind(&self) -> NodeKind {
        match self {
            UnaryOp::BwNot => NodeKind::OpBwNot,
            UnaryOp::Neg => NodeKind::OpNeg,
            UnaryOp::Not => NodeKind::OpNot,
            UnaryOp::AddrOf => NodeKind::OpAddrOf,
            UnaryOp::Deref => NodeKind::OpDeref,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BwAnd,
    BwOr,
    Xor,
    Lsh,
    Rsh,
    Equal,
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Or,
    And,
}

impl BinaryOp {
    pub fn kind(&self) -> NodeKind {
        match self {
            BinaryOp::Add => NodeKind::OpAdd,
            BinaryOp::Sub => NodeKind::OpSub,
            BinaryOp::Mul => NodeKind::OpMul,
            BinaryOp::Div => NodeKind::OpDiv,
            BinaryOp::Mod => NodeKind::OpMod,
            BinaryOp::BwAnd => NodeKind::OpBwAnd,
            BinaryOp::BwOr => NodeKind::OpBwOr,
            BinaryOp::Xor => NodeKind::OpXor,
            BinaryOp::Lsh => NodeKind::OpLsh,
            BinaryOp::Rsh => NodeKind::OpRsh,
            BinaryOp::Equal => NodeKind::OpEqual,
            BinaryOp::NotEqual => NodeKind::OpNotEqual,
            BinaryOp::Less => NodeKind::OpLess,
            BinaryOp::LessEq => NodeKind::OpLessEq,
            BinaryOp::Greater => NodeKind::OpGreater,
            BinaryOp::GreaterEq => NodeKind::OpGreaterEq,
            BinaryOp::Or => NodeKind::OpOr,
            BinaryOp::And => NodeKind::OpAnd,
        }
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, BinaryOp::Lsh | BinaryOp::Rsh)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEq
                | BinaryOp::Greater
                | BinaryOp::GreaterEq
        )
    }
}

/// Literal payload. Characters are stored as their integer value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Char(i64),
    Str(Vec<u8>),
}

/// Nodes wrapping a single child that are not operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKind {
    ExprStmt,
    Return,
    Cast,
}

/// Two-child nodes that are not generic binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    AccessSubscript,
    AssignDeref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Program,
    Block,
    ArrayInit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Define,
    DefineGlobal,
    Access,
    AccessGlobal,
    Assign,
    AssignGlobal,
    /// Field declaration inside a struct or union.
    Member,
    Struct,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Definition,
    Call,
    CallMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    If,
    While,
    Ternary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Access,
    Assign,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub value: Option<Box<Node>>,
    /// Displacement below the frame base, assigned by the layout pass.
    pub stack_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    /// `DefineVar` nodes for definitions, argument expressions for calls.
    pub arguments: Vec<Node>,
    pub body: Option<Box<Node>>,
    /// Set for declarations that have no definition in this unit.
    pub has_implicit_body: bool,
    /// Receiver of a method-style call.
    pub parent: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conditional {
    pub condition: Option<Box<Node>>,
    pub do_true: Option<Box<Node>>,
    pub do_false: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Loop {
    pub initial: Option<Box<Node>>,
    pub condition: Option<Box<Node>>,
    pub iteration: Option<Box<Node>>,
    pub body: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Member {
    pub name: String,
    pub parent: Option<Box<Node>>,
    pub value: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constant {
    pub name: String,
    pub value: i64,
}

/// Payload of a node. Each variant is one payload family and records which
/// concrete kind of that family the node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Literal(Literal),
    Unary {
        op: UnaryOp,
        operand: Option<Box<Node>>,
    },
    Binary {
        op: BinaryOp,
        lhs: Option<Box<Node>>,
        rhs: Option<Box<Node>>,
    },
    Wrapper {
        kind: WrapperKind,
        inner: Option<Box<Node>>,
    },
    Pair {
        kind: PairKind,
        lhs: Option<Box<Node>>,
        rhs: Option<Box<Node>>,
    },
    /// Subscript assignment: `target[index] = value`.
    Ternary {
        lhs: Option<Box<Node>>,
        mid: Option<Box<Node>>,
        rhs: Option<Box<Node>>,
    },
    Block {
        kind: BlockKind,
        children: Vec<Node>,
    },
    Variable {
        kind: VariableKind,
        variable: Variable,
    },
    Function {
        kind: FunctionKind,
        function: Function,
    },
    Conditional {
        kind: ConditionalKind,
        conditional: Conditional,
    },
    Loop(Loop),
    Member {
        kind: MemberKind,
        member: Member,
    },
    Constant(Constant),
    /// `sizeof`; the measured type is the node's own type.
    Sizeof,
}

impl NodeData {
    /// Zero-filled payload for the family `kind` belongs to.
    pub fn empty(kind: NodeKind) -> Self {
        let unary = |op: UnaryOp| NodeData::Unary { op, operand: None };
        let binary = |op: BinaryOp| NodeData::Binary {
            op,
            lhs: None,
            rhs: None,
        };
        let variable = |kind: VariableKind| NodeData::Variable {
            kind,
            variable: Variable::default(),
        };
        let function = |kind: FunctionKind| NodeData::Function {
            kind,
            function: Function::default(),
        };
        let conditional = |kind: ConditionalKind| NodeData::Conditional {
            kind,
            conditional: Conditional::default(),
        };
        let block = |kind: BlockKind| NodeData::Block {
            kind,
            children: Vec::new(),
        };
        match kind {
            NodeKind::Program => block(BlockKind::Program),
            NodeKind::Block => block(BlockKind::Block),
            NodeKind::ArrayInit => block(BlockKind::ArrayInit),
            NodeKind::ExprStmt => NodeData::Wrapper {
                kind: WrapperKind::ExprStmt,
                inner: None,
            },
            NodeKind::Return => NodeData::Wrapper {
                kind: WrapperKind::Return,
                inner: None,
            },
            NodeKind::Cast => NodeData::Wrapper {
                kind: WrapperKind::Cast,
                inner: None,
            },
            NodeKind::Function => function(FunctionKind::Definition),
            NodeKind::Call => function(FunctionKind::Call),
            NodeKind::CallMethod => function(FunctionKind::CallMethod),
            NodeKind::If => conditional(ConditionalKind::If),
            NodeKind::While => conditional(ConditionalKind::While),
            NodeKind::OpTernary => conditional(ConditionalKind::Ternary),
            NodeKind::For => NodeData::Loop(Loop::default()),
            NodeKind::IntLiteral => NodeData::Literal(Literal::Int(0)),
            NodeKind::CharLiteral => NodeData::Literal(Literal::Char(0)),
            NodeKind::String => NodeData::Literal(Literal::Str(Vec::new())),
            NodeKind::DefineVar => variable(VariableKind::Define),
            NodeKind::DefineGlobalVar => variable(VariableKind::DefineGlobal),
            NodeKind::AccessVar => variable(VariableKind::Access),
            NodeKind::AccessGlobalVar => variable(VariableKind::AccessGlobal),
            NodeKind::AssignVar => variable(VariableKind::Assign),
            NodeKind::AssignGlobalVar => variable(VariableKind::AssignGlobal),
            NodeKind::Member => variable(VariableKind::Member),
            NodeKind::Struct => variable(VariableKind::Struct),
            NodeKind::Union => variable(VariableKind::Union),
            NodeKind::DefineConst => NodeData::Constant(Constant::default()),
            NodeKind::OpSizeof => NodeData::Sizeof,
            NodeKind::OpAccessSubscript => NodeData::Pair {
                kind: PairKind::AccessSubscript,
                lhs: None,
                rhs: None,
            },
            NodeKind::OpAssignDeref => NodeData::Pair {
                kind: PairKind::AssignDeref,
                lhs: None,
                rhs: None,
            },
            NodeKind::OpAssignSubscript => NodeData::Ternary {
                lhs: None,
                mid: None,
                rhs: None,
            },
            NodeKind::OpAccessMember => NodeData::Member {
                kind: MemberKind::Access,
                member: Member::default(),
            },
            NodeKind::OpAssignMember => NodeData::Member {
                kind: MemberKind::Assign,
                member: Member::default(),
            },
            NodeKind::OpBwNot => unary(UnaryOp::BwNot),
            NodeKind::OpNeg => unary(UnaryOp::Neg),
            NodeKind::OpNot => unary(UnaryOp::Not),
            NodeKind::OpAddrOf => unary(UnaryOp::AddrOf),
            NodeKind::OpDeref => unary(UnaryOp::Deref),
            NodeKind::OpAdd => binary(BinaryOp::Add),
            NodeKind::OpSub => binary(BinaryOp::Sub),
            NodeKind::OpMul => binary(BinaryOp::Mul),
            NodeKind::OpDiv => binary(BinaryOp::Div),
            NodeKind::OpMod => binary(BinaryOp::Mod),
            NodeKind::OpBwAnd => binary(BinaryOp::BwAnd),
            NodeKind::OpBwOr => binary(BinaryOp::BwOr),
            NodeKind::OpXor => binary(BinaryOp::Xor),
            NodeKind::OpLsh => binary(BinaryOp::Lsh),
            NodeKind::OpRsh => binary(BinaryOp::Rsh),
            NodeKind::OpEqual => binary(BinaryOp::Equal),
            NodeKind::OpNotEqual => binary(BinaryOp::NotEqual),
            NodeKind::OpLess => binary(BinaryOp::Less),
            NodeKind::OpLessEq => binary(BinaryOp::LessEq),
            NodeKind::OpGreater => binary(BinaryOp::Greater),
            NodeKind::OpGreaterEq => binary(BinaryOp::GreaterEq),
            NodeKind::OpOr => binary(BinaryOp::Or),
            NodeKind::OpAnd => binary(BinaryOp::And),
        }
    }
}

/// A node of the syntax tree: position, resolved type and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub position: Position,
    pub ty: Type,
    pub data: NodeData,
}

impl Node {
    /// Allocate an empty node of `kind` at `position`.
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            position,
            ty: Type::default(),
            data: NodeData::empty(kind),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::Literal(Literal::Int(_)) => NodeKind::IntLiteral,
            NodeData::Literal(Literal::Char(_)) => NodeKind::CharLiteral,
            NodeData::Literal(Literal::Str(_)) => NodeKind::String,
            NodeData::Unary { op, .. } => op.kind(),
            NodeData::Binary { op, .. } => op.kind(),
            NodeData::Wrapper { kind, .. } => match kind {
                WrapperKind::ExprStmt => NodeKind::ExprStmt,
                WrapperKind::Return => NodeKind::Return,
                WrapperKind::Cast => NodeKind::Cast,
            },
            NodeData::Pair { kind, .. } => match kind {
                PairKind::AccessSubscript => NodeKind::OpAccessSubscript,
                PairKind::AssignDeref => NodeKind::OpAssignDeref,
            },
            NodeData::Ternary { .. } => NodeKind::OpAssignSubscript,
            NodeData::Block { kind, .. } => match kind {
                BlockKind::Program => NodeKind::Program,
                BlockKind::Block => NodeKind::Block,
                BlockKind::ArrayInit => NodeKind::ArrayInit,
            },
            NodeData::Variable { kind, .. } => match kind {
                VariableKind::Define => NodeKind::DefineVar,
                VariableKind::DefineGlobal => NodeKind::DefineGlobalVar,
                VariableKind::Access => NodeKind::AccessVar,
                VariableKind::AccessGlobal => NodeKind::AccessGlobalVar,
                VariableKind::Assign => NodeKind::AssignVar,
                VariableKind::AssignGlobal => NodeKind::AssignGlobalVar,
                VariableKind::Member => NodeKind::Member,
                VariableKind::Struct => NodeKind::Struct,
                VariableKind::Union => NodeKind::Union,
            },
            NodeData::Function { kind, .. } => match kind {
                FunctionKind::Definition => NodeKind::Function,
                FunctionKind::Call => NodeKind::Call,
                FunctionKind::CallMethod => NodeKind::CallMethod,
            },
            NodeData::Conditional { kind, .. } => match kind {
                ConditionalKind::If => NodeKind::If,
                ConditionalKind::While => NodeKind::While,
                ConditionalKind::Ternary => NodeKind::OpTernary,
            },
            NodeData::Loop(_) => NodeKind::For,
            NodeData::Member { kind, .. } => match kind {
                MemberKind::Access => NodeKind::OpAccessMember,
                MemberKind::Assign => NodeKind::OpAssignMember,
            },
            NodeData::Constant(_) => NodeKind::DefineConst,
            NodeData::Sizeof => NodeKind::OpSizeof,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    /// Append `child` to a block-shaped node (program, block or array initializer).
    pub fn add_child(&mut self, child: Node) -> CompileResult<()> {
        let kind = self.kind();
        match &mut self.data {
            NodeData::Block { children, .. } => {
                if children.capacity() == 0 {
                    children.reserve_exact(INITIAL_CHILD_CAPACITY);
                }
                children.push(child);
                Ok(())
            }
            _ => Err(CompileError::NotABlock {
                kind: kind.to_string(),
            }),
        }
    }

    /// Children of a block-shaped node; empty for every other node.
    pub fn children(&self) -> &[Node] {
        match &self.data {
            NodeData::Block { children, .. } => children,
            _ => &[],
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.data {
            NodeData::Variable { variable, .. } => Some(variable),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.data {
            NodeData::Function { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Every node directly owned by this one, in source order.
    pub fn subnodes(&self) -> Vec<&Node> {
        fn push<'a>(out: &mut Vec<&'a Node>, node: &'a Option<Box<Node>>) {
            if let Some(node) = node {
                out.push(node);
            }
        }
        let mut out = Vec::new();
        match &self.data {
            NodeData::Literal(_) | NodeData::Constant(_) | NodeData::Sizeof => {}
            NodeData::Unary { operand, .. } => push(&mut out, operand),
            NodeData::Wrapper { inner, .. } => push(&mut out, inner),
            NodeData::Binary { lhs, rhs, .. } | NodeData::Pair { lhs, rhs, .. } => {
                push(&mut out, lhs);
                push(&mut out, rhs);
            }
            NodeData::Ternary { lhs, mid, rhs } => {
                push(&mut out, lhs);
                push(&mut out, mid);
                push(&mut out, rhs);
            }
            NodeData::Block { children, .. } => out.extend(children.iter()),
            NodeData::Variable { variable, .. } => push(&mut out, &variable.value),
            NodeData::Function { function, .. } => {
                push(&mut out, &function.parent);
                out.extend(function.arguments.iter());
                push(&mut out, &function.body);
            }
            NodeData::Conditional { conditional, .. } => {
                push(&mut out, &conditional.condition);
                push(&mut out, &conditional.do_true);
                push(&mut out, &conditional.do_false);
            }
            NodeData::Loop(l) => {
                push(&mut out, &l.initial);
                push(&mut out, &l.condition);
                push(&mut out, &l.iteration);
                push(&mut out, &l.body);
            }
            NodeData::Member { member, .. } => {
                push(&mut out, &member.parent);
                push(&mut out, &member.value);
            }
        }
        out
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        1 + self.subnodes().iter().map(|n| n.node_count()).sum::<usize>()
    }
}

fn boxed(node: Node) -> Option<Box<Node>> {
    Some(Box::new(node))
}

// Builders used by front ends, the demo programs and tests.
impl Node {
    pub fn int_literal(value: i64) -> Self {
        Node {
            data: NodeData::Literal(Literal::Int(value)),
            ..Node::new(NodeKind::IntLiteral, Position::default())
        }
        .with_type(Type::int())
    }

    pub fn char_literal(value: u8) -> Self {
        Node {
            data: NodeData::Literal(Literal::Char(value as i64)),
            ..Node::new(NodeKind::CharLiteral, Position::default())
        }
        .with_type(Type::primitive(super::types::Primitive::I8))
    }

    pub fn string_literal(bytes: impl Into<Vec<u8>>) -> Self {
        Node {
            data: NodeData::Literal(Literal::Str(bytes.into())),
            ..Node::new(NodeKind::String, Position::default())
        }
        .with_type(Type::primitive(super::types::Primitive::I8).pointer_to())
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        // Logical not yields a truth value, like the comparisons.
        let ty = if op == UnaryOp::Not { Type::int() } else { operand.ty.clone() };
        Node {
            data: NodeData::Unary {
                op,
                operand: boxed(operand),
            },
            ..Node::new(op.kind(), Position::default())
        }
        .with_type(ty)
    }

    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Self {
        let ty = if op.is_comparison() {
            Type::int()
        } else {
            lhs.ty.clone()
        };
        Node {
            data: NodeData::Binary {
                op,
                lhs: boxed(lhs),
                rhs: boxed(rhs),
            },
            ..Node::new(op.kind(), Position::default())
        }
        .with_type(ty)
    }

    pub fn expr_stmt(expr: Node) -> Self {
        Node {
            data: NodeData::Wrapper {
                kind: WrapperKind::ExprStmt,
                inner: boxed(expr),
            },
            ..Node::new(NodeKind::ExprStmt, Position::default())
        }
    }

    pub fn ret(value: Option<Node>) -> Self {
        Node {
            data: NodeData::Wrapper {
                kind: WrapperKind::Return,
                inner: value.map(Box::new),
            },
            ..Node::new(NodeKind::Return, Position::default())
        }
    }

    pub fn cast(expr: Node, ty: Type) -> Self {
        Node {
            data: NodeData::Wrapper {
                kind: WrapperKind::Cast,
                inner: boxed(expr),
            },
            ..Node::new(NodeKind::Cast, Position::default())
        }
        .with_type(ty)
    }

    pub fn program(functions: Vec<Node>) -> Self {
        Node {
            data: NodeData::Block {
                kind: BlockKind::Program,
                children: functions,
            },
            ..Node::new(NodeKind::Program, Position::default())
        }
    }

    pub fn block(statements: Vec<Node>) -> Self {
        Node {
            data: NodeData::Block {
                kind: BlockKind::Block,
                children: statements,
            },
            ..Node::new(NodeKind::Block, Position::default())
        }
    }

    fn variable_node(kind: NodeKind, name: &str, ty: Type, stack_offset: usize, value: Option<Node>) -> Self {
        let mut node = Node::new(kind, Position::default()).with_type(ty.clone());
        if let NodeData::Variable { variable, .. } = &mut node.data {
            *variable = Variable {
                name: name.to_string(),
                ty,
                value: value.map(Box::new),
                stack_offset,
            };
        }
        node
    }

    pub fn define_var(name: &str, ty: Type, stack_offset: usize, value: Option<Node>) -> Self {
        Node::variable_node(NodeKind::DefineVar, name, ty, stack_offset, value)
    }

    pub fn access_var(name: &str, ty: Type, stack_offset: usize) -> Self {
        Node::variable_node(NodeKind::AccessVar, name, ty, stack_offset, None)
    }

    pub fn assign_var(name: &str, ty: Type, stack_offset: usize, value: Node) -> Self {
        Node::variable_node(NodeKind::AssignVar, name, ty, stack_offset, Some(value))
    }

    pub fn define_global_var(name: &str, ty: Type, value: Option<Node>) -> Self {
        Node::variable_node(NodeKind::DefineGlobalVar, name, ty, 0, value)
    }

    /// A struct or union field declaration.
    pub fn field(name: &str, ty: Type) -> Self {
        Node::variable_node(NodeKind::Member, name, ty, 0, None)
    }

    pub fn function(name: &str, return_type: Type, arguments: Vec<Node>, body: Node) -> Self {
        Node {
            data: NodeData::Function {
                kind: FunctionKind::Definition,
                function: Function {
                    name: name.to_string(),
                    return_type: return_type.clone(),
                    arguments,
                    body: boxed(body),
                    has_implicit_body: false,
                    parent: None,
                },
            },
            ..Node::new(NodeKind::Function, Position::default())
        }
        .with_type(return_type)
    }

    /// A function declared without a definition.
    pub fn declaration(name: &str, return_type: Type, arguments: Vec<Node>) -> Self {
        Node {
            data: NodeData::Function {
                kind: FunctionKind::Definition,
                function: Function {
                    name: name.to_string(),
                    return_type: return_type.clone(),
                    arguments,
                    body: boxed(Node::block(Vec::new())),
                    has_implicit_body: true,
                    parent: None,
                },
            },
            ..Node::new(NodeKind::Function, Position::default())
        }
        .with_type(return_type)
    }

    pub fn call(name: &str, arguments: Vec<Node>) -> Self {
        Node {
            data: NodeData::Function {
                kind: FunctionKind::Call,
                function: Function {
                    name: name.to_string(),
                    arguments,
                    ..Function::default()
                },
            },
            ..Node::new(NodeKind::Call, Position::default())
        }
        .with_type(Type::int())
    }

    pub fn call_method(name: &str, arguments: Vec<Node>, receiver: Node) -> Self {
        Node {
            data: NodeData::Function {
                kind: FunctionKind::CallMethod,
                function: Function {
                    name: name.to_string(),
                    arguments,
                    parent: boxed(receiver),
                    ..Function::default()
                },
            },
            ..Node::new(NodeKind::CallMethod, Position::default())
        }
        .with_type(Type::int())
    }

    fn conditional_node(kind: ConditionalKind, condition: Node, do_true: Node, do_false: Option<Node>) -> Self {
        let node_kind = match kind {
            ConditionalKind::If => NodeKind::If,
            ConditionalKind::While => NodeKind::While,
            ConditionalKind::Ternary => NodeKind::OpTernary,
        };
        Node {
            data: NodeData::Conditional {
                kind,
                conditional: Conditional {
                    condition: boxed(condition),
                    do_true: boxed(do_true),
                    do_false: do_false.map(Box::new),
                },
            },
            ..Node::new(node_kind, Position::default())
        }
    }

    pub fn if_else(condition: Node, do_true: Node, do_false: Option<Node>) -> Self {
        Node::conditional_node(ConditionalKind::If, condition, do_true, do_false)
    }

    pub fn while_loop(condition: Node, body: Node) -> Self {
        Node::conditional_node(ConditionalKind::While, condition, body, None)
    }

    pub fn ternary(condition: Node, do_true: Node, do_false: Node) -> Self {
        let ty = do_true.ty.clone();
        Node::conditional_node(ConditionalKind::Ternary, condition, do_true, Some(do_false)).with_type(ty)
    }

    pub fn for_loop(initial: Option<Node>, condition: Option<Node>, iteration: Option<Node>, body: Node) -> Self {
        Node {
            data: NodeData::Loop(Loop {
                initial: initial.map(Box::new),
                condition: condition.map(Box::new),
                iteration: iteration.map(Box::new),
                body: boxed(body),
            }),
            ..Node::new(NodeKind::For, Position::default())
        }
    }

    pub fn constant(name: &str, value: i64) -> Self {
        Node {
            data: NodeData::Constant(Constant {
                name: name.to_string(),
                value,
            }),
            ..Node::new(NodeKind::DefineConst, Position::default())
        }
        .with_type(Type::int())
    }

    pub fn sizeof(ty: Type) -> Self {
        Node::new(NodeKind::OpSizeof, Position::default()).with_type(ty)
    }

    pub fn access_member(name: &str, parent: Node) -> Self {
        Node {
            data: NodeData::Member {
                kind: MemberKind::Access,
                member: Member {
                    name: name.to_string(),
                    parent: boxed(parent),
                    value: None,
                },
            },
            ..Node::new(NodeKind::OpAccessMember, Position::default())
        }
    }

    pub fn assign_member(name: &str, parent: Node, value: Node) -> Self {
        Node {
            data: NodeData::Member {
                kind: MemberKind::Assign,
                member: Member {
                    name: name.to_string(),
                    parent: boxed(parent),
                    value: boxed(value),
                },
            },
            ..Node::new(NodeKind::OpAssignMember, Position::default())
        }
    }

    pub fn structure(name: &str, fields: Vec<Node>) -> Self {
        let ty = Type::structure(name, fields);
        Node::variable_node(NodeKind::Struct, name, ty, 0, None)
    }

    pub fn union(name: &str, fields: Vec<Node>) -> Self {
        let ty = Type::union(name, fields);
        Node::variable_node(NodeKind::Union, name, ty, 0, None)
    }

    pub fn assign_deref(target: Node, value: Node) -> Self {
        Node {
            data: NodeData::Pair {
                kind: PairKind::AssignDeref,
                lhs: boxed(target),
                rhs: boxed(value),
            },
            ..Node::new(NodeKind::OpAssignDeref, Position::default())
        }
    }

    pub fn access_subscript(target: Node, index: Node) -> Self {
        Node {
            data: NodeData::Pair {
                kind: PairKind::AccessSubscript,
                lhs: boxed(target),
                rhs: boxed(index),
            },
            ..Node::new(NodeKind::OpAccessSubscript, Position::default())
        }
    }

    pub fn assign_subscript(target: Node, index: Node, value: Node) -> Self {
        Node {
            data: NodeData::Ternary {
                lhs: boxed(target),
                mid: boxed(index),
                rhs: boxed(value),
            },
            ..Node::new(NodeKind::OpAssignSubscript, Position::default())
        }
    }
}
