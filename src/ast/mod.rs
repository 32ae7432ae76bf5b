// Abstract Syntax Tree definitions and the type model.
// Trees arrive here fully built; types and frame offsets are filled in by
// the resolution and layout passes before code generation.

mod node;
mod position;
mod printer;
mod types;

pub use node::{
    is_binary_op, is_unary_op, BinaryOp, BlockKind, Conditional, ConditionalKind, Constant, Function,
    FunctionKind, Literal, Loop, Member, MemberKind, Node, NodeData, NodeKind, PairKind, UnaryOp, Variable,
    VariableKind, WrapperKind,
};
pub use position::Position;
pub use printer::{dump_ast, print_ast, AstPrinter};
pub use types::{type_to_string, Aggregate, BaseType, DataType, Primitive, Type};
