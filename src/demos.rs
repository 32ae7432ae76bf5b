//! Sample programs built directly as trees, one per scenario the backend is
//! expected to handle end to end. Frame offsets are laid out by hand here.

use crate::ast::{BinaryOp, Node, Primitive, Type};

pub struct Demo {
    pub name: &'static str,
    pub description: &'static str,
    /// Exit status the linked program terminates with.
    pub expected_exit_status: i32,
    pub build: fn() -> Node,
}

pub const DEMOS: &[Demo] = &[
    Demo {
        name: "answer",
        description: "main returns the literal 42",
        expected_exit_status: 42,
        build: answer,
    },
    Demo {
        name: "arith",
        description: "(3 + 4) * 2 stored in a local, then returned",
        expected_exit_status: 14,
        build: arith,
    },
    Demo {
        name: "modulo",
        description: "returns 10 % 3",
        expected_exit_status: 1,
        build: modulo,
    },
    Demo {
        name: "divide",
        description: "returns 10 / 3",
        expected_exit_status: 3,
        build: divide,
    },
    Demo {
        name: "calls",
        description: "main returns add(20, 22)",
        expected_exit_status: 42,
        build: calls,
    },
    Demo {
        name: "loop",
        description: "while loop summing 10 down to 1",
        expected_exit_status: 55,
        build: while_sum,
    },
    Demo {
        name: "for",
        description: "for loop adding 2 five times",
        expected_exit_status: 10,
        build: for_count,
    },
    Demo {
        name: "branch",
        description: "if/else on a comparison",
        expected_exit_status: 100,
        build: branch,
    },
    Demo {
        name: "shift",
        description: "(1 << 4) >> 1",
        expected_exit_status: 8,
        build: shift,
    },
    Demo {
        name: "narrow",
        description: "300 stored in an i8 local wraps to 44",
        expected_exit_status: 44,
        build: narrow,
    },
];

pub fn all() -> &'static [Demo] {
    DEMOS
}

pub fn by_name(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.name == name)
}

pub fn names() -> Vec<&'static str> {
    DEMOS.iter().map(|demo| demo.name).collect()
}

fn int(value: i64) -> Node {
    Node::int_literal(value)
}

fn local(name: &str, offset: usize) -> Node {
    Node::access_var(name, Type::int(), offset)
}

fn main_returning(statements: Vec<Node>) -> Node {
    Node::program(vec![Node::function("main", Type::int(), Vec::new(), Node::block(statements))])
}

fn answer() -> Node {
    main_returning(vec![Node::ret(Some(int(42)))])
}

fn arith() -> Node {
    let sum = Node::binary(BinaryOp::Add, int(3), int(4));
    let product = Node::binary(BinaryOp::Mul, sum, int(2));
    main_returning(vec![
        Node::define_var("x", Type::int(), 8, Some(product)),
        Node::ret(Some(local("x", 8))),
    ])
}

fn modulo() -> Node {
    main_returning(vec![Node::ret(Some(Node::binary(BinaryOp::Mod, int(10), int(3))))])
}

fn divide() -> Node {
    main_returning(vec![Node::ret(Some(Node::binary(BinaryOp::Div, int(10), int(3))))])
}

fn calls() -> Node {
    let add = Node::function(
        "add",
        Type::int(),
        vec![
            Node::define_var("a", Type::int(), 8, None),
            Node::define_var("b", Type::int(), 16, None),
        ],
        Node::block(vec![Node::ret(Some(Node::binary(
            BinaryOp::Add,
            local("a", 8),
            local("b", 16),
        )))]),
    );
    let main = Node::function(
        "main",
        Type::int(),
        Vec::new(),
        Node::block(vec![Node::ret(Some(Node::call("add", vec![int(20), int(22)])))]),
    );
    Node::program(vec![add, main])
}

fn while_sum() -> Node {
    let body = Node::block(vec![
        Node::expr_stmt(Node::assign_var(
            "sum",
            Type::int(),
            8,
            Node::binary(BinaryOp::Add, local("sum", 8), local("i", 16)),
        )),
        Node::expr_stmt(Node::assign_var(
            "i",
            Type::int(),
            16,
            Node::binary(BinaryOp::Sub, local("i", 16), int(1)),
        )),
    ]);
    main_returning(vec![
        Node::define_var("sum", Type::int(), 8, Some(int(0))),
        Node::define_var("i", Type::int(), 16, Some(int(10))),
        Node::while_loop(Node::binary(BinaryOp::Greater, local("i", 16), int(0)), body),
        Node::ret(Some(local("sum", 8))),
    ])
}

fn for_count() -> Node {
    let step = Node::expr_stmt(Node::assign_var(
        "n",
        Type::int(),
        8,
        Node::binary(BinaryOp::Add, local("n", 8), int(2)),
    ));
    let lp = Node::for_loop(
        Some(Node::define_var("i", Type::int(), 16, Some(int(0)))),
        Some(Node::binary(BinaryOp::Less, local("i", 16), int(5))),
        Some(Node::assign_var(
            "i",
            Type::int(),
            16,
            Node::binary(BinaryOp::Add, local("i", 16), int(1)),
        )),
        Node::block(vec![step]),
    );
    main_returning(vec![
        Node::define_var("n", Type::int(), 8, Some(int(0))),
        lp,
        Node::ret(Some(local("n", 8))),
    ])
}

fn branch() -> Node {
    main_returning(vec![
        Node::define_var("x", Type::int(), 8, Some(int(5))),
        Node::if_else(
            Node::binary(BinaryOp::Equal, local("x", 8), int(5)),
            Node::block(vec![Node::ret(Some(int(100)))]),
            Some(Node::block(vec![Node::ret(Some(int(0)))])),
        ),
        Node::ret(Some(int(1))),
    ])
}

fn shift() -> Node {
    let left = Node::binary(BinaryOp::Lsh, int(1), int(4));
    main_returning(vec![Node::ret(Some(Node::binary(BinaryOp::Rsh, left, int(1))))])
}

fn narrow() -> Node {
    let byte = Type::primitive(Primitive::I8);
    main_returning(vec![
        Node::define_var("c", byte.clone(), 1, Some(int(300))),
        Node::ret(Some(Node::access_var("c", byte, 1))),
    ])
}
