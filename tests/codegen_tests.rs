use minic::ast::{BinaryOp, Node, NodeKind, Position, Primitive, Type, UnaryOp};
use minic::backend::{FreeBSD, Linux};
use minic::codegen::convention::{check_convention, AccumulatorConvention, RegisterConvention, RegisterName};
use minic::codegen::emitter::{symbol, validate_label};
use minic::codegen::function_handlers::frame_size;
use minic::codegen::{generate, generate_for_target, CodeGenerator};
use minic::{demos, driver, CompileError, CompileResult};

#[cfg(test)]
mod tests {
    use super::*;

    fn main_returning(value: Node) -> Node {
        main_with(vec![Node::ret(Some(value))])
    }

    fn main_with(statements: Vec<Node>) -> Node {
        Node::program(vec![Node::function("main", Type::int(), Vec::new(), Node::block(statements))])
    }

    fn lines(asm: &str) -> Vec<&str> {
        asm.lines().map(|line| line.trim()).collect()
    }

    // True when `expected` appears as a contiguous run of lines.
    fn has_sequence(asm: &str, expected: &[&str]) -> bool {
        let lines = lines(asm);
        lines.windows(expected.len()).any(|window| window == expected)
    }

    fn position_of(asm: &str, line: &str) -> Option<usize> {
        lines(asm).iter().position(|l| *l == line)
    }

    #[test]
    fn test_main_returning_literal() -> CompileResult<()> {
        let asm = generate(&main_returning(Node::int_literal(42)))?;
        let expected = "global $main\n\
                        $main:\n    \
                        push rbp\n    \
                        mov rbp, rsp\n    \
                        mov rax, 42\n    \
                        mov rsp, rbp\n    \
                        pop rbp\n    \
                        ret\n\
                        global $_start\n\
                        $_start:\n    \
                        call $main\n    \
                        mov rdi, rax\n    \
                        mov rax, 60\n    \
                        syscall\n";
        assert_eq!(asm, expected);
        Ok(())
    }

    #[test]
    fn test_entry_routine_is_last_and_unique() -> CompileResult<()> {
        let asm = generate(&(demos::by_name("calls").ok_or("missing demo")?.build)())?;
        assert_eq!(asm.matches("$_start:").count(), 1);
        assert!(asm.ends_with("    syscall\n"));
        let start = position_of(&asm, "$_start:").ok_or("no entry label")?;
        assert!(position_of(&asm, "$add:").ok_or("no add")? < start);
        assert!(position_of(&asm, "$main:").ok_or("no main")? < start);
        Ok(())
    }

    #[test]
    fn test_freebsd_exit_syscall() -> CompileResult<()> {
        let asm = generate_for_target(&main_returning(Node::int_literal(0)), Box::new(FreeBSD))?;
        assert!(has_sequence(&asm, &["call $main", "mov rdi, rax", "mov rax, 1", "syscall"]));
        let asm = generate_for_target(&main_returning(Node::int_literal(0)), Box::new(Linux))?;
        assert!(has_sequence(&asm, &["mov rdi, rax", "mov rax, 60", "syscall"]));
        Ok(())
    }

    #[test]
    fn test_binary_uses_push_pop_discipline() -> CompileResult<()> {
        let expr = Node::binary(BinaryOp::Add, Node::int_literal(1), Node::int_literal(2));
        let asm = generate(&main_returning(expr))?;
        assert!(has_sequence(
            &asm,
            &["mov rax, 1", "push rax", "mov rax, 2", "mov rbx, rax", "pop rax", "add rax, rbx"]
        ));
        Ok(())
    }

    #[test]
    fn test_arithmetic_and_bitwise_instructions() -> CompileResult<()> {
        let cases = [
            (BinaryOp::Sub, "sub rax, rbx"),
            (BinaryOp::Mul, "imul rax, rbx"),
            (BinaryOp::BwAnd, "and rax, rbx"),
            (BinaryOp::BwOr, "or rax, rbx"),
            (BinaryOp::Xor, "xor rax, rbx"),
        ];
        for (op, instruction) in cases {
            let expr = Node::binary(op, Node::int_literal(6), Node::int_literal(3));
            let asm = generate(&main_returning(expr))?;
            assert!(has_sequence(&asm, &["mov rbx, rax", "pop rax", instruction]), "{:?}", op);
        }
        Ok(())
    }

    #[test]
    fn test_comparisons_are_normalized() -> CompileResult<()> {
        let cases = [
            (BinaryOp::Equal, "sete al"),
            (BinaryOp::NotEqual, "setne al"),
            (BinaryOp::Less, "setl al"),
            (BinaryOp::LessEq, "setle al"),
            (BinaryOp::Greater, "setg al"),
            (BinaryOp::GreaterEq, "setge al"),
        ];
        for (op, set) in cases {
            let expr = Node::binary(op, Node::int_literal(1), Node::int_literal(2));
            let asm = generate(&main_returning(expr))?;
            assert!(has_sequence(&asm, &["pop rax", "cmp rax, rbx", set, "movzx rax, al"]), "{:?}", op);
        }
        Ok(())
    }

    #[test]
    fn test_unary_operators() -> CompileResult<()> {
        let asm = generate(&main_returning(Node::unary(UnaryOp::BwNot, Node::int_literal(5))))?;
        assert!(has_sequence(&asm, &["mov rax, 5", "not rax"]));

        let asm = generate(&main_returning(Node::unary(UnaryOp::Neg, Node::int_literal(5))))?;
        assert!(has_sequence(&asm, &["mov rax, 5", "neg rax"]));

        let asm = generate(&main_returning(Node::unary(UnaryOp::Not, Node::int_literal(5))))?;
        assert!(has_sequence(&asm, &["mov rax, 5", "test rax, rax", "sete al", "movzx rax, al"]));
        Ok(())
    }

    #[test]
    fn test_char_literal_loads_its_value() -> CompileResult<()> {
        let asm = generate(&main_returning(Node::char_literal(b'A')))?;
        assert!(has_sequence(&asm, &["mov rax, 65"]));
        Ok(())
    }

    #[test]
    fn test_division_and_modulo() -> CompileResult<()> {
        let div = generate(&main_returning(Node::binary(BinaryOp::Div, Node::int_literal(10), Node::int_literal(3))))?;
        assert!(has_sequence(&div, &["mov rbx, rax", "pop rax", "cqo", "idiv rbx", "mov rsp, rbp"]));

        let rem = generate(&main_returning(Node::binary(BinaryOp::Mod, Node::int_literal(10), Node::int_literal(3))))?;
        assert!(has_sequence(&rem, &["cqo", "idiv rbx", "mov rax, rdx"]));
        Ok(())
    }

    #[test]
    fn test_shift_count_lands_in_rcx() -> CompileResult<()> {
        let lhs = Node::binary(BinaryOp::Add, Node::int_literal(1), Node::int_literal(2));
        let expr = Node::binary(BinaryOp::Lsh, lhs, Node::int_literal(3));
        let asm = generate(&main_returning(expr))?;
        assert!(has_sequence(
            &asm,
            &["add rax, rbx", "push rax", "mov rax, 3", "mov rcx, rax", "pop rax", "sal rax, cl"]
        ));

        let expr = Node::binary(BinaryOp::Rsh, Node::int_literal(16), Node::int_literal(2));
        let asm = generate(&main_returning(expr))?;
        assert!(has_sequence(&asm, &["mov rcx, rax", "pop rax", "sar rax, cl"]));
        Ok(())
    }

    #[test]
    fn test_left_operand_evaluated_first() -> CompileResult<()> {
        let expr = Node::binary(BinaryOp::Sub, Node::call("left", Vec::new()), Node::call("right", Vec::new()));
        let program = Node::program(vec![
            Node::declaration("left", Type::int(), Vec::new()),
            Node::declaration("right", Type::int(), Vec::new()),
            Node::function("main", Type::int(), Vec::new(), Node::block(vec![Node::ret(Some(expr))])),
        ]);
        let asm = generate(&program)?;
        assert!(asm.starts_with("extern $left\nextern $right\n"));
        let left = position_of(&asm, "call $left").ok_or("left not called")?;
        let right = position_of(&asm, "call $right").ok_or("right not called")?;
        assert!(left < right);
        assert!(has_sequence(
            &asm,
            &["call $left", "push rax", "sub rsp, 8", "call $right", "add rsp, 8", "mov rbx, rax", "pop rax"]
        ));
        Ok(())
    }

    #[test]
    fn test_non_function_at_top_level_is_rejected() {
        let program = Node::program(vec![
            Node::define_global_var("g", Type::int(), None).at(Position::new(3, 1)),
            Node::function("main", Type::int(), Vec::new(), Node::block(vec![Node::ret(Some(Node::int_literal(0)))])),
        ]);
        match generate(&program) {
            Err(CompileError::InvalidTopLevel { kind, line }) => {
                assert_eq!(kind, "define global var");
                assert_eq!(line, 3);
            }
            other => panic!("expected InvalidTopLevel, got {:?}", other),
        }

        assert!(matches!(
            generate(&Node::int_literal(1)),
            Err(CompileError::InvalidTopLevel { .. })
        ));
    }

    #[test]
    fn test_failed_generation_writes_no_file() -> CompileResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.asm");
        let program = Node::program(vec![Node::constant("N", 3)]);
        assert!(driver::compile_to_file(&program, &path, Box::new(Linux)).is_err());
        assert!(!path.exists());

        let asm = driver::compile_to_file(&main_returning(Node::int_literal(7)), &path, Box::new(Linux))?;
        assert_eq!(std::fs::read_to_string(&path)?, asm);
        Ok(())
    }

    #[test]
    fn test_logical_and_is_unsupported() {
        let expr = Node::binary(BinaryOp::And, Node::int_literal(1), Node::int_literal(0)).at(Position::new(4, 9));
        let err = generate(&main_returning(expr)).unwrap_err();
        match &err {
            CompileError::UnsupportedNode { kind, line, .. } => {
                assert_eq!(kind, "&&");
                assert_eq!(*line, 4);
            }
            other => panic!("expected UnsupportedNode, got {:?}", other),
        }
        assert!(err.to_string().contains("'&&'"));
    }

    #[test]
    fn test_other_constructs_fail_loudly() {
        let unsupported = vec![
            Node::binary(BinaryOp::Or, Node::int_literal(1), Node::int_literal(0)),
            Node::unary(UnaryOp::AddrOf, Node::access_var("x", Type::int(), 8)),
            Node::unary(UnaryOp::Deref, Node::access_var("p", Type::int().pointer_to(), 8)),
            Node::ternary(Node::int_literal(1), Node::int_literal(2), Node::int_literal(3)),
            Node::cast(Node::int_literal(1), Type::primitive(Primitive::I8)),
            Node::sizeof(Type::int()),
            Node::string_literal("hi"),
            Node::access_member("x", Node::access_var("p", Type::int(), 8)),
            Node::access_subscript(Node::access_var("a", Type::int().pointer_to(), 8), Node::int_literal(0)),
        ];
        for expr in unsupported {
            let kind = expr.kind();
            let result = generate(&main_returning(expr));
            assert!(
                matches!(result, Err(CompileError::UnsupportedNode { .. })),
                "{} should be rejected, got {:?}",
                kind,
                result
            );
        }
    }

    #[test]
    fn test_bare_expression_is_not_a_statement() {
        let result = generate(&main_with(vec![Node::int_literal(1)]));
        match result {
            Err(CompileError::UnsupportedNode { context, kind, .. }) => {
                assert_eq!(context, "statement");
                assert_eq!(kind, "int literal");
            }
            other => panic!("expected UnsupportedNode, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_operand_is_reported() {
        let broken = Node::new(NodeKind::OpAdd, Position::new(2, 5));
        assert!(matches!(
            generate(&main_returning(broken)),
            Err(CompileError::MissingOperand { line: 2, .. })
        ));
    }

    #[test]
    fn test_arguments_passed_in_registers() -> CompileResult<()> {
        let asm = generate(&(demos::by_name("calls").ok_or("missing demo")?.build)())?;
        assert!(has_sequence(
            &asm,
            &[
                "push rbp",
                "mov rbp, rsp",
                "sub rsp, 16",
                "mov QWORD [rbp-8], rdi",
                "mov QWORD [rbp-16], rsi",
            ]
        ));
        assert!(has_sequence(
            &asm,
            &["mov rax, 20", "push rax", "mov rax, 22", "push rax", "pop rsi", "pop rdi", "call $add"]
        ));
        Ok(())
    }

    #[test]
    fn test_calls_keep_stack_aligned() -> CompileResult<()> {
        let program = |expr: Node| {
            Node::program(vec![
                Node::declaration("g", Type::int(), Vec::new()),
                Node::function("main", Type::int(), Vec::new(), Node::block(vec![Node::ret(Some(expr))])),
            ])
        };

        // No temporaries parked: the frame alone keeps rsp aligned.
        let asm = generate(&program(Node::call("g", vec![Node::int_literal(1)])))?;
        assert!(has_sequence(&asm, &["push rax", "pop rdi", "call $g", "mov rsp, rbp"]));
        assert!(!asm.contains("sub rsp, 8"));

        // One parked left operand: pad by 8 around the call.
        let one = Node::binary(BinaryOp::Add, Node::int_literal(1), Node::call("g", Vec::new()));
        let asm = generate(&program(one))?;
        assert!(has_sequence(&asm, &["push rax", "sub rsp, 8", "call $g", "add rsp, 8", "mov rbx, rax"]));

        // Two parked values: already aligned.
        let inner = Node::binary(BinaryOp::Add, Node::int_literal(2), Node::call("g", Vec::new()));
        let two = Node::binary(BinaryOp::Add, Node::int_literal(1), inner);
        let asm = generate(&program(two))?;
        assert!(has_sequence(&asm, &["push rax", "mov rax, 2", "push rax", "call $g", "mov rbx, rax"]));
        assert!(!asm.contains("sub rsp, 8"));

        // An argument evaluated while an earlier argument is parked.
        let nested = Node::call("g", vec![Node::int_literal(5), Node::call("g", Vec::new())]);
        let asm = generate(&program(nested))?;
        assert!(has_sequence(&asm, &["mov rax, 5", "push rax", "sub rsp, 8", "call $g", "add rsp, 8", "push rax"]));
        assert!(has_sequence(&asm, &["pop rsi", "pop rdi", "call $g", "mov rsp, rbp"]));
        Ok(())
    }

    #[test]
    fn test_too_many_arguments() {
        let args = (0..7).map(Node::int_literal).collect();
        let program = Node::program(vec![
            Node::declaration("many", Type::int(), Vec::new()),
            Node::function(
                "main",
                Type::int(),
                Vec::new(),
                Node::block(vec![Node::ret(Some(Node::call("many", args)))]),
            ),
        ]);
        match generate(&program) {
            Err(CompileError::TooManyArguments { name, count }) => {
                assert_eq!(name, "many");
                assert_eq!(count, 7);
            }
            other => panic!("expected TooManyArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_locals_reserve_aligned_frame() -> CompileResult<()> {
        let asm = generate(&(demos::by_name("arith").ok_or("missing demo")?.build)())?;
        assert!(has_sequence(&asm, &["mov rbp, rsp", "sub rsp, 16"]));
        assert!(has_sequence(&asm, &["imul rax, rbx", "mov QWORD [rbp-8], rax", "mov rax, QWORD [rbp-8]"]));

        let function = Node::function(
            "f",
            Type::int(),
            vec![Node::define_var("a", Type::int(), 8, None)],
            Node::block(vec![Node::if_else(
                Node::int_literal(1),
                Node::block(vec![Node::define_var("deep", Type::int(), 24, None)]),
                None,
            )]),
        );
        assert_eq!(frame_size(&function), 32);
        assert_eq!(frame_size(&Node::function("g", Type::int(), Vec::new(), Node::block(Vec::new()))), 0);
        Ok(())
    }

    #[test]
    fn test_access_width_follows_declared_type() -> CompileResult<()> {
        let cases = [
            (Primitive::I8, 1, "mov BYTE [rbp-1], al", "movsx rax, BYTE [rbp-1]"),
            (Primitive::I16, 2, "mov WORD [rbp-2], ax", "movsx rax, WORD [rbp-2]"),
            (Primitive::I32, 4, "mov DWORD [rbp-4], eax", "movsxd rax, DWORD [rbp-4]"),
            (Primitive::I64, 8, "mov QWORD [rbp-8], rax", "mov rax, QWORD [rbp-8]"),
        ];
        for (primitive, offset, store, load) in cases {
            let ty = Type::primitive(primitive);
            let program = main_with(vec![
                Node::define_var("v", ty.clone(), offset, Some(Node::int_literal(3))),
                Node::ret(Some(Node::access_var("v", ty, offset))),
            ]);
            let asm = generate(&program)?;
            assert!(has_sequence(&asm, &["mov rax, 3", store, load]), "{:?}", primitive);
        }

        let ptr = Type::primitive(Primitive::I8).pointer_to();
        let program = main_with(vec![Node::ret(Some(Node::access_var("p", ptr, 8)))]);
        assert!(has_sequence(&generate(&program)?, &["mov rax, QWORD [rbp-8]"]));
        Ok(())
    }

    #[test]
    fn test_assignment_keeps_value_in_accumulator() -> CompileResult<()> {
        let assign = Node::assign_var("x", Type::int(), 8, Node::int_literal(9));
        let program = main_with(vec![
            Node::define_var("x", Type::int(), 8, None),
            Node::ret(Some(assign)),
        ]);
        let asm = generate(&program)?;
        assert!(has_sequence(&asm, &["mov rax, 9", "mov QWORD [rbp-8], rax", "mov rsp, rbp"]));
        Ok(())
    }

    #[test]
    fn test_unresolved_type_is_an_invariant_violation() {
        let program = main_returning(Node::access_var("x", Type::unresolved("T"), 8));
        assert!(matches!(generate(&program), Err(CompileError::InvariantViolation { .. })));
    }

    #[test]
    fn test_aggregate_and_void_values_cannot_be_loaded() {
        let point = Type::structure("Point", vec![Node::field("x", Type::int())]);
        let program = main_returning(Node::access_var("p", point, 16));
        assert!(matches!(generate(&program), Err(CompileError::UnsupportedNode { .. })));

        let program = main_returning(Node::access_var("v", Type::void(), 8));
        assert!(matches!(generate(&program), Err(CompileError::UnsupportedNode { .. })));
    }

    #[test]
    fn test_local_without_offset_is_rejected() {
        let program = main_with(vec![Node::define_var("x", Type::int(), 0, Some(Node::int_literal(1)))]);
        assert!(matches!(generate(&program), Err(CompileError::InvariantViolation { .. })));
    }

    #[test]
    fn test_implicit_epilogue() -> CompileResult<()> {
        let program = Node::program(vec![
            Node::function(
                "noop",
                Type::void(),
                Vec::new(),
                Node::block(vec![Node::expr_stmt(Node::int_literal(1))]),
            ),
            Node::function("main", Type::int(), Vec::new(), Node::block(vec![Node::ret(Some(Node::int_literal(0)))])),
        ]);
        let asm = generate(&program)?;
        assert!(has_sequence(&asm, &["mov rax, 1", "mov rsp, rbp", "pop rbp", "ret", "global $main"]));
        assert_eq!(lines(&asm).iter().filter(|l| **l == "ret").count(), 2);
        Ok(())
    }

    #[test]
    fn test_if_else_labels() -> CompileResult<()> {
        let asm = generate(&(demos::by_name("branch").ok_or("missing demo")?.build)())?;
        assert!(has_sequence(&asm, &["movzx rax, al", "test rax, rax", "jz .L0"]));
        assert!(has_sequence(&asm, &["ret", "jmp .L1", ".L0:", "mov rax, 0"]));
        assert!(has_sequence(&asm, &[".L1:", "mov rax, 1"]));
        Ok(())
    }

    #[test]
    fn test_while_loop_shape() -> CompileResult<()> {
        let asm = generate(&(demos::by_name("loop").ok_or("missing demo")?.build)())?;
        let start = position_of(&asm, ".L0:").ok_or("no loop head")?;
        let exit = position_of(&asm, "jz .L1").ok_or("no loop exit")?;
        let back = position_of(&asm, "jmp .L0").ok_or("no back edge")?;
        let end = position_of(&asm, ".L1:").ok_or("no loop end")?;
        assert!(start < exit && exit < back && back + 1 == end);
        Ok(())
    }

    #[test]
    fn test_for_loop_runs_initializer_once() -> CompileResult<()> {
        let asm = generate(&(demos::by_name("for").ok_or("missing demo")?.build)())?;
        let init = position_of(&asm, "mov QWORD [rbp-16], rax").ok_or("no initializer")?;
        let head = position_of(&asm, ".L0:").ok_or("no loop head")?;
        assert!(init < head);
        assert!(has_sequence(&asm, &["setl al", "movzx rax, al", "test rax, rax", "jz .L1"]));
        assert!(has_sequence(&asm, &["jmp .L0", ".L1:"]));
        Ok(())
    }

    #[test]
    fn test_labels_unique_across_functions() -> CompileResult<()> {
        let looping = |name: &str| {
            Node::function(
                name,
                Type::int(),
                Vec::new(),
                Node::block(vec![
                    Node::while_loop(Node::int_literal(0), Node::block(Vec::new())),
                    Node::ret(Some(Node::int_literal(0))),
                ]),
            )
        };
        let asm = generate(&Node::program(vec![looping("first"), looping("main")]))?;
        for label in [".L0:", ".L1:", ".L2:", ".L3:"] {
            assert_eq!(lines(&asm).iter().filter(|l| **l == label).count(), 1, "{}", label);
        }

        let mut generator = CodeGenerator::new();
        assert_eq!(generator.create_label(), ".L0");
        assert_eq!(generator.create_label(), ".L1");
        Ok(())
    }

    #[test]
    fn test_label_validation() {
        assert!(validate_label("main").is_ok());
        assert!(validate_label("_start").is_ok());
        assert!(validate_label(".L12").is_ok());
        assert!(validate_label("my_func2").is_ok());
        assert!(matches!(validate_label("1abc"), Err(CompileError::InvalidLabel(_))));
        assert!(matches!(validate_label("has space"), Err(CompileError::InvalidLabel(_))));
        assert!(matches!(validate_label("$x"), Err(CompileError::InvalidLabel(_))));
        assert!(matches!(validate_label(""), Err(CompileError::InvalidLabel(_))));

        let program = Node::program(vec![Node::function(
            "bad-name",
            Type::int(),
            Vec::new(),
            Node::block(vec![Node::ret(Some(Node::int_literal(0)))]),
        )]);
        assert!(matches!(generate(&program), Err(CompileError::InvalidLabel(_))));
    }

    #[test]
    fn test_reserved_words_as_function_names() -> CompileResult<()> {
        assert_eq!(symbol("add")?, "$add");
        assert_eq!(symbol("rax")?, "$rax");

        let reserved = ["add", "div", "ret", "call", "qword", "byte", "rbx"];
        let mut functions: Vec<Node> = reserved
            .iter()
            .map(|name| {
                Node::function(
                    name,
                    Type::int(),
                    Vec::new(),
                    Node::block(vec![Node::ret(Some(Node::int_literal(1)))]),
                )
            })
            .collect();
        functions.push(Node::function(
            "main",
            Type::int(),
            Vec::new(),
            Node::block(vec![Node::ret(Some(Node::call("div", Vec::new())))]),
        ));
        let asm = generate(&Node::program(functions))?;
        for name in reserved {
            let global = format!("global ${}", name);
            let label = format!("${}:", name);
            assert!(has_sequence(&asm, &[global.as_str(), label.as_str(), "push rbp"]), "{}", name);
            assert!(position_of(&asm, &format!("{}:", name)).is_none(), "{} emitted bare", name);
        }
        assert!(has_sequence(&asm, &["call $div", "mov rsp, rbp"]));
        assert!(position_of(&asm, "call div").is_none());
        Ok(())
    }

    // Same as the default policy but with a different scratch register.
    struct CustomConvention {
        scratch: RegisterName,
        remainder: RegisterName,
    }

    impl RegisterConvention for CustomConvention {
        fn accumulator(&self) -> RegisterName { RegisterName::RAX }
        fn scratch(&self) -> RegisterName { self.scratch }
        fn shift_count(&self) -> RegisterName { RegisterName::RCX }
        fn remainder(&self) -> RegisterName { self.remainder }
        fn frame_base(&self) -> RegisterName { RegisterName::RBP }
        fn stack_pointer(&self) -> RegisterName { RegisterName::RSP }
        fn argument_registers(&self) -> &'static [RegisterName] { AccumulatorConvention.argument_registers() }
        fn syscall_argument(&self) -> RegisterName { RegisterName::RDI }
    }

    fn custom(scratch: RegisterName, remainder: RegisterName) -> Box<dyn RegisterConvention> {
        Box::new(CustomConvention { scratch, remainder })
    }

    #[test]
    fn test_alternative_scratch_register() -> CompileResult<()> {
        let mut generator = CodeGenerator::new().with_convention(custom(RegisterName::R8, RegisterName::RDX))?;
        let expr = Node::binary(
            BinaryOp::Mod,
            Node::binary(BinaryOp::Add, Node::int_literal(7), Node::int_literal(6)),
            Node::int_literal(5),
        );
        generator.generate_program(&main_returning(expr))?;
        let asm = generator.get_output();
        assert!(has_sequence(asm, &["mov r8, rax", "pop rax", "add rax, r8"]));
        assert!(has_sequence(asm, &["mov r8, rax", "pop rax", "cqo", "idiv r8", "mov rax, rdx"]));
        assert!(!asm.contains("rbx"));
        Ok(())
    }

    #[test]
    fn test_conventions_fighting_fixed_registers_are_rejected() {
        let rejected = [
            (RegisterName::RDX, RegisterName::RDX),
            (RegisterName::RCX, RegisterName::RDX),
            (RegisterName::RAX, RegisterName::RDX),
            (RegisterName::RSP, RegisterName::RDX),
            (RegisterName::RBX, RegisterName::R9),
        ];
        for (scratch, remainder) in rejected {
            let result = CodeGenerator::new().with_convention(custom(scratch, remainder));
            match result {
                Err(CompileError::InvalidConvention(msg)) => assert!(!msg.is_empty()),
                Err(other) => panic!("expected InvalidConvention for {}, got {:?}", scratch, other),
                Ok(_) => panic!("scratch {} with remainder {} was accepted", scratch, remainder),
            }
        }

        assert!(check_convention(&AccumulatorConvention).is_ok());
        assert!(CodeGenerator::new().with_convention(Box::new(AccumulatorConvention)).is_ok());
    }

    #[test]
    fn test_codegen_errors_carry_a_line() {
        let err = CompileError::codegen_error_with_line("local definition without a variable", 12);
        assert!(matches!(err, CompileError::CodeGenError { line: Some(12), .. }));
        assert_eq!(
            err.to_string(),
            "Code generation error at line 12: local definition without a variable"
        );
    }

    #[test]
    fn test_generator_counts_functions() -> CompileResult<()> {
        let mut generator = CodeGenerator::new();
        generator.generate_program(&(demos::by_name("calls").ok_or("missing demo")?.build)())?;
        assert_eq!(generator.functions_emitted(), 2);
        assert!(generator.get_output().contains("global $add"));
        Ok(())
    }

    #[test]
    fn test_every_demo_generates() -> CompileResult<()> {
        for demo in demos::all() {
            let asm = generate(&(demo.build)())?;
            assert!(asm.contains("global $main"), "{}", demo.name);
        }
        Ok(())
    }
}
