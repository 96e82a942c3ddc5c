// tests/parser_tests.rs

use graphnav_lang::ast::{BinaryOp, Literal, Node, NodeKind, SelectKind, UnaryOp};
use graphnav_lang::lexer::Lexer;
use graphnav_lang::parser::Parser;
use graphnav_lang::value::DynamicSubscript;
use pretty_assertions::assert_eq;

fn parse_expr(input: &str) -> Node {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer).unwrap();
    parser.parse().unwrap()
}

fn parse_err(input: &str) -> graphnav_lang::ParseError {
    let lexer = Lexer::new(input);
    Parser::new(lexer).and_then(|mut parser| parser.parse()).unwrap_err()
}

fn prop(name: &str) -> Node {
    Node::property(name)
}

fn int(n: i32) -> Node {
    Node::constant(Literal::Int(n))
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        parse_expr("1 + 2 * 3"),
        Node::binary(BinaryOp::Add, int(1), Node::binary(BinaryOp::Multiply, int(2), int(3)))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        parse_expr("(1 + 2) * 3"),
        Node::binary(BinaryOp::Multiply, Node::binary(BinaryOp::Add, int(1), int(2)), int(3))
    );
}

#[test]
fn test_left_associative_subtraction() {
    assert_eq!(
        parse_expr("10 - 4 - 3"),
        Node::binary(BinaryOp::Subtract, Node::binary(BinaryOp::Subtract, int(10), int(4)), int(3))
    );
}

#[test]
fn test_logical_precedence() {
    assert_eq!(
        parse_expr("a || b && c"),
        Node::binary(BinaryOp::Or, prop("a"), Node::binary(BinaryOp::And, prop("b"), prop("c")))
    );
}

#[test]
fn test_comparison_below_arithmetic() {
    assert_eq!(
        parse_expr("a + 1 > b"),
        Node::binary(
            BinaryOp::Greater,
            Node::binary(BinaryOp::Add, prop("a"), int(1)),
            prop("b")
        )
    );
}

#[test]
fn test_bitwise_levels() {
    // | below ^ below &
    assert_eq!(
        parse_expr("a | b ^ c & d"),
        Node::binary(
            BinaryOp::BitOr,
            prop("a"),
            Node::binary(BinaryOp::Xor, prop("b"), Node::binary(BinaryOp::BitAnd, prop("c"), prop("d")))
        )
    );
}

#[test]
fn test_word_operators_parse_like_symbols() {
    assert_eq!(parse_expr("a and b or not c"), parse_expr("a && b || !c"));
    assert_eq!(parse_expr("x shl 2 lt y"), parse_expr("x << 2 < y"));
}

#[test]
fn test_not_in() {
    assert_eq!(
        parse_expr("x not in list"),
        Node::binary(BinaryOp::NotIn, prop("x"), prop("list"))
    );
    assert_eq!(
        parse_expr("!x in list"),
        Node::binary(BinaryOp::In, Node::unary(UnaryOp::Not, prop("x")), prop("list"))
    );
}

#[test]
fn test_ternary_is_right_associative() {
    let node = parse_expr("a ? 1 : b ? 2 : 3");
    let NodeKind::Ternary { otherwise, .. } = node.kind() else {
        panic!("expected ternary, got {:?}", node);
    };
    assert!(matches!(otherwise.kind(), NodeKind::Ternary { .. }));
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(
        parse_expr("#a = #b = 1"),
        Node::assign(Node::variable("a"), Node::assign(Node::variable("b"), int(1)))
    );
}

#[test]
fn test_sequence_binds_loosest() {
    let node = parse_expr("#x = 1, #x + 1");
    let NodeKind::Sequence(items) = node.kind() else {
        panic!("expected sequence, got {:?}", node);
    };
    assert_eq!(items.len(), 2);
    assert!(matches!(items[0].kind(), NodeKind::Assign { .. }));
}

// ============================================================================
// Literals and unary operators
// ============================================================================

#[test]
fn test_negative_literals_fold() {
    assert_eq!(parse_expr("-5"), int(-5));
    assert_eq!(parse_expr("-2.5"), Node::constant(Literal::Double(-2.5)));
    assert_eq!(parse_expr("-x"), Node::unary(UnaryOp::Negate, prop("x")));
}

#[test]
fn test_most_negative_int_is_long() {
    assert_eq!(parse_expr("-2147483648"), Node::constant(Literal::Long(-2_147_483_648)));
}

#[test]
fn test_unary_operators() {
    assert_eq!(parse_expr("!flag"), Node::unary(UnaryOp::Not, prop("flag")));
    assert_eq!(parse_expr("~mask"), Node::unary(UnaryOp::BitNot, prop("mask")));
    assert_eq!(parse_expr("+n"), Node::unary(UnaryOp::Plus, prop("n")));
}

#[test]
fn test_literal_kinds() {
    assert_eq!(parse_expr("'c'"), Node::constant(Literal::Char('c')));
    assert_eq!(parse_expr("\"text\""), Node::string("text"));
    assert_eq!(parse_expr("null"), Node::constant(Literal::Null));
    assert_eq!(parse_expr("true"), Node::constant(Literal::Boolean(true)));
    assert_eq!(parse_expr("3L"), Node::constant(Literal::Long(3)));
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_property_chain() {
    assert_eq!(
        parse_expr("bean.items[#LAST].name"),
        Node::chain(vec![
            prop("bean"),
            prop("items"),
            Node::index(Node::constant(Literal::Subscript(DynamicSubscript::Last))),
            prop("name"),
        ])
    );
}

#[test]
fn test_symbolic_subscripts() {
    let cases = [
        ("items[^]", DynamicSubscript::First),
        ("items[|]", DynamicSubscript::Mid),
        ("items[$]", DynamicSubscript::Last),
        ("items[*]", DynamicSubscript::All),
        ("items[#FIRST]", DynamicSubscript::First),
        ("items[#MID]", DynamicSubscript::Mid),
        ("items[#ALL]", DynamicSubscript::All),
    ];
    for (input, subscript) in cases {
        assert_eq!(
            parse_expr(input),
            Node::chain(vec![prop("items"), Node::index(Node::constant(Literal::Subscript(subscript)))]),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_method_call_with_arguments() {
    assert_eq!(
        parse_expr("list.get(0, name)"),
        Node::chain(vec![prop("list"), Node::method("get", vec![int(0), prop("name")])])
    );
}

#[test]
fn test_variables_and_specials() {
    assert_eq!(parse_expr("#count"), Node::variable("count"));
    assert!(matches!(parse_expr("#this").kind(), NodeKind::This));
    assert!(matches!(parse_expr("#root").kind(), NodeKind::Root));
}

#[test]
fn test_projection_and_selections() {
    let cases = [
        ("items.{? #this > 1}", Some(SelectKind::All)),
        ("items.{^ #this > 1}", Some(SelectKind::First)),
        ("items.{$ #this > 1}", Some(SelectKind::Last)),
        ("items.{#this > 1}", None),
    ];
    for (input, kind) in cases {
        let node = parse_expr(input);
        let NodeKind::Chain(steps) = node.kind() else {
            panic!("expected chain for {}", input);
        };
        match (kind, steps[1].kind()) {
            (Some(expected), NodeKind::Selection { kind, .. }) => assert_eq!(*kind, expected),
            (None, NodeKind::Projection(_)) => {}
            (_, other) => panic!("unexpected step {:?} for {}", other, input),
        }
    }
}

#[test]
fn test_static_members() {
    assert_eq!(
        parse_expr("@Math@PI").kind(),
        &NodeKind::StaticField {
            class: "Math".to_string(),
            name: "PI".to_string(),
        }
    );
    let node = parse_expr("@java.lang.Math@max(1, 2)");
    let NodeKind::StaticMethod { class, name, args } = node.kind() else {
        panic!("expected static call, got {:?}", node);
    };
    assert_eq!(class, "java.lang.Math");
    assert_eq!(name, "max");
    assert_eq!(args.len(), 2);
}

#[test]
fn test_constructors() {
    assert!(matches!(
        parse_expr("new ArrayList()").kind(),
        NodeKind::Constructor { array: false, args, .. } if args.is_empty()
    ));

    let sized = parse_expr("new int[3]");
    assert_eq!(
        sized.kind(),
        &NodeKind::Constructor {
            class: "int".to_string(),
            args: vec![int(3)],
            array: true,
        }
    );

    let init = parse_expr("new String[] {'ab', 'cd'}");
    let NodeKind::Constructor { args, array: true, .. } = init.kind() else {
        panic!("expected array constructor, got {:?}", init);
    };
    assert!(matches!(args[0].kind(), NodeKind::List(items) if items.len() == 2));
}

#[test]
fn test_collection_literals() {
    assert_eq!(parse_expr("{1, 2}").kind(), &NodeKind::List(vec![int(1), int(2)]));
    assert_eq!(parse_expr("{}").kind(), &NodeKind::List(vec![]));
    assert_eq!(
        parse_expr("#{\"a\": 1}").kind(),
        &NodeKind::Map(vec![(Node::string("a"), int(1))])
    );
}

#[test]
fn test_instanceof() {
    assert_eq!(
        parse_expr("value instanceof java.util.List").kind(),
        &NodeKind::InstanceOf {
            operand: Box::new(prop("value")),
            class: "java.util.List".to_string(),
        }
    );
}

// ============================================================================
// Tree shape
// ============================================================================

#[test]
fn test_parenthesized_chain_is_flattened() {
    assert_eq!(parse_expr("(a.b).c"), parse_expr("a.b.c"));
    assert_eq!(parse_expr("((a.b).c).d()"), parse_expr("a.b.c.d()"));
}

#[test]
fn test_single_step_is_not_wrapped() {
    assert_eq!(parse_expr("name"), prop("name"));
    assert_eq!(parse_expr("(name)"), prop("name"));
}

#[test]
fn test_nodes_get_distinct_ids() {
    let a = parse_expr("a.b");
    let b = parse_expr("a.b");
    assert_eq!(a, b);
    assert!(a.id() != b.id());
}

// ============================================================================
// Printing
// ============================================================================

#[test]
fn test_normalized_form() {
    let cases = [
        ("1+2*3", "1 + 2 * 3"),
        ("(1+2)*3", "(1 + 2) * 3"),
        ("1 + (2 + 3)", "1 + (2 + 3)"),
        ("a and b", "a && b"),
        ("x not in {1,2}", "x not in {1, 2}"),
        ("!(a || b)", "!(a || b)"),
        ("@Math@max( 1 ,2 )", "@Math@max(1, 2)"),
        ("items.{?#this>1}", "items.{? #this > 1}"),
        ("new int[] {1,2}", "new int[] {1, 2}"),
        ("#x=5,#x+1", "#x = 5, #x + 1"),
        ("bean.items[#LAST].name", "bean.items[#LAST].name"),
        ("items[$]", "items[#LAST]"),
        ("f((1, 2))", "f((1, 2))"),
        ("7L + 1.5", "7L + 1.5"),
    ];
    for (input, expected) in cases {
        assert_eq!(parse_expr(input).to_string(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_print_then_parse_round_trips() {
    let inputs = [
        "bean.items[#LAST].name",
        "a ? b : c ? d : e",
        "(a ? b : c) ? d : e",
        "a = b = c",
        "1 - (2 - 3)",
        "1 - -2",
        "(-1).abs()",
        "-(a.b)",
        "!flag && x >= 10 || y != null",
        "#{'key' : value, \"k2\" : {1, 2}}",
        "list.{? #this.name == 'x'}.{ size() }",
        "new java.util.ArrayList(3)",
        "new int[n + 1]",
        "@Math@max(a, b) * 2",
        "x instanceof String ? 'str' : 'other'",
        "\"tab\\tquote\\\"\"",
        "'\\n' + 'x'",
        "10.25H * 2B",
        "a >>> 2 << 1",
        "#root.items[0] = #this",
    ];
    for input in inputs {
        let first = parse_expr(input);
        let printed = first.to_string();
        let second = parse_expr(&printed);
        assert_eq!(first, second, "Round trip failed for {} (printed as {})", input, printed);
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_positions() {
    assert_eq!(parse_err("1 +").position, 3);
    assert_eq!(parse_err("a.").position, 2);
    assert_eq!(parse_err("(1 + 2").position, 6);
    assert_eq!(parse_err("1 2").position, 2);
}

#[test]
fn test_error_messages() {
    assert!(parse_err("a.").message.contains("Expected property name"));
    assert!(parse_err("1 2").message.contains("Unexpected token"));
}

#[test]
fn test_lex_errors_surface_as_parse_errors() {
    let err = parse_err("a + 'open");
    assert_eq!(err.position, 4);
    assert!(err.message.contains("Unterminated"));
}
