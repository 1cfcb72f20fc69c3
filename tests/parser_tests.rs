// tests/parser_tests.rs

use std::sync::Arc;

use jmes_lang::ast::{Comparator, FunctionCall, KeyValuePair, Node, Slice};
use jmes_lang::{Error, Parser, Value};

fn parse(input: &str) -> Node {
    Parser::new()
        .parse(input)
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", input, e))
}

fn field(name: &str) -> Node {
    Node::Field(name.to_string())
}

fn syntax_position(input: &str) -> usize {
    match Parser::new().parse(input) {
        Err(Error::Syntax { position, .. }) => position,
        other => panic!("expected syntax error for {}, got {:?}", input, other),
    }
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_parse_field() {
    assert_eq!(parse("foo"), field("foo"));
    assert_eq!(parse(r#""with space""#), field("with space"));
}

#[test]
fn test_parse_subexpression_is_left_associative() {
    assert_eq!(
        parse("a.b.c"),
        Node::subexpression(Node::subexpression(field("a"), field("b")), field("c"))
    );
}

#[test]
fn test_parse_index() {
    assert_eq!(parse("[0]"), Node::Index(0));
    assert_eq!(parse("foo[-1]"), Node::subexpression(field("foo"), Node::Index(-1)));
}

#[test]
fn test_parse_current_and_literals() {
    assert_eq!(parse("@"), Node::Current);
    assert_eq!(parse("'raw'"), Node::Literal(Value::from("raw")));
    assert_eq!(parse("`[1, 2]`"), Node::Literal(Value::from(vec![Value::Integer(1), Value::Integer(2)])));
}

#[test]
fn test_parse_parentheses() {
    assert_eq!(
        parse("(a || b) && c"),
        Node::and(Node::or(field("a"), field("b")), field("c"))
    );
}

// ============================================================================
// Projections
// ============================================================================

#[test]
fn test_parse_wildcard_array() {
    assert_eq!(parse("foo[*].bar"), Node::array_projection(field("foo"), field("bar")));
    assert_eq!(parse("[*]"), Node::array_projection(Node::Current, Node::Current));
}

#[test]
fn test_parse_wildcard_object() {
    assert_eq!(parse("*.a"), Node::object_projection(Node::Current, field("a")));
    assert_eq!(parse("foo.*"), Node::object_projection(field("foo"), Node::Current));
}

#[test]
fn test_parse_projection_stops_at_pipe() {
    assert_eq!(
        parse("foo[*].bar | [0]"),
        Node::pipe(Node::array_projection(field("foo"), field("bar")), Node::Index(0))
    );
}

#[test]
fn test_parse_projection_continues_through_index() {
    assert_eq!(
        parse("foo[*].bar[0]"),
        Node::array_projection(field("foo"), Node::subexpression(field("bar"), Node::Index(0)))
    );
}

#[test]
fn test_parse_flatten() {
    assert_eq!(
        parse("a[]"),
        Node::array_projection(Node::Flatten(Box::new(field("a"))), Node::Current)
    );
    assert_eq!(
        parse("a[].b"),
        Node::array_projection(Node::Flatten(Box::new(field("a"))), field("b"))
    );
}

#[test]
fn test_parse_slice() {
    let slice = Slice::new(Some(1), Some(3), None).unwrap();
    assert_eq!(
        parse("[1:3]"),
        Node::array_projection(Node::Slice(slice), Node::Current)
    );

    let reverse = Slice::new(None, None, Some(-1)).unwrap();
    assert_eq!(
        parse("foo[::-1]"),
        Node::subexpression(
            field("foo"),
            Node::array_projection(Node::Slice(reverse), Node::Current)
        )
    );

    let open = Slice::new(None, None, None).unwrap();
    assert_eq!(parse("[:]"), Node::array_projection(Node::Slice(open), Node::Current));
}

#[test]
fn test_parse_zero_step_slice() {
    assert!(matches!(Parser::new().parse("[::0]"), Err(Error::InvalidValue(_))));
}

#[test]
fn test_parse_filter() {
    let expected = Node::array_projection(
        field("items"),
        Node::condition(
            Node::comparator(
                Comparator::GreaterThan,
                field("age"),
                Node::Literal(Value::Integer(20)),
            ),
            field("name"),
        ),
    );
    assert_eq!(parse("items[?age > `20`].name"), expected);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_parse_or_and_precedence() {
    assert_eq!(
        parse("a || b && c"),
        Node::or(field("a"), Node::and(field("b"), field("c")))
    );
}

#[test]
fn test_parse_not_binds_tighter_than_comparator() {
    assert_eq!(
        parse("!a == b"),
        Node::comparator(Comparator::Equal, Node::Not(Box::new(field("a"))), field("b"))
    );
}

#[test]
fn test_parse_all_comparators() {
    let cases = [
        ("==", Comparator::Equal),
        ("!=", Comparator::NotEqual),
        ("<", Comparator::LessThan),
        ("<=", Comparator::LessEqual),
        (">", Comparator::GreaterThan),
        (">=", Comparator::GreaterEqual),
    ];
    for (symbol, comparator) in cases {
        assert_eq!(
            parse(&format!("a {} b", symbol)),
            Node::comparator(comparator, field("a"), field("b")),
            "Failed for comparator: {}",
            symbol
        );
    }
}

// ============================================================================
// Multi-select
// ============================================================================

#[test]
fn test_parse_multi_select_list() {
    assert_eq!(parse("[a, b.c]"), Node::MultiSelectList(vec![
        field("a"),
        Node::subexpression(field("b"), field("c")),
    ]));
    assert_eq!(
        parse("foo.[a, b]"),
        Node::subexpression(field("foo"), Node::MultiSelectList(vec![field("a"), field("b")]))
    );
}

#[test]
fn test_parse_multi_select_hash() {
    assert_eq!(
        parse(r#"{x: a, "y z": b}"#),
        Node::MultiSelectHash(vec![
            KeyValuePair { key: "x".to_string(), value: field("a") },
            KeyValuePair { key: "y z".to_string(), value: field("b") },
        ])
    );
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_parse_function_call() {
    assert_eq!(
        parse("length(@)"),
        Node::Function(FunctionCall {
            name: "length".to_string(),
            args: vec![Node::Current],
            disable_visit_errors: false,
        })
    );
}

#[test]
fn test_parse_expref_argument() {
    assert_eq!(
        parse("sort_by(people, &a.b)"),
        Node::Function(FunctionCall {
            name: "sort_by".to_string(),
            args: vec![
                field("people"),
                Node::Expression(Arc::new(Node::subexpression(field("a"), field("b")))),
            ],
            disable_visit_errors: false,
        })
    );
}

#[test]
fn test_parse_function_with_errors_disabled() {
    let node = Parser::new().with_visit_errors_disabled(true).parse("abs(a)").unwrap();
    match node {
        Node::Function(call) => assert!(call.disable_visit_errors),
        other => panic!("expected a function node, got {:?}", other),
    }
}

#[test]
fn test_parse_unknown_function() {
    match Parser::new().parse("nope(@)") {
        Err(Error::UnknownFunction(name)) => assert_eq!(name, "nope"),
        other => panic!("expected unknown function, got {:?}", other),
    }
}

#[test]
fn test_parse_quoted_function_name() {
    assert!(matches!(Parser::new().parse(r#""length"(@)"#), Err(Error::Syntax { .. })));
}

// ============================================================================
// Syntax Errors
// ============================================================================

#[test]
fn test_syntax_error_positions() {
    assert_eq!(syntax_position("a.]"), 2);
    assert_eq!(syntax_position("foo bar"), 4);
    assert_eq!(syntax_position("foo."), 4);
    assert_eq!(syntax_position("a # b"), 2);
}

#[test]
fn test_syntax_errors() {
    let invalid = [
        "",
        "[1, ]",
        "a[?b",
        "{a: b",
        "{a b}",
        "`foo`",
        "a[1:2:3:4]",
        "(a",
        "a[0](b)",
        "a =  b",
        "-",
    ];
    for input in invalid {
        assert!(
            matches!(Parser::new().parse(input), Err(Error::Syntax { .. })),
            "expected syntax error for {:?}",
            input
        );
    }
}

#[test]
fn test_syntax_error_message_names_expression() {
    let err = Parser::new().parse("foo.").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("position 4"), "{}", message);
    assert!(message.contains("`foo.`"), "{}", message);
}
