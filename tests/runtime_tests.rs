use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::thread;

use jmes_lang::ast::Node;
use jmes_lang::{
    CachingParser, Error, ExpressionParser, Parser, Result, Runtime, RuntimeOptions, Value, search,
};
use serde_json::json;

fn doc() -> Value {
    Value::from(json!({
        "people": [
            {"name": "a", "age": 20},
            {"name": "b", "age": 40},
            {"name": "c", "age": 30}
        ]
    }))
}

/// Counts how often the runtime asks for a parse.
struct CountingParser {
    calls: Arc<AtomicUsize>,
    inner: Parser,
}

impl ExpressionParser for CountingParser {
    fn parse(&self, expression: &str) -> Result<Arc<Node>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.parse(expression).map(Arc::new)
    }
}

// ============================================================================
// Runtime
// ============================================================================

#[test]
fn test_default_options() {
    let options = RuntimeOptions::default();
    assert!(options.cache_expressions);
    assert!(!options.disable_visit_errors);
    assert_eq!(options.cache_capacity, 1000);
}

#[test]
fn test_runtime_search() {
    let runtime = Runtime::new(RuntimeOptions::default());
    let result = runtime.search("people[?age > `25`].name", &doc()).unwrap();
    assert_eq!(result, Value::from(json!(["b", "c"])));
}

#[test]
fn test_runtime_without_cache() {
    let runtime = Runtime::new(RuntimeOptions {
        cache_expressions: false,
        ..RuntimeOptions::default()
    });
    assert_eq!(
        runtime.search("max_by(people, &age).name", &doc()).unwrap(),
        Value::from("b")
    );
}

#[test]
fn test_runtime_reports_errors() {
    let runtime = Runtime::default();
    assert!(matches!(runtime.search("people[", &doc()), Err(Error::Syntax { .. })));
    assert!(matches!(
        runtime.search("length(people, people)", &doc()),
        Err(Error::InvalidArity(_))
    ));
}

#[test]
fn test_compile_once_search_many() {
    let runtime = Runtime::default();
    let compiled = runtime.compile("people[*].name | [0]").unwrap();
    assert_eq!(compiled.source(), "people[*].name | [0]");
    assert_eq!(compiled.search(&doc()).unwrap(), Value::from("a"));

    let other = Value::from(json!({"people": [{"name": "z"}]}));
    assert_eq!(compiled.search(&other).unwrap(), Value::from("z"));
}

#[test]
fn test_compiled_tree_is_optimized() {
    let compiled = Runtime::default().compile("a.b.c").unwrap();
    assert_eq!(
        *compiled.root(),
        Node::ChainedField(vec!["a".into(), "b".into(), "c".into()])
    );
}

#[test]
fn test_with_parser() {
    let calls = Arc::new(AtomicUsize::new(0));
    let runtime = Runtime::with_parser(Box::new(CountingParser {
        calls: Arc::clone(&calls),
        inner: Parser::new(),
    }));

    runtime.search("people[0].name", &doc()).unwrap();
    runtime.search("people[0].name", &doc()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_crate_search() {
    assert_eq!(search("people[-1].age", &doc()).unwrap(), Value::Integer(30));
}

// ============================================================================
// Caching Parser
// ============================================================================

#[test]
fn test_cache_returns_shared_tree() {
    let parser = CachingParser::new(Parser::new());
    let first = parser.parse("a.b").unwrap();
    let second = parser.parse("a.b").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(parser.len(), 1);
}

#[test]
fn test_cache_skips_failures() {
    let parser = CachingParser::new(Parser::new());
    assert!(parser.parse("a.").is_err());
    assert!(parser.parse("nope(@)").is_err());
    assert!(parser.is_empty());
}

#[test]
fn test_cache_clears_when_full() {
    let parser = CachingParser::with_capacity(Parser::new(), 2);
    parser.parse("a").unwrap();
    parser.parse("b").unwrap();
    parser.parse("c").unwrap();
    assert_eq!(parser.len(), 3);

    parser.parse("d").unwrap();
    assert_eq!(parser.len(), 1);

    // Cleared entries parse again
    let a = parser.parse("a").unwrap();
    assert_eq!(*a, Node::Field("a".into()));
    assert_eq!(parser.len(), 2);
}

#[test]
fn test_cache_stays_bounded() {
    let capacity = 10;
    let parser = CachingParser::with_capacity(Parser::new(), capacity);
    for i in 0..100 {
        parser.parse(&format!("field_{}", i)).unwrap();
        assert!(parser.len() <= capacity + 1);
    }
}

#[test]
fn test_cache_clear() {
    let parser = CachingParser::new(Parser::new());
    parser.parse("a").unwrap();
    parser.clear();
    assert!(parser.is_empty());
}

#[test]
fn test_cache_concurrent_parses_match_direct_parse() {
    let parser = CachingParser::with_capacity(Parser::new(), 16);
    let expressions: Vec<String> = (0..40)
        .map(|i| format!("items[?id == `{}`].name | [0]", i))
        .collect();

    thread::scope(|scope| {
        for offset in 0..8 {
            let parser = &parser;
            let expressions = &expressions;
            scope.spawn(move || {
                for round in 0..expressions.len() {
                    let expression = &expressions[(round + offset * 5) % expressions.len()];
                    let cached = parser.parse(expression).unwrap();
                    let direct = Parser::new().parse(expression).unwrap();
                    assert_eq!(*cached, direct);
                }
            });
        }
    });

    assert!(parser.len() <= 17);
}

#[test]
fn test_shared_runtime_across_threads() {
    let runtime = Runtime::default();
    let data = doc();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..50)
                        .map(|_| runtime.search("sort_by(people, &age)[*].name", &data).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for result in handle.join().unwrap() {
                assert_eq!(result, Value::from(json!(["a", "c", "b"])));
            }
        }
    });
}
