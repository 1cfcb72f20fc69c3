use jmes_lang::functions::{self, Arity};
use jmes_lang::{Error, RuntimeOptions, Value, search, search_with};
use serde_json::json;

fn eval(expression: &str, doc: serde_json::Value) -> Value {
    search(expression, &Value::from(doc))
        .unwrap_or_else(|e| panic!("failed to evaluate {}: {}", expression, e))
}

fn call(expression: &str) -> Value {
    eval(expression, json!(null))
}

fn call_err(expression: &str) -> Error {
    match search(expression, &Value::Null) {
        Err(e) => e,
        Ok(v) => panic!("expected {} to fail, got {:?}", expression, v),
    }
}

fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_lookup() {
    let length = functions::lookup("length").unwrap();
    assert_eq!(length.name, "length");
    assert_eq!(length.arity, Arity::Exact(1));
    assert!(functions::lookup("nope").is_none());
}

#[test]
fn test_builtins_sorted_and_complete() {
    let names: Vec<_> = functions::builtins().iter().map(|b| b.name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 26);
}

#[test]
fn test_call_unknown() {
    assert!(matches!(functions::call("nope", &[]), Err(Error::UnknownFunction(_))));
}

// ============================================================================
// Arity and Type Checks
// ============================================================================

#[test]
fn test_invalid_arity() {
    let err = call_err("length(`1`, `2`)");
    assert!(matches!(err, Error::InvalidArity(_)));
    assert_eq!(
        err.to_string(),
        "invalid arity: function length() expects one argument, got 2"
    );
    assert!(matches!(call_err("merge()"), Error::InvalidArity(_)));
    assert!(matches!(call_err("not_null()"), Error::InvalidArity(_)));
}

#[test]
fn test_invalid_type() {
    let err = call_err("length(`true`)");
    assert!(matches!(err, Error::InvalidType(_)));
    assert_eq!(
        err.to_string(),
        "invalid type: function length() expects argument 1 to be string|array|object, got boolean"
    );
    assert!(matches!(call_err("abs('a')"), Error::InvalidType(_)));
    assert!(matches!(call_err("sum(`[1, \"a\"]`)"), Error::InvalidType(_)));
    assert!(matches!(call_err("merge(`{}`, `1`)"), Error::InvalidType(_)));
    assert!(matches!(call_err("map(`1`, `[]`)"), Error::InvalidType(_)));
}

#[test]
fn test_disabled_errors_return_null() {
    let options = RuntimeOptions {
        disable_visit_errors: true,
        ..RuntimeOptions::default()
    };
    let data = Value::Null;
    assert_eq!(search_with("length(`1`, `2`)", &data, options).unwrap(), Value::Null);
    assert_eq!(search_with("length(`true`)", &data, options).unwrap(), Value::Null);
    assert_eq!(search_with("length('abc')", &data, options).unwrap(), Value::Integer(3));
    assert!(matches!(
        search_with("nope(@)", &data, options),
        Err(Error::UnknownFunction(_))
    ));
}

// ============================================================================
// Numeric Functions
// ============================================================================

#[test]
fn test_abs() {
    assert_eq!(call("abs(`-3`)"), Value::Integer(3));
    assert_eq!(call("abs(`-1.5`)"), Value::Float(1.5));
    assert_eq!(call("abs(`2`)"), Value::Integer(2));
}

#[test]
fn test_ceil_floor() {
    assert!(matches!(call("ceil(`1.2`)"), Value::Integer(2)));
    assert!(matches!(call("floor(`1.8`)"), Value::Integer(1)));
    assert!(matches!(call("floor(`-1.2`)"), Value::Integer(-2)));
    assert!(matches!(call("ceil(`5`)"), Value::Integer(5)));
}

#[test]
fn test_sum() {
    assert!(matches!(call("sum(`[1, 2, 3]`)"), Value::Integer(6)));
    assert!(matches!(call("sum(`[]`)"), Value::Integer(0)));
    assert_eq!(call("sum(`[1.5, 2.5, 1]`)"), Value::Float(5.0));
}

#[test]
fn test_avg() {
    assert_eq!(call("avg(`[1, 2, 3, 4]`)"), Value::Float(2.5));
    assert!(matches!(call("avg(`[2, 4]`)"), Value::Float(_)));
    assert_eq!(call("avg(`[]`)"), Value::Null);
}

#[test]
fn test_to_number() {
    assert_eq!(call("to_number('12')"), Value::Integer(12));
    assert_eq!(call("to_number('1.5')"), Value::Float(1.5));
    assert_eq!(call("to_number(`3`)"), Value::Integer(3));
    assert_eq!(call("to_number('abc')"), Value::Null);
    assert_eq!(call("to_number(`true`)"), Value::Null);
}

// ============================================================================
// String Functions
// ============================================================================

#[test]
fn test_starts_ends_with() {
    assert_eq!(call("starts_with('foobar', 'foo')"), Value::Boolean(true));
    assert_eq!(call("starts_with('foobar', 'bar')"), Value::Boolean(false));
    assert_eq!(call("ends_with('foobar', 'bar')"), Value::Boolean(true));
    assert!(matches!(call_err("ends_with('a', `1`)"), Error::InvalidType(_)));
}

#[test]
fn test_join() {
    assert_eq!(call("join(', ', `[\"a\", \"b\"]`)"), Value::from("a, b"));
    assert_eq!(call("join('-', `[]`)"), Value::from(""));
    assert!(matches!(call_err("join(', ', `[1]`)"), Error::InvalidType(_)));
}

#[test]
fn test_to_string() {
    assert_eq!(call("to_string('a')"), Value::from("a"));
    assert_eq!(call("to_string(`[1, 2]`)"), Value::from("[1,2]"));
    assert_eq!(call("to_string(`{\"a\": null}`)"), Value::from("{\"a\":null}"));
    assert!(matches!(call_err("to_string(&a)"), Error::InvalidType(_)));
}

// ============================================================================
// Collection Functions
// ============================================================================

#[test]
fn test_length() {
    assert_eq!(call("length('héllo')"), Value::Integer(5));
    assert_eq!(call("length(`[1, 2]`)"), Value::Integer(2));
    assert_eq!(call("length(`{\"a\": 1}`)"), Value::Integer(1));
}

#[test]
fn test_contains() {
    assert_eq!(call("contains(`[1, 2, 3]`, `2`)"), Value::Boolean(true));
    assert_eq!(call("contains(`[1, 2, 3]`, `2.0`)"), Value::Boolean(true));
    assert_eq!(call("contains(`[1, 2, 3]`, `4`)"), Value::Boolean(false));
    assert_eq!(call("contains('foobar', 'oba')"), Value::Boolean(true));
    assert_eq!(call("contains('foo', `1`)"), Value::Boolean(false));
}

#[test]
fn test_keys_values_keep_order() {
    let doc = json!({"obj": {"b": 1, "a": 2, "c": 3}});
    assert_eq!(eval("keys(obj)", doc.clone()), value(json!(["b", "a", "c"])));
    assert_eq!(eval("values(obj)", doc), value(json!([1, 2, 3])));
}

#[test]
fn test_merge() {
    assert_eq!(
        call("merge(`{\"a\": 1, \"b\": 1}`, `{\"a\": 2}`, `{\"c\": 3}`)"),
        value(json!({"a": 2, "b": 1, "c": 3}))
    );
}

#[test]
fn test_not_null() {
    let doc = json!({"a": null, "c": false});
    assert_eq!(eval("not_null(a, b, c)", doc.clone()), Value::Boolean(false));
    assert_eq!(eval("not_null(a, b)", doc), Value::Null);
}

#[test]
fn test_reverse() {
    assert_eq!(call("reverse('abc')"), Value::from("cba"));
    assert_eq!(call("reverse(`[1, 2, 3]`)"), value(json!([3, 2, 1])));
    assert_eq!(call("reverse(`[1, 2]`, 'ignored')"), value(json!([2, 1])));
}

#[test]
fn test_to_array() {
    assert_eq!(call("to_array(`1`)"), value(json!([1])));
    assert_eq!(call("to_array(`[1]`)"), value(json!([1])));
}

#[test]
fn test_type() {
    assert_eq!(call("type(`null`)"), Value::from("null"));
    assert_eq!(call("type(`true`)"), Value::from("boolean"));
    assert_eq!(call("type(`1.5`)"), Value::from("number"));
    assert_eq!(call("type('s')"), Value::from("string"));
    assert_eq!(call("type(`[]`)"), Value::from("array"));
    assert_eq!(call("type(`{}`)"), Value::from("object"));
    assert_eq!(call("type(&a)"), Value::from("expression"));
}

#[test]
fn test_map() {
    let doc = json!([{"a": 1}, {"b": 2}, {"a": 3}]);
    assert_eq!(eval("map(&a, @)", doc), value(json!([1, null, 3])));
}

// ============================================================================
// Ordering Functions
// ============================================================================

#[test]
fn test_max_min() {
    assert_eq!(call("max(`[1, 3, 2]`)"), Value::Integer(3));
    assert_eq!(call("min(`[1, 3, 0.5]`)"), Value::Float(0.5));
    assert_eq!(call("max(`[\"a\", \"c\", \"b\"]`)"), Value::from("c"));
    assert_eq!(call("max(`[]`)"), Value::Null);
    assert!(matches!(call_err("max(`[1, \"a\"]`)"), Error::InvalidType(_)));
}

#[test]
fn test_sort() {
    assert_eq!(call("sort(`[3, 1.5, 2]`)"), value(json!([1.5, 2, 3])));
    assert_eq!(call("sort(`[\"b\", \"a\"]`)"), value(json!(["a", "b"])));
    assert_eq!(call("sort(`[]`)"), value(json!([])));
    assert!(matches!(call_err("sort(`[1, \"a\"]`)"), Error::InvalidType(_)));
}

#[test]
fn test_sort_by_is_stable() {
    let doc = json!([
        {"n": 1, "k": "a"},
        {"n": 0, "k": "b"},
        {"n": 1, "k": "c"},
        {"n": 0, "k": "d"}
    ]);
    assert_eq!(eval("sort_by(@, &n)[*].k", doc), value(json!(["b", "d", "a", "c"])));
}

#[test]
fn test_sort_by_mixed_keys() {
    let doc = json!([{"n": 1}, {"n": "x"}]);
    let err = search("sort_by(@, &n)", &Value::from(doc)).unwrap_err();
    assert!(matches!(err, Error::InvalidType(_)));
}

#[test]
fn test_max_by_min_by() {
    let doc = json!({"people": [
        {"name": "a", "age": 30},
        {"name": "b", "age": 50},
        {"name": "c", "age": 10}
    ]});
    assert_eq!(eval("max_by(people, &age).name", doc.clone()), Value::from("b"));
    assert_eq!(eval("min_by(people, &age).name", doc.clone()), Value::from("c"));
    assert_eq!(eval("min_by(people, &name).age", doc), Value::Integer(30));
    assert_eq!(call("max_by(`[]`, &a)"), Value::Null);
}

#[test]
fn test_signature_text() {
    assert_eq!(functions::lookup("join").unwrap().signature_text(), "join(string, array[string])");
    assert_eq!(functions::lookup("not_null").unwrap().signature_text(), "not_null(any, ...)");
}
