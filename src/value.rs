use std::{cmp::Ordering, sync::Arc};

use indexmap::IndexMap;

use crate::ast::Node;

/// Object representation: string keys in insertion order.
pub type Map = IndexMap<String, Value>;

/// A value flowing through expression evaluation.
///
/// Mirrors the JSON data model, keeping integers apart from floats, plus the
/// `Expression` variant produced by `&expr` for higher-order functions.
///
/// # Equality
///
/// Equality is deep and numeric-aware: `Integer(1) == Float(1.0)`. Objects
/// compare as maps, so key order is irrelevant.
///
/// # Examples
///
/// ```
/// use jmes_lang::Value;
///
/// let array = Value::Array(vec![Value::Integer(1), Value::Float(2.5)]);
/// assert_eq!(array.type_name(), "array");
/// assert_eq!(Value::Integer(1), Value::Float(1.0));
/// assert!(!Value::String(String::new()).is_truthy());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// JSON null, also used for "absent" results
    #[default]
    Null,

    /// JSON boolean
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// Object with string keys, in insertion order
    Object(Map),

    /// Deferred sub-expression created by `&expr`
    Expression(Arc<Node>),
}

impl Value {
    /// Falsey values are null, `false`, and empty strings, arrays and objects.
    /// Everything else, including `0` and expressions, is truthy.
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Integer(_) | Float(_) => true,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
            Expression(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer; floats are not truncated
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The type name reported by the `type()` built-in.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Expression(_) => "expression",
        }
    }

    /// Ordering between two numbers or two strings; `None` for anything else.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (a, b) => a.as_float()?.partial_cmp(&b.as_float()?),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => *a as f64 == *b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Expression(a), Expression(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<Map> for Value {
    fn from(obj: Map) -> Self {
        Value::Object(obj)
    }
}
