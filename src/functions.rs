//! Built-in function library.
//!
//! Every built-in is described by a [`Builtin`]: a name, a fixed or minimum
//! arity and the accepted types of each argument. [`Builtin::invoke`] checks
//! the arguments against that contract before the body runs, so the bodies
//! only deal with well-typed input. The table is immutable and indexed once
//! on first use.

use std::{collections::HashMap, sync::LazyLock};

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    ast::Node,
    error::{Error, Result},
    value::{Map, Value},
};

/// Accepted type of a single argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Any,
    Number,
    String,
    Array,
    Object,
    Expression,
    /// Array whose elements are all numbers (including the empty array)
    ArrayOfNumbers,
    /// Array whose elements are all strings (including the empty array)
    ArrayOfStrings,
}

impl ArgType {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ArgType::Any => true,
            ArgType::Number => value.is_number(),
            ArgType::String => matches!(value, Value::String(_)),
            ArgType::Array => matches!(value, Value::Array(_)),
            ArgType::Object => matches!(value, Value::Object(_)),
            ArgType::Expression => matches!(value, Value::Expression(_)),
            ArgType::ArrayOfNumbers => {
                matches!(value, Value::Array(items) if items.iter().all(Value::is_number))
            }
            ArgType::ArrayOfStrings => {
                matches!(value, Value::Array(items) if items.iter().all(|v| matches!(v, Value::String(_))))
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ArgType::Any => "any",
            ArgType::Number => "number",
            ArgType::String => "string",
            ArgType::Array => "array",
            ArgType::Object => "object",
            ArgType::Expression => "expression",
            ArgType::ArrayOfNumbers => "array[number]",
            ArgType::ArrayOfStrings => "array[string]",
        }
    }
}

/// Number of arguments a built-in takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exact(1) => "one argument".to_string(),
            Arity::Exact(n) => format!("{} arguments", n),
            Arity::AtLeast(n) => format!("at least {} argument(s)", n),
        }
    }
}

/// Signature for a built-in body. Arguments are already validated.
pub type BuiltinFn = fn(&[Value]) -> Result<Value>;

/// Descriptor of one built-in function.
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    /// Accepted types per argument position. Variadic functions check every
    /// extra argument against the last entry.
    pub signature: &'static [&'static [ArgType]],
    body: BuiltinFn,
}

impl Builtin {
    /// Validates arity and argument types, then runs the body.
    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        self.check(args)?;
        (self.body)(args)
    }

    fn check(&self, args: &[Value]) -> Result<()> {
        if !self.arity.accepts(args.len()) {
            return Err(Error::InvalidArity(format!(
                "function {}() expects {}, got {}",
                self.name,
                self.arity.describe(),
                args.len()
            )));
        }

        for (position, arg) in args.iter().enumerate() {
            let Some(accepted) = self.signature.get(position).or(self.signature.last()) else {
                continue;
            };
            if !accepted.iter().any(|t| t.accepts(arg)) {
                return Err(Error::InvalidType(format!(
                    "function {}() expects argument {} to be {}, got {}",
                    self.name,
                    position + 1,
                    describe_types(accepted),
                    arg.type_name()
                )));
            }
        }
        Ok(())
    }

    /// Human-readable signature, e.g. `merge(object, ...)`.
    pub fn signature_text(&self) -> String {
        let mut params: Vec<String> = self.signature.iter().map(|t| describe_types(t)).collect();
        if matches!(self.arity, Arity::AtLeast(_)) {
            params.push("...".to_string());
        }
        format!("{}({})", self.name, params.join(", "))
    }
}

fn describe_types(types: &[ArgType]) -> String {
    types.iter().map(|t| t.name()).collect::<Vec<_>>().join("|")
}

static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "abs",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Number]],
        body: abs,
    },
    Builtin {
        name: "avg",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::ArrayOfNumbers]],
        body: avg,
    },
    Builtin {
        name: "ceil",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Number]],
        body: ceil,
    },
    Builtin {
        name: "contains",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::Array, ArgType::String], &[ArgType::Any]],
        body: contains,
    },
    Builtin {
        name: "ends_with",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::String], &[ArgType::String]],
        body: ends_with,
    },
    Builtin {
        name: "floor",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Number]],
        body: floor,
    },
    Builtin {
        name: "join",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::String], &[ArgType::ArrayOfStrings]],
        body: join,
    },
    Builtin {
        name: "keys",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Object]],
        body: keys,
    },
    Builtin {
        name: "length",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::String, ArgType::Array, ArgType::Object]],
        body: length,
    },
    Builtin {
        name: "map",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::Expression], &[ArgType::Array]],
        body: map,
    },
    Builtin {
        name: "max",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::ArrayOfNumbers, ArgType::ArrayOfStrings]],
        body: max,
    },
    Builtin {
        name: "max_by",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::Array], &[ArgType::Expression]],
        body: max_by,
    },
    Builtin {
        name: "merge",
        arity: Arity::AtLeast(1),
        signature: &[&[ArgType::Object]],
        body: merge,
    },
    Builtin {
        name: "min",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::ArrayOfNumbers, ArgType::ArrayOfStrings]],
        body: min,
    },
    Builtin {
        name: "min_by",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::Array], &[ArgType::Expression]],
        body: min_by,
    },
    Builtin {
        name: "not_null",
        arity: Arity::AtLeast(1),
        signature: &[&[ArgType::Any]],
        body: not_null,
    },
    Builtin {
        name: "reverse",
        arity: Arity::AtLeast(1),
        signature: &[&[ArgType::String, ArgType::Array], &[ArgType::Any]],
        body: reverse,
    },
    Builtin {
        name: "sort",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::ArrayOfNumbers, ArgType::ArrayOfStrings]],
        body: sort,
    },
    Builtin {
        name: "sort_by",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::Array], &[ArgType::Expression]],
        body: sort_by,
    },
    Builtin {
        name: "starts_with",
        arity: Arity::Exact(2),
        signature: &[&[ArgType::String], &[ArgType::String]],
        body: starts_with,
    },
    Builtin {
        name: "sum",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::ArrayOfNumbers]],
        body: sum,
    },
    Builtin {
        name: "to_array",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Any]],
        body: to_array,
    },
    Builtin {
        name: "to_number",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Any]],
        body: to_number,
    },
    Builtin {
        name: "to_string",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Any]],
        body: to_string,
    },
    Builtin {
        name: "type",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Any]],
        body: type_of,
    },
    Builtin {
        name: "values",
        arity: Arity::Exact(1),
        signature: &[&[ArgType::Object]],
        body: values,
    },
];

static REGISTRY: LazyLock<HashMap<&'static str, &'static Builtin>> =
    LazyLock::new(|| BUILTINS.iter().map(|b| (b.name, b)).collect());

/// Finds a built-in by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    REGISTRY.get(name).copied()
}

/// All built-ins, in alphabetical order.
pub fn builtins() -> &'static [Builtin] {
    BUILTINS
}

/// Validates and invokes the built-in called `name`.
pub fn call(name: &str, args: &[Value]) -> Result<Value> {
    let builtin = lookup(name).ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
    builtin.invoke(args)
}

// ========================================
// Argument accessors
// ========================================

fn type_error(expected: &str, got: &Value) -> Error {
    Error::InvalidType(format!("expected {}, got {}", expected, got.type_name()))
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| type_error("array", value))
}

fn as_object(value: &Value) -> Result<&Map> {
    value.as_object().ok_or_else(|| type_error("object", value))
}

fn as_str(value: &Value) -> Result<&str> {
    value.as_str().ok_or_else(|| type_error("string", value))
}

fn as_expression(value: &Value) -> Result<&Node> {
    match value {
        Value::Expression(node) => Ok(node.as_ref()),
        other => Err(type_error("expression", other)),
    }
}

// ========================================
// Numeric functions
// ========================================

fn abs(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Integer(n) => Ok(n
            .checked_abs()
            .map(Value::Integer)
            .unwrap_or(Value::Float((*n as f64).abs()))),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(type_error("number", other)),
    }
}

/// Rounds toward an integer, keeping the integer type when it fits.
fn round_with(value: &Value, round: fn(f64) -> f64) -> Result<Value> {
    match value {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Float(n) => {
            let rounded = round(*n);
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                Ok(Value::Integer(rounded as i64))
            } else {
                Ok(Value::Float(rounded))
            }
        }
        other => Err(type_error("number", other)),
    }
}

fn ceil(args: &[Value]) -> Result<Value> {
    round_with(&args[0], f64::ceil)
}

fn floor(args: &[Value]) -> Result<Value> {
    round_with(&args[0], f64::floor)
}

/// Exact decimal total, or `None` when a value has no decimal form or the
/// total overflows.
fn decimal_total(items: &[Value]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        let value = match item {
            Value::Integer(n) => Decimal::from(*n),
            Value::Float(n) => Decimal::from_f64(*n)?,
            _ => return None,
        };
        total.checked_add(value)
    })
}

fn float_total(items: &[Value]) -> f64 {
    items.iter().filter_map(Value::as_float).sum()
}

fn sum(args: &[Value]) -> Result<Value> {
    let items = as_array(&args[0])?;
    let all_integers = items.iter().all(|v| matches!(v, Value::Integer(_)));

    let total = match decimal_total(items) {
        Some(total) if all_integers => total.to_i64().map(Value::Integer),
        Some(total) => total.to_f64().map(Value::Float),
        None => None,
    };
    Ok(total.unwrap_or_else(|| Value::Float(float_total(items))))
}

fn avg(args: &[Value]) -> Result<Value> {
    let items = as_array(&args[0])?;
    if items.is_empty() {
        return Ok(Value::Null);
    }

    let average = decimal_total(items)
        .and_then(|total| total.checked_div(Decimal::from(items.len())))
        .and_then(|avg| avg.to_f64())
        .unwrap_or_else(|| float_total(items) / items.len() as f64);
    Ok(Value::Float(average))
}

fn to_number(args: &[Value]) -> Result<Value> {
    Ok(match &args[0] {
        Value::Integer(n) => Value::Integer(*n),
        Value::Float(n) => Value::Float(*n),
        Value::String(s) => match s.parse::<i64>() {
            Ok(n) => Value::Integer(n),
            Err(_) => match s.parse::<f64>() {
                Ok(n) if n.is_finite() => Value::Float(n),
                _ => Value::Null,
            },
        },
        _ => Value::Null,
    })
}

// ========================================
// String functions
// ========================================

fn starts_with(args: &[Value]) -> Result<Value> {
    let subject = as_str(&args[0])?;
    let prefix = as_str(&args[1])?;
    Ok(Value::Boolean(subject.starts_with(prefix)))
}

fn ends_with(args: &[Value]) -> Result<Value> {
    let subject = as_str(&args[0])?;
    let suffix = as_str(&args[1])?;
    Ok(Value::Boolean(subject.ends_with(suffix)))
}

fn join(args: &[Value]) -> Result<Value> {
    let glue = as_str(&args[0])?;
    let parts = as_array(&args[1])?
        .iter()
        .map(as_str)
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::String(parts.join(glue)))
}

fn to_string(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Expression(_) => Err(Error::InvalidType(
            "function to_string() cannot encode an expression".to_string(),
        )),
        other => Ok(Value::String(other.to_json_string())),
    }
}

// ========================================
// Collection functions
// ========================================

fn length(args: &[Value]) -> Result<Value> {
    let count = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(obj) => obj.len(),
        other => return Err(type_error("string, array or object", other)),
    };
    Ok(Value::Integer(count as i64))
}

fn contains(args: &[Value]) -> Result<Value> {
    let found = match (&args[0], &args[1]) {
        (Value::Array(items), needle) => items.contains(needle),
        (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
        (Value::String(_), _) => false,
        (other, _) => return Err(type_error("array or string", other)),
    };
    Ok(Value::Boolean(found))
}

fn reverse(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::Array(items) => Ok(Value::Array(items.iter().rev().cloned().collect())),
        other => Err(type_error("string or array", other)),
    }
}

fn to_array(args: &[Value]) -> Result<Value> {
    Ok(match &args[0] {
        Value::Array(items) => Value::Array(items.clone()),
        other => Value::Array(vec![other.clone()]),
    })
}

fn not_null(args: &[Value]) -> Result<Value> {
    Ok(args
        .iter()
        .find(|arg| !arg.is_null())
        .cloned()
        .unwrap_or_default())
}

fn type_of(args: &[Value]) -> Result<Value> {
    Ok(Value::from(args[0].type_name()))
}

fn keys(args: &[Value]) -> Result<Value> {
    let obj = as_object(&args[0])?;
    Ok(Value::Array(obj.keys().map(|k| Value::String(k.clone())).collect()))
}

fn values(args: &[Value]) -> Result<Value> {
    let obj = as_object(&args[0])?;
    Ok(Value::Array(obj.values().cloned().collect()))
}

fn merge(args: &[Value]) -> Result<Value> {
    let mut merged = Map::new();
    for arg in args {
        for (key, value) in as_object(arg)? {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(merged))
}

// ========================================
// Ordering functions
// ========================================

/// Items must already be all numbers or all strings.
fn extreme(items: &[Value], want: std::cmp::Ordering) -> Value {
    let mut best: Option<&Value> = None;
    for item in items {
        best = match best {
            Some(current) if item.compare(current) != Some(want) => Some(current),
            _ => Some(item),
        };
    }
    best.cloned().unwrap_or_default()
}

fn max(args: &[Value]) -> Result<Value> {
    Ok(extreme(as_array(&args[0])?, std::cmp::Ordering::Greater))
}

fn min(args: &[Value]) -> Result<Value> {
    Ok(extreme(as_array(&args[0])?, std::cmp::Ordering::Less))
}

fn sort(args: &[Value]) -> Result<Value> {
    let mut items = as_array(&args[0])?.clone();
    items.sort_by(|a, b| a.compare(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Value::Array(items))
}

/// Evaluates `expression` against every item, requiring the keys to be all
/// numbers or all strings.
fn sort_keys(function: &str, items: &[Value], expression: &Node) -> Result<Vec<Value>> {
    let keys = items
        .iter()
        .map(|item| expression.visit(item))
        .collect::<Result<Vec<_>>>()?;

    let all_numbers = keys.iter().all(Value::is_number);
    let all_strings = keys.iter().all(|k| matches!(k, Value::String(_)));
    if !(all_numbers || all_strings) {
        return Err(Error::InvalidType(format!(
            "function {}() expects the expression to return only numbers or only strings",
            function
        )));
    }
    Ok(keys)
}

fn sort_by(args: &[Value]) -> Result<Value> {
    let items = as_array(&args[0])?;
    let keys = sort_keys("sort_by", items, as_expression(&args[1])?)?;

    let mut keyed: Vec<(Value, &Value)> = keys.into_iter().zip(items.iter()).collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Value::Array(keyed.into_iter().map(|(_, item)| item.clone()).collect()))
}

fn extreme_by(function: &str, args: &[Value], want: std::cmp::Ordering) -> Result<Value> {
    let items = as_array(&args[0])?;
    let keys = sort_keys(function, items, as_expression(&args[1])?)?;

    let mut best: Option<usize> = None;
    for (i, key) in keys.iter().enumerate() {
        best = match best {
            Some(current) if key.compare(&keys[current]) != Some(want) => Some(current),
            _ => Some(i),
        };
    }
    Ok(best.map(|i| items[i].clone()).unwrap_or_default())
}

fn max_by(args: &[Value]) -> Result<Value> {
    extreme_by("max_by", args, std::cmp::Ordering::Greater)
}

fn min_by(args: &[Value]) -> Result<Value> {
    extreme_by("min_by", args, std::cmp::Ordering::Less)
}

fn map(args: &[Value]) -> Result<Value> {
    let expression = as_expression(&args[0])?;
    let items = as_array(&args[1])?;
    let mapped = items
        .iter()
        .map(|item| expression.visit(item))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(mapped))
}
