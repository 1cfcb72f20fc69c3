//! Tree-walking evaluation of [`Node`] trees.
//!
//! Evaluation is a pure function of the node and its input. Missing data
//! never raises: lookups that find nothing produce `Value::Null`, which the
//! projections then drop. Only built-in functions raise at evaluation time.

use std::{cmp::Ordering, sync::Arc};

use crate::{
    ast::{Comparator, FunctionCall, Node, Slice},
    error::Result,
    functions,
    value::{Map, Value},
};

impl Node {
    /// Evaluates the node against `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmes_lang::{Parser, Value};
    ///
    /// let data = Value::from_json_str(r#"{"foo": {"bar": [1, 2, 3]}}"#).unwrap();
    /// let node = Parser::new().parse("foo.bar[-1]").unwrap();
    /// assert_eq!(node.visit(&data).unwrap(), Value::Integer(3));
    /// ```
    pub fn visit(&self, value: &Value) -> Result<Value> {
        match self {
            Node::Current => Ok(value.clone()),
            Node::Field(name) => Ok(field(value, name).cloned().unwrap_or_default()),
            Node::ChainedField(keys) => {
                let mut current = value;
                for key in keys {
                    match field(current, key) {
                        Some(next) => current = next,
                        None => return Ok(Value::Null),
                    }
                }
                Ok(current.clone())
            }
            Node::Index(position) => Ok(index(value, *position)),
            Node::Subexpression { left, right } | Node::Pipe { left, right } => {
                right.visit(&left.visit(value)?)
            }
            Node::Flatten(child) => Ok(flatten(child.visit(value)?)),
            Node::ArrayProjection { target, projection } => match target.visit(value)? {
                Value::Array(items) => project(items.iter(), projection),
                _ => Ok(Value::Null),
            },
            Node::ObjectProjection { target, projection } => match target.visit(value)? {
                Value::Object(obj) => project(obj.values(), projection),
                _ => Ok(Value::Null),
            },
            Node::IdentityArrayProjection(target) => match target.visit(value)? {
                Value::Array(items) => Ok(Value::Array(
                    items.into_iter().filter(|item| !item.is_null()).collect(),
                )),
                _ => Ok(Value::Null),
            },
            Node::IdentityObjectProjection(target) => match target.visit(value)? {
                Value::Object(obj) => Ok(Value::Array(
                    obj.into_values().filter(|item| !item.is_null()).collect(),
                )),
                _ => Ok(Value::Null),
            },
            Node::Condition { test, body } => {
                if test.visit(value)?.is_truthy() {
                    body.visit(value)
                } else {
                    Ok(Value::Null)
                }
            }
            Node::Comparator {
                comparator,
                left,
                right,
            } => {
                let left = left.visit(value)?;
                let right = right.visit(value)?;
                Ok(compare(*comparator, &left, &right)
                    .map(Value::Boolean)
                    .unwrap_or_default())
            }
            Node::ComparatorCondition {
                comparator,
                left,
                right,
                body,
            } => {
                let left = left.visit(value)?;
                let right = right.visit(value)?;
                if compare(*comparator, &left, &right) == Some(true) {
                    body.visit(value)
                } else {
                    Ok(Value::Null)
                }
            }
            Node::LiteralCondition {
                negate,
                left,
                literal,
                body,
            } => {
                if (left.visit(value)? == *literal) != *negate {
                    body.visit(value)
                } else {
                    Ok(Value::Null)
                }
            }
            Node::And { left, right } => {
                let left = left.visit(value)?;
                if left.is_truthy() {
                    right.visit(value)
                } else {
                    Ok(left)
                }
            }
            Node::Or { left, right } => {
                let left = left.visit(value)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    right.visit(value)
                }
            }
            Node::Not(child) => Ok(Value::Boolean(!child.visit(value)?.is_truthy())),
            Node::MultiSelectList(nodes) => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let items = nodes
                    .iter()
                    .map(|node| node.visit(value))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(items))
            }
            Node::MultiSelectHash(pairs) => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let mut map = Map::with_capacity(pairs.len());
                for pair in pairs {
                    map.insert(pair.key.clone(), pair.value.visit(value)?);
                }
                Ok(Value::Object(map))
            }
            Node::Literal(literal) => Ok(literal.clone()),
            Node::Expression(child) => Ok(Value::Expression(Arc::clone(child))),
            Node::Slice(slice) => Ok(slice.apply(value)),
            Node::SimpleSlice { start, stop } => Ok(simple_slice(value, *start, *stop)),
            Node::Function(call) => call.invoke(value),
        }
    }
}

impl FunctionCall {
    fn invoke(&self, value: &Value) -> Result<Value> {
        let args = self
            .args
            .iter()
            .map(|arg| arg.visit(value))
            .collect::<Result<Vec<_>>>()?;

        match functions::call(&self.name, &args) {
            Err(err) if self.disable_visit_errors && err.is_visit_error() => {
                log::debug!("{}() evaluated to null: {}", self.name, err);
                Ok(Value::Null)
            }
            result => result,
        }
    }
}

impl Slice {
    /// Applies the slice to an array or a string (by character); anything
    /// else yields null.
    pub fn apply(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(
                self.indices(items.len())
                    .into_iter()
                    .map(|i| items[i].clone())
                    .collect(),
            ),
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                Value::String(self.indices(chars.len()).into_iter().map(|i| chars[i]).collect())
            }
            _ => Value::Null,
        }
    }

    /// Positions selected from a sequence of `len` elements, after
    /// normalizing negative and omitted bounds against the step's sign.
    fn indices(&self, len: usize) -> Vec<usize> {
        let len = len as i64;
        let step = self.step.unwrap_or(1);
        let start = match self.start {
            Some(start) => adjust_endpoint(len, start, step),
            None if step < 0 => len - 1,
            None => 0,
        };
        let stop = match self.stop {
            Some(stop) => adjust_endpoint(len, stop, step),
            None if step < 0 => -1,
            None => len,
        };

        let mut selected = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            selected.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        selected
    }
}

fn adjust_endpoint(len: i64, endpoint: i64, step: i64) -> i64 {
    if endpoint < 0 {
        let adjusted = endpoint.saturating_add(len);
        if adjusted >= 0 {
            adjusted
        } else if step < 0 {
            -1
        } else {
            0
        }
    } else if endpoint >= len {
        if step < 0 { len - 1 } else { len }
    } else {
        endpoint
    }
}

/// Direct sub-range for `[start:stop]` with `0 < start < stop`.
fn simple_slice(value: &Value, start: usize, stop: usize) -> Value {
    match value {
        Value::Array(items) => {
            let end = stop.min(items.len());
            let begin = start.min(end);
            Value::Array(items[begin..end].to_vec())
        }
        Value::String(s) => Value::String(s.chars().skip(start).take(stop - start).collect()),
        _ => Value::Null,
    }
}

/// Evaluates a comparison. `None` means the operands cannot be ordered, which
/// the comparator node reports as null.
pub(crate) fn compare(comparator: Comparator, left: &Value, right: &Value) -> Option<bool> {
    let ordering = || -> Option<Ordering> {
        if left.is_number() && right.is_number() {
            left.compare(right)
        } else {
            None
        }
    };
    match comparator {
        Comparator::Equal => Some(left == right),
        Comparator::NotEqual => Some(left != right),
        Comparator::LessThan => ordering().map(Ordering::is_lt),
        Comparator::LessEqual => ordering().map(Ordering::is_le),
        Comparator::GreaterThan => ordering().map(Ordering::is_gt),
        Comparator::GreaterEqual => ordering().map(Ordering::is_ge),
    }
}

fn field<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
    match value {
        Value::Object(obj) => obj.get(name),
        _ => None,
    }
}

fn index(value: &Value, position: i64) -> Value {
    let Value::Array(items) = value else {
        return Value::Null;
    };
    let resolved = if position < 0 {
        items.len().checked_sub(position.unsigned_abs() as usize)
    } else {
        Some(position as usize)
    };
    resolved
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or_default()
}

fn flatten(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut flat = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            Value::Array(flat)
        }
        _ => Value::Null,
    }
}

fn project<'v>(items: impl Iterator<Item = &'v Value>, projection: &Node) -> Result<Value> {
    let mut collected = Vec::new();
    for item in items {
        let result = projection.visit(item)?;
        if !result.is_null() {
            collected.push(result);
        }
    }
    Ok(Value::Array(collected))
}
