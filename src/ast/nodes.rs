use std::sync::Arc;

use crate::{
    ast::Comparator,
    error::{Error, Result},
    value::Value,
};

/// Abstract Syntax Tree node.
///
/// Every variant is evaluated by [`Node::visit`](crate::ast::Node::visit) and
/// rewritten by [`Node::optimize`](crate::ast::Node::optimize). Nodes are
/// immutable once built, so one tree can be evaluated from several threads.
///
/// The variants below the "optimized forms" marker are never produced by the
/// parser; only the optimizer creates them.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Current node (`@`), returns its input unchanged
    Current,

    /// Object member lookup
    ///
    /// # Example
    /// ```text
    /// foo
    /// "with space"
    /// ```
    Field(String),

    /// Array element lookup, negative indices count from the end
    ///
    /// # Example
    /// ```text
    /// [0]
    /// [-1]
    /// ```
    Index(i64),

    /// Evaluate `left`, feed the result to `right`
    ///
    /// # Example
    /// ```text
    /// foo.bar
    /// ```
    Subexpression { left: Box<Node>, right: Box<Node> },

    /// Same evaluation as `Subexpression`, but produced by `|`, so a projection
    /// on the left does not extend into `right`
    ///
    /// # Example
    /// ```text
    /// foo[*].bar | [0]
    /// ```
    Pipe { left: Box<Node>, right: Box<Node> },

    /// One-level flatten of the child's array result (`[]`)
    Flatten(Box<Node>),

    /// Evaluate `projection` against each element of the `target` array,
    /// dropping null results
    ArrayProjection {
        target: Box<Node>,
        projection: Box<Node>,
    },

    /// Evaluate `projection` against each value of the `target` object
    ObjectProjection {
        target: Box<Node>,
        projection: Box<Node>,
    },

    /// Evaluate `body` only when `test` is truthy
    Condition { test: Box<Node>, body: Box<Node> },

    /// Binary comparison
    ///
    /// # Example
    /// ```text
    /// age > `20`
    /// ```
    Comparator {
        comparator: Comparator,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `left && right`
    And { left: Box<Node>, right: Box<Node> },

    /// `left || right`
    Or { left: Box<Node>, right: Box<Node> },

    /// `!expr`
    Not(Box<Node>),

    /// `[a, b, c]`
    MultiSelectList(Vec<Node>),

    /// `{a: x, b: y}`
    MultiSelectHash(Vec<KeyValuePair>),

    /// Constant value from a raw string or JSON literal
    Literal(Value),

    /// `&expr`, evaluates to a first-class expression value
    Expression(Arc<Node>),

    /// `[start:stop:step]`
    Slice(Slice),

    /// Built-in function call
    ///
    /// # Example
    /// ```text
    /// length(people)
    /// sort_by(people, &age)
    /// ```
    Function(FunctionCall),

    // ---- optimized forms ----
    /// Fused chain of field lookups (`a.b.c`)
    ChainedField(Vec<String>),

    /// Array projection whose body is `@`: only drops null elements
    IdentityArrayProjection(Box<Node>),

    /// Object projection whose body is `@`: only drops null values
    IdentityObjectProjection(Box<Node>),

    /// Condition whose test is a comparison, evaluated inline
    ComparatorCondition {
        comparator: Comparator,
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },

    /// `==` or `!=` condition against a precomputed literal
    LiteralCondition {
        negate: bool,
        left: Box<Node>,
        literal: Value,
        body: Box<Node>,
    },

    /// Step-1 slice with positive, increasing bounds
    SimpleSlice { start: usize, stop: usize },
}

/// One `key: value` entry of a multi-select hash.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: Node,
}

/// Slice bounds as written; `None` means the bound was omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    /// Builds a slice, rejecting a zero step.
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Result<Self> {
        if step == Some(0) {
            return Err(Error::InvalidValue("slice step cannot be 0".to_string()));
        }
        Ok(Slice { start, stop, step })
    }
}

/// A call to a built-in function. The name is checked against the function
/// table when the node is built, so evaluation can assume it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Node>,
    /// Return null instead of raising arity/type errors.
    pub disable_visit_errors: bool,
}

impl Node {
    pub fn subexpression(left: Node, right: Node) -> Node {
        Node::Subexpression {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn pipe(left: Node, right: Node) -> Node {
        Node::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn array_projection(target: Node, projection: Node) -> Node {
        Node::ArrayProjection {
            target: Box::new(target),
            projection: Box::new(projection),
        }
    }

    pub fn object_projection(target: Node, projection: Node) -> Node {
        Node::ObjectProjection {
            target: Box::new(target),
            projection: Box::new(projection),
        }
    }

    pub fn condition(test: Node, body: Node) -> Node {
        Node::Condition {
            test: Box::new(test),
            body: Box::new(body),
        }
    }

    pub fn comparator(comparator: Comparator, left: Node, right: Node) -> Node {
        Node::Comparator {
            comparator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Node, right: Node) -> Node {
        Node::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Node, right: Node) -> Node {
        Node::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
