//! Post-parse rewrite pass.
//!
//! `optimize` rebuilds the tree bottom-up, so every rule sees children that
//! are already optimized. The pass never changes results, only how they are
//! computed:
//!
//! - `a.b.c` field chains fuse into one [`Node::ChainedField`]
//! - conditions over a comparison evaluate the comparison inline, and `==` /
//!   `!=` against a literal keep the literal value precomputed
//! - projections whose body is `@` only drop nulls
//! - `[start:stop]` with `0 < start < stop` becomes a direct sub-range
//!
//! Running the pass on its own output returns an equal tree.

use std::sync::Arc;

use crate::ast::{Comparator, FunctionCall, KeyValuePair, Node, Slice};

impl Node {
    /// Returns an optimized copy of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmes_lang::{Parser, ast::Node};
    ///
    /// let node = Parser::new().parse("a.b.c").unwrap().optimize();
    /// assert_eq!(node, Node::ChainedField(vec!["a".into(), "b".into(), "c".into()]));
    /// ```
    pub fn optimize(&self) -> Node {
        match self {
            Node::Current
            | Node::Field(_)
            | Node::ChainedField(_)
            | Node::Index(_)
            | Node::Literal(_)
            | Node::SimpleSlice { .. } => self.clone(),
            Node::Subexpression { left, right } => fuse_fields(left.optimize(), right.optimize()),
            Node::Pipe { left, right } => Node::pipe(left.optimize(), right.optimize()),
            Node::Flatten(child) => Node::Flatten(Box::new(child.optimize())),
            Node::ArrayProjection { target, projection } => {
                let target = target.optimize();
                match projection.optimize() {
                    Node::Current => Node::IdentityArrayProjection(Box::new(target)),
                    projection => Node::array_projection(target, projection),
                }
            }
            Node::ObjectProjection { target, projection } => {
                let target = target.optimize();
                match projection.optimize() {
                    Node::Current => Node::IdentityObjectProjection(Box::new(target)),
                    projection => Node::object_projection(target, projection),
                }
            }
            Node::IdentityArrayProjection(target) => {
                Node::IdentityArrayProjection(Box::new(target.optimize()))
            }
            Node::IdentityObjectProjection(target) => {
                Node::IdentityObjectProjection(Box::new(target.optimize()))
            }
            Node::Condition { test, body } => {
                let body = body.optimize();
                match test.optimize() {
                    Node::Comparator {
                        comparator,
                        left,
                        right,
                    } => comparator_condition(comparator, *left, *right, body),
                    test => Node::condition(test, body),
                }
            }
            Node::ComparatorCondition {
                comparator,
                left,
                right,
                body,
            } => comparator_condition(*comparator, left.optimize(), right.optimize(), body.optimize()),
            Node::LiteralCondition {
                negate,
                left,
                literal,
                body,
            } => Node::LiteralCondition {
                negate: *negate,
                left: Box::new(left.optimize()),
                literal: literal.clone(),
                body: Box::new(body.optimize()),
            },
            Node::Comparator {
                comparator,
                left,
                right,
            } => Node::comparator(*comparator, left.optimize(), right.optimize()),
            Node::And { left, right } => Node::and(left.optimize(), right.optimize()),
            Node::Or { left, right } => Node::or(left.optimize(), right.optimize()),
            Node::Not(child) => Node::Not(Box::new(child.optimize())),
            Node::MultiSelectList(nodes) => {
                Node::MultiSelectList(nodes.iter().map(Node::optimize).collect())
            }
            Node::MultiSelectHash(pairs) => Node::MultiSelectHash(
                pairs
                    .iter()
                    .map(|pair| KeyValuePair {
                        key: pair.key.clone(),
                        value: pair.value.optimize(),
                    })
                    .collect(),
            ),
            Node::Expression(child) => Node::Expression(Arc::new(child.optimize())),
            Node::Slice(slice) => slice.optimize(),
            Node::Function(call) => Node::Function(FunctionCall {
                name: call.name.clone(),
                args: call.args.iter().map(Node::optimize).collect(),
                disable_visit_errors: call.disable_visit_errors,
            }),
        }
    }
}

impl Slice {
    fn optimize(&self) -> Node {
        match (self.start, self.stop, self.step) {
            (Some(start), Some(stop), None | Some(1)) if start > 0 && stop > start => {
                Node::SimpleSlice {
                    start: start as usize,
                    stop: stop as usize,
                }
            }
            _ => Node::Slice(*self),
        }
    }
}

fn is_field(node: &Node) -> bool {
    matches!(node, Node::Field(_) | Node::ChainedField(_))
}

fn into_keys(node: Node) -> Vec<String> {
    match node {
        Node::Field(key) => vec![key],
        Node::ChainedField(keys) => keys,
        _ => Vec::new(),
    }
}

/// Joins two already-optimized sides of a `Subexpression`.
fn fuse_fields(left: Node, right: Node) -> Node {
    match (left, right) {
        (left, right) if is_field(&left) && is_field(&right) => {
            let mut keys = into_keys(left);
            keys.extend(into_keys(right));
            Node::ChainedField(keys)
        }
        // `x.a` followed by `.b`: fuse into the inner right-hand side
        (Node::Subexpression { left, right: inner }, right) if is_field(&inner) && is_field(&right) => {
            Node::subexpression(*left, fuse_fields(*inner, right))
        }
        (left, right) => Node::subexpression(left, right),
    }
}

fn comparator_condition(comparator: Comparator, left: Node, right: Node, body: Node) -> Node {
    match (comparator, right) {
        (Comparator::Equal | Comparator::NotEqual, Node::Literal(literal)) => Node::LiteralCondition {
            negate: comparator == Comparator::NotEqual,
            left: Box::new(left),
            literal,
            body: Box::new(body),
        },
        (comparator, right) => Node::ComparatorCondition {
            comparator,
            left: Box::new(left),
            right: Box::new(right),
            body: Box::new(body),
        },
    }
}
