//! Composite boolean expressions

use std::fmt;

use super::Expression;

/// Logical operator joining the children of a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

impl BoolOperator {
    pub(crate) fn separator(self) -> &'static str {
        match self {
            BoolOperator::And => " AND ",
            BoolOperator::Or => " OR ",
        }
    }
}

impl fmt::Display for BoolOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOperator::And => f.write_str("AND"),
            BoolOperator::Or => f.write_str("OR"),
        }
    }
}

/// A mutable tree node combining child expressions under a single operator.
///
/// The operator is fixed for the lifetime of the node; combining a tree with
/// a different operator always wraps it in a new parent node (see the WHERE
/// merging in the statement builders) instead of rewriting the operator in
/// place. Children keep their insertion order, which is also the textual
/// join order, and duplicates are allowed.
///
/// # Examples
/// ```
/// use mason_core::{BoolOperator, CompositeExpression};
///
/// let mut group = CompositeExpression::new(BoolOperator::Or);
/// group.add("status = 'new'");
/// group.add("status = 'open'");
/// assert_eq!(group.to_string(), "(status = 'new' OR status = 'open')");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeExpression {
    operator: BoolOperator,
    children: Vec<Expression>,
}

impl CompositeExpression {
    /// Create an empty composite with the given operator
    pub fn new(operator: BoolOperator) -> Self {
        Self {
            operator,
            children: Vec::new(),
        }
    }

    /// Shorthand for an empty AND composite
    pub fn and() -> Self {
        Self::new(BoolOperator::And)
    }

    /// Shorthand for an empty OR composite
    pub fn or() -> Self {
        Self::new(BoolOperator::Or)
    }

    /// Create a composite over the given children, in iteration order
    pub fn with<I>(operator: BoolOperator, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        Self {
            operator,
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a single child expression
    pub fn add(&mut self, expr: impl Into<Expression>) -> &mut Self {
        self.children.push(expr.into());
        self
    }

    /// Append a sequence of child expressions, in iteration order
    pub fn add_all<I>(&mut self, exprs: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        self.children.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Remove all children, keeping the operator
    pub fn clear(&mut self) -> &mut Self {
        self.children.clear();
        self
    }

    /// True iff the composite has no direct children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children (not recursive)
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// The operator fixed at construction
    pub fn operator(&self) -> BoolOperator {
        self.operator
    }
}

impl fmt::Display for CompositeExpression {
    /// Render the subtree.
    ///
    /// An empty composite renders as nothing and a single child is emitted
    /// without wrapping parentheses; only groups of two or more children get
    /// exactly one enclosing pair. This keeps nested mixed-operator trees
    /// correctly parenthesized without ever emitting `((x))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.children.as_slice() {
            [] => Ok(()),
            [only] => only.fmt(f),
            children => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(self.operator.separator())?;
                    }
                    child.fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}
