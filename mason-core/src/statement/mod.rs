//! Statement builders and their shared parts plumbing
//!
//! Each statement owns a bag of typed clause parts plus a [`RenderState`]
//! cache. Mutators invalidate the cache; [`Renderable::sql`] re-assembles
//! only when a part changed since the last render.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use select::SelectStatement;
pub use update::UpdateStatement;

use std::fmt::Display;

use crate::expression::{BoolOperator, CompositeExpression, Expression};

/// Two-state memoization of the rendered SQL string.
///
/// Any part mutation moves the owning statement back to `Dirty`; rendering
/// while `Clean` returns the cached string without re-assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RenderState {
    #[default]
    Dirty,
    Clean(String),
}

impl RenderState {
    /// Discard any cached output
    pub fn invalidate(&mut self) {
        *self = RenderState::Dirty;
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, RenderState::Dirty)
    }

    pub fn cached(&self) -> Option<&str> {
        match self {
            RenderState::Clean(sql) => Some(sql),
            RenderState::Dirty => None,
        }
    }
}

/// Capability of producing final SQL text.
///
/// This is the contract the subquery protocol and the driver layer rely on:
/// anything renderable can be embedded in an `IN (...)` clause or shipped to
/// a [`Connection`](crate::driver::Connection).
pub trait Renderable {
    /// Assemble the full statement from its parts.
    ///
    /// Pure with respect to the cache; clause order is fixed per statement
    /// type and trailing whitespace is trimmed.
    fn assemble(&self) -> String;

    /// The dirty/clean cache slot owned by this statement
    fn render_state(&mut self) -> &mut RenderState;

    /// Render the statement, reusing the cached string until the next part
    /// mutation. Repeated calls without intervening mutation are O(1) and
    /// byte-identical.
    fn sql(&mut self) -> &str {
        if self.render_state().is_dirty() {
            let sql = self.assemble();
            *self.render_state() = RenderState::Clean(sql);
        }
        self.render_state().cached().unwrap_or("")
    }
}

/// WHERE/HAVING accumulation: always either absent or a single composite
/// root, never a bare fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ConditionSet {
    root: Option<CompositeExpression>,
}

impl ConditionSet {
    /// Drop the existing tree entirely, then merge the given predicates
    /// under AND.
    pub(crate) fn replace(&mut self, exprs: Vec<Expression>) {
        self.root = None;
        self.merge(BoolOperator::And, exprs);
    }

    /// Merge predicates into the tree.
    ///
    /// With no existing root the predicates become a fresh composite. A root
    /// with the same operator absorbs them in place, keeping the tree flat.
    /// A root with a different operator is wrapped whole as the first child
    /// of a new parent, so the old group stays one parenthesized unit.
    pub(crate) fn merge(&mut self, operator: BoolOperator, exprs: Vec<Expression>) {
        if exprs.is_empty() {
            return;
        }
        self.root = Some(match self.root.take() {
            None => CompositeExpression::with(operator, exprs),
            Some(mut root) if root.operator() == operator => {
                root.add_all(exprs);
                root
            }
            Some(root) => {
                let mut parent = CompositeExpression::new(operator);
                parent.add(root);
                parent.add_all(exprs);
                parent
            }
        });
    }

    pub(crate) fn render(&self) -> Option<String> {
        self.root
            .as_ref()
            .map(|root| root.to_string())
            .filter(|rendered| !rendered.is_empty())
    }
}

/// Ordered column/value pairs backing SET assignments and INSERT lists.
///
/// Repeating a column keeps its first-seen position and takes the latest
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Assignments {
    pairs: Vec<(String, String)>,
}

impl Assignments {
    pub(crate) fn put(&mut self, column: &str, value: String) {
        match self.pairs.iter_mut().find(|(name, _)| name == column) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((column.to_string(), value)),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `a = 1, b = 2`
    pub(crate) fn assignment_list(&self) -> String {
        self.pairs
            .iter()
            .map(|(column, value)| format!("{} = {}", column, value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `a, b`
    pub(crate) fn column_list(&self) -> String {
        self.pairs
            .iter()
            .map(|(column, _)| column.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `1, 2`
    pub(crate) fn value_list(&self) -> String {
        self.pairs
            .iter()
            .map(|(_, value)| value.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn join_display<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}
