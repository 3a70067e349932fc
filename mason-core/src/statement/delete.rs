//! DELETE statement builder

use std::fmt::Display;

use super::{join_display, ConditionSet, RenderState, Renderable};
use crate::clause::{Alias, Limit, Order, SortDirection};
use crate::error::Result;
use crate::expression::{BoolOperator, Expression};

/// Builder for a single DELETE statement.
///
/// Clause order is fixed: target table, WHERE, ORDER BY, LIMIT.
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    table: Alias,
    where_clause: ConditionSet,
    order_by: Vec<Order>,
    limit: Option<u64>,
    state: RenderState,
}

impl DeleteStatement {
    /// Create a builder targeting the given table
    pub fn new(table: &str, alias: Option<&str>) -> Result<Self> {
        Ok(Self {
            table: Alias::new(table, alias)?,
            where_clause: ConditionSet::default(),
            order_by: Vec::new(),
            limit: None,
            state: RenderState::default(),
        })
    }

    /// Replace the target table
    pub fn table(mut self, table: &str, alias: Option<&str>) -> Result<Self> {
        self.table = Alias::new(table, alias)?;
        self.state.invalidate();
        Ok(self)
    }

    /// Replace the WHERE part with the given predicate
    pub fn where_(mut self, predicate: impl Into<Expression>) -> Self {
        self.where_clause.replace(vec![predicate.into()]);
        self.state.invalidate();
        self
    }

    /// Replace the WHERE part with the given predicates, joined by AND
    pub fn where_all<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        self.where_clause
            .replace(predicates.into_iter().map(Into::into).collect());
        self.state.invalidate();
        self
    }

    /// AND the predicate into the WHERE tree
    pub fn and_where(mut self, predicate: impl Into<Expression>) -> Self {
        self.where_clause
            .merge(BoolOperator::And, vec![predicate.into()]);
        self.state.invalidate();
        self
    }

    /// AND the predicates into the WHERE tree, in iteration order
    pub fn and_where_all<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        self.where_clause.merge(
            BoolOperator::And,
            predicates.into_iter().map(Into::into).collect(),
        );
        self.state.invalidate();
        self
    }

    /// OR the predicate into the WHERE tree
    pub fn or_where(mut self, predicate: impl Into<Expression>) -> Self {
        self.where_clause
            .merge(BoolOperator::Or, vec![predicate.into()]);
        self.state.invalidate();
        self
    }

    /// OR the predicates into the WHERE tree, in iteration order
    pub fn or_where_all<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        self.where_clause.merge(
            BoolOperator::Or,
            predicates.into_iter().map(Into::into).collect(),
        );
        self.state.invalidate();
        self
    }

    /// Replace all ordering terms with a single one
    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by.clear();
        self.order_by.push(Order::new(column, direction));
        self.state.invalidate();
        self
    }

    /// Append an ordering term
    pub fn add_order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by.push(Order::new(column, direction));
        self.state.invalidate();
        self
    }

    /// Cap the affected row count; `None` clears the LIMIT
    pub fn limit(mut self, count: Option<u64>) -> Self {
        self.limit = count;
        self.state.invalidate();
        self
    }
}

impl Renderable for DeleteStatement {
    fn assemble(&self) -> String {
        let mut sql = String::new();
        sql.push_str("DELETE FROM ");
        sql.push_str(&self.table.to_string());

        if let Some(where_sql) = self.where_clause.render() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&join_display(&self.order_by, ", "));
        }

        if let Some(count) = self.limit {
            sql.push(' ');
            sql.push_str(&Limit::new(count, None).to_string());
        }

        sql.trim_end().to_string()
    }

    fn render_state(&mut self) -> &mut RenderState {
        &mut self.state
    }
}

impl Display for DeleteStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.assemble())
    }
}
