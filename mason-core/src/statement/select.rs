//! SELECT statement builder

use std::fmt::Display;

use super::{join_display, ConditionSet, RenderState, Renderable};
use crate::clause::{Alias, Join, JoinType, Limit, Order, SortDirection};
use crate::error::Result;
use crate::expression::{BoolOperator, Expression};

/// Builder for a single SELECT statement.
///
/// Mutators consume and return the builder for fluent chaining; the ones
/// that take a table or alias validate it at the call and return `Result`.
/// Clause order in the rendered statement is fixed: projection, FROM with
/// its joins, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT/OFFSET.
///
/// # Examples
/// ```
/// use mason_core::{select, Renderable};
///
/// let mut query = select(["name", "age"])
///     .from("users", Some("u"))
///     .unwrap()
///     .where_("u.active = :active")
///     .and_where("u.age > :age");
/// assert_eq!(
///     query.sql(),
///     "SELECT name, age FROM users AS u WHERE (u.active = :active AND u.age > :age)"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectStatement {
    columns: Vec<String>,
    distinct: bool,
    from: Option<Alias>,
    joins: Vec<Join>,
    where_clause: ConditionSet,
    group_by: Vec<String>,
    having: ConditionSet,
    order_by: Vec<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
    state: RenderState,
}

impl SelectStatement {
    /// Create a builder projecting the given columns
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Replace the projection with the given columns
    pub fn select<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self.state.invalidate();
        self
    }

    /// Append columns to the projection
    pub fn add_select<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self.state.invalidate();
        self
    }

    /// Emit `SELECT DISTINCT`
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self.state.invalidate();
        self
    }

    /// Set the FROM target; the latest call replaces any previous one
    pub fn from(mut self, table: &str, alias: Option<&str>) -> Result<Self> {
        self.from = Some(Alias::new(table, alias)?);
        self.state.invalidate();
        Ok(self)
    }

    /// Add an INNER JOIN with its ON condition
    pub fn inner_join(self, table: &str, alias: Option<&str>, on: &str) -> Result<Self> {
        self.join(JoinType::Inner, table, alias, on)
    }

    /// Add a LEFT JOIN with its ON condition
    pub fn left_join(self, table: &str, alias: Option<&str>, on: &str) -> Result<Self> {
        self.join(JoinType::Left, table, alias, on)
    }

    /// Add a RIGHT JOIN with its ON condition
    pub fn right_join(self, table: &str, alias: Option<&str>, on: &str) -> Result<Self> {
        self.join(JoinType::Right, table, alias, on)
    }

    fn join(mut self, kind: JoinType, table: &str, alias: Option<&str>, on: &str) -> Result<Self> {
        self.joins.push(Join::new(kind, Alias::new(table, alias)?, on));
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

    /// Replace the GROUP BY columns
    pub fn group_by<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self.state.invalidate();
        self
    }

    /// Append GROUP BY columns
    pub fn add_group_by<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self.state.invalidate();
        self
    }

    /// Replace the HAVING part with the given predicate
    pub fn having(mut self, predicate: impl Into<Expression>) -> Self {
        self.having.replace(vec![predicate.into()]);
        self.state.invalidate();
        self
    }

    /// AND the predicate into the HAVING tree
    pub fn and_having(mut self, predicate: impl Into<Expression>) -> Self {
        self.having.merge(BoolOperator::And, vec![predicate.into()]);
        self.state.invalidate();
        self
    }

    /// OR the predicate into the HAVING tree
    pub fn or_having(mut self, predicate: impl Into<Expression>) -> Self {
        self.having.merge(BoolOperator::Or, vec![predicate.into()]);
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

    /// Cap the row count; `None` clears the LIMIT and any pending OFFSET
    pub fn limit(mut self, count: Option<u64>) -> Self {
        self.limit = count;
        if count.is_none() {
            self.offset = None;
        }
        self.state.invalidate();
        self
    }

    /// Skip leading rows; only emitted together with a LIMIT
    pub fn offset(mut self, offset: Option<u64>) -> Self {
        self.offset = offset;
        self.state.invalidate();
        self
    }
}

impl Renderable for SelectStatement {
    fn assemble(&self) -> String {
        let mut sql = String::new();

        if self.columns.is_empty() && self.from.is_none() {
            return sql;
        }

        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        if let Some(from) = &self.from {
            sql.push_str(" FROM ");
            sql.push_str(&from.to_string());
            for join in &self.joins {
                sql.push(' ');
                sql.push_str(&join.to_string());
            }
        }

        if let Some(where_sql) = self.where_clause.render() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if let Some(having_sql) = self.having.render() {
            sql.push_str(" HAVING ");
            sql.push_str(&having_sql);
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&join_display(&self.order_by, ", "));
        }

        if let Some(count) = self.limit {
            sql.push(' ');
            sql.push_str(&Limit::new(count, self.offset).to_string());
        }

        sql.trim_end().to_string()
    }

    fn render_state(&mut self) -> &mut RenderState {
        &mut self.state
    }
}

impl Display for SelectStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.assemble())
    }
}
