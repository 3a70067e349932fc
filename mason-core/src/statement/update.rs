//! UPDATE statement builder

use std::fmt::Display;

use super::{join_display, Assignments, ConditionSet, RenderState, Renderable};
use crate::clause::{Alias, Limit, Order, SortDirection};
use crate::error::Result;
use crate::expression::{BoolOperator, Expression};

/// Builder for a single UPDATE statement.
///
/// Clause order is fixed: target table, SET, WHERE, ORDER BY, LIMIT. With no
/// assignments there is nothing to execute and the statement renders as an
/// empty string.
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    table: Alias,
    set: Assignments,
    where_clause: ConditionSet,
    order_by: Vec<Order>,
    limit: Option<u64>,
    state: RenderState,
}

impl UpdateStatement {
    /// Create a builder targeting the given table
    pub fn new(table: &str, alias: Option<&str>) -> Result<Self> {
        Ok(Self {
            table: Alias::new(table, alias)?,
            set: Assignments::default(),
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

    /// Store a `column = value` assignment.
    ///
    /// Setting the same column again keeps its original position in the SET
    /// list but takes the latest value.
    pub fn set(mut self, column: &str, value: impl Display) -> Self {
        self.set.put(column, value.to_string());
        self.state.invalidate();
        self
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

impl Renderable for UpdateStatement {
    fn assemble(&self) -> String {
        if self.set.is_empty() {
            return String::new();
        }

        let mut sql = String::new();
        sql.push_str("UPDATE ");
        sql.push_str(&self.table.to_string());
        sql.push_str(" SET ");
        sql.push_str(&self.set.assignment_list());

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

impl Display for UpdateStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.assemble())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update;

    #[test]
    fn test_basic_update() {
        let mut query = update("users", Some("u"))
            .unwrap()
            .set("name", ":n")
            .where_("u.id = :id");
        assert_eq!(query.sql(), "UPDATE users AS u SET name = :n WHERE u.id = :id");
    }

    #[test]
    fn test_multiple_assignments_keep_call_order() {
        let mut query = update("users", None)
            .unwrap()
            .set("name", ":n")
            .set("age", ":a");
        assert_eq!(query.sql(), "UPDATE users SET name = :n, age = :a");
    }

    #[test]
    fn test_repeated_column_keeps_position_takes_latest_value() {
        let mut query = update("users", None)
            .unwrap()
            .set("name", ":first")
            .set("age", ":a")
            .set("name", ":second");
        assert_eq!(query.sql(), "UPDATE users SET name = :second, age = :a");
    }

    #[test]
    fn test_update_without_assignments_renders_nothing() {
        let mut query = update("users", None).unwrap().where_("id = 1");
        assert_eq!(query.sql(), "");
    }

    #[test]
    fn test_where_merging() {
        let mut query = update("users", None)
            .unwrap()
            .set("active", "0")
            .where_("a")
            .and_where("b")
            .or_where("c");
        assert_eq!(
            query.sql(),
            "UPDATE users SET active = 0 WHERE ((a AND b) OR c)"
        );
    }

    #[test]
    fn test_order_by_and_limit() {
        let mut query = update("jobs", None)
            .unwrap()
            .set("claimed", "1")
            .where_("claimed = 0")
            .order_by("created_at", SortDirection::Asc)
            .limit(Some(1));
        assert_eq!(
            query.sql(),
            "UPDATE jobs SET claimed = 1 WHERE claimed = 0 ORDER BY created_at ASC LIMIT 1"
        );
    }

    #[test]
    fn test_table_replacement_and_validation() {
        let mut query = update("users", None)
            .unwrap()
            .table("accounts", Some("a"))
            .unwrap()
            .set("touched", "1");
        assert_eq!(query.sql(), "UPDATE accounts AS a SET touched = 1");

        assert!(update("", None).is_err());
        assert!(update("users", Some("a u")).is_err());
    }
}
