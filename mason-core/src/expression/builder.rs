//! Condition and aggregate fragment factory

use std::fmt::Display;

use super::{BoolOperator, CompositeExpression, Expression};
use crate::error::{Error, Result};
use crate::statement::Renderable;
use crate::Query;

/// Stateless factory translating named comparison and aggregate operations
/// into condition fragments and composite trees.
///
/// Values are emitted verbatim: callers pass literals or named placeholder
/// tokens such as `:age`, and no escaping happens here. The two logical
/// combinators [`and_x`](Self::and_x) and [`or_x`](Self::or_x) build fresh
/// composites and never merge into an existing tree; merging is the job of
/// the statement builders.
///
/// # Examples
/// ```
/// use mason_core::ExpressionBuilder;
///
/// let expr = ExpressionBuilder::new();
/// assert_eq!(expr.gte("u.age", ":age").to_string(), "u.age >= :age");
/// assert_eq!(
///     expr.and_x(["a = 1", "b = 2"]).to_string(),
///     "(a = 1 AND b = 2)"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionBuilder;

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Combine the given expressions under AND
    pub fn and_x<I>(&self, exprs: I) -> CompositeExpression
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        CompositeExpression::with(BoolOperator::And, exprs)
    }

    /// Combine the given expressions under OR
    pub fn or_x<I>(&self, exprs: I) -> CompositeExpression
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        CompositeExpression::with(BoolOperator::Or, exprs)
    }

    fn comparison(&self, name: &str, op: &str, value: impl Display) -> Expression {
        Expression::Condition(format!("{} {} {}", name, op, value))
    }

    /// `name = value`
    pub fn eq(&self, name: &str, value: impl Display) -> Expression {
        self.comparison(name, "=", value)
    }

    /// `name != value`
    pub fn neq(&self, name: &str, value: impl Display) -> Expression {
        self.comparison(name, "!=", value)
    }

    /// `name > value`
    pub fn gt(&self, name: &str, value: impl Display) -> Expression {
        self.comparison(name, ">", value)
    }

    /// `name >= value`
    pub fn gte(&self, name: &str, value: impl Display) -> Expression {
        self.comparison(name, ">=", value)
    }

    /// `name < value`
    pub fn lt(&self, name: &str, value: impl Display) -> Expression {
        self.comparison(name, "<", value)
    }

    /// `name <= value`
    pub fn lte(&self, name: &str, value: impl Display) -> Expression {
        self.comparison(name, "<=", value)
    }

    /// `name LIKE pattern`
    pub fn like(&self, name: &str, pattern: impl Display) -> Expression {
        self.comparison(name, "LIKE", pattern)
    }

    /// `name NOT LIKE pattern`
    pub fn not_like(&self, name: &str, pattern: impl Display) -> Expression {
        self.comparison(name, "NOT LIKE", pattern)
    }

    /// `name IS NULL`
    pub fn is_null(&self, name: &str) -> Expression {
        Expression::Condition(format!("{} IS NULL", name))
    }

    /// `name IS NOT NULL`
    pub fn is_not_null(&self, name: &str) -> Expression {
        Expression::Condition(format!("{} IS NOT NULL", name))
    }

    /// `value BETWEEN lower AND upper`
    pub fn between(
        &self,
        value: impl Display,
        lower: impl Display,
        upper: impl Display,
    ) -> Expression {
        Expression::Condition(format!("{} BETWEEN {} AND {}", value, lower, upper))
    }

    /// `name IN (v1, v2, ...)` over literal values or placeholder tokens
    pub fn in_list<I>(&self, name: &str, values: I) -> Expression
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Expression::Condition(format!("{} IN ({})", name, csv(values)))
    }

    /// `name NOT IN (v1, v2, ...)` over literal values or placeholder tokens
    pub fn not_in_list<I>(&self, name: &str, values: I) -> Expression
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Expression::Condition(format!("{} NOT IN ({})", name, csv(values)))
    }

    /// `name IN (SELECT ...)` with the subquery produced by `build`.
    ///
    /// The closure receives a statement factory and must return a statement
    /// that assembles to non-empty SQL; anything else fails with
    /// [`Error::UnexpectedResult`] before any text is joined.
    pub fn in_query<S, F>(&self, name: &str, build: F) -> Result<Expression>
    where
        S: Renderable,
        F: FnOnce(Query) -> Result<S>,
    {
        let subquery = self.subquery(build)?;
        Ok(Expression::Condition(format!("{} IN ({})", name, subquery)))
    }

    /// `name NOT IN (SELECT ...)`, see [`in_query`](Self::in_query)
    pub fn not_in_query<S, F>(&self, name: &str, build: F) -> Result<Expression>
    where
        S: Renderable,
        F: FnOnce(Query) -> Result<S>,
    {
        let subquery = self.subquery(build)?;
        Ok(Expression::Condition(format!(
            "{} NOT IN ({})",
            name, subquery
        )))
    }

    fn subquery<S, F>(&self, build: F) -> Result<String>
    where
        S: Renderable,
        F: FnOnce(Query) -> Result<S>,
    {
        let statement = build(Query::new())?;
        let sql = statement.assemble();
        if sql.trim().is_empty() {
            return Err(Error::unexpected_result(
                "subquery closure produced a statement that renders to no SQL",
            ));
        }
        Ok(sql)
    }

    /// `COUNT(name)`
    pub fn count(&self, name: &str) -> String {
        format!("COUNT({})", name)
    }

    /// `AVG(name)`
    pub fn avg(&self, name: impl Display) -> String {
        func("AVG", [name])
    }

    /// `AVG(e1, e2, ...)` over a sequence of expressions
    pub fn avg_all<I>(&self, exprs: I) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        func("AVG", exprs)
    }

    /// `SUM(name)`
    pub fn sum(&self, name: impl Display) -> String {
        func("SUM", [name])
    }

    /// `SUM(e1, e2, ...)` over a sequence of expressions
    pub fn sum_all<I>(&self, exprs: I) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        func("SUM", exprs)
    }

    /// `MAX(name)`
    pub fn max(&self, name: impl Display) -> String {
        func("MAX", [name])
    }

    /// `MAX(e1, e2, ...)` over a sequence of expressions
    pub fn max_all<I>(&self, exprs: I) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        func("MAX", exprs)
    }

    /// `MIN(name)`
    pub fn min(&self, name: impl Display) -> String {
        func("MIN", [name])
    }

    /// `MIN(e1, e2, ...)` over a sequence of expressions
    pub fn min_all<I>(&self, exprs: I) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        func("MIN", exprs)
    }
}

fn csv<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn func<I>(function: &str, args: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    format!("{}({})", function, csv(args))
}
