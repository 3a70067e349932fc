//! Mason Core - a fluent SQL statement builder
//!
//! Statements are assembled through chained method calls instead of
//! hand-written SQL strings. Each builder accumulates named clause parts,
//! renders them in a fixed clause order and caches the result until the next
//! mutation; execution is left to a pluggable [`driver::Connection`].
//!
//! ```
//! use mason_core::{select, Renderable};
//!
//! let mut query = select(["name", "age"])
//!     .from("users", Some("u"))
//!     .unwrap()
//!     .where_("u.active = :active")
//!     .and_where("u.age > :age")
//!     .limit(Some(10));
//! assert_eq!(
//!     query.sql(),
//!     "SELECT name, age FROM users AS u \
//!      WHERE (u.active = :active AND u.age > :age) LIMIT 10"
//! );
//! ```

pub mod clause;
pub mod driver;
pub mod error;
pub mod expression;
pub mod statement;
pub mod value;

// Re-export main types
pub use clause::{Alias, Join, JoinType, Limit, Order, SortDirection};
pub use driver::{Connection, Parameters, PlaceholderStyle};
pub use error::{Error, Result};
pub use expression::{BoolOperator, CompositeExpression, Expression, ExpressionBuilder};
pub use statement::{
    DeleteStatement, InsertStatement, RenderState, Renderable, SelectStatement, UpdateStatement,
};
pub use value::Value;

/// Thin factory handle for statements and expression building.
///
/// The same handle is passed to subquery closures, so nested SELECTs are
/// spawned from the same entry points as top-level statements. The crate
/// root re-exports each method as a free function.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query;

impl Query {
    pub fn new() -> Self {
        Self
    }

    /// Start a SELECT projecting the given columns
    pub fn select<I>(&self, columns: I) -> SelectStatement
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        SelectStatement::new(columns)
    }

    /// Start an INSERT into the given table
    pub fn insert(&self, table: &str) -> Result<InsertStatement> {
        InsertStatement::new(table)
    }

    /// Start an UPDATE of the given table
    pub fn update(&self, table: &str, alias: Option<&str>) -> Result<UpdateStatement> {
        UpdateStatement::new(table, alias)
    }

    /// Start a DELETE from the given table
    pub fn delete(&self, table: &str, alias: Option<&str>) -> Result<DeleteStatement> {
        DeleteStatement::new(table, alias)
    }

    /// The condition fragment factory
    pub fn expr(&self) -> ExpressionBuilder {
        ExpressionBuilder::new()
    }
}

/// Start a SELECT projecting the given columns
pub fn select<I>(columns: I) -> SelectStatement
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Query::new().select(columns)
}

/// Start an INSERT into the given table
pub fn insert(table: &str) -> Result<InsertStatement> {
    Query::new().insert(table)
}

/// Start an UPDATE of the given table
pub fn update(table: &str, alias: Option<&str>) -> Result<UpdateStatement> {
    Query::new().update(table, alias)
}

/// Start a DELETE from the given table
pub fn delete(table: &str, alias: Option<&str>) -> Result<DeleteStatement> {
    Query::new().delete(table, alias)
}

/// The condition fragment factory
pub fn expr() -> ExpressionBuilder {
    ExpressionBuilder::new()
}
