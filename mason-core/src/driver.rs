//! Driver contracts and named-parameter dispatch
//!
//! The statement builders only produce SQL text. Everything here is the
//! collaborator layer that ships a finished statement plus a set of named
//! parameter values to a database: placeholder expansion, the [`Connection`]
//! capability, and a PostgreSQL-backed implementation behind the `postgres`
//! feature.

use std::collections::BTreeMap;
use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::value::Value;

/// Named parameter values for one statement execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, Value>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under the given placeholder name (without the `:`)
    ///
    /// # Examples
    /// ```
    /// use mason_core::driver::Parameters;
    ///
    /// let params = Parameters::new().bind("age", 21).bind("name", "Jo");
    /// assert_eq!(params.len(), 2);
    /// ```
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Placeholder syntax of the target driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Positional,
    /// `$1`, `$2`, ...
    Numbered,
}

impl PlaceholderStyle {
    fn marker(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", index),
        }
    }
}

/// Rewrite `:name` placeholders into driver markers and collect the bind
/// list in appearance order.
///
/// `::` is left alone (cast syntax), as is anything inside a single-quoted
/// string literal. A placeholder with no bound value fails with
/// [`Error::UnknownParameter`] before anything reaches the database. A value
/// bound under several placeholders is cloned into each position.
pub fn expand_placeholders(
    sql: &str,
    params: &Parameters,
    style: PlaceholderStyle,
) -> Result<(String, Vec<Value>)> {
    let mut out = String::with_capacity(sql.len());
    let mut binds = Vec::new();
    let mut in_string = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\'' {
                in_string = false;
            }
            continue;
        }
        match c {
            '\'' => {
                in_string = true;
                out.push(c);
            }
            ':' => {
                if chars.peek() == Some(&':') {
                    chars.next();
                    out.push_str("::");
                    continue;
                }
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    out.push(':');
                } else {
                    let value = params
                        .get(&name)
                        .ok_or_else(|| Error::unknown_parameter(name.clone()))?;
                    binds.push(value.clone());
                    out.push_str(&style.marker(binds.len()));
                }
            }
            _ => out.push(c),
        }
    }

    Ok((out, binds))
}

/// Capability of executing a finished SQL string with named parameters.
///
/// The facade renders a statement via
/// [`Renderable::sql`](crate::statement::Renderable::sql) and hands the text
/// here; the builders themselves never touch a connection.
pub trait Connection: Send + Sync {
    /// Execute a statement that returns no rows (INSERT, UPDATE, DELETE)
    fn execute(
        &self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Execute a query and decode every row
    fn fetch_all<T>(
        &self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send + Unpin;

    /// Execute a query and decode exactly one row
    fn fetch_one<T>(
        &self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send + Unpin;

    /// Execute a query and decode at most one row
    fn fetch_optional<T>(
        &self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = Result<Option<T>>> + Send
    where
        T: DeserializeOwned + Send + Unpin;
}

/// PostgreSQL connection wrapper
#[cfg(feature = "postgres")]
pub mod postgres {
    use super::*;
    use sqlx::postgres::{PgPool, PgRow};
    use sqlx::{Column as _, Row as _, TypeInfo as _};

    /// PostgreSQL-backed [`Connection`] over a sqlx pool
    #[derive(Clone)]
    pub struct PostgresDriver {
        pool: PgPool,
    }

    impl PostgresDriver {
        /// Connect and build a pool from a connection string
        pub async fn connect(database_url: &str) -> Result<Self> {
            let pool = PgPool::connect(database_url).await?;
            Ok(Self { pool })
        }

        /// Wrap an existing pool
        pub fn from_pool(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    impl Connection for PostgresDriver {
        async fn execute(&self, sql: &str, params: &Parameters) -> Result<u64> {
            let (sql, binds) = expand_placeholders(sql, params, PlaceholderStyle::Numbered)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(sql = %sql, binds = binds.len(), "executing statement");
            let result = bind_values(sqlx::query(&sql), &binds)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }

        async fn fetch_all<T>(&self, sql: &str, params: &Parameters) -> Result<Vec<T>>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            let (sql, binds) = expand_placeholders(sql, params, PlaceholderStyle::Numbered)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(sql = %sql, binds = binds.len(), "fetching rows");
            let rows = bind_values(sqlx::query(&sql), &binds)
                .fetch_all(&self.pool)
                .await?;

            let mut results = Vec::with_capacity(rows.len());
            for row in rows {
                results.push(serde_json::from_value(row_to_json(&row)?)?);
            }
            Ok(results)
        }

        async fn fetch_one<T>(&self, sql: &str, params: &Parameters) -> Result<T>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            let (sql, binds) = expand_placeholders(sql, params, PlaceholderStyle::Numbered)?;
            let row = bind_values(sqlx::query(&sql), &binds)
                .fetch_one(&self.pool)
                .await?;
            Ok(serde_json::from_value(row_to_json(&row)?)?)
        }

        async fn fetch_optional<T>(&self, sql: &str, params: &Parameters) -> Result<Option<T>>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            let (sql, binds) = expand_placeholders(sql, params, PlaceholderStyle::Numbered)?;
            match bind_values(sqlx::query(&sql), &binds)
                .fetch_optional(&self.pool)
                .await?
            {
                Some(row) => Ok(Some(serde_json::from_value(row_to_json(&row)?)?)),
                None => Ok(None),
            }
        }
    }

    /// Bind parameter values in expansion order
    fn bind_values<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        params: &'q [Value],
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<i32>),
                Value::Bool(b) => query.bind(*b),
                Value::I32(i) => query.bind(*i),
                Value::I64(i) => query.bind(*i),
                Value::F32(f) => query.bind(*f),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.as_str()),
                Value::Bytes(b) => query.bind(b.as_slice()),
                Value::Json(j) => query.bind(j.to_string()),
            };
        }
        query
    }

    /// Decode a row into a JSON object keyed by column name
    fn row_to_json(row: &PgRow) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (i, column) in row.columns().iter().enumerate() {
            let value = match column.type_info().name() {
                "BOOL" => row.try_get::<Option<bool>, _>(i)?.map(serde_json::Value::Bool),
                "INT2" => row
                    .try_get::<Option<i16>, _>(i)?
                    .map(|v| serde_json::Value::from(v as i64)),
                "INT4" => row
                    .try_get::<Option<i32>, _>(i)?
                    .map(serde_json::Value::from),
                "INT8" => row
                    .try_get::<Option<i64>, _>(i)?
                    .map(serde_json::Value::from),
                "FLOAT4" => row
                    .try_get::<Option<f32>, _>(i)?
                    .map(|v| serde_json::Value::from(v as f64)),
                "FLOAT8" => row
                    .try_get::<Option<f64>, _>(i)?
                    .map(serde_json::Value::from),
                _ => row
                    .try_get::<Option<String>, _>(i)?
                    .map(serde_json::Value::String),
            };
            map.insert(
                column.name().to_string(),
                value.unwrap_or(serde_json::Value::Null),
            );
        }
        Ok(serde_json::Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{delete, insert, select, Renderable};
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_parameters_accumulate() {
        let params = Parameters::new().bind("age", 21).bind("name", "Jo");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("age"), Some(&Value::I32(21)));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_expand_positional() {
        let params = Parameters::new().bind("age", 21).bind("name", "Jo");
        let (sql, binds) = expand_placeholders(
            "SELECT * FROM users WHERE age > :age AND name = :name",
            &params,
            PlaceholderStyle::Positional,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM users WHERE age > ? AND name = ?");
        assert_eq!(
            binds,
            vec![Value::I32(21), Value::String("Jo".to_string())]
        );
    }

    #[test]
    fn test_expand_numbered_in_appearance_order() {
        let params = Parameters::new().bind("a", 1).bind("b", 2);
        let (sql, binds) = expand_placeholders(
            "SELECT :b, :a, :b",
            &params,
            PlaceholderStyle::Numbered,
        )
        .unwrap();
        assert_eq!(sql, "SELECT $1, $2, $3");
        assert_eq!(binds, vec![Value::I32(2), Value::I32(1), Value::I32(2)]);
    }

    #[test]
    fn test_expand_skips_casts_and_string_literals() {
        let params = Parameters::new().bind("id", 7);
        let (sql, binds) = expand_placeholders(
            "SELECT ':ignored', id::text FROM t WHERE id = :id",
            &params,
            PlaceholderStyle::Positional,
        )
        .unwrap();
        assert_eq!(sql, "SELECT ':ignored', id::text FROM t WHERE id = ?");
        assert_eq!(binds, vec![Value::I32(7)]);
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        let params = Parameters::new();
        let result = expand_placeholders(
            "SELECT * FROM t WHERE id = :id",
            &params,
            PlaceholderStyle::Positional,
        );
        assert!(matches!(result, Err(Error::UnknownParameter { name }) if name == "id"));
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: i32,
        name: String,
    }

    // Mock connection for exercising the dispatch surface without a database
    struct MockConnection {
        rows: serde_json::Value,
        fail: bool,
    }

    impl MockConnection {
        fn with_rows(rows: serde_json::Value) -> Self {
            Self { rows, fail: false }
        }

        fn failing() -> Self {
            Self {
                rows: serde_json::Value::Null,
                fail: true,
            }
        }

        fn check(&self, sql: &str, params: &Parameters) -> Result<()> {
            if self.fail {
                return Err(Error::unexpected_result("mock failure"));
            }
            expand_placeholders(sql, params, PlaceholderStyle::Positional)?;
            Ok(())
        }
    }

    impl Connection for MockConnection {
        async fn execute(&self, sql: &str, params: &Parameters) -> Result<u64> {
            self.check(sql, params)?;
            Ok(1)
        }

        async fn fetch_all<T>(&self, sql: &str, params: &Parameters) -> Result<Vec<T>>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            self.check(sql, params)?;
            Ok(serde_json::from_value(self.rows.clone())?)
        }

        async fn fetch_one<T>(&self, sql: &str, params: &Parameters) -> Result<T>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            self.check(sql, params)?;
            let rows: Vec<serde_json::Value> = serde_json::from_value(self.rows.clone())?;
            let first = rows
                .into_iter()
                .next()
                .ok_or_else(|| Error::unexpected_result("no rows"))?;
            Ok(serde_json::from_value(first)?)
        }

        async fn fetch_optional<T>(&self, sql: &str, params: &Parameters) -> Result<Option<T>>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            self.check(sql, params)?;
            let rows: Vec<serde_json::Value> = serde_json::from_value(self.rows.clone())?;
            match rows.into_iter().next() {
                Some(row) => Ok(Some(serde_json::from_value(row)?)),
                None => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn test_select_fetch_all() {
        let conn = MockConnection::with_rows(serde_json::json!([
            {"id": 1, "name": "John"},
            {"id": 2, "name": "Jane"}
        ]));
        let mut query = select(["id", "name"])
            .from("users", None)
            .unwrap()
            .where_("age > :age");
        let params = Parameters::new().bind("age", 18);

        let users: Vec<User> = conn.fetch_all(query.sql(), &params).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "John");
    }

    #[tokio::test]
    async fn test_fetch_one_and_optional() {
        let conn = MockConnection::with_rows(serde_json::json!([
            {"id": 1, "name": "John"}
        ]));
        let mut query = select(["id", "name"])
            .from("users", None)
            .unwrap()
            .where_("id = :id");
        let params = Parameters::new().bind("id", 1);

        let user: User = conn.fetch_one(query.sql(), &params).await.unwrap();
        assert_eq!(user.id, 1);

        let user: Option<User> = conn.fetch_optional(query.sql(), &params).await.unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn test_modifications_execute() {
        let conn = MockConnection::with_rows(serde_json::Value::Null);
        let params = Parameters::new().bind("name", "Test");

        let mut query = insert("users").unwrap().value("name", ":name");
        assert_eq!(conn.execute(query.sql(), &params).await.unwrap(), 1);

        let mut query = delete("users", None).unwrap().where_("name = :name");
        assert_eq!(conn.execute(query.sql(), &params).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unbound_placeholder_fails_before_execution() {
        let conn = MockConnection::with_rows(serde_json::Value::Null);
        let mut query = delete("users", None).unwrap().where_("id = :id");
        let result = conn.execute(query.sql(), &Parameters::new()).await;
        assert!(matches!(result, Err(Error::UnknownParameter { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_propagates() {
        let conn = MockConnection::failing();
        let mut query = select(["id"]).from("users", None).unwrap();
        let result: Result<Vec<User>> = conn.fetch_all(query.sql(), &Parameters::new()).await;
        assert!(result.is_err());
    }
}
