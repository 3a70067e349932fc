//! INSERT statement builder

use std::fmt::Display;

use super::{Assignments, RenderState, Renderable};
use crate::clause::validate_identifier;
use crate::error::Result;

/// Builder for a single-row INSERT statement.
///
/// Rendered as `INSERT INTO table (columns) VALUES (values)`; with no
/// column/value pairs there is nothing to execute and the statement renders
/// as an empty string. Repeating a column keeps its first-seen position and
/// takes the latest value, mirroring the UPDATE SET policy.
#[derive(Debug, Clone)]
pub struct InsertStatement {
    table: String,
    values: Assignments,
    state: RenderState,
}

impl InsertStatement {
    /// Create a builder targeting the given table
    pub fn new(table: &str) -> Result<Self> {
        validate_identifier("table name", table)?;
        Ok(Self {
            table: table.to_string(),
            values: Assignments::default(),
            state: RenderState::default(),
        })
    }

    /// Replace the target table
    pub fn into_table(mut self, table: &str) -> Result<Self> {
        validate_identifier("table name", table)?;
        self.table = table.to_string();
        self.state.invalidate();
        Ok(self)
    }

    /// Add one column/value pair
    pub fn value(mut self, column: &str, value: impl Display) -> Self {
        self.values.put(column, value.to_string());
        self.state.invalidate();
        self
    }

    /// Add a sequence of column/value pairs, in iteration order
    pub fn values<I, C, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, V)>,
        C: AsRef<str>,
        V: Display,
    {
        for (column, value) in pairs {
            self.values.put(column.as_ref(), value.to_string());
        }
        self.state.invalidate();
        self
    }
}

impl Renderable for InsertStatement {
    fn assemble(&self) -> String {
        if self.values.is_empty() {
            return String::new();
        }

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.values.column_list(),
            self.values.value_list()
        )
    }

    fn render_state(&mut self) -> &mut RenderState {
        &mut self.state
    }
}

impl Display for InsertStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.assemble())
    }
}
