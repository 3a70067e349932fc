//! Clause value objects consumed by the statement renderers

use std::fmt::{self, Display};

use crate::error::{Error, Result};

/// Check a possibly dot-qualified SQL identifier.
///
/// Each part must start with a letter or underscore and continue with
/// letters, digits, underscores or `$`. Rejection happens at the call that
/// introduced the value, before any SQL is assembled.
pub(crate) fn validate_identifier(what: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_identifier(what, value));
    }
    for part in value.split('.') {
        let mut chars = part.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            }
            _ => false,
        };
        if !valid {
            return Err(Error::invalid_identifier(what, value));
        }
    }
    Ok(())
}

/// A table reference with an optional alias, rendered as `target AS name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    target: String,
    name: Option<String>,
}

impl Alias {
    /// Create a validated table reference
    pub fn new(target: &str, name: Option<&str>) -> Result<Self> {
        validate_identifier("table name", target)?;
        if let Some(name) = name {
            validate_identifier("alias", name)?;
        }
        Ok(Self {
            target: target.to_string(),
            name: name.map(str::to_string),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} AS {}", self.target, name),
            None => f.write_str(&self.target),
        }
    }
}

/// Sort direction for ORDER BY terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// A single ORDER BY term, rendered as `column ASC` / `column DESC`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    column: String,
    direction: SortDirection,
}

impl Order {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        Self {
            column: column.to_string(),
            direction,
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

/// A row window, rendered as `LIMIT count` with an optional ` OFFSET n`.
///
/// An offset without a count is not representable; statements drop a pending
/// offset when their limit is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    count: u64,
    offset: Option<u64>,
}

impl Limit {
    pub fn new(count: u64, offset: Option<u64>) -> Self {
        Self { count, offset }
    }
}

impl Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.count)?;
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

/// JOIN flavors supported by the SELECT renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => f.write_str("INNER"),
            JoinType::Left => f.write_str("LEFT"),
            JoinType::Right => f.write_str("RIGHT"),
        }
    }
}

/// A JOIN clause with its ON condition, stored in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    kind: JoinType,
    table: Alias,
    on: String,
}

impl Join {
    pub fn new(kind: JoinType, table: Alias, on: &str) -> Self {
        Self {
            kind,
            table,
            on: on.to_string(),
        }
    }
}

impl Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} JOIN {} ON {}", self.kind, self.table, self.on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("table name", "users").is_ok());
        assert!(validate_identifier("table name", "app_users2").is_ok());
        assert!(validate_identifier("table name", "public.users").is_ok());
        assert!(validate_identifier("column name", "u.created_at").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("table name", "").is_err());
        assert!(validate_identifier("table name", "   ").is_err());
        assert!(validate_identifier("table name", "1users").is_err());
        assert!(validate_identifier("table name", "users; DROP").is_err());
        assert!(validate_identifier("table name", "users.").is_err());
    }

    #[test]
    fn test_alias_rendering() {
        let plain = Alias::new("users", None).unwrap();
        assert_eq!(plain.to_string(), "users");

        let aliased = Alias::new("users", Some("u")).unwrap();
        assert_eq!(aliased.to_string(), "users AS u");
        assert_eq!(aliased.target(), "users");
        assert_eq!(aliased.name(), Some("u"));
    }

    #[test]
    fn test_alias_rejects_bad_input() {
        assert!(Alias::new("", None).is_err());
        assert!(Alias::new("users", Some("a b")).is_err());
    }

    #[test]
    fn test_order_rendering() {
        assert_eq!(
            Order::new("u.id", SortDirection::Asc).to_string(),
            "u.id ASC"
        );
        assert_eq!(
            Order::new("created_at", SortDirection::Desc).to_string(),
            "created_at DESC"
        );
    }

    #[test]
    fn test_limit_rendering() {
        assert_eq!(Limit::new(10, None).to_string(), "LIMIT 10");
        assert_eq!(Limit::new(10, Some(20)).to_string(), "LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_join_rendering() {
        let join = Join::new(
            JoinType::Left,
            Alias::new("profiles", Some("p")).unwrap(),
            "u.id = p.user_id",
        );
        assert_eq!(
            join.to_string(),
            "LEFT JOIN profiles AS p ON u.id = p.user_id"
        );
    }
}
