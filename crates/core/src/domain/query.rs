// Query Text (rebuilt every cycle)

use super::error::{DomainError, Result};
use std::fmt;

/// Placeholder bound to the offset in the parameterized form
pub const OFFSET_PLACEHOLDER: &str = "?";

/// SQL for one poll cycle
///
/// Stored as the statement prefix ending at the offset comparison plus the
/// offset value, so it can be rendered literally or as a parameterized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryText {
    prefix: String,
    offset: i64,
}

impl QueryText {
    pub fn new(prefix: impl Into<String>, offset: i64) -> Self {
        Self {
            prefix: prefix.into(),
            offset,
        }
    }

    /// Literal statement with the offset spliced in
    pub fn sql(&self) -> String {
        format!("{}{}", self.prefix, self.offset)
    }

    /// Statement with a single placeholder in place of the offset
    pub fn parameterized(&self) -> String {
        format!("{}{}", self.prefix, OFFSET_PLACEHOLDER)
    }

    /// Value bound to the placeholder
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.offset)
    }
}

/// Portion of a custom template kept across cycles
///
/// Everything up to and including the first `>`, plus any whitespace right
/// after it. The literal value that follows is dropped.
pub fn comparison_prefix(template: &str) -> Result<&str> {
    let marker = template.find('>').ok_or_else(|| {
        DomainError::InvalidTemplate(format!(
            "custom query has no '>' offset comparison: {}",
            template
        ))
    })?;
    let after = &template[marker + 1..];
    let spaces = after.len() - after.trim_start().len();
    Ok(&template[..marker + 1 + spaces])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_forms() {
        let q = QueryText::new("SELECT * FROM orders WHERE id > ", 42);
        assert_eq!(q.sql(), "SELECT * FROM orders WHERE id > 42");
        assert_eq!(q.to_string(), q.sql());
        assert_eq!(q.parameterized(), "SELECT * FROM orders WHERE id > ?");
        assert_eq!(q.offset(), 42);
    }

    #[test]
    fn test_prefix_keeps_space_after_marker() {
        assert_eq!(
            comparison_prefix("SELECT * FROM t WHERE id > 0").unwrap(),
            "SELECT * FROM t WHERE id > "
        );
    }

    #[test]
    fn test_prefix_without_space() {
        assert_eq!(
            comparison_prefix("SELECT * FROM t WHERE id>100 ORDER BY id").unwrap(),
            "SELECT * FROM t WHERE id>"
        );
    }

    #[test]
    fn test_prefix_uses_first_marker() {
        assert_eq!(
            comparison_prefix("SELECT a FROM t WHERE b > 1 AND id > 2").unwrap(),
            "SELECT a FROM t WHERE b > "
        );
    }

    #[test]
    fn test_prefix_missing_marker() {
        assert!(matches!(
            comparison_prefix("SELECT * FROM t"),
            Err(DomainError::InvalidTemplate(_))
        ));
    }
}
