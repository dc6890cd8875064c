// Query Builder - SQL for the next poll cycle

use crate::domain::error::Result;
use crate::domain::query::comparison_prefix;
use crate::domain::{JobConfig, QueryText};

/// Column compared against the offset by the default query
pub const DEFAULT_OFFSET_COLUMN: &str = "id";

/// Build the query for `current_offset`
///
/// Without a custom template: `SELECT <columns> FROM <table> WHERE id > <offset>`.
/// With one: the template up to its first `>` followed by the offset.
/// Called every cycle because the offset changes.
pub fn build(config: &JobConfig, current_offset: i64) -> Result<QueryText> {
    match &config.custom_query {
        None => Ok(QueryText::new(
            format!(
                "SELECT {} FROM {} WHERE {} > ",
                config.columns_to_select(),
                config.table,
                DEFAULT_OFFSET_COLUMN
            ),
            current_offset,
        )),
        Some(template) => Ok(QueryText::new(
            comparison_prefix(template)?,
            current_offset,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_default_query_all_columns() {
        let q = build(&JobConfig::new("orders"), 0).unwrap();
        assert_eq!(q.sql(), "SELECT * FROM orders WHERE id > 0");
        assert_eq!(q.parameterized(), "SELECT * FROM orders WHERE id > ?");
    }

    #[test]
    fn test_default_query_with_columns() {
        let cfg = JobConfig::new("orders").with_columns("id, amount");
        let q = build(&cfg, 17).unwrap();
        assert_eq!(q.sql(), "SELECT id, amount FROM orders WHERE id > 17");
    }

    #[test]
    fn test_blank_columns_fall_back_to_star() {
        let cfg = JobConfig::new("orders").with_columns("   ");
        assert_eq!(build(&cfg, 1).unwrap().sql(), "SELECT * FROM orders WHERE id > 1");
    }

    #[test]
    fn test_custom_template_value_replaced() {
        let cfg = JobConfig::new("orders").with_custom_query("SELECT * FROM orders WHERE id > 0");
        assert_eq!(
            build(&cfg, 3).unwrap().sql(),
            "SELECT * FROM orders WHERE id > 3"
        );
    }

    #[test]
    fn test_custom_template_drops_trailing_clause() {
        let cfg = JobConfig::new("orders")
            .with_custom_query("SELECT id, total FROM orders o WHERE o.id>10 ORDER BY o.id");
        let q = build(&cfg, 250).unwrap();
        assert_eq!(q.sql(), "SELECT id, total FROM orders o WHERE o.id>250");
        assert_eq!(q.parameterized(), "SELECT id, total FROM orders o WHERE o.id>?");
    }

    #[test]
    fn test_custom_template_prefix_preserved_for_any_offset() {
        let template = "select a,b from t where seq >   99";
        let cfg = JobConfig::new("t").with_custom_query(template);
        for offset in [0_i64, 1, 42, 1_000_000, i64::MAX] {
            let sql = build(&cfg, offset).unwrap().sql();
            assert!(sql.starts_with("select a,b from t where seq >"));
            assert!(sql.ends_with(&offset.to_string()));
        }
    }

    #[test]
    fn test_custom_template_without_marker() {
        let cfg = JobConfig::new("orders").with_custom_query("SELECT * FROM orders");
        assert!(matches!(build(&cfg, 0), Err(DomainError::InvalidTemplate(_))));
    }
}
