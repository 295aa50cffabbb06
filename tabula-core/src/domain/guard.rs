// tabula-core/src/domain/guard.rs
//
// Read-only gate for ad-hoc SQL against a dataset. Whatever produced the
// query (a user, a generator), only a single SELECT may reach the engine.

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::domain::error::DomainError;

pub struct QueryGuard;

impl QueryGuard {
    pub fn assert_read_only(sql: &str) -> Result<(), DomainError> {
        let dialect = GenericDialect {};
        let statements = Parser::parse_sql(&dialect, sql)
            .map_err(|e| DomainError::QueryRejected(format!("parse error: {}", e)))?;

        match statements.as_slice() {
            [] => Err(DomainError::QueryRejected("empty statement".to_string())),
            [Statement::Query(_)] => Ok(()),
            [_] => Err(DomainError::QueryRejected(
                "only SELECT statements are allowed".to_string(),
            )),
            _ => Err(DomainError::QueryRejected(
                "multiple statements are not allowed".to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select_accepted() {
        assert!(QueryGuard::assert_read_only("SELECT a, count(*) FROM data GROUP BY a").is_ok());
    }

    #[test]
    fn test_cte_select_accepted() {
        let sql = "WITH top AS (SELECT * FROM data LIMIT 10) SELECT count(*) FROM top";
        assert!(QueryGuard::assert_read_only(sql).is_ok());
    }

    #[test]
    fn test_dml_rejected() {
        let result = QueryGuard::assert_read_only("DELETE FROM data");
        assert!(matches!(result, Err(DomainError::QueryRejected(_))));
    }

    #[test]
    fn test_multiple_statements_rejected() {
        let result = QueryGuard::assert_read_only("SELECT 1; SELECT 2");
        assert!(matches!(result, Err(DomainError::QueryRejected(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let result = QueryGuard::assert_read_only("SHOW ME THE DATA please");
        assert!(matches!(result, Err(DomainError::QueryRejected(_))));
    }
}
