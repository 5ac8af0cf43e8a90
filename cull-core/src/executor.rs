//! Bulk execution seam over the database driver

use std::future::Future;

use sqlx::postgres::PgConnection;

use crate::error::Result;

/// Trait for connections that can run the staging pipeline
///
/// Covers the two driver capabilities the pipeline needs: executing a
/// statement for its affected-row count, and streaming a pre-encoded
/// payload through the native bulk-copy path. Every statement of one
/// execution goes through the same implementor, which keeps the
/// session-scoped staging table visible throughout.
pub trait BulkConnection: Send {
    /// Execute a single statement and return the affected-row count
    fn execute_statement(&mut self, sql: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Run a `COPY ... FROM STDIN` statement, streaming the payload
    /// batches, and return the number of rows copied
    fn copy_in(
        &mut self,
        statement: &str,
        payload: Vec<Vec<u8>>,
    ) -> impl Future<Output = Result<u64>> + Send;
}

impl BulkConnection for PgConnection {
    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        let result = sqlx::query(sql).execute(&mut *self).await?;
        Ok(result.rows_affected())
    }

    async fn copy_in(&mut self, statement: &str, payload: Vec<Vec<u8>>) -> Result<u64> {
        let mut copy = self.copy_in_raw(statement).await?;
        for batch in payload {
            copy.send(batch).await?;
        }
        Ok(copy.finish().await?)
    }
}

impl BulkConnection for sqlx::pool::PoolConnection<sqlx::Postgres> {
    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        (**self).execute_statement(sql).await
    }

    async fn copy_in(&mut self, statement: &str, payload: Vec<Vec<u8>>) -> Result<u64> {
        (**self).copy_in(statement, payload).await
    }
}

impl BulkConnection for sqlx::Transaction<'_, sqlx::Postgres> {
    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        (**self).execute_statement(sql).await
    }

    async fn copy_in(&mut self, statement: &str, payload: Vec<Vec<u8>>) -> Result<u64> {
        (**self).copy_in(statement, payload).await
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockConnection;
    use super::*;

    #[tokio::test]
    async fn test_mock_records_statements() {
        let mut conn = MockConnection::new(3);
        let affected = conn.execute_statement("DELETE FROM t").await.unwrap();
        assert_eq!(affected, 3);
        assert_eq!(conn.statements, vec!["DELETE FROM t".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_counts_copied_rows() {
        let mut conn = MockConnection::new(0);
        let copied = conn
            .copy_in("COPY t FROM STDIN", vec![b"1\n2\n".to_vec(), b"3\n".to_vec()])
            .await
            .unwrap();
        assert_eq!(copied, 3);
        assert_eq!(conn.copies.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_trigger() {
        let mut conn = MockConnection::new(0);
        conn.fail_on = Some("DELETE".to_string());
        assert!(conn.execute_statement("CREATE TABLE x (y INT)").await.is_ok());
        assert!(conn.execute_statement("DELETE FROM x").await.is_err());
    }
}
