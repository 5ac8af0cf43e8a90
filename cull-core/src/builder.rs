//! Bulk delete builder module

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;

use crate::columns::{ColumnMappings, IntoIdColumns};
use crate::error::{Error, Result};
use crate::executor::BulkConnection;
use crate::options::BulkOptions;
use crate::sql;
use crate::staging::{self, StagedRows};

/// Result of a bulk delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkDeleteResult {
    /// Number of rows removed from the target table
    pub affected_rows: u64,
}

/// Statements rendered for one staging pipeline run
#[derive(Debug, Clone)]
pub struct BulkDeleteStatements {
    pub staging_table: String,
    pub create_table: String,
    pub copy: String,
    pub delete: String,
    pub drop_table: String,
}

/// Staging-table bulk delete builder
///
/// Stages the id columns of the supplied rows into a uniquely named
/// temporary table via `COPY`, then removes the matching rows from the
/// target table with a single join-based DELETE.
///
/// # Examples
/// ```no_run
/// use cull_core::bulk_delete;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct OrderLine {
///     order_id: i64,
///     line_no: i32,
/// }
///
/// # async fn run(pool: &sqlx::PgPool, lines: Vec<OrderLine>) -> cull_core::Result<()> {
/// let result = bulk_delete("order_lines")
///     .with_data(lines)
///     .with_id(("order_id", "line_no"))
///     .execute(pool)
///     .await?;
/// println!("removed {} rows", result.affected_rows);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BulkDeleteBuilder<T> {
    table_name: String,
    data: Vec<T>,
    id_columns: Vec<String>,
    mappings: ColumnMappings,
    options: BulkOptions,
}

impl<T> BulkDeleteBuilder<T> {
    /// Create a new bulk delete builder for the given target table
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            data: Vec::new(),
            id_columns: Vec::new(),
            mappings: ColumnMappings::new(),
            options: BulkOptions::default(),
        }
    }

    /// Change the target table
    pub fn to_table(mut self, table: &str) -> Self {
        self.table_name = table.to_string();
        self
    }

    /// Supply the rows whose identifiers select what to delete
    pub fn with_data<I>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.data = data.into_iter().collect();
        self
    }

    /// Select the id column(s) used for the join
    ///
    /// Accepts a single name, a tuple for composite keys, or a collection
    /// of names.
    pub fn with_id<C>(mut self, columns: C) -> Self
    where
        C: IntoIdColumns,
    {
        self.id_columns = columns.into_id_columns();
        self
    }

    /// Map row field names to database column names on the target table
    pub fn with_column_mappings<I, K, V>(mut self, mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.mappings.extend(mappings);
        self
    }

    /// Map a single row field name to a database column name
    pub fn map_column(mut self, field: &str, db_column: &str) -> Self {
        self.mappings.insert(field, db_column);
        self
    }

    /// Adjust execution options
    pub fn configure_options<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut BulkOptions),
    {
        configure(&mut self.options);
        self
    }
}

impl<T> BulkDeleteBuilder<T>
where
    T: Serialize,
{
    /// Render the statements this bulk delete would execute
    ///
    /// Generates a fresh staging table name per call; useful for inspection
    /// and logging.
    pub fn to_statements(&self) -> Result<BulkDeleteStatements> {
        self.validate()?;
        let staged = self.stage()?;
        Ok(self.render(&staged))
    }

    /// Execute against a pool, acquiring a single connection for the whole
    /// pipeline
    ///
    /// The staging table is session-scoped, so all three statements must
    /// share one connection.
    pub async fn execute(self, pool: &PgPool) -> Result<BulkDeleteResult> {
        let mut conn = pool.acquire().await?;
        self.execute_with(&mut conn).await
    }

    /// Execute on a caller-supplied connection or open transaction
    ///
    /// The connection is used as-is: no transaction is begun, committed, or
    /// rolled back here.
    pub async fn execute_with<C>(self, conn: &mut C) -> Result<BulkDeleteResult>
    where
        C: BulkConnection,
    {
        self.validate()?;

        if self.data.is_empty() {
            self.log("No rows supplied; nothing to delete.");
            return Ok(BulkDeleteResult { affected_rows: 0 });
        }

        let staged = self.stage()?;
        let statements = self.render(&staged);
        let batches = staging::encode_batches(&staged.rows, self.options.batch_size);
        let timeout = self.options.timeout;

        self.log(&format!("Begin creating staging table:\n{}", statements.create_table));
        tracing::debug!(statement = %statements.create_table, "creating staging table");
        with_deadline(timeout, conn.execute_statement(&statements.create_table)).await?;
        self.log("End creating staging table.");

        self.log(&format!("Begin bulk copy. Staging table: {}", statements.staging_table));
        tracing::debug!(statement = %statements.copy, rows = staged.rows.len(), "bulk copying identifiers");
        let copied = match with_deadline(timeout, conn.copy_in(&statements.copy, batches)).await {
            Ok(copied) => copied,
            Err(e) => return Err(self.cleanup_after(conn, &statements, e).await),
        };
        self.log(&format!("End bulk copy. {copied} rows staged."));

        self.log(&format!("Begin deleting:\n{}", statements.delete));
        tracing::debug!(statement = %statements.delete, "deleting staged identifiers");
        let affected = match with_deadline(timeout, conn.execute_statement(&statements.delete)).await {
            Ok(affected) => affected,
            Err(e) => return Err(self.cleanup_after(conn, &statements, e).await),
        };
        self.log(&format!("End deleting. {affected} rows affected."));

        if let Err(e) = conn.execute_statement(&statements.drop_table).await {
            tracing::warn!(error = %e, table = %statements.staging_table, "failed to drop staging table");
        }

        Ok(BulkDeleteResult { affected_rows: affected })
    }

    fn validate(&self) -> Result<()> {
        if self.table_name.is_empty() {
            return Err(Error::invalid_operation("bulk delete requires a target table"));
        }
        if self.id_columns.is_empty() {
            return Err(Error::invalid_operation("bulk delete requires at least one id column"));
        }
        Ok(())
    }

    fn stage(&self) -> Result<StagedRows> {
        staging::stage_rows(&self.data, &self.id_columns, &self.mappings)
    }

    fn render(&self, staged: &StagedRows) -> BulkDeleteStatements {
        let staging_table = sql::staging_table_name();
        BulkDeleteStatements {
            create_table: sql::create_staging_table_sql(&staging_table, &staged.columns),
            copy: sql::copy_sql(&staging_table, &staged.columns),
            delete: sql::delete_sql(
                &self.table_name,
                &staging_table,
                &staged.columns,
                self.options.collation.as_deref(),
            ),
            drop_table: sql::drop_staging_table_sql(&staging_table),
            staging_table,
        }
    }

    /// Best-effort staging table drop on the error path, so the original
    /// error is the one the caller sees
    async fn cleanup_after<C>(&self, conn: &mut C, statements: &BulkDeleteStatements, error: Error) -> Error
    where
        C: BulkConnection,
    {
        let _ = conn.execute_statement(&statements.drop_table).await;
        error
    }

    fn log(&self, message: &str) {
        if let Some(sink) = &self.options.log_to {
            sink(message);
        }
    }
}

async fn with_deadline<F, T>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(limit)),
        },
        None => fut.await,
    }
}
