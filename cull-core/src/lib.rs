//! Cull Core - staging-table bulk deletes for PostgreSQL
//!
//! This crate builds and executes bulk delete statements by staging the
//! identifiers of caller-supplied rows into a temporary table through the
//! driver's native `COPY` path, then joining the target table against it
//! with a single DELETE.

pub mod builder;
pub mod columns;
pub mod error;
pub mod executor;
pub mod options;
pub mod sql;
pub mod staging;
pub mod value;

// Re-export main types
pub use builder::{BulkDeleteBuilder, BulkDeleteResult, BulkDeleteStatements};
pub use columns::{ColumnMappings, IntoIdColumns};
pub use error::{Error, Result};
pub use executor::BulkConnection;
pub use options::{BulkOptions, LogSink};
pub use staging::{StagedRows, StagingColumn};
pub use value::{SqlType, Value};

/// Create a new bulk delete builder for the given target table
pub fn bulk_delete<T>(table: &str) -> BulkDeleteBuilder<T> {
    BulkDeleteBuilder::new(table)
}
