use cull_core::{bulk_delete, BulkConnection};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct User {
    id: i64,
    email: String,
}

// Mock connection for demonstration (replace with a PgPool or PgConnection
// in production)
struct PrintingConnection;

impl BulkConnection for PrintingConnection {
    async fn execute_statement(&mut self, sql: &str) -> cull_core::Result<u64> {
        println!("   EXECUTE: {}", sql);
        Ok(2) // Simulate 2 affected rows
    }

    async fn copy_in(&mut self, statement: &str, payload: Vec<Vec<u8>>) -> cull_core::Result<u64> {
        println!("   COPY: {}", statement);
        let mut rows = 0;
        for batch in &payload {
            print!("{}", String::from_utf8_lossy(batch));
            rows += batch.iter().filter(|b| **b == b'\n').count() as u64;
        }
        Ok(rows)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> cull_core::Result<()> {
    let stale = vec![
        User {
            id: 1,
            email: "old@example.com".to_string(),
        },
        User {
            id: 2,
            email: "gone@example.com".to_string(),
        },
    ];

    let mut conn = PrintingConnection;

    let result = bulk_delete("users")
        .with_data(stale)
        .with_id("id")
        .configure_options(|o| {
            o.batch_size = 500;
            o.log_to = Some(Arc::new(|message| println!("[bulk_delete] {message}")));
        })
        .execute_with(&mut conn)
        .await?;

    println!("affected rows: {}", result.affected_rows);
    Ok(())
}
