//! SQL text generation for the staging pipeline

use crate::staging::StagingColumn;

/// Quote an identifier, doubling any embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Format a table name, handling schema.table format
pub fn format_table_name(table_name: &str) -> String {
    if table_name.contains('.') {
        let parts: Vec<&str> = table_name.split('.').collect();
        if parts.len() == 2 {
            let schema = parts[0].trim_matches('"');
            let table = parts[1].trim_matches('"');
            format!("\"{}\".\"{}\"", schema, table)
        } else {
            table_name.to_string()
        }
    } else {
        table_name.to_string()
    }
}

/// Generate a unique staging table name
pub fn staging_table_name() -> String {
    format!("_cull_staging_{}", uuid::Uuid::new_v4().simple())
}

/// Render the `CREATE TEMPORARY TABLE` statement for the staging table
pub fn create_staging_table_sql(staging_table: &str, columns: &[StagingColumn]) -> String {
    let column_defs = columns
        .iter()
        .map(|col| format!("{} {}", quote_identifier(&col.name), col.ty.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE TEMPORARY TABLE {} ({})",
        quote_identifier(staging_table),
        column_defs
    )
}

/// Render the COPY statement that loads identifiers into the staging table
pub fn copy_sql(staging_table: &str, columns: &[StagingColumn]) -> String {
    let column_names = columns
        .iter()
        .map(|col| quote_identifier(&col.name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT text)",
        quote_identifier(staging_table),
        column_names
    )
}

/// Render the join-based DELETE statement
///
/// The target side uses the mapped database column names; the staging side
/// uses the row field names. When a collation is configured it is applied
/// to both sides of every text-column comparison.
pub fn delete_sql(
    target_table: &str,
    staging_table: &str,
    columns: &[StagingColumn],
    collation: Option<&str>,
) -> String {
    let join_condition = columns
        .iter()
        .map(|col| {
            let target_col = format!("a.{}", quote_identifier(&col.target));
            let staging_col = format!("b.{}", quote_identifier(&col.name));
            match collation {
                Some(name) if col.ty.is_text() => {
                    let collate = format!(" COLLATE {}", quote_identifier(name));
                    format!("{target_col}{collate} = {staging_col}{collate}")
                }
                _ => format!("{target_col} = {staging_col}"),
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ");

    format!(
        "DELETE FROM {} AS a USING {} AS b WHERE {}",
        format_table_name(target_table),
        quote_identifier(staging_table),
        join_condition
    )
}

/// Render the staging table cleanup statement
pub fn drop_staging_table_sql(staging_table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_identifier(staging_table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlType;

    fn column(name: &str, target: &str, ty: SqlType) -> StagingColumn {
        StagingColumn {
            name: name.to_string(),
            target: target.to_string(),
            ty,
        }
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("order_id"), "\"order_id\"");
        assert_eq!(quote_identifier("od\"d"), "\"od\"\"d\"");
    }

    #[test]
    fn test_format_table_name() {
        assert_eq!(format_table_name("orders"), "orders");
        assert_eq!(format_table_name("sales.orders"), "\"sales\".\"orders\"");
        assert_eq!(format_table_name("\"sales\".\"orders\""), "\"sales\".\"orders\"");
    }

    #[test]
    fn test_staging_table_names_are_unique() {
        let first = staging_table_name();
        let second = staging_table_name();
        assert!(first.starts_with("_cull_staging_"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_create_staging_table() {
        let columns = vec![
            column("order_id", "order_id", SqlType::BigInt),
            column("code", "code", SqlType::Text),
        ];
        let sql = create_staging_table_sql("_cull_staging_1", &columns);
        assert_eq!(
            sql,
            "CREATE TEMPORARY TABLE \"_cull_staging_1\" (\"order_id\" BIGINT, \"code\" TEXT)"
        );
    }

    #[test]
    fn test_copy_statement() {
        let columns = vec![column("order_id", "order_id", SqlType::BigInt)];
        let sql = copy_sql("_cull_staging_1", &columns);
        assert_eq!(
            sql,
            "COPY \"_cull_staging_1\" (\"order_id\") FROM STDIN WITH (FORMAT text)"
        );
    }

    #[test]
    fn test_delete_statement() {
        let columns = vec![
            column("order_id", "order_id", SqlType::BigInt),
            column("line_no", "line_no", SqlType::Integer),
        ];
        let sql = delete_sql("orders", "_cull_staging_1", &columns, None);
        assert_eq!(
            sql,
            "DELETE FROM orders AS a USING \"_cull_staging_1\" AS b \
             WHERE a.\"order_id\" = b.\"order_id\" AND a.\"line_no\" = b.\"line_no\""
        );
    }

    #[test]
    fn test_delete_statement_with_mapped_column() {
        let columns = vec![column("order_id", "OrderId", SqlType::BigInt)];
        let sql = delete_sql("sales.orders", "_cull_staging_1", &columns, None);
        assert_eq!(
            sql,
            "DELETE FROM \"sales\".\"orders\" AS a USING \"_cull_staging_1\" AS b \
             WHERE a.\"OrderId\" = b.\"order_id\""
        );
    }

    #[test]
    fn test_delete_statement_collation_applies_to_text_only() {
        let columns = vec![
            column("code", "code", SqlType::Text),
            column("qty", "qty", SqlType::BigInt),
        ];
        let sql = delete_sql("orders", "_cull_staging_1", &columns, Some("C"));
        assert_eq!(
            sql,
            "DELETE FROM orders AS a USING \"_cull_staging_1\" AS b \
             WHERE a.\"code\" COLLATE \"C\" = b.\"code\" COLLATE \"C\" AND a.\"qty\" = b.\"qty\""
        );
    }

    #[test]
    fn test_drop_statement() {
        assert_eq!(
            drop_staging_table_sql("_cull_staging_1"),
            "DROP TABLE IF EXISTS \"_cull_staging_1\""
        );
    }
}
