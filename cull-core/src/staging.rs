//! Row reflection and staging payload encoding
//!
//! Rows are reflected by serializing them to JSON objects and pulling out
//! the id fields; the staging schema is then inferred column-by-column over
//! the whole row set.

use serde::Serialize;

use crate::columns::ColumnMappings;
use crate::error::{Error, Result};
use crate::value::{SqlType, Value};

/// One column of the staging table
#[derive(Debug, Clone)]
pub struct StagingColumn {
    /// Row field name, also the staging table column name
    pub name: String,
    /// Database column name on the target table
    pub target: String,
    /// Inferred column type
    pub ty: SqlType,
}

/// Identifier rows extracted from the caller's data, ready to encode
#[derive(Debug)]
pub struct StagedRows {
    pub columns: Vec<StagingColumn>,
    pub rows: Vec<Vec<Value>>,
}

/// Extract id-column values from the row set and infer the staging schema
pub fn stage_rows<T>(data: &[T], id_columns: &[String], mappings: &ColumnMappings) -> Result<StagedRows>
where
    T: Serialize,
{
    let mut rows = Vec::with_capacity(data.len());

    for row in data {
        let serialized = serde_json::to_value(row)?;
        let object = match serialized {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(Error::invalid_operation(
                    "rows must serialize to objects with named fields",
                ))
            }
        };

        let mut values = Vec::with_capacity(id_columns.len());
        for column in id_columns {
            let field = object
                .get(column.as_str())
                .cloned()
                .ok_or_else(|| Error::column_not_found(column.clone()))?;
            values.push(Value::from_json(field));
        }
        rows.push(values);
    }

    let columns = infer_columns(&rows, id_columns, mappings)?;

    Ok(StagedRows { columns, rows })
}

fn infer_columns(
    rows: &[Vec<Value>],
    id_columns: &[String],
    mappings: &ColumnMappings,
) -> Result<Vec<StagingColumn>> {
    let mut types: Vec<Option<SqlType>> = vec![None; id_columns.len()];

    for row in rows {
        for (i, value) in row.iter().enumerate() {
            let Some(found) = value.sql_type() else {
                continue;
            };
            types[i] = Some(match types[i] {
                None => found,
                Some(existing) => existing.unify(found).ok_or_else(|| {
                    Error::type_conflict(id_columns[i].clone(), existing.as_sql(), found.as_sql())
                })?,
            });
        }
    }

    let columns = id_columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let ty = match types[i] {
                Some(SqlType::Text) => refine_text_column(rows, i),
                // a column with no non-null values still needs valid DDL;
                // NULL identifiers never match the join regardless
                None => SqlType::Text,
                Some(ty) => ty,
            };
            StagingColumn {
                name: name.clone(),
                target: mappings.resolve(name).to_string(),
                ty,
            }
        })
        .collect();

    Ok(columns)
}

/// Narrow a text column to UUID, TIMESTAMPTZ, or DATE when every non-null
/// value parses as one
///
/// Serde reflection flattens uuid and chrono fields to JSON strings, so the
/// native type has to be recovered from the values themselves. The decision
/// is column-level: a single non-conforming value keeps the column TEXT.
fn refine_text_column(rows: &[Vec<Value>], index: usize) -> SqlType {
    let strings = rows.iter().filter_map(|row| match &row[index] {
        Value::String(s) => Some(s.as_str()),
        _ => None,
    });

    let mut uuid_like = true;
    let mut timestamp_like = true;
    let mut date_like = true;
    let mut seen = false;

    for s in strings {
        seen = true;
        uuid_like = uuid_like && uuid::Uuid::parse_str(s).is_ok();
        timestamp_like = timestamp_like && chrono::DateTime::parse_from_rfc3339(s).is_ok();
        date_like = date_like && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok();
        if !uuid_like && !timestamp_like && !date_like {
            return SqlType::Text;
        }
    }

    if !seen {
        SqlType::Text
    } else if uuid_like {
        SqlType::Uuid
    } else if timestamp_like {
        SqlType::TimestampTz
    } else if date_like {
        SqlType::Date
    } else {
        SqlType::Text
    }
}

/// Encode staged rows into COPY text-format payloads, one per batch
pub fn encode_batches(rows: &[Vec<Value>], batch_size: usize) -> Vec<Vec<u8>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(rows.len().div_ceil(batch_size));

    for chunk in rows.chunks(batch_size) {
        let mut buf = String::new();
        for row in chunk {
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    buf.push('\t');
                }
                value.encode_copy_text(&mut buf);
            }
            buf.push('\n');
        }
        batches.push(buf.into_bytes());
    }

    batches
}
