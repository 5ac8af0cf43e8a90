//! Id column selection and target-column mapping

use std::collections::HashMap;

/// Trait for types that can be converted to an id column selection
///
/// Lets `with_id` accept a single name, a tuple of names for composite
/// keys, or any collection of names.
pub trait IntoIdColumns {
    fn into_id_columns(self) -> Vec<String>;
}

impl IntoIdColumns for &str {
    fn into_id_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoIdColumns for String {
    fn into_id_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoIdColumns for Vec<String> {
    fn into_id_columns(self) -> Vec<String> {
        self
    }
}

impl IntoIdColumns for Vec<&str> {
    fn into_id_columns(self) -> Vec<String> {
        self.into_iter().map(|c| c.to_string()).collect()
    }
}

impl IntoIdColumns for &[&str] {
    fn into_id_columns(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }
}

impl<const N: usize> IntoIdColumns for [&str; N] {
    fn into_id_columns(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }
}

impl IntoIdColumns for (&str, &str) {
    fn into_id_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoIdColumns for (&str, &str, &str) {
    fn into_id_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

/// Field-name to database-column mapping for the target table
///
/// Unmapped fields resolve to their own name, so a partial mapping only has
/// to name the columns that differ.
#[derive(Debug, Clone, Default)]
pub struct ColumnMappings {
    mappings: HashMap<String, String>,
}

impl ColumnMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a row field name to a database column name
    pub fn insert(&mut self, field: impl Into<String>, db_column: impl Into<String>) {
        self.mappings.insert(field.into(), db_column.into());
    }

    /// Resolve a row field name to its database column name
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.mappings.get(field).map(String::as_str).unwrap_or(field)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMappings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            mappings: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for ColumnMappings
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.mappings.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_column() {
        assert_eq!("id".into_id_columns(), vec!["id".to_string()]);
    }

    #[test]
    fn test_tuple_columns() {
        assert_eq!(
            ("order_id", "line_no").into_id_columns(),
            vec!["order_id".to_string(), "line_no".to_string()]
        );
    }

    #[test]
    fn test_array_columns() {
        assert_eq!(
            ["a", "b", "c"].into_id_columns(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_vec_columns() {
        assert_eq!(vec!["x", "y"].into_id_columns(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_mapping_resolution() {
        let mappings: ColumnMappings = [("order_id", "OrderId")].into_iter().collect();
        assert_eq!(mappings.resolve("order_id"), "OrderId");
        assert_eq!(mappings.resolve("line_no"), "line_no");
    }

    #[test]
    fn test_empty_mappings_fall_through() {
        let mappings = ColumnMappings::new();
        assert!(mappings.is_empty());
        assert_eq!(mappings.resolve("anything"), "anything");
    }
}
