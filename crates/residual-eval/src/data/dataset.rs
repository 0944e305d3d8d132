//! Dataset container and builder.
//!
//! This module provides [`Dataset`], [`DatasetBuilder`] and [`Column`].

use ndarray::{Array1, ArrayView1};

use super::groups::Partition;

// =============================================================================
// Column
// =============================================================================

/// A single named column of a [`Dataset`].
///
/// Missing numeric values are represented as `f64::NAN`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating-point values.
    Numeric(Array1<f64>),
    /// String values, e.g. a fold or model identifier used for grouping.
    Text(Vec<String>),
}

impl Column {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "numeric",
            Self::Text(_) => "text",
        }
    }

    /// View the values if the column is numeric.
    pub fn as_numeric(&self) -> Option<ArrayView1<'_, f64>> {
        match self {
            Self::Numeric(values) => Some(values.view()),
            Self::Text(_) => None,
        }
    }

    /// Number of missing (NaN) values. Text columns never contain missing values.
    pub fn n_missing(&self) -> usize {
        match self {
            Self::Numeric(values) => values.iter().filter(|v| v.is_nan()).count(),
            Self::Text(_) => 0,
        }
    }
}

impl From<Array1<f64>> for Column {
    fn from(values: Array1<f64>) -> Self {
        Self::Numeric(values)
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Self::Numeric(Array1::from_vec(values))
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Self::Text(values)
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Self::Text(values.into_iter().map(str::to_owned).collect())
    }
}

// =============================================================================
// DatasetError
// =============================================================================

/// Errors raised while building a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// Two columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// A column's length differs from the first column's.
    #[error("column '{column}' has {got} rows, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    /// A grouping column does not exist.
    #[error("grouping column '{0}' not found")]
    UnknownGroupColumn(String),

    /// The same grouping column was listed twice.
    #[error("grouping column '{0}' listed more than once")]
    DuplicateGroupColumn(String),

    /// A grouping column has the same name as a selected metric column.
    #[error("grouping column '{0}' clashes with a metric column of the same name")]
    GroupColumnClash(String),
}

// =============================================================================
// Dataset
// =============================================================================

/// A table of named, equal-length columns with optional grouping columns.
///
/// Grouping columns define a partition of the rows. A dataset without
/// grouping columns is treated as a single implicit group.
///
/// # Example
///
/// ```
/// use residual_eval::data::Dataset;
///
/// let ds = Dataset::builder()
///     .add_text("model", vec!["a", "a", "b"])
///     .add_numeric("y", vec![1.0, 2.0, 3.0])
///     .add_numeric("pred", vec![1.5, 2.0, 2.5])
///     .group_by(["model"])
///     .build()
///     .unwrap();
///
/// assert_eq!(ds.n_rows(), 3);
/// assert_eq!(ds.group_columns(), ["model"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    group_by: Vec<String>,
    n_rows: usize,
}

impl Dataset {
    /// Start building a dataset.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns, including grouping columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Names of the grouping columns, in the order they were declared.
    pub fn group_columns(&self) -> &[String] {
        &self.group_by
    }

    /// Whether the dataset carries grouping columns.
    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.columns[idx])
    }

    /// Return a copy of this dataset grouped by `columns`, replacing any
    /// previous grouping.
    ///
    /// # Errors
    ///
    /// Fails if a column is unknown or listed twice.
    pub fn regroup<S: Into<String>>(
        &self,
        columns: impl IntoIterator<Item = S>,
    ) -> Result<Dataset, DatasetError> {
        let group_by: Vec<String> = columns.into_iter().map(Into::into).collect();
        validate_group_by(&self.names, &group_by)?;
        Ok(Dataset {
            group_by,
            ..self.clone()
        })
    }

    /// Return a copy of this dataset without grouping columns.
    pub fn ungroup(&self) -> Dataset {
        Dataset {
            group_by: Vec::new(),
            ..self.clone()
        }
    }

    /// Partition the rows by the grouping columns.
    ///
    /// See [`Partition`] for the ordering guarantees.
    pub fn partition(&self) -> Partition {
        let key_columns: Vec<&Column> = self
            .group_by
            .iter()
            .filter_map(|name| self.column(name))
            .collect();
        Partition::from_columns(&key_columns, self.n_rows)
    }
}

fn validate_group_by(names: &[String], group_by: &[String]) -> Result<(), DatasetError> {
    for (i, name) in group_by.iter().enumerate() {
        if !names.contains(name) {
            return Err(DatasetError::UnknownGroupColumn(name.clone()));
        }
        if group_by[..i].contains(name) {
            return Err(DatasetError::DuplicateGroupColumn(name.clone()));
        }
    }
    Ok(())
}

// =============================================================================
// DatasetBuilder
// =============================================================================

/// Builder for [`Dataset`].
///
/// Validation happens once, in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    names: Vec<String>,
    columns: Vec<Column>,
    group_by: Vec<String>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column of any supported type.
    pub fn add_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> Self {
        self.names.push(name.into());
        self.columns.push(column.into());
        self
    }

    /// Add a numeric column. Use `f64::NAN` for missing values.
    pub fn add_numeric(self, name: impl Into<String>, values: impl Into<Array1<f64>>) -> Self {
        self.add_column(name, Column::Numeric(values.into()))
    }

    /// Add a numeric column from a view.
    pub fn add_numeric_view(self, name: impl Into<String>, values: ArrayView1<f64>) -> Self {
        self.add_column(name, Column::Numeric(values.to_owned()))
    }

    /// Add a text column.
    pub fn add_text<S: Into<String>>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.add_column(name, Column::Text(values))
    }

    /// Declare the grouping columns. Replaces any previous declaration.
    pub fn group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Build the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if:
    /// - Two columns share a name
    /// - Columns have inconsistent row counts
    /// - A grouping column is unknown or listed twice
    pub fn build(self) -> Result<Dataset, DatasetError> {
        for (i, name) in self.names.iter().enumerate() {
            if self.names[..i].contains(name) {
                return Err(DatasetError::DuplicateColumn(name.clone()));
            }
        }

        let n_rows = self.columns.first().map_or(0, Column::len);
        for (name, col) in self.names.iter().zip(&self.columns) {
            if col.len() != n_rows {
                return Err(DatasetError::ShapeMismatch {
                    column: name.clone(),
                    expected: n_rows,
                    got: col.len(),
                });
            }
        }

        validate_group_by(&self.names, &self.group_by)?;

        Ok(Dataset {
            names: self.names,
            columns: self.columns,
            group_by: self.group_by,
            n_rows,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_builder_basic() {
        let ds = Dataset::builder()
            .add_numeric("y", array![1.0, 2.0, 3.0])
            .add_numeric_view("pred", array![1.0, 2.5, 3.0].view())
            .add_text("fold", vec!["a", "b", "a"])
            .build()
            .unwrap();

        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_columns(), 3);
        assert_eq!(ds.column_names(), ["y", "pred", "fold"]);
        assert!(!ds.is_grouped());
        assert_eq!(ds.column("y").unwrap().type_name(), "numeric");
        assert_eq!(ds.column("fold").unwrap().type_name(), "text");
        assert!(ds.column("missing").is_none());
    }

    #[test]
    fn test_empty_dataset_has_no_rows() {
        let ds = DatasetBuilder::new().build().unwrap();
        assert_eq!(ds.n_rows(), 0);
        assert_eq!(ds.n_columns(), 0);
    }

    #[test]
    fn test_builder_duplicate_column_error() {
        let result = Dataset::builder()
            .add_numeric("y", vec![1.0])
            .add_numeric("y", vec![2.0])
            .build();
        assert_eq!(result, Err(DatasetError::DuplicateColumn("y".into())));
    }

    #[test]
    fn test_builder_shape_mismatch_error() {
        let result = Dataset::builder()
            .add_numeric("y", vec![1.0, 2.0, 3.0])
            .add_numeric("pred", vec![1.0, 2.0])
            .build();
        assert!(matches!(result, Err(DatasetError::ShapeMismatch { got: 2, .. })));
    }

    #[test]
    fn test_builder_unknown_group_error() {
        let result = Dataset::builder()
            .add_numeric("y", vec![1.0])
            .group_by(["fold"])
            .build();
        assert_eq!(result, Err(DatasetError::UnknownGroupColumn("fold".into())));
    }

    #[test]
    fn test_builder_duplicate_group_error() {
        let result = Dataset::builder()
            .add_text("fold", vec!["a"])
            .group_by(["fold", "fold"])
            .build();
        assert_eq!(result, Err(DatasetError::DuplicateGroupColumn("fold".into())));
    }

    #[test]
    fn test_regroup_and_ungroup() {
        let ds = Dataset::builder()
            .add_text("fold", vec!["a", "b"])
            .add_numeric("y", vec![1.0, 2.0])
            .build()
            .unwrap();

        let grouped = ds.regroup(["fold"]).unwrap();
        assert_eq!(grouped.group_columns(), ["fold"]);
        assert!(grouped.ungroup().group_columns().is_empty());
        assert!(ds.regroup(["nope"]).is_err());
    }

    #[test]
    fn test_column_missing_count() {
        let col = Column::from(vec![1.0, f64::NAN, f64::NAN]);
        assert_eq!(col.n_missing(), 2);
        assert_eq!(Column::from(vec!["a"]).n_missing(), 0);
        assert!(Column::from(vec!["a"]).as_numeric().is_none());
    }
}
