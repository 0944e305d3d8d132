//! The output table of a grouped evaluation.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::data::{GroupKey, GroupValue};
use crate::metrics::{Metric, MetricSet, MetricsRecord};

/// One output row: a group key and the selected metric values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    /// Group key, one value per grouping column.
    pub key: GroupKey,
    /// Selected metric values in universe order; `None` is NA.
    pub values: Vec<Option<f64>>,
}

/// Grouping columns followed by the selected metric columns, one row per group.
///
/// Rows are in canonical (ascending key) group order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    group_columns: Vec<String>,
    metrics: MetricSet,
    rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Assemble a table by projecting full records onto `metrics`.
    pub fn from_records(
        group_columns: Vec<String>,
        metrics: MetricSet,
        records: impl IntoIterator<Item = (GroupKey, MetricsRecord)>,
    ) -> Self {
        let rows = records
            .into_iter()
            .map(|(key, record)| MetricsRow {
                key,
                values: record.project(&metrics),
            })
            .collect();
        Self {
            group_columns,
            metrics,
            rows,
        }
    }

    /// Names of the grouping columns.
    pub fn group_columns(&self) -> &[String] {
        &self.group_columns
    }

    /// The metric columns.
    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// All column names: grouping columns, then metric labels.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.group_columns.iter().map(String::as_str).collect();
        for metric in self.metrics.iter() {
            names.push(metric.name());
        }
        names
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of one metric column, or `None` if the metric wasn't selected.
    pub fn metric_column(&self, metric: Metric) -> Option<Vec<Option<f64>>> {
        let idx = self.metrics.iter().position(|m| m == metric)?;
        Some(self.rows.iter().map(|row| row.values[idx]).collect())
    }

    /// Values of one grouping column, or `None` if there is no such column.
    pub fn group_column(&self, name: &str) -> Option<Vec<&GroupValue>> {
        let idx = self.group_columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row.key[idx]).collect())
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        Some(v) => v.to_string(),
        None => "NA".to_owned(),
    }
}

fn write_line<'a>(
    f: &mut fmt::Formatter<'_>,
    fields: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> fmt::Result {
    for (i, (field, &width)) in fields.zip(widths).enumerate() {
        if i > 0 {
            f.write_str("  ")?;
        }
        write!(f, "{field:>width$}")?;
    }
    writeln!(f)
}

impl fmt::Display for MetricsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.column_names();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.key
                    .iter()
                    .map(ToString::to_string)
                    .chain(row.values.iter().map(|v| format_value(*v)))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write_line(f, header.iter().copied(), &widths)?;
        for row in &cells {
            write_line(f, row.iter().map(String::as_str), &widths)?;
        }
        Ok(())
    }
}

struct RowRef<'a> {
    table: &'a MetricsTable,
    row: &'a MetricsRow,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.column_names().len()))?;
        for (name, value) in self.table.group_columns.iter().zip(&self.row.key) {
            map.serialize_entry(name, value)?;
        }
        for (metric, value) in self.table.metrics.iter().zip(&self.row.values) {
            map.serialize_entry(metric.name(), value)?;
        }
        map.end()
    }
}

/// Serializes as a list of rows, each a map from column name to value.
impl Serialize for MetricsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowRef { table: self, row })?;
        }
        seq.end()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_residual_metrics;
    use ndarray::array;
    use serde_json::json;

    fn sample_table() -> MetricsTable {
        let a = compute_residual_metrics(array![1.0, 2.0, 3.0, 5.0].view(), array![1.0, 2.0, 3.0, 4.0].view())
            .unwrap();
        let metrics = MetricSet::from_names(&["RMSE", "MAE"]).unwrap();
        MetricsTable::from_records(
            vec!["fold".to_owned()],
            metrics,
            vec![
                (vec![GroupValue::from("a")], a),
                (vec![GroupValue::from("b")], MetricsRecord::placeholder()),
            ],
        )
    }

    #[test]
    fn test_columns_are_groups_then_metrics() {
        let table = sample_table();
        assert_eq!(table.column_names(), ["fold", "MAE", "RMSE"]);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn test_column_access() {
        let table = sample_table();
        assert_eq!(table.metric_column(Metric::Rmse), Some(vec![Some(0.5), None]));
        assert_eq!(table.metric_column(Metric::Mse), None);
        let folds: Vec<String> = table
            .group_column("fold")
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(folds, ["a", "b"]);
        assert!(table.group_column("model").is_none());
    }

    #[test]
    fn test_display_aligns_columns() {
        let rendered = sample_table().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "fold       MAE      RMSE");
        assert_eq!(lines[1], "   a  0.250000  0.500000");
        assert_eq!(lines[2], "   b        NA        NA");
    }

    #[test]
    fn test_serializes_rows_as_maps() {
        let json = serde_json::to_value(sample_table()).unwrap();
        assert_eq!(
            json,
            json!([
                {"fold": "a", "MAE": 0.25, "RMSE": 0.5},
                {"fold": "b", "MAE": null, "RMSE": null},
            ])
        );
    }
}
