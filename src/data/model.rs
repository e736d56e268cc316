use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

// ---------------------------------------------------------------------------
// ColumnReference – how a configuration names a series
// ---------------------------------------------------------------------------

/// A series selector as written in a plot configuration.
///
/// Raw indices are 0-based over every column of the file, the time column
/// included. JSON form is externally tagged:
/// `{"index": 3}`, `{"header": "pm_3_1"}`, `{"derived": "yaw"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnReference {
    /// Raw column by position.
    Index(usize),
    /// Raw column by exact header name.
    Header(String),
    /// Key in the derived-signal map.
    Derived(String),
}

impl ColumnReference {
    pub fn index(i: usize) -> Self {
        ColumnReference::Index(i)
    }

    pub fn header(name: &str) -> Self {
        ColumnReference::Header(name.to_string())
    }

    pub fn derived(name: &str) -> Self {
        ColumnReference::Derived(name.to_string())
    }
}

impl fmt::Display for ColumnReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnReference::Index(i) => write!(f, "#{i}"),
            ColumnReference::Header(h) => write!(f, "'{h}'"),
            ColumnReference::Derived(d) => write!(f, "derived '{d}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named numeric sequence
// ---------------------------------------------------------------------------

/// A single column of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// One value per row. Empty and unparsable cells are NaN.
    pub values: Vec<f64>,
    /// Number of non-empty cells that were not numbers.
    pub malformed_cells: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            values,
            malformed_cells: 0,
        }
    }

    /// Whether every cell parsed as a number (or was empty).
    pub fn is_numeric(&self) -> bool {
        self.malformed_cells == 0
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Rows × named columns, stored column-major.
///
/// Immutable once built; [`Dataset::slice_rows`] and [`Dataset::remap`]
/// produce new, independent tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        for col in &columns {
            if col.values.len() != rows {
                return Err(TableError::DimensionMismatch {
                    expected: rows,
                    found: col.values.len(),
                });
            }
        }
        Ok(Dataset { columns, rows })
    }

    /// Build from row-major numeric records.
    pub fn from_rows(headers: &[&str], rows: &[Vec<f64>]) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|h| Column::new(*h, Vec::with_capacity(rows.len())))
            .collect();
        for (row_no, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(TableError::RaggedRow {
                    row: row_no,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            for (col, &v) in columns.iter_mut().zip(row) {
                col.values.push(v);
            }
        }
        Dataset::new(columns)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Header names in column order.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn header(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of the first column with this exact header.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Resolve a raw reference to a column position.
    pub fn raw_index(&self, reference: &ColumnReference) -> Result<usize, TableError> {
        match reference {
            ColumnReference::Index(i) if *i < self.columns.len() => Ok(*i),
            ColumnReference::Index(i) => Err(TableError::ColumnOutOfRange {
                index: *i,
                count: self.columns.len(),
            }),
            ColumnReference::Header(h) => self
                .index_of(h)
                .ok_or_else(|| TableError::UnknownHeader(h.clone())),
            ColumnReference::Derived(d) => Err(TableError::NotRawColumn(d.clone())),
        }
    }

    /// Numeric values of a column, refusing malformed ones.
    pub fn values(&self, index: usize) -> Result<&[f64], TableError> {
        let col = self.columns.get(index).ok_or(TableError::ColumnOutOfRange {
            index,
            count: self.columns.len(),
        })?;
        if !col.is_numeric() {
            return Err(TableError::MalformedColumn(col.name.clone()));
        }
        Ok(&col.values)
    }

    /// Numeric values of a raw column reference.
    pub fn series(&self, reference: &ColumnReference) -> Result<&[f64], TableError> {
        let idx = self.raw_index(reference)?;
        self.values(idx)
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.rows {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index]).collect())
    }

    /// Copy of the rows from `start` to the end.
    pub fn slice_rows(&self, start: usize) -> Dataset {
        let start = start.min(self.rows);
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c.values[start..].to_vec(),
                malformed_cells: c.malformed_cells,
            })
            .collect();
        Dataset {
            columns,
            rows: self.rows - start,
        }
    }

    /// Apply a rename/drop map, keeping column order.
    pub fn remap(&self, map: &ColumnMap) -> Dataset {
        let columns = self
            .columns
            .iter()
            .filter(|c| !map.drop.iter().any(|d| d == &c.name))
            .map(|c| Column {
                name: map.rename.get(&c.name).cloned().unwrap_or_else(|| c.name.clone()),
                values: c.values.clone(),
                malformed_cells: c.malformed_cells,
            })
            .collect();
        Dataset {
            columns,
            rows: self.rows,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnMap – header cleanup
// ---------------------------------------------------------------------------

/// Rename and drop rules applied by the `clean` workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMap {
    /// old name → new name.
    pub rename: BTreeMap<String, String>,
    /// Columns removed entirely.
    pub drop: Vec<String>,
}

impl ColumnMap {
    /// The mapping used for the three-body rig logs: keeps body 3 under
    /// generic rigid-body names and gives pressure channels segment names.
    pub fn rig_default() -> Self {
        let rename = [
            ("pd_4", "Desired_pressure_segment_1_2"),
            ("pd_7", "Desired_pressure_segment_3"),
            ("pd_8", "Desired_pressure_segment_4"),
            ("pm_4_1", "Measured_pressure_Segment_4"),
            ("pm_4_2", "Measured_pressure_segment_3"),
            ("pm_4_3", "Measured_pressure_Segment_1_pouch_1"),
            ("pm_4_4", "Measured_pressure_Segment_1_pouch_2"),
            ("pm_7_1", "Measured_pressure_Segment_1_pouch_3"),
            ("pm_7_2", "Measured_pressure_Segment_1_pouch_4"),
            ("pm_7_3", "Measured_pressure_Segment_1_pouch_5"),
            ("pm_7_4", "Measured_pressure_Segment_2_pouch_1"),
            ("pm_8_1", "Measured_pressure_Segment_2_pouch_2"),
            ("pm_8_2", "Measured_pressure_Segment_2_pouch_3"),
            ("pm_8_3", "Measured_pressure_Segment_2_pouch_4"),
            ("pm_8_4", "Measured_pressure_Segment_2_pouch_5"),
            ("mocap3_x", "mocap_rigid_body_x"),
            ("mocap3_y", "mocap_rigid_body_y"),
            ("mocap3_z", "mocap_rigid_body_z"),
            ("mocap3_qx", "mocap_rigid_body_qx"),
            ("mocap3_qy", "mocap_rigid_body_qy"),
            ("mocap3_qz", "mocap_rigid_body_qz"),
            ("mocap3_qw", "mocap_rigid_body_qw"),
        ]
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();

        let drop = ["mocap1", "mocap2"]
            .iter()
            .flat_map(|body| {
                ["x", "y", "z", "qx", "qy", "qz", "qw"]
                    .iter()
                    .map(move |axis| format!("{body}_{axis}"))
            })
            .collect();

        ColumnMap { rename, drop }
    }
}
