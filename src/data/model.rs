use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{DeriveError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common dataframe dtypes.
///
/// Equality, ordering and hashing all go through the same total order, with
/// floats compared by `total_cmp`: `NaN` equals itself and `-0.0 != 0.0`.
/// Cells can therefore key both the sorted pivot index and hash lookups.
#[derive(Debug, Clone)]
pub enum CellValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl CellValue {
    /// Position of the variant in the cross-type order.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::String(_) => 4,
        }
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CellValue::Bool(b) => b.hash(state),
            CellValue::Integer(i) => i.hash(state),
            // total_cmp is Equal exactly when the bit patterns match
            CellValue::Float(v) => v.to_bits().hash(state),
            CellValue::String(s) => s.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => fmt::Display::fmt(b, f),
            CellValue::Integer(i) => fmt::Display::fmt(i, f),
            CellValue::Float(v) => fmt::Display::fmt(v, f),
            CellValue::String(s) => f.write_str(s),
            CellValue::Null => f.write_str("<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for arithmetic. Booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Null cells and NaN floats are both treated as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – named columns over row-major cells
// ---------------------------------------------------------------------------

/// An in-memory table: ordered column names plus rows of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Assemble a table from parts whose arity is already known to match.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Table { columns, rows }
    }

    /// Append a row. The row must have one cell per column.
    pub fn push_row<I, V>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let row: Vec<CellValue> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(DeriveError::RowArity {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, or a `MissingColumn` error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| DeriveError::missing_column(name))
    }

    /// Iterate over the cells of one column.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Cell at `row` in column `name`.
    pub fn value(&self, row: usize, name: &str) -> Option<&CellValue> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Distinct non-missing values of a column, in order of first appearance.
    pub fn unique_in_order(&self, name: &str) -> Result<Vec<CellValue>> {
        let idx = self.require_column(name)?;
        let mut seen = HashSet::new();
        Ok(self
            .rows
            .iter()
            .map(|r| &r[idx])
            .filter(|v| !v.is_missing())
            .filter(|v| seen.insert((*v).clone()))
            .cloned()
            .collect())
    }

    /// A new table holding only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(["patient", "reconstruction_type", "hu"]);
        t.push_row([CellValue::from("P2"), "Mono_70keV".into(), 40.0.into()])
            .unwrap();
        t.push_row([CellValue::from("P1"), "Mono_50keV".into(), CellValue::Null])
            .unwrap();
        t.push_row([CellValue::from("P1"), "Mono_70keV".into(), 38.5.into()])
            .unwrap();
        t
    }

    #[test]
    fn test_push_row_checks_arity() {
        let mut t = Table::new(["a", "b"]);
        let err = t.push_row([1i64]).unwrap_err();
        assert!(matches!(
            err,
            DeriveError::RowArity {
                expected: 2,
                actual: 1
            }
        ));
        assert!(t.is_empty());
    }

    #[test]
    fn test_unique_in_order_keeps_first_appearance() {
        let t = sample();
        let subjects = t.unique_in_order("patient").unwrap();
        assert_eq!(subjects, vec![CellValue::from("P2"), CellValue::from("P1")]);
        let recon = t.unique_in_order("reconstruction_type").unwrap();
        assert_eq!(recon.len(), 2);
        assert_eq!(recon[0].to_string(), "Mono_70keV");
    }

    #[test]
    fn test_unique_in_order_skips_missing() {
        let t = sample();
        let hu = t.unique_in_order("hu").unwrap();
        assert_eq!(hu, vec![CellValue::Float(40.0), CellValue::Float(38.5)]);
    }

    #[test]
    fn test_missing_column_lookup() {
        let t = sample();
        assert!(t.column_index("energy").is_none());
        assert!(matches!(
            t.require_column("energy"),
            Err(DeriveError::MissingColumn(name)) if name == "energy"
        ));
    }

    #[test]
    fn test_missing_cells() {
        assert!(CellValue::Null.is_missing());
        assert!(CellValue::Float(f64::NAN).is_missing());
        assert!(!CellValue::Float(0.0).is_missing());
        assert!(!CellValue::from("").is_missing());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(CellValue::from("3").as_f64(), None);
    }

    #[test]
    fn test_ordering_groups_by_type() {
        let mut vals = vec![
            CellValue::from("b"),
            CellValue::Integer(2),
            CellValue::Null,
            CellValue::from("a"),
            CellValue::Integer(1),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                CellValue::Null,
                CellValue::Integer(1),
                CellValue::Integer(2),
                CellValue::from("a"),
                CellValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_float_equality_agrees_with_hash() {
        let mut seen = HashSet::new();
        assert!(seen.insert(CellValue::Float(f64::NAN)));
        assert!(!seen.insert(CellValue::Float(f64::NAN)));
        assert!(seen.insert(CellValue::Float(0.0)));
        assert!(seen.insert(CellValue::Float(-0.0)));
        assert_eq!(seen.len(), 3);

        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
        assert_ne!(CellValue::Float(0.0), CellValue::Float(-0.0));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
    }

    #[test]
    fn test_select_rows() {
        let t = sample();
        let sub = t.select_rows(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.value(0, "hu"), Some(&CellValue::Float(38.5)));
        assert_eq!(sub.value(1, "patient"), Some(&CellValue::from("P2")));
    }
}
