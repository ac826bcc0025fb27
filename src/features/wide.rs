//! Long → wide reshape: one row per index tuple, one column per (field, condition).

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::data::model::{CellValue, Table};
use crate::error::{DeriveError, Result};

/// A pivoted table. Cells absent from the long input hold `0.0`.
#[derive(Debug, Clone)]
pub struct WideTable {
    index_names: Vec<String>,
    /// Index tuples in ascending order.
    index: Vec<Vec<CellValue>>,
    /// Condition values in first-appearance order.
    conditions: Vec<CellValue>,
    fields: Vec<String>,
    /// `cells[field][condition][row]`
    cells: Vec<Vec<Vec<f64>>>,
}

impl WideTable {
    /// Pivot `table` on `index_keys` × `condition_key`, spreading every field.
    ///
    /// Fails when a column is missing, a field cell is non-numeric, or two rows
    /// land on the same (index, condition) cell.
    pub fn pivot(
        table: &Table,
        index_keys: &[String],
        condition_key: &str,
        fields: &[String],
    ) -> Result<WideTable> {
        let index_pos = index_keys
            .iter()
            .map(|k| table.require_column(k))
            .collect::<Result<Vec<_>>>()?;
        let cond_pos = table.require_column(condition_key)?;
        let field_pos = fields
            .iter()
            .map(|f| table.require_column(f))
            .collect::<Result<Vec<_>>>()?;

        let conditions = table.unique_in_order(condition_key)?;
        let cond_lookup: HashMap<&CellValue, usize> =
            conditions.iter().enumerate().map(|(i, c)| (c, i)).collect();

        // BTreeMap keeps the index sorted; positions are assigned once all keys are known
        let mut row_lookup: BTreeMap<Vec<CellValue>, usize> = BTreeMap::new();
        for row in table.rows().iter().filter(|r| !r[cond_pos].is_missing()) {
            let key: Vec<CellValue> = index_pos.iter().map(|&p| row[p].clone()).collect();
            row_lookup.entry(key).or_insert(0);
        }
        for (i, slot) in row_lookup.values_mut().enumerate() {
            *slot = i;
        }

        let n_rows = row_lookup.len();
        let mut cells = vec![vec![vec![0.0; n_rows]; conditions.len()]; fields.len()];
        let mut filled: HashSet<(usize, usize)> = HashSet::new();

        for (row_no, row) in table.rows().iter().enumerate() {
            let cond = &row[cond_pos];
            let Some(&c) = cond_lookup.get(cond) else {
                continue;
            };
            let key: Vec<CellValue> = index_pos.iter().map(|&p| row[p].clone()).collect();
            let r = row_lookup[&key];

            if !filled.insert((r, c)) {
                return Err(DeriveError::DuplicateEntry {
                    key: format_key(&key),
                    condition: cond.to_string(),
                });
            }

            for (f, &p) in field_pos.iter().enumerate() {
                let cell = &row[p];
                if cell.is_missing() {
                    continue;
                }
                cells[f][c][r] = cell.as_f64().ok_or_else(|| DeriveError::NonNumeric {
                    column: fields[f].clone(),
                    row: row_no,
                    value: cell.to_string(),
                })?;
            }
        }

        Ok(WideTable {
            index_names: index_keys.to_vec(),
            index: row_lookup.into_keys().collect(),
            conditions,
            fields: fields.to_vec(),
            cells,
        })
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    /// Index tuples, one per wide row.
    pub fn index(&self) -> &[Vec<CellValue>] {
        &self.index
    }

    pub fn conditions(&self) -> &[CellValue] {
        &self.conditions
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of wide rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Values of `field` under `condition`, one per wide row.
    pub fn column(&self, field: &str, condition: &CellValue) -> Option<&[f64]> {
        let f = self.fields.iter().position(|x| x == field)?;
        let c = self.conditions.iter().position(|x| x == condition)?;
        Some(&self.cells[f][c])
    }
}

fn format_key(key: &[CellValue]) -> String {
    let parts: Vec<String> = key.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn long_table() -> Table {
        let mut t = Table::new(["patient", "reconstruction_type", "hu"]);
        t.push_row([CellValue::from("P2"), "Mono_70keV".into(), 16.0.into()])
            .unwrap();
        t.push_row([CellValue::from("P1"), "Mono_50keV".into(), 10.0.into()])
            .unwrap();
        t.push_row([CellValue::from("P1"), "Mono_70keV".into(), 14.0.into()])
            .unwrap();
        t
    }

    #[test]
    fn test_pivot_sorts_index_and_zero_fills() {
        let t = long_table();
        let wide =
            WideTable::pivot(&t, &names(&["patient"]), "reconstruction_type", &names(&["hu"]))
                .unwrap();

        assert_eq!(wide.len(), 2);
        assert_eq!(wide.index()[0], vec![CellValue::from("P1")]);
        assert_eq!(
            wide.conditions(),
            [CellValue::from("Mono_70keV"), CellValue::from("Mono_50keV")]
        );

        let kev50 = wide.column("hu", &CellValue::from("Mono_50keV")).unwrap();
        // P2 never had a 50 keV row
        assert_eq!(kev50, [10.0, 0.0]);
        let kev70 = wide.column("hu", &CellValue::from("Mono_70keV")).unwrap();
        assert_eq!(kev70, [14.0, 16.0]);
    }

    #[test]
    fn test_pivot_rejects_duplicates() {
        let mut t = long_table();
        t.push_row([CellValue::from("P1"), "Mono_50keV".into(), 11.0.into()])
            .unwrap();
        let err =
            WideTable::pivot(&t, &names(&["patient"]), "reconstruction_type", &names(&["hu"]))
                .unwrap_err();
        assert!(matches!(err, DeriveError::DuplicateEntry { ref condition, .. } if condition == "Mono_50keV"));
    }

    #[test]
    fn test_pivot_rejects_non_numeric_field() {
        let mut t = Table::new(["patient", "reconstruction_type", "hu"]);
        t.push_row([CellValue::from("P1"), "FBP".into(), "high".into()])
            .unwrap();
        let err =
            WideTable::pivot(&t, &names(&["patient"]), "reconstruction_type", &names(&["hu"]))
                .unwrap_err();
        assert!(matches!(err, DeriveError::NonNumeric { ref column, .. } if column == "hu"));
    }

    #[test]
    fn test_pivot_missing_field_column() {
        let t = long_table();
        let err =
            WideTable::pivot(&t, &names(&["patient"]), "reconstruction_type", &names(&["volume"]))
                .unwrap_err();
        assert!(matches!(err, DeriveError::MissingColumn(c) if c == "volume"));
    }

    #[test]
    fn test_grouping_keys_split_rows() {
        let mut t = Table::new(["patient", "lesion", "reconstruction_type", "hu"]);
        t.push_row([CellValue::from("P1"), 1i64.into(), "FBP".into(), 1.0.into()])
            .unwrap();
        t.push_row([CellValue::from("P1"), 2i64.into(), "FBP".into(), 2.0.into()])
            .unwrap();
        let wide = WideTable::pivot(
            &t,
            &names(&["patient", "lesion"]),
            "reconstruction_type",
            &names(&["hu"]),
        )
        .unwrap();
        assert_eq!(wide.len(), 2);
        assert_eq!(wide.column("hu", &CellValue::from("FBP")).unwrap(), [1.0, 2.0]);
    }
}
