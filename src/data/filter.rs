use crate::error::Result;

use super::model::Table;

// ---------------------------------------------------------------------------
// Completeness filter: rows must be defined in every required column
// ---------------------------------------------------------------------------

/// Return indices of rows that have a value in every `required` column.
///
/// A row fails when any required cell is missing:
/// * `Null` → fails
/// * a NaN float → fails
/// * anything else, including empty strings → passes
///
/// Every required column must exist in the table.
pub fn complete_row_indices(table: &Table, required: &[String]) -> Result<Vec<usize>> {
    let positions = required
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    Ok(table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| positions.iter().all(|&p| !row[p].is_missing()))
        .map(|(i, _)| i)
        .collect())
}

/// Drop every row with a missing value in one of the `required` columns.
pub fn drop_incomplete_rows(table: &Table, required: &[String]) -> Result<Table> {
    let keep = complete_row_indices(table, required)?;
    if keep.len() < table.len() {
        log::debug!(
            "dropping {} of {} rows with missing values in {:?}",
            table.len() - keep.len(),
            table.len(),
            required
        );
    }
    Ok(table.select_rows(&keep))
}
