//! Cross-condition feature derivation.
//!
//! Turns a long table (one row per subject × condition) into one row per
//! subject carrying pairwise ratios and differences between conditions,
//! keV slopes between mono conditions, and summary statistics across them.

use std::collections::HashMap;

use crate::config::DeriveConfig;
use crate::data::filter::drop_incomplete_rows;
use crate::data::model::{CellValue, Table};
use crate::error::Result;

use super::energy::{sorted_mono_conditions, MonoCondition};
use super::stats::{std_dev, RowSummary};
use super::wide::WideTable;

/// Stand-in denominator for ratios whose denominator is exactly zero.
pub const RATIO_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// FeatureColumns – ordered output columns with overwrite-by-name
// ---------------------------------------------------------------------------

/// Output feature columns in insertion order. Setting an existing name
/// replaces its values in place.
#[derive(Debug, Default)]
struct FeatureColumns {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
    lookup: HashMap<String, usize>,
}

impl FeatureColumns {
    fn set(&mut self, name: String, values: Vec<f64>) {
        match self.lookup.get(&name) {
            Some(&i) => self.values[i] = values,
            None => {
                self.lookup.insert(name.clone(), self.names.len());
                self.names.push(name);
                self.values.push(values);
            }
        }
    }

    fn get(&self, name: &str) -> Option<&[f64]> {
        self.lookup.get(name).map(|&i| self.values[i].as_slice())
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    /// Key columns from the wide index followed by every feature, NaN → 0.
    fn into_table(self, wide: &WideTable) -> Table {
        let columns: Vec<String> = wide
            .index_names()
            .iter()
            .cloned()
            .chain(self.names)
            .collect();

        let rows = wide
            .index()
            .iter()
            .enumerate()
            .map(|(r, key)| {
                key.iter()
                    .cloned()
                    .chain(self.values.iter().map(|col| {
                        let v = col[r];
                        CellValue::Float(if v.is_nan() { 0.0 } else { v })
                    }))
                    .collect()
            })
            .collect();

        Table::from_parts(columns, rows)
    }
}

// ---------------------------------------------------------------------------
// FeatureDeriver
// ---------------------------------------------------------------------------

/// Derives inter-condition comparison features from a long-format table.
#[derive(Debug, Clone, Default)]
pub struct FeatureDeriver {
    config: DeriveConfig,
}

impl FeatureDeriver {
    pub fn new(config: DeriveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeriveConfig {
        &self.config
    }

    /// Reshape `table` to one row per subject (and grouping keys) and derive
    /// every comparison feature. The input is left untouched.
    ///
    /// Output columns, in order: the subject and grouping keys, then
    /// `{field}_ratio_{a}_vs_{b}` / `{field}_diff_{a}_vs_{b}` for every pair of
    /// conditions, `{field}_slope_{a}_to_{b}` along the keV axis,
    /// `{field}_std_across_mono` / `{field}_mono_mean` / `{field}_mono_range`,
    /// and `{field}_slope_std_across_keV`. No cell is NaN.
    pub fn derive(&self, table: &Table) -> Result<Table> {
        let config = &self.config;
        config.validate()?;

        let fields = config.resolve_feature_fields(table.column_names());
        let required: Vec<String> = [config.subject_key.clone(), config.condition_key.clone()]
            .into_iter()
            .chain(fields.iter().cloned())
            .collect();

        let clean = drop_incomplete_rows(table, &required)?;
        let wide = WideTable::pivot(&clean, &config.index_keys(), &config.condition_key, &fields)?;

        let mut out = FeatureColumns::default();
        add_ratio_diff_features(&mut out, &wide);

        let mono = sorted_mono_conditions(wide.conditions());
        let slopes = add_slope_features(&mut out, &wide, &mono);
        add_mono_statistics(&mut out, &wide, &mono);
        add_slope_variability(&mut out, &wide, &slopes);

        log::info!(
            "derived {} features for {} rows from {} of {} input rows ({} conditions, {} mono)",
            out.len(),
            wide.len(),
            clean.len(),
            table.len(),
            wide.conditions().len(),
            mono.len()
        );

        Ok(out.into_table(&wide))
    }
}

/// One-shot form of [`FeatureDeriver::derive`].
pub fn derive_inter_energy_features(table: &Table, config: &DeriveConfig) -> Result<Table> {
    FeatureDeriver::new(config.clone()).derive(table)
}

// -- Feature groups --

fn add_ratio_diff_features(out: &mut FeatureColumns, wide: &WideTable) {
    let conditions = wide.conditions();
    let pairs: Vec<(&CellValue, &CellValue)> = conditions
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| conditions[i + 1..].iter().map(move |b| (a, b)))
        .collect();

    log::debug!(
        "comparing condition pairs: {:?}",
        pairs
            .iter()
            .map(|(a, b)| format!("{a} vs {b}"))
            .collect::<Vec<_>>()
    );

    for field in wide.fields() {
        for &(e1, e2) in &pairs {
            let (Some(a), Some(b)) = (wide.column(field, e1), wide.column(field, e2)) else {
                continue;
            };
            let ratio = a
                .iter()
                .zip(b)
                .map(|(&x, &y)| x / if y == 0.0 { RATIO_EPSILON } else { y })
                .collect();
            let diff = a.iter().zip(b).map(|(&x, &y)| x - y).collect();

            out.set(format!("{field}_ratio_{e1}_vs_{e2}"), ratio);
            out.set(format!("{field}_diff_{e1}_vs_{e2}"), diff);
        }
    }
}

/// Adds slope columns and returns, per field, the slope column names produced.
fn add_slope_features(
    out: &mut FeatureColumns,
    wide: &WideTable,
    mono: &[MonoCondition],
) -> Vec<Vec<String>> {
    let mut produced = vec![Vec::new(); wide.fields().len()];
    let (Some(lowest), Some(highest)) = (mono.first(), mono.last()) else {
        return produced;
    };
    if mono.len() < 2 {
        return produced;
    }

    let pairs = mono
        .windows(2)
        .map(|w| (&w[0], &w[1]))
        .chain(std::iter::once((lowest, highest)));

    for (m1, m2) in pairs {
        if m1.kev == m2.kev {
            log::debug!("no slope between {} and {}: same energy", m1.label, m2.label);
            continue;
        }
        // widened so labels at opposite ends of the i64 range cannot overflow
        let delta_kev = (i128::from(m2.kev) - i128::from(m1.kev)) as f64;

        for (f, field) in wide.fields().iter().enumerate() {
            let (Some(v1), Some(v2)) = (
                wide.column(field, &m1.condition),
                wide.column(field, &m2.condition),
            ) else {
                continue;
            };
            let slope = v1
                .iter()
                .zip(v2)
                .map(|(&a, &b)| (a - b) / delta_kev)
                .collect();

            let name = format!("{field}_slope_{}_to_{}", m1.label, m2.label);
            if !produced[f].contains(&name) {
                produced[f].push(name.clone());
            }
            out.set(name, slope);
        }
    }
    produced
}

fn add_mono_statistics(out: &mut FeatureColumns, wide: &WideTable, mono: &[MonoCondition]) {
    for field in wide.fields() {
        let columns: Vec<&[f64]> = mono
            .iter()
            .filter_map(|m| wide.column(field, &m.condition))
            .collect();
        if columns.len() < 2 {
            continue;
        }

        let summaries: Vec<RowSummary> = (0..wide.len())
            .map(|r| {
                let row: Vec<f64> = columns.iter().map(|c| c[r]).collect();
                RowSummary::compute(&row)
            })
            .collect();

        out.set(
            format!("{field}_std_across_mono"),
            summaries.iter().map(|s| s.std_dev).collect(),
        );
        out.set(
            format!("{field}_mono_mean"),
            summaries.iter().map(|s| s.mean).collect(),
        );
        out.set(
            format!("{field}_mono_range"),
            summaries.iter().map(RowSummary::range).collect(),
        );
    }
}

fn add_slope_variability(out: &mut FeatureColumns, wide: &WideTable, slopes: &[Vec<String>]) {
    for (field, names) in wide.fields().iter().zip(slopes) {
        let columns: Vec<&[f64]> = names.iter().filter_map(|n| out.get(n)).collect();
        if columns.is_empty() {
            continue;
        }
        let variability: Vec<f64> = (0..wide.len())
            .map(|r| {
                let row: Vec<f64> = columns
                    .iter()
                    .map(|c| if c[r].is_nan() { 0.0 } else { c[r] })
                    .collect();
                std_dev(&row)
            })
            .collect();
        out.set(format!("{field}_slope_std_across_keV"), variability);
    }
}
