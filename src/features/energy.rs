//! Mono-energetic condition detection and energy ordering.

use crate::data::model::CellValue;

/// Marker a condition label must contain to count as a mono condition.
pub const MONO_MARKER: &str = "Mono";

/// A mono condition with its parsed energy in keV.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoCondition {
    /// The condition value exactly as it appears in the input.
    pub condition: CellValue,
    /// Label used in column names.
    pub label: String,
    pub kev: i64,
}

/// Whether a condition label names a mono-energetic reconstruction.
pub fn is_mono(label: &str) -> bool {
    label.contains(MONO_MARKER)
}

/// Energy encoded in a label such as `Mono_70keV`.
///
/// The second `_`-separated token, with `keV` stripped, must be an integer.
/// Returns `None` for anything else (`Mono`, `Mono_high`, `Mono_70.5keV`).
pub fn extract_kev(label: &str) -> Option<i64> {
    label
        .split('_')
        .nth(1)?
        .replace("keV", "")
        .parse::<i64>()
        .ok()
}

/// Mono conditions among `conditions`, sorted ascending by energy.
///
/// Labels that look mono but carry no parsable energy are dropped and logged.
/// The sort is stable, so equal energies keep their first-appearance order.
pub fn sorted_mono_conditions(conditions: &[CellValue]) -> Vec<MonoCondition> {
    let mut mono: Vec<MonoCondition> = conditions
        .iter()
        .filter_map(|c| {
            let label = c.to_string();
            if !is_mono(&label) {
                return None;
            }
            match extract_kev(&label) {
                Some(kev) => Some(MonoCondition {
                    condition: c.clone(),
                    label,
                    kev,
                }),
                None => {
                    log::warn!("no keV value in mono condition '{label}', leaving it out of energy features");
                    None
                }
            }
        })
        .collect();

    mono.sort_by_key(|m| m.kev);
    log::debug!(
        "mono conditions by energy: {:?}",
        mono.iter().map(|m| (&m.label, m.kev)).collect::<Vec<_>>()
    );
    mono
}
