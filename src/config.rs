//! Configuration for inter-energy feature derivation.
//!
//! # Example
//!
//! ```
//! use inter_energy_features::DeriveConfig;
//!
//! let config = DeriveConfig::default()
//!     .with_grouping_keys(["lesion_id"])
//!     .with_feature_fields(["hu_mean", "hu_std"]);
//! assert_eq!(config.subject_key, "patient");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DeriveError, Result};

/// Default subject column name.
pub const DEFAULT_SUBJECT_KEY: &str = "patient";
/// Default condition column name.
pub const DEFAULT_CONDITION_KEY: &str = "reconstruction_type";

/// Which columns identify rows and conditions, and which columns are features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveConfig {
    /// Column identifying the subject each output row belongs to.
    pub subject_key: String,

    /// Column holding the condition label (e.g. `Mono_70keV`).
    pub condition_key: String,

    /// Extra columns that, with the subject, identify an output row.
    pub grouping_keys: Vec<String>,

    /// Measurement columns to compare. `None` or an empty list means every
    /// non-key column.
    pub feature_fields: Option<Vec<String>>,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            subject_key: DEFAULT_SUBJECT_KEY.to_string(),
            condition_key: DEFAULT_CONDITION_KEY.to_string(),
            grouping_keys: Vec::new(),
            feature_fields: None,
        }
    }
}

impl DeriveConfig {
    #[must_use]
    pub fn with_subject_key(mut self, key: impl Into<String>) -> Self {
        self.subject_key = key.into();
        self
    }

    #[must_use]
    pub fn with_condition_key(mut self, key: impl Into<String>) -> Self {
        self.condition_key = key.into();
        self
    }

    #[must_use]
    pub fn with_grouping_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grouping_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_feature_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Read a configuration from JSON text. Absent fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: DeriveConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Subject key followed by the grouping keys: the wide table's row index.
    pub fn index_keys(&self) -> Vec<String> {
        std::iter::once(self.subject_key.clone())
            .chain(self.grouping_keys.iter().cloned())
            .collect()
    }

    /// Feature columns for `columns`: the configured list, or every non-key
    /// column when no list (or an empty one) is configured.
    pub fn resolve_feature_fields(&self, columns: &[String]) -> Vec<String> {
        match &self.feature_fields {
            Some(fields) if !fields.is_empty() => fields.clone(),
            _ => columns
                .iter()
                .filter(|c| !self.is_key(c))
                .cloned()
                .collect(),
        }
    }

    fn is_key(&self, column: &str) -> bool {
        column == self.subject_key
            || column == self.condition_key
            || self.grouping_keys.iter().any(|g| g == column)
    }

    /// Check that key names are usable and disjoint from the feature list.
    pub fn validate(&self) -> Result<()> {
        if self.subject_key.is_empty() {
            return Err(DeriveError::invalid_config("subject_key must not be empty"));
        }
        if self.condition_key.is_empty() {
            return Err(DeriveError::invalid_config("condition_key must not be empty"));
        }
        if self.subject_key == self.condition_key {
            return Err(DeriveError::invalid_config(format!(
                "subject_key and condition_key are both '{}'",
                self.subject_key
            )));
        }
        if let Some(fields) = &self.feature_fields {
            if let Some(f) = fields.iter().find(|f| self.is_key(f)) {
                return Err(DeriveError::invalid_config(format!(
                    "feature field '{f}' is also a key column"
                )));
            }
        }
        Ok(())
    }
}
