//! Inter-energy comparison features for multi-reconstruction measurements.
//!
//! Takes a long table with one row per (subject, reconstruction) and produces
//! one row per subject with pairwise ratios and differences between
//! reconstructions, slopes along the keV axis between mono-energetic
//! reconstructions, and the spread of values across them.
//!
//! ```
//! use inter_energy_features::{CellValue, FeatureDeriver, Table};
//!
//! let mut table = Table::new(["patient", "reconstruction_type", "hu_mean"]);
//! table.push_row([CellValue::from("P1"), "Mono_50keV".into(), 10.0.into()])?;
//! table.push_row([CellValue::from("P1"), "Mono_70keV".into(), 16.0.into()])?;
//!
//! let features = FeatureDeriver::default().derive(&table)?;
//! let slope = features
//!     .value(0, "hu_mean_slope_Mono_50keV_to_Mono_70keV")
//!     .and_then(CellValue::as_f64);
//! assert_eq!(slope, Some(-0.3));
//! # Ok::<(), inter_energy_features::DeriveError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;

pub use config::DeriveConfig;
pub use data::model::{CellValue, Table};
pub use error::{DeriveError, Result};
pub use features::deriver::{derive_inter_energy_features, FeatureDeriver, RATIO_EPSILON};
pub use features::energy::{extract_kev, is_mono, MonoCondition};
