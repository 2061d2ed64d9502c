//! tunekit - hyperparameter tuning convenience layer
//!
//! A [`Tuner`](tuner::Tuner) holds one dataset plus a persisted search
//! configuration and exposes one method per model family. Each call
//! resolves the effective grid, scoring, and cross-validation strategy
//! (explicit override > persisted value > family default), delegates to the
//! configured search strategy, and records the outcome on the Tuner.
//!
//! # Modules
//!
//! - [`tuner`] - The Tuner, per-call overrides, and outcome bookkeeping
//! - [`families`] - Model family registry: default grids, scorings,
//!   cross-validation kinds, and estimator factories
//! - [`search`] - Search strategies (grid, randomized) and the
//!   cross-validated executor
//! - [`cross_validation`] - K-fold and stratified k-fold splitters
//! - [`metrics`] - Named scoring metrics and callable scorers
//! - [`models`] - Estimator implementations behind the family factories
//! - [`params`] - Hyperparameter grids, candidate sets, fit parameters
//! - [`data`] - DataFrame ingestion
//!
//! # Example
//!
//! ```no_run
//! use tunekit::prelude::*;
//! use ndarray::{Array1, Array2};
//!
//! # fn main() -> tunekit::Result<()> {
//! let x = Array2::from_shape_fn((40, 2), |(i, j)| (i * (j + 1)) as f64 / 7.0);
//! let y = Array1::from_shape_fn(40, |i| (i % 2) as f64);
//!
//! let mut tuner = Tuner::new(x, y).with_n_splits(4).with_random_state(0);
//! tuner.logistic_regression(TuneOverrides::new())?;
//!
//! let best = tuner.best_params().expect("search ran");
//! println!("best candidate: {best}");
//! # Ok(())
//! # }
//! ```

pub mod error;

pub mod cross_validation;
pub mod data;
pub mod families;
pub mod metrics;
pub mod models;
pub mod params;
pub mod search;
pub mod tuner;

pub use error::{Result, TuneError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, TuneError};

    pub use crate::tuner::{SearchOutcome, TuneOverrides, Tuner};

    pub use crate::families::{ModelFamily, ALL_FAMILIES};

    pub use crate::search::{
        CvResults, ErrorScore, GridSearch, RandomizedSearch, SearchReport, SearchStrategy,
    };

    pub use crate::cross_validation::{CrossValidator, CvStrategy};

    pub use crate::metrics::{Metric, Scoring};

    pub use crate::models::{ClassWeight, TunedModel};

    pub use crate::params::{
        bools, floats, ints, names, FitParams, FitValue, ParamGrid, ParamSet, ParamValue,
    };
}
