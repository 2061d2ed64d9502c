//! Hyperparameter grids and candidate parameter sets
//!
//! A grid maps parameter names to finite axes of candidate values. Axes are
//! heterogeneous: `max_depth` mixes integers with null, `max_features` mixes
//! names with null, so values are a small tagged enum rather than `f64`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
    /// Explicit "not set" (e.g. unlimited depth, all features)
    Null,
}

impl ParamValue {
    /// Numeric view; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Int(v) if *v >= 0 => Some(*v as usize),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v}"),
            ParamValue::Null => write!(f, "null"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// Axis builder: a list of float candidates.
pub fn floats(values: &[f64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Float(v)).collect()
}

/// Axis builder: a list of integer candidates.
pub fn ints(values: &[i64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Int(v)).collect()
}

/// Axis builder: both boolean candidates.
pub fn bools() -> Vec<ParamValue> {
    vec![ParamValue::Bool(true), ParamValue::Bool(false)]
}

/// Axis builder: a list of named candidates.
pub fn names(values: &[&str]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Str(v.to_string())).collect()
}

/// A hyperparameter grid: parameter name -> finite axis of candidates.
///
/// Keys are kept sorted so expansion order (and therefore candidate
/// indices in search results) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    axes: BTreeMap<String, Vec<ParamValue>>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an axis.
    pub fn axis(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.axes.insert(name.into(), values);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<ParamValue>) {
        self.axes.insert(name.into(), values);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&[ParamValue]> {
        self.axes.get(name).map(Vec::as_slice)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }

    pub fn n_axes(&self) -> usize {
        self.axes.len()
    }

    /// Number of candidates the grid expands to.
    pub fn n_candidates(&self) -> usize {
        self.axes.values().map(Vec::len).product()
    }

    /// Expand to the full cartesian product, in key-sorted order with the
    /// last axis varying fastest. An empty grid expands to one empty
    /// candidate (the estimator's own defaults).
    pub fn expand(&self) -> Vec<ParamSet> {
        let mut out = vec![ParamSet::default()];
        for (name, values) in &self.axes {
            let mut next = Vec::with_capacity(out.len() * values.len().max(1));
            for base in &out {
                for value in values {
                    let mut set = base.clone();
                    set.values.insert(name.clone(), value.clone());
                    next.push(set);
                }
            }
            out = next;
        }
        out
    }
}

/// One concrete candidate: a parameter name -> value assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

/// A value passed to an estimator's `fit`, as opposed to a hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FitValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    FloatVec(Vec<f64>),
}

/// Options forwarded to the estimator's `fit` call (e.g. per-sample
/// weights). No defaults; estimators reject keys they do not understand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    values: BTreeMap<String, FitValue>,
}

impl FitParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: FitValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FitValue> {
        self.values.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convenience accessor for the one widely supported fit option.
    pub fn sample_weight(&self) -> Option<&[f64]> {
        match self.values.get("sample_weight") {
            Some(FitValue::FloatVec(w)) => Some(w.as_slice()),
            _ => None,
        }
    }

    /// Restrict per-sample values to a fold: float vectors whose length
    /// matches the full dataset are re-indexed, everything else passes
    /// through unchanged.
    pub fn subset(&self, indices: &[usize], n_samples: usize) -> FitParams {
        let values = self
            .values
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    FitValue::FloatVec(w) if w.len() == n_samples => {
                        FitValue::FloatVec(indices.iter().map(|&i| w[i]).collect())
                    }
                    other => other.clone(),
                };
                (k.clone(), v)
            })
            .collect();
        FitParams { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_counts() {
        let grid = ParamGrid::new()
            .axis("a", floats(&[0.1, 1.0]))
            .axis("b", bools())
            .axis("c", names(&["x", "y", "z"]));

        assert_eq!(grid.n_candidates(), 12);
        let sets = grid.expand();
        assert_eq!(sets.len(), 12);

        // Every candidate carries every axis
        for set in &sets {
            assert_eq!(set.len(), 3);
            assert!(set.contains("a"));
            assert!(set.contains("c"));
        }
    }

    #[test]
    fn test_expand_deterministic() {
        let grid = ParamGrid::new()
            .axis("beta", ints(&[1, 2]))
            .axis("alpha", bools());
        let a = grid.expand();
        let b = grid.expand();
        assert_eq!(a, b);
        // Keys sort alphabetically, so "alpha" is the slow axis
        assert_eq!(a[0].get("alpha"), Some(&ParamValue::Bool(true)));
        assert_eq!(a[0].get("beta"), Some(&ParamValue::Int(1)));
        assert_eq!(a[1].get("alpha"), Some(&ParamValue::Bool(true)));
        assert_eq!(a[1].get("beta"), Some(&ParamValue::Int(2)));
    }

    #[test]
    fn test_empty_grid_single_candidate() {
        let sets = ParamGrid::new().expand();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].is_empty());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(ParamValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(ParamValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(ParamValue::Int(3).as_usize(), Some(3));
        assert_eq!(ParamValue::Int(-1).as_usize(), None);
        assert_eq!(ParamValue::Str("sqrt".into()).as_str(), Some("sqrt"));
        assert!(ParamValue::Null.is_null());
        assert_eq!(ParamValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_fit_params_sample_weight() {
        let fp = FitParams::new().with("sample_weight", FitValue::FloatVec(vec![1.0, 2.0]));
        assert_eq!(fp.sample_weight(), Some(&[1.0, 2.0][..]));
        assert!(FitParams::new().sample_weight().is_none());
    }

    #[test]
    fn test_fit_params_subset_reindexes_full_length_vectors() {
        let fp = FitParams::new()
            .with("sample_weight", FitValue::FloatVec(vec![1.0, 2.0, 3.0, 4.0]))
            .with("threshold", FitValue::Float(0.5));
        let sub = fp.subset(&[3, 1], 4);
        assert_eq!(sub.sample_weight(), Some(&[4.0, 2.0][..]));
        assert_eq!(sub.get("threshold"), Some(&FitValue::Float(0.5)));

        // A vector of some other length is not per-sample data; untouched
        let fp = FitParams::new().with("sample_weight", FitValue::FloatVec(vec![1.0, 2.0]));
        let sub = fp.subset(&[0], 4);
        assert_eq!(sub.sample_weight(), Some(&[1.0, 2.0][..]));
    }
}
