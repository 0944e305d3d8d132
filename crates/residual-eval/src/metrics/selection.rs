//! Metric selection.
//!
//! A [`MetricConfig`] is a sparse set of enable/disable switches, keyed by
//! metric or by the reserved `"all"` switch. [`MetricConfig::resolve`] turns
//! it into the concrete [`MetricSet`] to emit:
//!
//! 1. Start from each metric's default.
//! 2. If `"all"` is set, apply it to every metric.
//! 3. Apply each per-metric switch to its own metric.
//!
//! Because step 2 always runs before step 3, `{"RMSE": true, "all": false}`
//! selects exactly RMSE, whatever the order the keys were written in.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use super::Metric;
use crate::error::EvalError;

/// Reserved configuration key toggling every metric at once.
pub const ALL_KEY: &str = "all";

// =============================================================================
// MetricSet
// =============================================================================

/// An ordered set of metrics.
///
/// Iteration always follows universe order, regardless of insertion order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MetricSet {
    enabled: [bool; Metric::COUNT],
}

impl MetricSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every metric of the universe.
    pub fn all() -> Self {
        Self {
            enabled: [true; Metric::COUNT],
        }
    }

    /// The metrics enabled by default.
    pub fn defaults() -> Self {
        Metric::ALL
            .into_iter()
            .filter(|m| m.default_enabled())
            .collect()
    }

    /// Parse a list of column labels.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidConfiguration`] for a label outside the universe.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, EvalError> {
        names.iter().map(|s| s.as_ref().parse::<Metric>()).collect()
    }

    pub fn insert(&mut self, metric: Metric) {
        self.enabled[metric.index()] = true;
    }

    pub fn remove(&mut self, metric: Metric) {
        self.enabled[metric.index()] = false;
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.enabled[metric.index()]
    }

    pub fn len(&self) -> usize {
        self.enabled.iter().filter(|&&e| e).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Metrics in universe order.
    pub fn iter(&self) -> impl Iterator<Item = Metric> + '_ {
        Metric::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Column labels in universe order.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(Metric::name).collect()
    }
}

impl fmt::Debug for MetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Metric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        let mut set = Self::empty();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

impl From<&[Metric]> for MetricSet {
    fn from(metrics: &[Metric]) -> Self {
        metrics.iter().copied().collect()
    }
}

// =============================================================================
// MetricConfig
// =============================================================================

/// Sparse metric enable/disable configuration.
///
/// The empty configuration resolves to the defaults.
///
/// # Example
///
/// ```
/// use residual_eval::metrics::{Metric, MetricConfig};
///
/// let selected = MetricConfig::none().with(Metric::Rmse, true).resolve();
/// assert_eq!(selected.names(), ["RMSE"]);
///
/// let json = serde_json::json!({"all": false, "MAE": true});
/// let selected = MetricConfig::from_json(&json).unwrap().resolve();
/// assert_eq!(selected.names(), ["MAE"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct MetricConfig {
    all: Option<bool>,
    overrides: Vec<(Metric, bool)>,
}

impl MetricConfig {
    /// Empty configuration (defaults only).
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"all": true}`, the meaning of the literal string `"all"`.
    pub fn all() -> Self {
        Self::new().with_all(true)
    }

    /// `{"all": false}`.
    pub fn none() -> Self {
        Self::new().with_all(false)
    }

    /// Set the `"all"` switch.
    pub fn with_all(mut self, enabled: bool) -> Self {
        self.all = Some(enabled);
        self
    }

    /// Set one metric's switch. A later call for the same metric wins.
    pub fn with(mut self, metric: Metric, enabled: bool) -> Self {
        self.overrides.retain(|(m, _)| *m != metric);
        self.overrides.push((metric, enabled));
        self
    }

    /// The `"all"` switch, if set.
    pub fn all_switch(&self) -> Option<bool> {
        self.all
    }

    /// Per-metric switches in the order they were given.
    pub fn overrides(&self) -> &[(Metric, bool)] {
        &self.overrides
    }

    /// Resolve into the set of metrics to emit.
    pub fn resolve(&self) -> MetricSet {
        let mut enabled = Metric::ALL.map(Metric::default_enabled);
        if let Some(all) = self.all {
            enabled = [all; Metric::COUNT];
        }
        for &(metric, on) in &self.overrides {
            enabled[metric.index()] = on;
        }
        let selected = MetricSet { enabled };
        debug!(all = ?self.all, metrics = ?selected.names(), "resolved metric selection");
        selected
    }

    /// Parse the external configuration form.
    ///
    /// Accepts the literal string `"all"` or an object mapping metric labels
    /// (or `"all"`) to booleans.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidConfiguration`] for unknown labels,
    /// non-boolean values, unnamed entries (arrays), or any other JSON kind.
    pub fn from_json(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::String(s) if s == ALL_KEY => Ok(Self::all()),
            Value::String(s) => Err(EvalError::invalid_configuration(format!(
                "expected \"{ALL_KEY}\" or a mapping of metric names to booleans, got \"{s}\""
            ))),
            Value::Object(map) => {
                let mut config = Self::new();
                for (key, value) in map {
                    let enabled = value.as_bool().ok_or_else(|| {
                        EvalError::invalid_configuration(format!(
                            "value for '{key}' must be a boolean, got {value}"
                        ))
                    })?;
                    config = if key == ALL_KEY {
                        config.with_all(enabled)
                    } else {
                        config.with(key.parse()?, enabled)
                    };
                }
                Ok(config)
            }
            Value::Array(_) => Err(EvalError::invalid_configuration(
                "all entries must be named by a metric or \"all\"",
            )),
            other => Err(EvalError::invalid_configuration(format!(
                "expected \"{ALL_KEY}\" or a mapping of metric names to booleans, got {other}"
            ))),
        }
    }
}

impl TryFrom<Value> for MetricConfig {
    type Error = EvalError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl Serialize for MetricConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.overrides.len() + usize::from(self.all.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(all) = self.all {
            map.serialize_entry(ALL_KEY, &all)?;
        }
        for (metric, enabled) in &self.overrides {
            map.serialize_entry(metric.name(), enabled)?;
        }
        map.end()
    }
}

// =============================================================================
// Tests
// =============================================================================
