use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Parameter values as sent with a job: key -> number.
pub type ParamSnapshot = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Parameter {
    pub fn new(label: impl Into<String>, value: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            label: label.into(),
            value,
            min,
            max,
            step,
        }
    }
}

/// Detection parameters in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    entries: Vec<(String, Parameter)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cascade-detector parameters the job server understands.
    pub fn detection_defaults() -> Self {
        Self::new()
            .with("scaleFactor", Parameter::new("Scale Factor", 1.1, 1.0, 3.0, 0.02))
            .with("minNeighbors", Parameter::new("Min Neighbors", 4.0, 3.0, 6.0, 1.0))
    }

    /// Add or replace a parameter, keeping its original position on replace.
    pub fn with(mut self, key: impl Into<String>, param: Parameter) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = param,
            None => self.entries.push((key, param)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Parameter> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    /// Store `value` as-is; range limits are for the input widgets only.
    pub fn set(&mut self, key: &str, value: f64) -> Result<()> {
        let param = self
            .entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p)
            .ok_or_else(|| Error::UnknownParameter(key.to_string()))?;

        param.value = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        self.entries
            .iter()
            .map(|(k, p)| (k.clone(), p.value))
            .collect()
    }
}

/// Write a snapshot with whole numbers as JSON integers, so `minNeighbors` goes out as `4`.
pub fn serialize_snapshot<S: Serializer>(
    snapshot: &ParamSnapshot,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    // Beyond 2^53 an f64 no longer maps onto a unique integer.
    const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

    let mut map = serializer.serialize_map(Some(snapshot.len()))?;
    for (key, value) in snapshot {
        if value.fract() == 0.0 && value.abs() <= EXACT_INTEGER_LIMIT {
            map.serialize_entry(key, &(*value as i64))?;
        } else {
            map.serialize_entry(key, value)?;
        }
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_defaults_order() {
        let params = ParameterSet::detection_defaults();
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["scaleFactor", "minNeighbors"]);
    }

    #[test]
    fn test_set_accepts_out_of_range() {
        let mut params = ParameterSet::detection_defaults();
        params.set("minNeighbors", 42.0).unwrap();
        assert_eq!(params.get("minNeighbors").unwrap().value, 42.0);
    }

    #[test]
    fn test_set_unknown_key() {
        let mut params = ParameterSet::detection_defaults();
        let err = params.set("threshold", 0.3).unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(key) if key == "threshold"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut params = ParameterSet::detection_defaults();
        let snapshot = params.snapshot();
        params.set("scaleFactor", 2.0).unwrap();

        assert_eq!(snapshot["scaleFactor"], 1.1);
        assert_eq!(snapshot["minNeighbors"], 4.0);
    }

    #[test]
    fn test_with_replaces_in_place() {
        let params = ParameterSet::detection_defaults()
            .with("scaleFactor", Parameter::new("Scale", 1.5, 1.0, 2.0, 0.1));
        let (first, param) = params.iter().next().unwrap();
        assert_eq!(first, "scaleFactor");
        assert_eq!(param.value, 1.5);
        assert_eq!(params.len(), 2);
    }
}
