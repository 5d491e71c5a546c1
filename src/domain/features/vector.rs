//! FeatureVector - the typed, default-filled projection of a raw record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coercion::{coerce_bool, coerce_category, coerce_numeric};
use super::contract::{self, FeatureKind, Pillar, FEATURES};
use super::FeaturePreparationError;

/// A raw input record: field name to loosely typed value.
pub type RawRecord = Map<String, Value>;

/// A single typed feature value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FeatureValue {
    Numeric(f64),
    Boolean(bool),
    /// Index into the feature's vocabulary.
    Categorical(usize),
}

impl FeatureValue {
    /// Numeric view: booleans as 1.0/0.0, categoricals as their index.
    pub fn as_f64(&self) -> f64 {
        match *self {
            FeatureValue::Numeric(v) => v,
            FeatureValue::Boolean(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            FeatureValue::Categorical(i) => i as f64,
        }
    }

    fn default_for(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Numeric => FeatureValue::Numeric(0.0),
            FeatureKind::Boolean => FeatureValue::Boolean(false),
            FeatureKind::Categorical(_) => FeatureValue::Categorical(0),
        }
    }

    fn coerce(kind: FeatureKind, raw: &Value) -> Self {
        match kind {
            FeatureKind::Numeric => FeatureValue::Numeric(coerce_numeric(raw)),
            FeatureKind::Boolean => FeatureValue::Boolean(coerce_bool(raw)),
            FeatureKind::Categorical(vocabulary) => {
                FeatureValue::Categorical(coerce_category(raw, vocabulary))
            }
        }
    }
}

/// Canonical, fixed-schema representation of one entity.
///
/// Holds exactly one value per contract feature, in contract order, plus a
/// presence mask recording which features the caller actually supplied.
/// Absent features carry their deterministic default (0 / false / first
/// category) so downstream models never see a hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<FeatureValue>,
    present: Vec<bool>,
}

impl FeatureVector {
    /// A vector with every feature absent and defaulted.
    pub fn empty() -> Self {
        Self {
            values: FEATURES.iter().map(|f| FeatureValue::default_for(f.kind)).collect(),
            present: vec![false; FEATURES.len()],
        }
    }

    /// Total projection from a raw record. Never fails.
    ///
    /// Unknown fields are ignored, `null` counts as absent, and wrong-typed
    /// values are coerced.
    pub fn from_record(record: &RawRecord) -> Self {
        let mut vector = Self::empty();
        for (i, spec) in FEATURES.iter().enumerate() {
            match record.get(spec.name) {
                None | Some(Value::Null) => {}
                Some(raw) => {
                    vector.values[i] = FeatureValue::coerce(spec.kind, raw);
                    vector.present[i] = true;
                }
            }
        }
        vector
    }

    /// Boundary entry point used by the orchestrator.
    ///
    /// # Errors
    ///
    /// - `NotAnObject` if the input is not a JSON object
    /// - `NoCanonicalFeatures` if none of the canonical features is present
    pub fn prepare(input: &Value) -> Result<Self, FeaturePreparationError> {
        let record = input.as_object().ok_or(FeaturePreparationError::NotAnObject {
            found: json_type_name(input),
        })?;
        Self::prepare_record(record)
    }

    /// Like [`FeatureVector::prepare`] for an already-parsed record.
    ///
    /// # Errors
    ///
    /// `NoCanonicalFeatures` if none of the canonical features is present.
    pub fn prepare_record(record: &RawRecord) -> Result<Self, FeaturePreparationError> {
        let vector = Self::from_record(record);
        if vector.present_count() == 0 {
            return Err(FeaturePreparationError::NoCanonicalFeatures {
                fields_seen: record.len(),
            });
        }
        Ok(vector)
    }

    /// Returns the typed value of a canonical feature.
    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        contract::feature_index(name).map(|i| self.values[i])
    }

    /// Numeric view of a feature; unknown names read as 0.0.
    pub fn numeric(&self, name: &str) -> f64 {
        self.get(name).map(|v| v.as_f64()).unwrap_or(0.0)
    }

    /// Boolean view of a feature; unknown names read as false.
    pub fn flag(&self, name: &str) -> bool {
        self.numeric(name) != 0.0
    }

    /// Label of a categorical feature.
    pub fn category(&self, name: &str) -> Option<&'static str> {
        let spec = contract::feature_spec(name)?;
        match (spec.kind, self.get(name)?) {
            (FeatureKind::Categorical(vocabulary), FeatureValue::Categorical(i)) => {
                vocabulary.get(i).copied()
            }
            _ => None,
        }
    }

    /// Returns true if the caller supplied this feature.
    pub fn is_present(&self, name: &str) -> bool {
        contract::feature_index(name).is_some_and(|i| self.present[i])
    }

    /// Number of canonical features the caller supplied.
    pub fn present_count(&self) -> usize {
        self.present.iter().filter(|p| **p).count()
    }

    /// Fraction of the canonical feature set supplied (0.0-1.0).
    pub fn coverage(&self) -> f64 {
        self.present_count() as f64 / FEATURES.len() as f64
    }

    /// Normalized 0.0-1.0 indicator for a present feature.
    ///
    /// Returns `None` for absent features and for features that carry no
    /// pillar signal.
    pub fn indicator(&self, name: &str) -> Option<f64> {
        let i = contract::feature_index(name)?;
        if !self.present[i] {
            return None;
        }
        FEATURES[i].normalizer.apply(self.values[i].as_f64())
    }

    /// Indicators for all present features of one pillar.
    pub fn pillar_indicators(&self, pillar: Pillar) -> Vec<f64> {
        FEATURES
            .iter()
            .filter(|spec| spec.pillar == pillar)
            .filter_map(|spec| self.indicator(spec.name))
            .collect()
    }

    /// One-of-k encoded model input, aligned with [`contract::encoded_names`].
    pub fn encode(&self) -> Vec<f64> {
        let mut encoded = Vec::with_capacity(contract::encoded_names().len());
        for (spec, value) in FEATURES.iter().zip(&self.values) {
            match (spec.kind, value) {
                (FeatureKind::Categorical(vocabulary), FeatureValue::Categorical(i)) => {
                    encoded.extend((0..vocabulary.len()).map(|k| if k == *i { 1.0 } else { 0.0 }));
                }
                (FeatureKind::Categorical(vocabulary), _) => {
                    encoded.extend(std::iter::repeat(0.0).take(vocabulary.len()));
                }
                _ => encoded.push(value.as_f64()),
            }
        }
        encoded
    }

    /// Selects encoded columns by name. Unknown columns read as 0.0.
    pub fn select(&self, columns: &[String]) -> Vec<f64> {
        let encoded = self.encode();
        columns
            .iter()
            .map(|name| {
                contract::encoded_index(name)
                    .and_then(|i| encoded.get(i).copied())
                    .unwrap_or(0.0)
            })
            .collect()
    }

    /// Names of supplied canonical features, in contract order.
    pub fn present_names(&self) -> Vec<&'static str> {
        FEATURES
            .iter()
            .zip(&self.present)
            .filter(|(_, p)| **p)
            .map(|(spec, _)| spec.name)
            .collect()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&RawRecord> for FeatureVector {
    fn from(record: &RawRecord) -> Self {
        Self::from_record(record)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
