//! Aggregate length statistics over a sequence of strings.
//!
//! Lengths are counted in Unicode scalar values, so `"héllo"` has length 5.

use crate::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// Sum, mean, min, max and median of string lengths.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthStats {
    pub total_length: usize,
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub median_length: f64,
}

/// A single statistic value, either a count or a mean-like number.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(usize),
    Real(f64),
}

/// Compute length statistics over `strings`.
///
/// Fails with [`Error::InvalidInput`] when `strings` is empty.
pub fn calculate_length_stats<S: AsRef<str>>(strings: &[S]) -> Result<LengthStats> {
    if strings.is_empty() {
        return Err(Error::InvalidInput(
            "length statistics are undefined for an empty sequence".to_string(),
        ));
    }

    let mut lengths: Vec<usize> = strings
        .iter()
        .map(|s| s.as_ref().chars().count())
        .collect();
    lengths.sort_unstable();

    let total: usize = lengths.iter().sum();
    let count = lengths.len();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (lengths[mid - 1] + lengths[mid]) as f64 / 2.0
    } else {
        lengths[mid] as f64
    };

    Ok(LengthStats {
        total_length: total,
        avg_length: total as f64 / count as f64,
        min_length: lengths[0],
        max_length: lengths[count - 1],
        median_length: median,
    })
}

impl LengthStats {
    /// Statistics in their canonical order, keyed by base name.
    pub fn fields(&self) -> [(&'static str, StatValue); 5] {
        [
            ("totalLength", StatValue::Count(self.total_length)),
            ("avgLength", StatValue::Real(self.avg_length)),
            ("minLength", StatValue::Count(self.min_length)),
            ("maxLength", StatValue::Count(self.max_length)),
            ("medianLength", StatValue::Real(self.median_length)),
        ]
    }

    /// Attach a label that gets appended to every key when serialized.
    pub fn labeled(self, label: &str) -> LabeledLengthStats {
        LabeledLengthStats {
            suffix: capitalize_label(label),
            stats: self,
        }
    }
}

/// Length statistics whose keys carry a label suffix, e.g. `totalLengthBodyText`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledLengthStats {
    suffix: String,
    stats: LengthStats,
}

impl LabeledLengthStats {
    pub fn stats(&self) -> &LengthStats {
        &self.stats
    }

    /// Keys and values in canonical order, with the label applied.
    pub fn fields(&self) -> impl Iterator<Item = (String, StatValue)> + '_ {
        self.stats
            .fields()
            .into_iter()
            .map(move |(name, value)| (format!("{}{}", name, self.suffix), value))
    }
}

impl Serialize for LabeledLengthStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (key, value) in self.fields() {
            map.serialize_entry(&key, &value)?;
        }
        map.end()
    }
}

/// Upper-case the first character of `label`, leaving the rest unchanged.
pub fn capitalize_label(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
