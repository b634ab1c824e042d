//! # Metrics Module
//!
//! One sample of server health is a flat [`MetricsRecord`]. Every source
//! produces a typed sub-record which is converted into a `MetricsRecord` and
//! merged with the others:
//!
//! - **`AnalyticsCounters`**: `active_users`, `users_cnt`, `unique_users_cnt`, `new_users_cnt`
//! - **`LoadAverage`**: `cpu_1`, `cpu_5`, `cpu_15`
//! - **`MemoryReport`**: `total_mem` … `free_swap`, parsed from `free -m`
//! - **`StatusHistogram`**: `logs_data`, request counts per HTTP status code
//!
//! The field names of the sources are disjoint, which is checked at compile
//! time below.

pub mod access_log;
pub mod counters;
pub mod memory;

pub use access_log::*;
pub use counters::*;
pub use memory::*;

use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Gauge(f64),
    Histogram(StatusHistogram),
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        MetricValue::Count(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Gauge(value)
    }
}

impl From<StatusHistogram> for MetricValue {
    fn from(value: StatusHistogram) -> Self {
        MetricValue::Histogram(value)
    }
}

/// Flat mapping from field name to value, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsRecord(BTreeMap<String, MetricValue>);

impl MetricsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<MetricValue>) -> Option<MetricValue> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&MetricValue> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Right-biased union: fields of `other` replace fields of `self` with the
    /// same name.
    pub fn merge(mut self, other: MetricsRecord) -> Self {
        for (field, value) in other.0 {
            if let Some(previous) = self.0.insert(field.clone(), value) {
                warn!(%field, ?previous, "Metric field collision, keeping the later value");
            }
        }
        self
    }

    pub fn merge_all(records: impl IntoIterator<Item = MetricsRecord>) -> Self {
        records.into_iter().fold(MetricsRecord::new(), MetricsRecord::merge)
    }
}

impl<K: Into<String>, V: Into<MetricValue>> FromIterator<(K, V)> for MetricsRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for MetricsRecord {
    type Item = (String, MetricValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

const fn same_field(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn disjoint(a: &[&str], b: &[&str]) -> bool {
    let mut i = 0;
    while i < a.len() {
        let mut j = 0;
        while j < b.len() {
            if same_field(a[i], b[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const SOURCE_FIELDS: [&[&str]; 4] = [
    &AnalyticsCounters::FIELDS,
    &LoadAverage::FIELDS,
    &MemoryReport::FIELDS,
    &StatusHistogram::FIELDS,
];

const fn sources_disjoint() -> bool {
    let mut i = 0;
    while i < SOURCE_FIELDS.len() {
        let mut j = i + 1;
        while j < SOURCE_FIELDS.len() {
            if !disjoint(SOURCE_FIELDS[i], SOURCE_FIELDS[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(sources_disjoint(), "metric sources must not share field names");

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_is_a_right_biased_union() {
        let merged = MetricsRecord::merge_all([
            MetricsRecord::from_iter([("a", 1u64)]),
            MetricsRecord::from_iter([("b", 2u64), ("shared", 10u64)]),
            MetricsRecord::from_iter([("c", 3.5f64)]),
            MetricsRecord::from_iter([("shared", 20u64)]),
        ]);

        assert_eq!(merged.fields().collect::<Vec<_>>(), vec!["a", "b", "c", "shared"]);
        assert_eq!(merged.get("shared"), Some(&MetricValue::Count(20)));
        assert_eq!(merged.get("c"), Some(&MetricValue::Gauge(3.5)));
    }

    #[test]
    fn serializes_as_a_flat_object() {
        let mut record = MetricsRecord::new();
        record.insert("cpu_1", 0.25);
        record.insert("total_mem", 31753u64);
        record.insert("logs_data", StatusHistogram::from_iter([(200, 541432), (404, 683)]));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cpu_1": 0.25,
                "logs_data": { "200": 541432, "404": 683 },
                "total_mem": 31753,
            })
        );
    }

    #[test]
    fn no_field_is_claimed_by_two_sources() {
        let mut seen = std::collections::BTreeSet::new();
        for fields in SOURCE_FIELDS {
            for field in fields {
                assert!(seen.insert(*field), "{field} appears twice");
            }
        }
        assert_eq!(seen.len(), 17);
    }
}
