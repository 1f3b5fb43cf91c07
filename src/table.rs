//! Time series table and its record-oriented JSON codec
//!
//! A [`TimeSeries`] is stored entity-major (one row per entity, one column per
//! time step). On the wire it travels as an array of records, one record per
//! time step, keyed by entity index:
//!
//! ```json
//! [{"0": 1.0, "1": -1.0}, {"0": -1.0, "1": -1.0}]
//! ```

use std::cmp::Ordering;
use std::collections::BTreeSet;

use nalgebra::DMatrix;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ExplorerError;
use crate::graph::Graph;

/// A single JSON record (one time step)
pub type Record = Map<String, Value>;

/// Errors raised while decoding or validating a time series
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("time series must contain at least one record with at least one entity")]
    Empty,

    #[error("record {index} does not have the same entities as the first record")]
    RaggedRecord { index: usize },

    #[error("record {index} has a non-numeric value for entity '{key}'")]
    NonNumeric { index: usize, key: String },
}

/// Entities x time steps numeric table
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    data: DMatrix<f64>,
}

impl TimeSeries {
    pub fn new(data: DMatrix<f64>) -> Self {
        Self { data }
    }

    pub fn num_entities(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_steps(&self) -> usize {
        self.data.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Values of one entity across all time steps
    pub fn entity(&self, idx: usize) -> Vec<f64> {
        self.data.row(idx).iter().copied().collect()
    }

    /// Shape mismatch when the entity count differs from the graph's node
    /// count
    pub fn check_entities(&self, graph: &Graph) -> Result<(), ExplorerError> {
        if self.num_entities() != graph.node_count() {
            return Err(ExplorerError::ShapeMismatch(format!(
                "time series has {} entities but the graph has {} nodes",
                self.num_entities(),
                graph.node_count()
            )));
        }
        Ok(())
    }

    /// Encodes the table as one record per time step
    pub fn to_records(&self) -> Vec<Record> {
        (0..self.num_steps())
            .map(|step| {
                (0..self.num_entities())
                    .map(|entity| (entity.to_string(), Value::from(self.data[(entity, step)])))
                    .collect()
            })
            .collect()
    }

    /// Decodes one-record-per-time-step JSON.
    ///
    /// Integer-like entity keys are ordered numerically, any other keys
    /// lexicographically.
    pub fn from_records(records: &[Record]) -> Result<Self, TableError> {
        let first = records.first().ok_or(TableError::Empty)?;
        if first.is_empty() {
            return Err(TableError::Empty);
        }

        let keys = ordered_keys(first);
        let key_set: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
        let mut data = DMatrix::zeros(keys.len(), records.len());

        for (step, record) in records.iter().enumerate() {
            if record.len() != keys.len() || !record.keys().all(|k| key_set.contains(k.as_str())) {
                return Err(TableError::RaggedRecord { index: step });
            }
            for (entity, key) in keys.iter().enumerate() {
                let value = record
                    .get(key)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| TableError::NonNumeric {
                        index: step,
                        key: key.clone(),
                    })?;
                data[(entity, step)] = value;
            }
        }

        Ok(Self { data })
    }
}

fn ordered_keys(record: &Record) -> Vec<String> {
    let mut keys: Vec<String> = record.keys().cloned().collect();
    keys.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_keys_ordered_numerically() {
        let mut record = Record::new();
        for entity in 0..12 {
            record.insert(entity.to_string(), json!(entity as f64));
        }
        let ts = TimeSeries::from_records(&[record]).unwrap();
        assert_eq!(ts.num_entities(), 12);
        assert_eq!(ts.num_steps(), 1);
        assert_eq!(ts.matrix()[(10, 0)], 10.0);
        assert_eq!(ts.matrix()[(2, 0)], 2.0);
    }

    #[test]
    fn test_records_roundtrip() {
        let input = records(json!([
            {"0": 1.0, "1": -1.0, "2": 0.5},
            {"0": -1.0, "1": 1, "2": 0.25}
        ]));
        let ts = TimeSeries::from_records(&input).unwrap();
        assert_eq!(ts.num_entities(), 3);
        assert_eq!(ts.num_steps(), 2);
        assert_eq!(ts.entity(1), vec![-1.0, 1.0]);

        let back = TimeSeries::from_records(&ts.to_records()).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(TimeSeries::from_records(&[]), Err(TableError::Empty));
        assert_eq!(
            TimeSeries::from_records(&[Record::new()]),
            Err(TableError::Empty)
        );
    }

    #[test]
    fn test_ragged_rejected() {
        let input = records(json!([{"0": 1.0, "1": 2.0}, {"0": 1.0, "2": 2.0}]));
        assert_eq!(
            TimeSeries::from_records(&input),
            Err(TableError::RaggedRecord { index: 1 })
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        let input = records(json!([{"0": "up"}]));
        assert_eq!(
            TimeSeries::from_records(&input),
            Err(TableError::NonNumeric {
                index: 0,
                key: "0".to_string()
            })
        );
    }

    #[test]
    fn test_entity_check() {
        let ts = TimeSeries::new(DMatrix::zeros(3, 10));
        assert!(ts.check_entities(&Graph::with_nodes(3)).is_ok());
        let err = ts.check_entities(&Graph::with_nodes(4)).unwrap_err();
        assert!(matches!(err, ExplorerError::ShapeMismatch(_)));
        assert_eq!(err.kind(), "shape_mismatch");
    }
}
