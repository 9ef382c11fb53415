// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};

use serde_derive::Serialize;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Speedup of a parallel run over the sequential baseline. Missing data, a
/// zero parallel time, or a non-finite ratio all yield 0.
pub fn speedup(sequential: Option<f64>, parallel: Option<f64>) -> f64 {
    match (sequential, parallel) {
        (Some(s), Some(p)) if p != 0.0 => {
            let ratio = s / p;
            if ratio.is_finite() {
                ratio
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Averages and speedups for one input size across all thread counts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    size: String,
    sequential: Option<f64>,
    parallel: Vec<Option<f64>>,
    speedup: Vec<f64>,
}

impl Series {
    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn sequential(&self) -> Option<f64> {
        self.sequential
    }

    pub fn parallel(&self) -> &[Option<f64>] {
        &self.parallel
    }

    pub fn speedup(&self) -> &[f64] {
        &self.speedup
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeedupTable {
    threads: Vec<usize>,
    series: Vec<Series>,
}

impl SpeedupTable {
    /// Build the table from per-size sequential averages and the sizes ×
    /// threads parallel averages. Sizes without a parallel row get an empty
    /// row, which plots as all zeros.
    pub fn new(
        sizes: &[String],
        sequential: &[Option<f64>],
        parallel: &[Vec<Option<f64>>],
        threads: &[usize],
    ) -> Self {
        let series = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                let seq = sequential.get(i).copied().flatten();
                let par: Vec<Option<f64>> = (0..threads.len())
                    .map(|j| parallel.get(i).and_then(|row| row.get(j)).copied().flatten())
                    .collect();
                let speedup = par.iter().map(|p| speedup(seq, *p)).collect();
                Series {
                    size: size.clone(),
                    sequential: seq,
                    parallel: par,
                    speedup,
                }
            })
            .collect();

        Self {
            threads: threads.to_vec(),
            series,
        }
    }

    pub fn threads(&self) -> &[usize] {
        &self.threads
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// The speedups as a sizes × threads matrix.
    pub fn speedups(&self) -> Vec<Vec<f64>> {
        self.series.iter().map(|s| s.speedup.clone()).collect()
    }

    /// Largest speedup in the table, 0 if there is none.
    pub fn max_speedup(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.speedup.iter().copied())
            .fold(0.0, f64::max)
    }

    /// Chart coordinates for a series, in thread list order.
    pub fn points(&self, series: &Series) -> Vec<(f64, f64)> {
        self.threads
            .iter()
            .zip(series.speedup.iter())
            .map(|(t, s)| (*t as f64, *s))
            .collect()
    }

    /// Write the table as pretty-printed JSON. Missing averages become `null`.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| Error::Json {
            path: path.to_owned(),
            source,
        })?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ratio() {
        assert_eq!(speedup(Some(3.0), Some(2.0)), 1.5);
        assert_eq!(speedup(Some(3.0), None), 0.0);
        assert_eq!(speedup(Some(3.0), Some(0.0)), 0.0);
        assert_eq!(speedup(None, Some(2.0)), 0.0);
        assert_eq!(speedup(Some(f64::INFINITY), Some(1.0)), 0.0);
    }

    #[test]
    fn single_cell() {
        let table = SpeedupTable::new(&sizes(&["small"]), &[Some(3.0)], &[vec![Some(2.0)]], &[2]);
        assert_eq!(table.speedups(), vec![vec![1.5]]);
        assert_eq!(table.series()[0].size(), "small");
        assert_eq!(table.series()[0].sequential(), Some(3.0));
        assert_eq!(table.series()[0].parallel(), &[Some(2.0)]);
        assert_eq!(table.points(&table.series()[0]), vec![(2.0, 1.5)]);
        assert_eq!(table.max_speedup(), 1.5);
    }

    #[test]
    fn empty_parallel() {
        let table = SpeedupTable::new(
            &sizes(&["a", "b"]),
            &[Some(1.0), Some(2.0)],
            &[vec![None, None], vec![None, None]],
            &[2, 4],
        );
        assert_eq!(table.speedups(), vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert_eq!(table.max_speedup(), 0.0);
    }

    #[test]
    fn ragged_input() {
        // fewer rows than sizes
        let table = SpeedupTable::new(&sizes(&["a", "b"]), &[Some(4.0)], &[vec![Some(2.0)]], &[2]);
        assert_eq!(table.speedups(), vec![vec![2.0], vec![0.0]]);
        assert_eq!(table.series()[1].sequential(), None);
    }

    #[test]
    fn json() {
        let table = SpeedupTable::new(&sizes(&["small"]), &[Some(3.0)], &[vec![Some(2.0), None]], &[2, 4]);
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["threads"], serde_json::json!([2, 4]));
        assert_eq!(value["series"][0]["size"], "small");
        assert_eq!(value["series"][0]["parallel"], serde_json::json!([2.0, null]));
        assert_eq!(value["series"][0]["speedup"], serde_json::json!([1.5, 0.0]));
    }
}
