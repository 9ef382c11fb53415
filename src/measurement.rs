// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Reading of benchmark timing files.
//!
//! A timing file holds one duration in seconds per non-blank line. Values are
//! grouped in contiguous blocks of `rounds` trials: one block per size for the
//! sequential baseline, and one block per (size, thread count) pair for the
//! parallel runs, sizes being the outer loop.

use crate::config::{Benchmark, OnMismatch};
use crate::error::{Error, Result};

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Which of the two timing files a set of values came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    Sequential,
    Parallel,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Category::Sequential => write!(f, "seq_results"),
            Category::Parallel => write!(f, "par_results"),
        }
    }
}

/// Read every non-blank line of the file as a floating point number.
pub fn read_values<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = line.parse::<f64>().map_err(|source| Error::Parse {
            path: path.to_owned(),
            line: index + 1,
            value: line.to_owned(),
            source,
        })?;
        values.push(value);
    }

    trace!("read {} values from {}", values.len(), path.display());

    Ok(values)
}

/// Arithmetic mean, or `None` for an empty block.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// The block of up to `len` values starting at `start`, clipped to what the
/// file actually holds.
fn block(values: &[f64], start: usize, len: usize) -> &[f64] {
    let start = start.min(values.len());
    let end = start.saturating_add(len).min(values.len());
    &values[start..end]
}

/// Compare the number of values read against the layout. Under
/// `OnMismatch::Warn` a mismatch is only logged.
pub fn check_count(
    category: Category,
    parsed: usize,
    expected: usize,
    policy: OnMismatch,
) -> Result<()> {
    if parsed == expected {
        return Ok(());
    }
    match policy {
        OnMismatch::Warn => {
            warn!("{} length {} != expected {}", category, parsed, expected);
            Ok(())
        }
        OnMismatch::Fail => Err(Error::CountMismatch {
            category,
            parsed,
            expected,
        }),
    }
}

/// Average the sequential values, one block of `rounds` per size in size
/// order.
pub fn average_sequential(values: &[f64], benchmark: &Benchmark) -> Vec<Option<f64>> {
    let rounds = benchmark.rounds();
    (0..benchmark.sizes().len())
        .map(|i| mean(block(values, i * rounds, rounds)))
        .collect()
}

/// Average the parallel values into a sizes × threads table.
///
/// The cursor advances by `rounds` for every cell even when the file ran out
/// early, so a short file leaves every later cell empty.
pub fn average_parallel(values: &[f64], benchmark: &Benchmark) -> Vec<Vec<Option<f64>>> {
    let rounds = benchmark.rounds();
    let mut cursor = 0;
    let mut table = Vec::with_capacity(benchmark.sizes().len());
    for _ in benchmark.sizes() {
        let mut row = Vec::with_capacity(benchmark.threads().len());
        for _ in benchmark.threads() {
            row.push(mean(block(values, cursor, rounds)));
            cursor += rounds;
        }
        table.push(row);
    }
    table
}

/// Read the sequential baseline file and average it per size.
pub fn read_sequential<P: AsRef<Path>>(
    path: P,
    benchmark: &Benchmark,
    policy: OnMismatch,
) -> Result<Vec<Option<f64>>> {
    let values = read_values(path)?;
    let expected = benchmark.sizes().len() * benchmark.rounds();
    check_count(Category::Sequential, values.len(), expected, policy)?;
    Ok(average_sequential(&values, benchmark))
}

/// Read the parallel file and average it per (size, thread count).
pub fn read_parallel<P: AsRef<Path>>(
    path: P,
    benchmark: &Benchmark,
    policy: OnMismatch,
) -> Result<Vec<Vec<Option<f64>>>> {
    let values = read_values(path)?;
    let expected = benchmark.sizes().len() * benchmark.threads().len() * benchmark.rounds();
    check_count(Category::Parallel, values.len(), expected, policy)?;
    Ok(average_parallel(&values, benchmark))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn benchmark(sizes: &[&str], threads: &[usize], rounds: usize) -> Benchmark {
        Benchmark::new(
            sizes.iter().map(|s| s.to_string()).collect(),
            threads.to_vec(),
            rounds,
        )
    }

    #[test]
    fn means() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(mean(&[1.5]), Some(1.5));
    }

    #[test]
    fn sequential_blocks() {
        let b = benchmark(&["small"], &[2], 2);
        assert_eq!(average_sequential(&[2.0, 4.0], &b), vec![Some(3.0)]);

        let b = benchmark(&["a", "b", "c"], &[2], 2);
        let values = [1.0, 3.0, 10.0, 20.0, 5.0, 5.0];
        assert_eq!(
            average_sequential(&values, &b),
            vec![Some(2.0), Some(15.0), Some(5.0)]
        );
    }

    #[test]
    fn sequential_short() {
        let b = benchmark(&["a", "b", "c"], &[2], 2);
        // second block is partial, third is empty
        assert_eq!(
            average_sequential(&[1.0, 3.0, 6.0], &b),
            vec![Some(2.0), Some(6.0), None]
        );
        assert_eq!(average_sequential(&[], &b), vec![None, None, None]);
    }

    #[test]
    fn parallel_blocks() {
        let b = benchmark(&["small"], &[2], 2);
        assert_eq!(average_parallel(&[1.0, 3.0], &b), vec![vec![Some(2.0)]]);

        let b = benchmark(&["a", "b"], &[2, 4, 8], 2);
        let values: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let table = average_parallel(&values, &b);
        assert_eq!(table.len(), 2);
        for (i, row) in table.iter().enumerate() {
            assert_eq!(row.len(), 3);
            for (j, cell) in row.iter().enumerate() {
                let start = (i * 3 + j) * 2;
                assert_eq!(*cell, mean(&values[start..start + 2]));
            }
        }
    }

    #[test]
    fn parallel_short() {
        let b = benchmark(&["a", "b"], &[2, 4], 2);
        let table = average_parallel(&[1.0, 3.0, 5.0], &b);
        assert_eq!(
            table,
            vec![vec![Some(2.0), Some(5.0)], vec![None, None]]
        );

        let table = average_parallel(&[], &b);
        assert!(table.iter().flatten().all(|cell| cell.is_none()));
    }

    #[test]
    fn count_policy() {
        assert!(check_count(Category::Sequential, 5, 5, OnMismatch::Fail).is_ok());
        assert!(check_count(Category::Sequential, 4, 5, OnMismatch::Warn).is_ok());
        match check_count(Category::Parallel, 4, 5, OnMismatch::Fail) {
            Err(Error::CountMismatch {
                category,
                parsed,
                expected,
            }) => {
                assert_eq!(category, Category::Parallel);
                assert_eq!(parsed, 4);
                assert_eq!(expected, 5);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn mismatch_message() {
        let err = check_count(Category::Sequential, 3, 25, OnMismatch::Fail).unwrap_err();
        assert_eq!(err.to_string(), "seq_results length 3 != expected 25");
    }
}
