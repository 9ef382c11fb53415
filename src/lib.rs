// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Speedup charts from benchmark timings.
//!
//! Sequential baseline timings are averaged per input size, parallel timings
//! per (input size, thread count), and the ratio of the two is plotted as one
//! line per input size.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

pub mod chart;
pub mod config;
pub mod error;
pub mod logger;
pub mod measurement;
pub mod speedup;

pub use crate::config::{Benchmark, Config, OnMismatch};
pub use crate::error::{Error, Result};
pub use crate::speedup::{Series, SpeedupTable};

/// Read both timing files and compute the speedup table.
pub fn prepare(config: &Config) -> Result<SpeedupTable> {
    let benchmark = config.benchmark();
    let policy = config.general().on_mismatch();

    let sequential = measurement::read_sequential(config.input().sequential(), benchmark, policy)?;
    let parallel = measurement::read_parallel(config.input().parallel(), benchmark, policy)?;

    let table = SpeedupTable::new(
        benchmark.sizes(),
        &sequential,
        &parallel,
        benchmark.threads(),
    );

    for series in table.series() {
        debug!(
            "size: {} sequential: {:?} parallel: {:?} speedup: {:?}",
            series.size(),
            series.sequential(),
            series.parallel(),
            series.speedup()
        );
    }

    Ok(table)
}

/// Run the whole pipeline: read, compute, render the chart and optionally
/// export the table.
pub fn run(config: &Config) -> Result<SpeedupTable> {
    let table = prepare(config)?;

    let chart = config.output().chart();
    chart::plot_speedup(&table, config.output(), chart)?;
    info!("saved plot to {}", chart.display());

    if let Some(data) = config.output().data() {
        table.save_json(data)?;
        info!("saved data to {}", data.display());
    }

    Ok(table)
}
