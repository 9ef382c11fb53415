// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

use clap::{App, Arg};
use log::LevelFilter;

use speedup_graph::config::{NAME, VERSION};
use speedup_graph::{fatal, logger, Config};

fn main() {
    if let Err(e) = logger::init(LevelFilter::Info) {
        eprintln!("failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    let matches = App::new(NAME)
        .version(VERSION)
        .about("Plot parallel speedup from benchmark timings")
        .arg(
            Arg::with_name("CONFIG")
                .help("TOML config file, defaults are used when omitted")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("FILE")
                .help("where to save the chart")
                .takes_value(true),
        )
        .get_matches();

    let mut config = match Config::new(matches.value_of("CONFIG")) {
        Ok(config) => config,
        Err(e) => fatal!("{}", e),
    };
    logger::set_level(config.general().logging());

    if let Some(output) = matches.value_of("output") {
        config.output_mut().set_chart(output);
    }

    info!("{} {}", NAME, VERSION);
    debug!(
        "sizes: {:?} threads: {:?} rounds: {}",
        config.benchmark().sizes(),
        config.benchmark().threads(),
        config.benchmark().rounds()
    );

    if let Err(e) = speedup_graph::run(&config) {
        fatal!("{}", e);
    }
}
