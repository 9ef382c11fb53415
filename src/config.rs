// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};

use log::LevelFilter;
use serde_derive::*;

use std::path::{Path, PathBuf};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Largest image side, in pixels, that the chart will be rendered at.
pub const MAX_PIXELS: f64 = 16384.0;

fn default_logging() -> LevelFilter {
    LevelFilter::Info
}

fn default_sizes() -> Vec<String> {
    ["xsmall", "small", "medium", "large", "xlarge"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_threads() -> Vec<usize> {
    vec![2, 4, 6, 8, 12]
}

fn default_rounds() -> usize {
    5
}

fn default_sequential() -> PathBuf {
    PathBuf::from("seq_results.txt")
}

fn default_parallel() -> PathBuf {
    PathBuf::from("par_results.txt")
}

fn default_chart() -> PathBuf {
    PathBuf::from("speedup.png")
}

fn default_caption() -> String {
    "Speedup vs Threads for Different Input Sizes".to_owned()
}

fn default_x_desc() -> String {
    "Number of Threads".to_owned()
}

fn default_y_desc() -> String {
    "Speedup (T_seq / T_par)".to_owned()
}

fn default_width() -> f64 {
    8.0
}

fn default_height() -> f64 {
    5.0
}

fn default_dpi() -> u32 {
    200
}

/// What to do when a measurement file holds a different number of values
/// than the benchmark layout calls for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnMismatch {
    /// Log a warning and average whatever values are present.
    Warn,
    /// Abort with `Error::CountMismatch`.
    Fail,
}

impl Default for OnMismatch {
    fn default() -> Self {
        OnMismatch::Warn
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    general: General,
    #[serde(default)]
    benchmark: Benchmark,
    #[serde(default)]
    input: Input,
    #[serde(default)]
    output: Output,
}

impl Config {
    /// Load the config from the given path, or fall back to the defaults
    /// when no path is given.
    pub fn new(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::load_str(&path.display().to_string(), &content)
    }

    pub fn load_str(name: &str, content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|source| Error::Config {
            name: name.to_owned(),
            source,
        })?;
        debug!("toml parsed successfully");
        config.validate()?;
        Ok(config)
    }

    pub fn general(&self) -> &General {
        &self.general
    }

    pub fn benchmark(&self) -> &Benchmark {
        &self.benchmark
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    pub fn validate(&self) -> Result<()> {
        let benchmark = &self.benchmark;
        if benchmark.sizes.is_empty() {
            return Err(Error::InvalidConfig("at least one size is required".into()));
        }
        if benchmark.threads.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one thread count is required".into(),
            ));
        }
        if benchmark.threads.iter().any(|t| *t == 0) {
            return Err(Error::InvalidConfig(
                "thread counts must be positive".into(),
            ));
        }
        if benchmark.rounds == 0 {
            return Err(Error::InvalidConfig("rounds must be positive".into()));
        }
        let output = &self.output;
        if output.dpi == 0 {
            return Err(Error::InvalidConfig("dpi must be positive".into()));
        }
        if !(output.width > 0.0 && output.height > 0.0) {
            return Err(Error::InvalidConfig(
                "figure width and height must be positive".into(),
            ));
        }
        let dpi = output.dpi as f64;
        if output.width * dpi > MAX_PIXELS || output.height * dpi > MAX_PIXELS {
            return Err(Error::InvalidConfig(format!(
                "figure size at {} dpi exceeds {} pixels per side",
                output.dpi, MAX_PIXELS
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    #[serde(default = "default_logging")]
    logging: LevelFilter,
    #[serde(default)]
    on_mismatch: OnMismatch,
}

impl Default for General {
    fn default() -> Self {
        Self {
            logging: default_logging(),
            on_mismatch: OnMismatch::default(),
        }
    }
}

impl General {
    pub fn logging(&self) -> LevelFilter {
        self.logging
    }

    pub fn on_mismatch(&self) -> OnMismatch {
        self.on_mismatch
    }
}

/// The layout of the measurement files: which sizes and thread counts were
/// run, and how many rounds each configuration was repeated.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Benchmark {
    #[serde(default = "default_sizes")]
    sizes: Vec<String>,
    #[serde(default = "default_threads")]
    threads: Vec<usize>,
    #[serde(default = "default_rounds")]
    rounds: usize,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            threads: default_threads(),
            rounds: default_rounds(),
        }
    }
}

impl Benchmark {
    pub fn new(sizes: Vec<String>, threads: Vec<usize>, rounds: usize) -> Self {
        Self {
            sizes,
            threads,
            rounds,
        }
    }

    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    pub fn threads(&self) -> &[usize] {
        &self.threads
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    #[serde(default = "default_sequential")]
    sequential: PathBuf,
    #[serde(default = "default_parallel")]
    parallel: PathBuf,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            sequential: default_sequential(),
            parallel: default_parallel(),
        }
    }
}

impl Input {
    pub fn sequential(&self) -> &Path {
        &self.sequential
    }

    pub fn parallel(&self) -> &Path {
        &self.parallel
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Output {
    #[serde(default = "default_chart")]
    chart: PathBuf,
    data: Option<PathBuf>,
    #[serde(default = "default_caption")]
    caption: String,
    #[serde(default = "default_x_desc")]
    x_desc: String,
    #[serde(default = "default_y_desc")]
    y_desc: String,
    #[serde(default = "default_width")]
    width: f64,
    #[serde(default = "default_height")]
    height: f64,
    #[serde(default = "default_dpi")]
    dpi: u32,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            chart: default_chart(),
            data: None,
            caption: default_caption(),
            x_desc: default_x_desc(),
            y_desc: default_y_desc(),
            width: default_width(),
            height: default_height(),
            dpi: default_dpi(),
        }
    }
}

impl Output {
    pub fn chart(&self) -> &Path {
        &self.chart
    }

    pub fn set_chart(&mut self, chart: impl Into<PathBuf>) {
        self.chart = chart.into();
    }

    pub fn data(&self) -> Option<&Path> {
        self.data.as_deref()
    }

    pub fn set_data(&mut self, data: Option<PathBuf>) {
        self.data = data;
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn x_desc(&self) -> &str {
        &self.x_desc
    }

    pub fn y_desc(&self) -> &str {
        &self.y_desc
    }

    /// Image size in pixels, derived from the figure size in inches and the
    /// resolution.
    pub fn pixels(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.width * dpi).round() as u32,
            (self.height * dpi).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new(None).unwrap();
        assert_eq!(config.benchmark().sizes().len(), 5);
        assert_eq!(config.benchmark().sizes()[0], "xsmall");
        assert_eq!(config.benchmark().threads(), &[2, 4, 6, 8, 12]);
        assert_eq!(config.benchmark().rounds(), 5);
        assert_eq!(config.input().sequential(), Path::new("seq_results.txt"));
        assert_eq!(config.input().parallel(), Path::new("par_results.txt"));
        assert_eq!(config.output().chart(), Path::new("speedup.png"));
        assert_eq!(config.output().data(), None);
        assert_eq!(config.output().pixels(), (1600, 1000));
        assert_eq!(config.general().on_mismatch(), OnMismatch::Warn);
        assert_eq!(config.general().logging(), LevelFilter::Info);
    }

    #[test]
    fn empty_file_is_default() {
        let config = Config::load_str("empty", "").unwrap();
        assert_eq!(config.benchmark(), &Benchmark::default());
    }

    #[test]
    fn sections() {
        let config = Config::load_str(
            "test",
            r#"
            [general]
            logging = "debug"
            on_mismatch = "fail"

            [benchmark]
            sizes = ["small", "large"]
            threads = [1, 2]
            rounds = 3

            [input]
            sequential = "seq.txt"

            [output]
            chart = "out.png"
            data = "out.json"
            dpi = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.general().logging(), LevelFilter::Debug);
        assert_eq!(config.general().on_mismatch(), OnMismatch::Fail);
        assert_eq!(config.benchmark().sizes(), &["small", "large"]);
        assert_eq!(config.benchmark().threads(), &[1, 2]);
        assert_eq!(config.benchmark().rounds(), 3);
        assert_eq!(config.input().sequential(), Path::new("seq.txt"));
        assert_eq!(config.input().parallel(), Path::new("par_results.txt"));
        assert_eq!(config.output().chart(), Path::new("out.png"));
        assert_eq!(config.output().data(), Some(Path::new("out.json")));
        assert_eq!(config.output().pixels(), (800, 500));
    }

    #[test]
    fn unknown_field() {
        let result = Config::load_str("test", "[benchmark]\nround = 3\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn invalid() {
        for content in &[
            "[benchmark]\nsizes = []\n",
            "[benchmark]\nthreads = []\n",
            "[benchmark]\nthreads = [0, 2]\n",
            "[benchmark]\nrounds = 0\n",
            "[output]\ndpi = 0\n",
            "[output]\nwidth = 0.0\n",
            "[output]\ndpi = 4000000000\n",
            "[output]\nwidth = 1000.0\n",
            "[output]\nheight = 1e300\n",
        ] {
            let result = Config::load_str("test", content);
            assert!(
                matches!(result, Err(Error::InvalidConfig(_))),
                "accepted: {}",
                content
            );
        }
    }

    #[test]
    fn missing_file() {
        let result = Config::load("/nonexistent/speedup.toml");
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
