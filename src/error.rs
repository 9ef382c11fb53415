// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::measurement::Category;

use thiserror::Error;

use std::num::ParseFloatError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: invalid number {value:?}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("{category} length {parsed} != expected {expected}")]
    CountMismatch {
        category: Category,
        parsed: usize,
        expected: usize,
    },
    #[error("failed to parse config {name}: {source}")]
    Config {
        name: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("failed to render chart {}: {reason}", .path.display())]
    Chart { path: PathBuf, reason: String },
    #[error("failed to export data {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
