// Copyright (c) 2026 rezky_nightky

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop glowdrift before or while it owns the terminal.
#[derive(Error, Debug)]
pub enum Error {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// An option value outside its documented range.
    #[error("failed to apply {name} {value} ({reason})")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid --cell-size {0} (expected WxH, each 1..=64)")]
    InvalidCellSize(String),

    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
