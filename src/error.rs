use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read input {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{which} column index {index} is out of range (file has {columns} columns)")]
    ColumnOutOfRange {
        which: &'static str,
        index: usize,
        columns: usize,
    },

    #[error("Cannot write output {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot render image: {0}")]
    Render(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGUMENTS: i32 = 2;
    pub const INPUT_UNREADABLE: i32 = 3;
    pub const OUTPUT_UNWRITABLE: i32 = 4;
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InputUnreadable { .. } => exit_code::INPUT_UNREADABLE,
            Error::ColumnOutOfRange { .. } | Error::InvalidArgument(_) => {
                exit_code::INVALID_ARGUMENTS
            }
            Error::OutputUnwritable { .. } => exit_code::OUTPUT_UNWRITABLE,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}
