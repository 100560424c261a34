use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;
use chordbook_core::ChordbookError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Model(#[from] ChordbookError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}
