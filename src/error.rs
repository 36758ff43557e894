use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CiflowError {
    #[error("Directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CiflowError>;
