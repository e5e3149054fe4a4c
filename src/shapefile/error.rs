use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A fault in a ".shp" file.
///
/// From the main header, this is fatal. From a single record, the reader
/// turns it into a warning and moves on.
#[derive(Debug,Error)]
pub enum ShpError {
    #[error(transparent)]
    IOError(#[from] io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// A fault in a ".dbf" file. Never fatal to a Shapefile read.
#[derive(Debug,Error)]
pub enum DbfError {
    #[error(transparent)]
    IOError(#[from] io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

#[derive(Debug,Error)]
pub enum ShapefileError {
    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error(transparent)]
    ShpError(#[from] ShpError),

    #[error(transparent)]
    DbfError(#[from] DbfError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    IOError(#[from] io::Error),
}
