//! Typed failures at the catalog and asset-store boundaries. Everything above
//! these layers works with `anyhow` and adds context as errors bubble up.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::Collection;

#[derive(Debug, Error)]
#[error("unknown collection `{0}`")]
pub struct UnknownCollection(pub String);

/// Reasons the catalog cannot be loaded. All of them stop the process before
/// it starts serving.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse catalog")]
    Csv(#[from] csv::Error),
    #[error("catalog has no header row")]
    Empty,
    #[error("catalog header is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: expected at least {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: column `{column}` is empty")]
    EmptyField { line: u64, column: &'static str },
    #[error("line {line}: {source}")]
    Collection {
        line: u64,
        #[source]
        source: UnknownCollection,
    },
}

/// Failures while listing page images. An empty listing is not an error.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset folder for collection `{collection}` not found at {path}")]
    MissingCollection {
        collection: Collection,
        path: PathBuf,
    },
    #[error("failed to list assets in {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
