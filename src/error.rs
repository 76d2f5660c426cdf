use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GeoError {
    #[error("unknown dataset: {0}")]
    #[diagnostic(help("run `geodata list` to see the known logical filenames"))]
    UnknownDataset(String),

    #[error("invalid selector {value:?} for {dataset}: must be one of {valid:?}")]
    InvalidSelector {
        dataset: &'static str,
        value: String,
        valid: Vec<&'static str>,
    },

    #[error("malformed manifest line {line}: {message}")]
    Manifest { line: usize, message: String },

    #[error("transfer failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("hash mismatch for {name}: expected sha256:{expected}, got sha256:{actual}")]
    #[diagnostic(help(
        "the mirror may be corrupted or the registry entry is stale; the file was not kept in the cache"
    ))]
    Integrity {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("corrupt archive {archive}: {message}")]
    CorruptArchive { archive: String, message: String },

    #[error("member {member} not found in archive {archive}")]
    MemberNotFound { archive: String, member: String },

    #[error("shape mismatch while merging grids: {0}")]
    ShapeMismatch(String),

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
