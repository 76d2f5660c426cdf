use std::collections::BTreeMap;

use camino::Utf8PathBuf;

/// Free-form dataset metadata (title, DOI, datum, scale factors, ranges).
pub type Attrs = BTreeMap<String, serde_json::Value>;

/// What a loader returns: the parsed dataset, or just the fetched (and
/// processed) file paths when the caller asked for `load = false`.
#[derive(Debug, Clone)]
pub enum Loaded<D> {
    Data(D),
    Paths(Vec<Utf8PathBuf>),
}

impl<D> Loaded<D> {
    pub fn data(self) -> Option<D> {
        match self {
            Loaded::Data(data) => Some(data),
            Loaded::Paths(_) => None,
        }
    }

    pub fn paths(self) -> Option<Vec<Utf8PathBuf>> {
        match self {
            Loaded::Data(_) => None,
            Loaded::Paths(paths) => Some(paths),
        }
    }
}

pub(crate) fn attr(value: impl Into<serde_json::Value>) -> serde_json::Value {
    value.into()
}
